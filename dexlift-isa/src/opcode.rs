//! The Dalvik opcode table.
//!
//! One declarative table maps every defined opcode byte to its mnemonic,
//! encoding format and flag set. Bytes absent from the table are undefined
//! (reserved or odex-only) and decode as a fatal error.

use crate::format::Format;
use bitflags::bitflags;

bitflags! {
    /// Static control-flow properties of an opcode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpFlags: u8 {
        /// Execution can continue at the next instruction.
        const CONTINUES = 1 << 0;
        /// Carries a branch offset operand.
        const BRANCHES = 1 << 1;
        /// Switch dispatch through a payload table.
        const SWITCHES = 1 << 2;
        /// Returns from the method.
        const RETURNS = 1 << 3;
        /// Explicitly throws the exception in its register.
        const THROWS = 1 << 4;
        /// Potentially-excepting instruction: may raise a runtime
        /// exception per the ISA semantics.
        const CAN_THROW = 1 << 5;
    }
}

macro_rules! opcodes {
    ($( $value:literal $variant:ident $mnemonic:literal $format:ident [ $($flag:ident),* ] ; )*) => {
        /// A defined Dalvik opcode.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Opcode {
            $( $variant = $value, )*
        }

        impl Opcode {
            /// Look up the opcode for a byte value. `None` for undefined bytes.
            pub const fn from_byte(byte: u8) -> Option<Opcode> {
                match byte {
                    $( $value => Some(Opcode::$variant), )*
                    _ => None,
                }
            }

            /// The dex-format mnemonic.
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $( Opcode::$variant => $mnemonic, )*
                }
            }

            /// The instruction's encoding format.
            pub const fn format(self) -> Format {
                match self {
                    $( Opcode::$variant => Format::$format, )*
                }
            }

            /// Static control-flow flags.
            pub const fn flags(self) -> OpFlags {
                match self {
                    $( Opcode::$variant =>
                        OpFlags::from_bits_retain(0 $( | OpFlags::$flag.bits() )*), )*
                }
            }
        }
    };
}

opcodes! {
    0x00 Nop                  "nop"                     Format10x [CONTINUES];
    0x01 Move                 "move"                    Format12x [CONTINUES];
    0x02 MoveFrom16           "move/from16"             Format22x [CONTINUES];
    0x03 Move16               "move/16"                 Format32x [CONTINUES];
    0x04 MoveWide             "move-wide"               Format12x [CONTINUES];
    0x05 MoveWideFrom16       "move-wide/from16"        Format22x [CONTINUES];
    0x06 MoveWide16           "move-wide/16"            Format32x [CONTINUES];
    0x07 MoveObject           "move-object"             Format12x [CONTINUES];
    0x08 MoveObjectFrom16     "move-object/from16"      Format22x [CONTINUES];
    0x09 MoveObject16         "move-object/16"          Format32x [CONTINUES];
    0x0a MoveResult           "move-result"             Format11x [CONTINUES];
    0x0b MoveResultWide       "move-result-wide"        Format11x [CONTINUES];
    0x0c MoveResultObject     "move-result-object"      Format11x [CONTINUES];
    0x0d MoveException        "move-exception"          Format11x [CONTINUES];
    0x0e ReturnVoid           "return-void"             Format10x [RETURNS];
    0x0f Return               "return"                  Format11x [RETURNS];
    0x10 ReturnWide           "return-wide"             Format11x [RETURNS];
    0x11 ReturnObject         "return-object"           Format11x [RETURNS];
    0x12 Const4               "const/4"                 Format11n [CONTINUES];
    0x13 Const16              "const/16"                Format21s [CONTINUES];
    0x14 Const                "const"                   Format31i [CONTINUES];
    0x15 ConstHigh16          "const/high16"            Format21h [CONTINUES];
    0x16 ConstWide16          "const-wide/16"           Format21s [CONTINUES];
    0x17 ConstWide32          "const-wide/32"           Format31i [CONTINUES];
    0x18 ConstWide            "const-wide"              Format51l [CONTINUES];
    0x19 ConstWideHigh16      "const-wide/high16"       Format21h [CONTINUES];
    0x1a ConstString          "const-string"            Format21c [CONTINUES];
    0x1b ConstStringJumbo     "const-string/jumbo"      Format31c [CONTINUES];
    0x1c ConstClass           "const-class"             Format21c [CONTINUES];
    0x1d MonitorEnter         "monitor-enter"           Format11x [CONTINUES, CAN_THROW];
    0x1e MonitorExit          "monitor-exit"            Format11x [CONTINUES, CAN_THROW];
    0x1f CheckCast            "check-cast"              Format21c [CONTINUES, CAN_THROW];
    0x20 InstanceOf           "instance-of"             Format22c [CONTINUES];
    0x21 ArrayLength          "array-length"            Format12x [CONTINUES, CAN_THROW];
    0x22 NewInstance          "new-instance"            Format21c [CONTINUES, CAN_THROW];
    0x23 NewArray             "new-array"               Format22c [CONTINUES, CAN_THROW];
    0x24 FilledNewArray       "filled-new-array"        Format35c [CONTINUES, CAN_THROW];
    0x25 FilledNewArrayRange  "filled-new-array/range"  Format3rc [CONTINUES, CAN_THROW];
    0x26 FillArrayData        "fill-array-data"         Format31t [CONTINUES];
    0x27 Throw                "throw"                   Format11x [THROWS, CAN_THROW];
    0x28 Goto                 "goto"                    Format10t [BRANCHES];
    0x29 Goto16               "goto/16"                 Format20t [BRANCHES];
    0x2a Goto32               "goto/32"                 Format30t [BRANCHES];
    0x2b PackedSwitch         "packed-switch"           Format31t [SWITCHES];
    0x2c SparseSwitch         "sparse-switch"           Format31t [SWITCHES];
    0x2d CmplFloat            "cmpl-float"              Format23x [CONTINUES];
    0x2e CmpgFloat            "cmpg-float"              Format23x [CONTINUES];
    0x2f CmplDouble           "cmpl-double"             Format23x [CONTINUES];
    0x30 CmpgDouble           "cmpg-double"             Format23x [CONTINUES];
    0x31 CmpLong              "cmp-long"                Format23x [CONTINUES];
    0x32 IfEq                 "if-eq"                   Format22t [CONTINUES, BRANCHES];
    0x33 IfNe                 "if-ne"                   Format22t [CONTINUES, BRANCHES];
    0x34 IfLt                 "if-lt"                   Format22t [CONTINUES, BRANCHES];
    0x35 IfGe                 "if-ge"                   Format22t [CONTINUES, BRANCHES];
    0x36 IfGt                 "if-gt"                   Format22t [CONTINUES, BRANCHES];
    0x37 IfLe                 "if-le"                   Format22t [CONTINUES, BRANCHES];
    0x38 IfEqz                "if-eqz"                  Format21t [CONTINUES, BRANCHES];
    0x39 IfNez                "if-nez"                  Format21t [CONTINUES, BRANCHES];
    0x3a IfLtz                "if-ltz"                  Format21t [CONTINUES, BRANCHES];
    0x3b IfGez                "if-gez"                  Format21t [CONTINUES, BRANCHES];
    0x3c IfGtz                "if-gtz"                  Format21t [CONTINUES, BRANCHES];
    0x3d IfLez                "if-lez"                  Format21t [CONTINUES, BRANCHES];
    0x44 Aget                 "aget"                    Format23x [CONTINUES, CAN_THROW];
    0x45 AgetWide             "aget-wide"               Format23x [CONTINUES, CAN_THROW];
    0x46 AgetObject           "aget-object"             Format23x [CONTINUES, CAN_THROW];
    0x47 AgetBoolean          "aget-boolean"            Format23x [CONTINUES, CAN_THROW];
    0x48 AgetByte             "aget-byte"               Format23x [CONTINUES, CAN_THROW];
    0x49 AgetChar             "aget-char"               Format23x [CONTINUES, CAN_THROW];
    0x4a AgetShort            "aget-short"              Format23x [CONTINUES, CAN_THROW];
    0x4b Aput                 "aput"                    Format23x [CONTINUES, CAN_THROW];
    0x4c AputWide             "aput-wide"               Format23x [CONTINUES, CAN_THROW];
    0x4d AputObject           "aput-object"             Format23x [CONTINUES, CAN_THROW];
    0x4e AputBoolean          "aput-boolean"            Format23x [CONTINUES, CAN_THROW];
    0x4f AputByte             "aput-byte"               Format23x [CONTINUES, CAN_THROW];
    0x50 AputChar             "aput-char"               Format23x [CONTINUES, CAN_THROW];
    0x51 AputShort            "aput-short"              Format23x [CONTINUES, CAN_THROW];
    0x52 Iget                 "iget"                    Format22c [CONTINUES, CAN_THROW];
    0x53 IgetWide             "iget-wide"               Format22c [CONTINUES, CAN_THROW];
    0x54 IgetObject           "iget-object"             Format22c [CONTINUES, CAN_THROW];
    0x55 IgetBoolean          "iget-boolean"            Format22c [CONTINUES, CAN_THROW];
    0x56 IgetByte             "iget-byte"               Format22c [CONTINUES, CAN_THROW];
    0x57 IgetChar             "iget-char"               Format22c [CONTINUES, CAN_THROW];
    0x58 IgetShort            "iget-short"              Format22c [CONTINUES, CAN_THROW];
    0x59 Iput                 "iput"                    Format22c [CONTINUES, CAN_THROW];
    0x5a IputWide             "iput-wide"               Format22c [CONTINUES, CAN_THROW];
    0x5b IputObject           "iput-object"             Format22c [CONTINUES, CAN_THROW];
    0x5c IputBoolean          "iput-boolean"            Format22c [CONTINUES, CAN_THROW];
    0x5d IputByte             "iput-byte"               Format22c [CONTINUES, CAN_THROW];
    0x5e IputChar             "iput-char"               Format22c [CONTINUES, CAN_THROW];
    0x5f IputShort            "iput-short"              Format22c [CONTINUES, CAN_THROW];
    0x60 Sget                 "sget"                    Format21c [CONTINUES, CAN_THROW];
    0x61 SgetWide             "sget-wide"               Format21c [CONTINUES, CAN_THROW];
    0x62 SgetObject           "sget-object"             Format21c [CONTINUES, CAN_THROW];
    0x63 SgetBoolean          "sget-boolean"            Format21c [CONTINUES, CAN_THROW];
    0x64 SgetByte             "sget-byte"               Format21c [CONTINUES, CAN_THROW];
    0x65 SgetChar             "sget-char"               Format21c [CONTINUES, CAN_THROW];
    0x66 SgetShort            "sget-short"              Format21c [CONTINUES, CAN_THROW];
    0x67 Sput                 "sput"                    Format21c [CONTINUES, CAN_THROW];
    0x68 SputWide             "sput-wide"               Format21c [CONTINUES, CAN_THROW];
    0x69 SputObject           "sput-object"             Format21c [CONTINUES, CAN_THROW];
    0x6a SputBoolean          "sput-boolean"            Format21c [CONTINUES, CAN_THROW];
    0x6b SputByte             "sput-byte"               Format21c [CONTINUES, CAN_THROW];
    0x6c SputChar             "sput-char"               Format21c [CONTINUES, CAN_THROW];
    0x6d SputShort            "sput-short"              Format21c [CONTINUES, CAN_THROW];
    0x6e InvokeVirtual        "invoke-virtual"          Format35c [CONTINUES, CAN_THROW];
    0x6f InvokeSuper          "invoke-super"            Format35c [CONTINUES, CAN_THROW];
    0x70 InvokeDirect         "invoke-direct"           Format35c [CONTINUES, CAN_THROW];
    0x71 InvokeStatic         "invoke-static"           Format35c [CONTINUES, CAN_THROW];
    0x72 InvokeInterface      "invoke-interface"        Format35c [CONTINUES, CAN_THROW];
    0x74 InvokeVirtualRange   "invoke-virtual/range"    Format3rc [CONTINUES, CAN_THROW];
    0x75 InvokeSuperRange     "invoke-super/range"      Format3rc [CONTINUES, CAN_THROW];
    0x76 InvokeDirectRange    "invoke-direct/range"     Format3rc [CONTINUES, CAN_THROW];
    0x77 InvokeStaticRange    "invoke-static/range"     Format3rc [CONTINUES, CAN_THROW];
    0x78 InvokeInterfaceRange "invoke-interface/range"  Format3rc [CONTINUES, CAN_THROW];
    0x7b NegInt               "neg-int"                 Format12x [CONTINUES];
    0x7c NotInt               "not-int"                 Format12x [CONTINUES];
    0x7d NegLong              "neg-long"                Format12x [CONTINUES];
    0x7e NotLong              "not-long"                Format12x [CONTINUES];
    0x7f NegFloat             "neg-float"               Format12x [CONTINUES];
    0x80 NegDouble            "neg-double"              Format12x [CONTINUES];
    0x81 IntToLong            "int-to-long"             Format12x [CONTINUES];
    0x82 IntToFloat           "int-to-float"            Format12x [CONTINUES];
    0x83 IntToDouble          "int-to-double"           Format12x [CONTINUES];
    0x84 LongToInt            "long-to-int"             Format12x [CONTINUES];
    0x85 LongToFloat          "long-to-float"           Format12x [CONTINUES];
    0x86 LongToDouble         "long-to-double"          Format12x [CONTINUES];
    0x87 FloatToInt           "float-to-int"            Format12x [CONTINUES];
    0x88 FloatToLong          "float-to-long"           Format12x [CONTINUES];
    0x89 FloatToDouble        "float-to-double"         Format12x [CONTINUES];
    0x8a DoubleToInt          "double-to-int"           Format12x [CONTINUES];
    0x8b DoubleToLong         "double-to-long"          Format12x [CONTINUES];
    0x8c DoubleToFloat        "double-to-float"         Format12x [CONTINUES];
    0x8d IntToByte            "int-to-byte"             Format12x [CONTINUES];
    0x8e IntToChar            "int-to-char"             Format12x [CONTINUES];
    0x8f IntToShort           "int-to-short"            Format12x [CONTINUES];
    0x90 AddInt               "add-int"                 Format23x [CONTINUES];
    0x91 SubInt               "sub-int"                 Format23x [CONTINUES];
    0x92 MulInt               "mul-int"                 Format23x [CONTINUES];
    0x93 DivInt               "div-int"                 Format23x [CONTINUES, CAN_THROW];
    0x94 RemInt               "rem-int"                 Format23x [CONTINUES, CAN_THROW];
    0x95 AndInt               "and-int"                 Format23x [CONTINUES];
    0x96 OrInt                "or-int"                  Format23x [CONTINUES];
    0x97 XorInt               "xor-int"                 Format23x [CONTINUES];
    0x98 ShlInt               "shl-int"                 Format23x [CONTINUES];
    0x99 ShrInt               "shr-int"                 Format23x [CONTINUES];
    0x9a UshrInt              "ushr-int"                Format23x [CONTINUES];
    0x9b AddLong              "add-long"                Format23x [CONTINUES];
    0x9c SubLong              "sub-long"                Format23x [CONTINUES];
    0x9d MulLong              "mul-long"                Format23x [CONTINUES];
    0x9e DivLong              "div-long"                Format23x [CONTINUES, CAN_THROW];
    0x9f RemLong              "rem-long"                Format23x [CONTINUES, CAN_THROW];
    0xa0 AndLong              "and-long"                Format23x [CONTINUES];
    0xa1 OrLong               "or-long"                 Format23x [CONTINUES];
    0xa2 XorLong              "xor-long"                Format23x [CONTINUES];
    0xa3 ShlLong              "shl-long"                Format23x [CONTINUES];
    0xa4 ShrLong              "shr-long"                Format23x [CONTINUES];
    0xa5 UshrLong             "ushr-long"               Format23x [CONTINUES];
    0xa6 AddFloat             "add-float"               Format23x [CONTINUES];
    0xa7 SubFloat             "sub-float"               Format23x [CONTINUES];
    0xa8 MulFloat             "mul-float"               Format23x [CONTINUES];
    0xa9 DivFloat             "div-float"               Format23x [CONTINUES];
    0xaa RemFloat             "rem-float"               Format23x [CONTINUES];
    0xab AddDouble            "add-double"              Format23x [CONTINUES];
    0xac SubDouble            "sub-double"              Format23x [CONTINUES];
    0xad MulDouble            "mul-double"              Format23x [CONTINUES];
    0xae DivDouble            "div-double"              Format23x [CONTINUES];
    0xaf RemDouble            "rem-double"              Format23x [CONTINUES];
    0xb0 AddInt2addr          "add-int/2addr"           Format12x [CONTINUES];
    0xb1 SubInt2addr          "sub-int/2addr"           Format12x [CONTINUES];
    0xb2 MulInt2addr          "mul-int/2addr"           Format12x [CONTINUES];
    0xb3 DivInt2addr          "div-int/2addr"           Format12x [CONTINUES, CAN_THROW];
    0xb4 RemInt2addr          "rem-int/2addr"           Format12x [CONTINUES, CAN_THROW];
    0xb5 AndInt2addr          "and-int/2addr"           Format12x [CONTINUES];
    0xb6 OrInt2addr           "or-int/2addr"            Format12x [CONTINUES];
    0xb7 XorInt2addr          "xor-int/2addr"           Format12x [CONTINUES];
    0xb8 ShlInt2addr          "shl-int/2addr"           Format12x [CONTINUES];
    0xb9 ShrInt2addr          "shr-int/2addr"           Format12x [CONTINUES];
    0xba UshrInt2addr         "ushr-int/2addr"          Format12x [CONTINUES];
    0xbb AddLong2addr         "add-long/2addr"          Format12x [CONTINUES];
    0xbc SubLong2addr         "sub-long/2addr"          Format12x [CONTINUES];
    0xbd MulLong2addr         "mul-long/2addr"          Format12x [CONTINUES];
    0xbe DivLong2addr         "div-long/2addr"          Format12x [CONTINUES, CAN_THROW];
    0xbf RemLong2addr         "rem-long/2addr"          Format12x [CONTINUES, CAN_THROW];
    0xc0 AndLong2addr         "and-long/2addr"          Format12x [CONTINUES];
    0xc1 OrLong2addr          "or-long/2addr"           Format12x [CONTINUES];
    0xc2 XorLong2addr         "xor-long/2addr"          Format12x [CONTINUES];
    0xc3 ShlLong2addr         "shl-long/2addr"          Format12x [CONTINUES];
    0xc4 ShrLong2addr         "shr-long/2addr"          Format12x [CONTINUES];
    0xc5 UshrLong2addr        "ushr-long/2addr"         Format12x [CONTINUES];
    0xc6 AddFloat2addr        "add-float/2addr"         Format12x [CONTINUES];
    0xc7 SubFloat2addr        "sub-float/2addr"         Format12x [CONTINUES];
    0xc8 MulFloat2addr        "mul-float/2addr"         Format12x [CONTINUES];
    0xc9 DivFloat2addr        "div-float/2addr"         Format12x [CONTINUES];
    0xca RemFloat2addr        "rem-float/2addr"         Format12x [CONTINUES];
    0xcb AddDouble2addr       "add-double/2addr"        Format12x [CONTINUES];
    0xcc SubDouble2addr       "sub-double/2addr"        Format12x [CONTINUES];
    0xcd MulDouble2addr       "mul-double/2addr"        Format12x [CONTINUES];
    0xce DivDouble2addr       "div-double/2addr"        Format12x [CONTINUES];
    0xcf RemDouble2addr       "rem-double/2addr"        Format12x [CONTINUES];
    0xd0 AddIntLit16          "add-int/lit16"           Format22s [CONTINUES];
    0xd1 RsubInt              "rsub-int"                Format22s [CONTINUES];
    0xd2 MulIntLit16          "mul-int/lit16"           Format22s [CONTINUES];
    0xd3 DivIntLit16          "div-int/lit16"           Format22s [CONTINUES, CAN_THROW];
    0xd4 RemIntLit16          "rem-int/lit16"           Format22s [CONTINUES, CAN_THROW];
    0xd5 AndIntLit16          "and-int/lit16"           Format22s [CONTINUES];
    0xd6 OrIntLit16           "or-int/lit16"            Format22s [CONTINUES];
    0xd7 XorIntLit16          "xor-int/lit16"           Format22s [CONTINUES];
    0xd8 AddIntLit8           "add-int/lit8"            Format22b [CONTINUES];
    0xd9 RsubIntLit8          "rsub-int/lit8"           Format22b [CONTINUES];
    0xda MulIntLit8           "mul-int/lit8"            Format22b [CONTINUES];
    0xdb DivIntLit8           "div-int/lit8"            Format22b [CONTINUES, CAN_THROW];
    0xdc RemIntLit8           "rem-int/lit8"            Format22b [CONTINUES, CAN_THROW];
    0xdd AndIntLit8           "and-int/lit8"            Format22b [CONTINUES];
    0xde OrIntLit8            "or-int/lit8"             Format22b [CONTINUES];
    0xdf XorIntLit8           "xor-int/lit8"            Format22b [CONTINUES];
    0xe0 ShlIntLit8           "shl-int/lit8"            Format22b [CONTINUES];
    0xe1 ShrIntLit8           "shr-int/lit8"            Format22b [CONTINUES];
    0xe2 UshrIntLit8          "ushr-int/lit8"           Format22b [CONTINUES];
}

impl Opcode {
    /// The opcode byte value.
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Whether this is a potentially-excepting instruction.
    pub const fn can_throw(self) -> bool {
        self.flags().contains(OpFlags::CAN_THROW)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Payload ident words, stored where an opcode byte of 0x00 would be.
pub const PACKED_SWITCH_PAYLOAD_IDENT: u16 = 0x0100;
pub const SPARSE_SWITCH_PAYLOAD_IDENT: u16 = 0x0200;
pub const ARRAY_DATA_PAYLOAD_IDENT: u16 = 0x0300;
