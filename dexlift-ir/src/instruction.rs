//! Semantic instructions.
//!
//! One decoded instruction per indexed address; payload pseudo-instructions
//! are folded into their owners during decoding and never appear here.
//! Instructions are immutable once the method's sequence is built and are
//! referenced by index everywhere downstream.

use crate::types::{FieldRef, MethodRef, TypeRef, runtime_exceptions as rex};
use dexlift_isa::{OpFlags, Opcode};

/// Register width/kind of an array or field access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Single,
    Wide,
    Object,
    Boolean,
    Byte,
    Char,
    Short,
}

/// Invocation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeKind {
    Virtual,
    Super,
    Direct,
    Static,
    Interface,
}

/// Comparison kind for `cmp*` instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareKind {
    CmplFloat,
    CmpgFloat,
    CmplDouble,
    CmpgDouble,
    CmpLong,
}

/// Branch test of an `if-*` or `if-*z` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfTest {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

/// Unary operator, including primitive conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    NegInt,
    NotInt,
    NegLong,
    NotLong,
    NegFloat,
    NegDouble,
    IntToLong,
    IntToFloat,
    IntToDouble,
    LongToInt,
    LongToFloat,
    LongToDouble,
    FloatToInt,
    FloatToLong,
    FloatToDouble,
    DoubleToInt,
    DoubleToLong,
    DoubleToFloat,
    IntToByte,
    IntToChar,
    IntToShort,
}

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    /// Reverse subtraction (literal forms only).
    Rsub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Ushr,
}

/// Numeric type of a binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumType {
    Int,
    Long,
    Float,
    Double,
}

/// A constant operand.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i32),
    Wide(i64),
    String(String),
    Class(TypeRef),
}

/// Linked `fill-array-data` payload contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayData {
    pub element_width: u16,
    pub data: Vec<u8>,
}

/// The semantic operation of one instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Nop,
    /// Register move; `src` may be the result or exception pseudo-register.
    Move { dest: u16, src: u16, wide: bool },
    /// `move-exception`: `src` is always the exception pseudo-register.
    MoveException { dest: u16, src: u16 },
    Return {
        value: Option<u16>,
        wide: bool,
        object: bool,
    },
    Const { dest: u16, value: ConstValue },
    MonitorEnter { object: u16 },
    MonitorExit { object: u16 },
    CheckCast { object: u16, ty: TypeRef },
    InstanceOf { dest: u16, object: u16, ty: TypeRef },
    ArrayLength { dest: u16, array: u16 },
    NewInstance { dest: u16, ty: TypeRef },
    NewArray { dest: u16, size: u16, ty: TypeRef },
    /// `filled-new-array`; the result lands in the result pseudo-register.
    FilledNewArray {
        dest: u16,
        ty: TypeRef,
        element_ty: TypeRef,
        args: Vec<u16>,
    },
    FillArrayData {
        array: u16,
        table_offset: i32,
        element_ty: TypeRef,
        /// Payload contents, once the owning table has been linked.
        data: Option<ArrayData>,
    },
    Throw { exception: u16 },
    /// Absolute target address.
    Goto { target: u32 },
    Switch {
        value: u16,
        table_offset: i32,
        /// Absolute case target addresses, once the table has been linked.
        targets: Vec<u32>,
        /// Absolute default target (the next instruction).
        default: u32,
    },
    Compare {
        kind: CompareKind,
        dest: u16,
        left: u16,
        right: u16,
    },
    /// Two-register test when `right` is set, zero test otherwise.
    If {
        test: IfTest,
        left: u16,
        right: Option<u16>,
        target: u32,
    },
    ArrayGet {
        kind: AccessKind,
        dest: u16,
        array: u16,
        index: u16,
    },
    ArrayPut {
        kind: AccessKind,
        src: u16,
        array: u16,
        index: u16,
    },
    InstanceGet {
        kind: AccessKind,
        dest: u16,
        object: u16,
        field: FieldRef,
    },
    InstancePut {
        kind: AccessKind,
        src: u16,
        object: u16,
        field: FieldRef,
    },
    StaticGet {
        kind: AccessKind,
        dest: u16,
        field: FieldRef,
    },
    StaticPut {
        kind: AccessKind,
        src: u16,
        field: FieldRef,
    },
    Invoke {
        kind: InvokeKind,
        method: MethodRef,
        args: Vec<u16>,
    },
    Unary { op: UnaryOp, dest: u16, src: u16 },
    Binary {
        op: BinaryOp,
        ty: NumType,
        dest: u16,
        left: u16,
        right: u16,
    },
    BinaryLit {
        op: BinaryOp,
        dest: u16,
        src: u16,
        literal: i32,
    },
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Code-unit address.
    pub addr: u32,
    pub opcode: Opcode,
    pub op: Op,
}

impl Instruction {
    /// Absolute branch target addresses. A switch lists every case target
    /// plus its default; non-branching instructions list nothing.
    pub fn branch_targets(&self) -> Vec<u32> {
        match &self.op {
            Op::Goto { target } => vec![*target],
            Op::If { target, .. } => vec![*target],
            Op::Switch {
                targets, default, ..
            } => {
                let mut all = targets.clone();
                all.push(*default);
                all
            }
            _ => Vec::new(),
        }
    }

    /// Whether execution can continue at the next instruction.
    pub fn falls_through(&self) -> bool {
        self.opcode.flags().contains(OpFlags::CONTINUES)
    }

    /// Whether this is a potentially-excepting instruction.
    pub fn may_throw(&self) -> bool {
        self.opcode.flags().contains(OpFlags::CAN_THROW)
    }

    pub fn is_return(&self) -> bool {
        self.opcode.flags().contains(OpFlags::RETURNS)
    }

    pub fn is_explicit_throw(&self) -> bool {
        self.opcode.flags().contains(OpFlags::THROWS)
    }

    /// The exception types this instruction may raise implicitly,
    /// independent of the class hierarchy. Does not include the type an
    /// explicit throw carries, nor a callee's declared exceptions.
    pub fn implicit_exceptions(&self) -> &'static [&'static str] {
        implicit_exceptions(self.opcode)
    }
}

const ARRAY_ACCESS: &[&str] = &[rex::NULL_POINTER, rex::ARRAY_INDEX_OUT_OF_BOUNDS];
const AASTORE: &[&str] = &[
    rex::NULL_POINTER,
    rex::ARRAY_INDEX_OUT_OF_BOUNDS,
    rex::ARRAY_STORE,
];
const NPE: &[&str] = &[rex::NULL_POINTER];
const ARITHMETIC: &[&str] = &[rex::ARITHMETIC];
const NEW_SCALAR: &[&str] = &[rex::EXCEPTION_IN_INITIALIZER, rex::OUT_OF_MEMORY];
const NEW_ARRAY: &[&str] = &[rex::OUT_OF_MEMORY, rex::NEGATIVE_ARRAY_SIZE];
const CLASS_CAST: &[&str] = &[rex::CLASS_CAST];
const CLASS_INIT: &[&str] = &[rex::EXCEPTION_IN_INITIALIZER];

/// The fixed opcode-to-implicit-exception-types table.
pub fn implicit_exceptions(opcode: Opcode) -> &'static [&'static str] {
    use Opcode::*;
    match opcode {
        Aget | AgetWide | AgetObject | AgetBoolean | AgetByte | AgetChar | AgetShort | Aput
        | AputWide | AputBoolean | AputByte | AputChar | AputShort => ARRAY_ACCESS,
        AputObject => AASTORE,
        Iget | IgetWide | IgetObject | IgetBoolean | IgetByte | IgetChar | IgetShort | Iput
        | IputWide | IputObject | IputBoolean | IputByte | IputChar | IputShort => NPE,
        // Like the JVM bytecode front end, static invokes contribute no
        // implicit NPE; their class-init effects come from the callee.
        InvokeVirtual | InvokeSuper | InvokeDirect | InvokeInterface | InvokeVirtualRange
        | InvokeSuperRange | InvokeDirectRange | InvokeInterfaceRange => NPE,
        DivInt | RemInt | DivLong | RemLong | DivInt2addr | RemInt2addr | DivLong2addr
        | RemLong2addr | DivIntLit16 | RemIntLit16 | DivIntLit8 | RemIntLit8 => ARITHMETIC,
        NewInstance => NEW_SCALAR,
        NewArray | FilledNewArray | FilledNewArrayRange => NEW_ARRAY,
        ArrayLength | MonitorEnter | MonitorExit => NPE,
        // The explicitly-thrown type is the caller's concern; the throw
        // itself can only raise NPE on a null operand.
        Throw => NPE,
        CheckCast => CLASS_CAST,
        Sget | SgetWide | SgetObject | SgetBoolean | SgetByte | SgetChar | SgetShort | Sput
        | SputWide | SputObject | SputBoolean | SputByte | SputChar | SputShort => CLASS_INIT,
        _ => &[],
    }
}
