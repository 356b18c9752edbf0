//! Raw-to-semantic translation of one method.
//!
//! Every defined opcode maps through a per-family dispatch table to exactly
//! one [`Op`] constructor; family functions are small and independently
//! testable. Payload pseudo-instructions are linked to their owners as they
//! stream past and never become instructions of their own.

use dexlift_ir::{
    AccessKind, AddressIndex, ArrayData, BinaryOp, CompareKind, ConstValue, Diagnostics, IfTest,
    Instruction, InvokeKind, NumType, Op, TypeRef, UnaryOp,
};
use dexlift_isa::{
    ArrayDataPayload, Opcode, PackedSwitchPayload, RawInstruction, RawNode, SparseSwitchPayload,
    decode_units,
};

use crate::error::{FrontError, Result};
use crate::method::{ConstantPool, MethodBody};

/// One method's decoded instruction stream plus the lookup structures the
/// rest of the pipeline needs.
#[derive(Debug, Clone)]
pub struct DecodedMethod {
    pub instructions: Vec<Instruction>,
    pub index: AddressIndex,
    /// Size in code units of each instruction, by index.
    pub sizes: Vec<u32>,
    pub diagnostics: Diagnostics,
}

/// Decode and translate the method's raw code.
pub fn decode_method(body: &dyn MethodBody) -> Result<DecodedMethod> {
    let nodes = decode_units(body.code())?;
    let mut tr = Translator {
        pool: body.pool(),
        result_register: body.result_register(),
        exception_register: body.exception_register(),
        instructions: Vec::with_capacity(nodes.len()),
        sizes: Vec::with_capacity(nodes.len()),
        diagnostics: Diagnostics::new(),
    };
    for node in &nodes {
        match node {
            RawNode::Insn(raw) => tr.translate(raw)?,
            RawNode::PackedSwitch(p) => tr.link_packed(p),
            RawNode::SparseSwitch(p) => tr.link_sparse(p),
            RawNode::ArrayData(p) => tr.link_array_data(p),
        }
    }
    let index = AddressIndex::from_instructions(&tr.instructions);
    Ok(DecodedMethod {
        instructions: tr.instructions,
        index,
        sizes: tr.sizes,
        diagnostics: tr.diagnostics,
    })
}

struct Translator<'a> {
    pool: &'a dyn ConstantPool,
    result_register: u16,
    exception_register: u16,
    instructions: Vec<Instruction>,
    sizes: Vec<u32>,
    diagnostics: Diagnostics,
}

type TranslateFn<'a> = fn(&mut Translator<'a>, &RawInstruction) -> Result<Op>;

/// The opcode-to-family dispatch table.
fn family_of<'a>(opcode: Opcode) -> TranslateFn<'a> {
    use Opcode::*;
    match opcode {
        Nop => Translator::nop,
        Move | MoveFrom16 | Move16 | MoveWide | MoveWideFrom16 | MoveWide16 | MoveObject
        | MoveObjectFrom16 | MoveObject16 => Translator::mov,
        MoveResult | MoveResultWide | MoveResultObject => Translator::mov_result,
        MoveException => Translator::mov_exception,
        ReturnVoid | Return | ReturnWide | ReturnObject => Translator::ret,
        Const4 | Const16 | Const | ConstHigh16 | ConstWide16 | ConstWide32 | ConstWide
        | ConstWideHigh16 | ConstString | ConstStringJumbo | ConstClass => Translator::constant,
        MonitorEnter | MonitorExit => Translator::monitor,
        CheckCast => Translator::check_cast,
        InstanceOf => Translator::instance_of,
        ArrayLength => Translator::array_length,
        NewInstance => Translator::new_instance,
        NewArray => Translator::new_array,
        FilledNewArray | FilledNewArrayRange => Translator::filled_new_array,
        FillArrayData => Translator::fill_array_data,
        Throw => Translator::throw,
        Goto | Goto16 | Goto32 => Translator::goto,
        PackedSwitch | SparseSwitch => Translator::switch,
        CmplFloat | CmpgFloat | CmplDouble | CmpgDouble | CmpLong => Translator::compare,
        IfEq | IfNe | IfLt | IfGe | IfGt | IfLe | IfEqz | IfNez | IfLtz | IfGez | IfGtz
        | IfLez => Translator::if_test,
        Aget | AgetWide | AgetObject | AgetBoolean | AgetByte | AgetChar | AgetShort => {
            Translator::aget
        }
        Aput | AputWide | AputObject | AputBoolean | AputByte | AputChar | AputShort => {
            Translator::aput
        }
        Iget | IgetWide | IgetObject | IgetBoolean | IgetByte | IgetChar | IgetShort => {
            Translator::iget
        }
        Iput | IputWide | IputObject | IputBoolean | IputByte | IputChar | IputShort => {
            Translator::iput
        }
        Sget | SgetWide | SgetObject | SgetBoolean | SgetByte | SgetChar | SgetShort => {
            Translator::sget
        }
        Sput | SputWide | SputObject | SputBoolean | SputByte | SputChar | SputShort => {
            Translator::sput
        }
        InvokeVirtual | InvokeSuper | InvokeDirect | InvokeStatic | InvokeInterface
        | InvokeVirtualRange | InvokeSuperRange | InvokeDirectRange | InvokeStaticRange
        | InvokeInterfaceRange => Translator::invoke,
        NegInt | NotInt | NegLong | NotLong | NegFloat | NegDouble | IntToLong | IntToFloat
        | IntToDouble | LongToInt | LongToFloat | LongToDouble | FloatToInt | FloatToLong
        | FloatToDouble | DoubleToInt | DoubleToLong | DoubleToFloat | IntToByte | IntToChar
        | IntToShort => Translator::unary,
        AddInt | SubInt | MulInt | DivInt | RemInt | AndInt | OrInt | XorInt | ShlInt | ShrInt
        | UshrInt | AddLong | SubLong | MulLong | DivLong | RemLong | AndLong | OrLong
        | XorLong | ShlLong | ShrLong | UshrLong | AddFloat | SubFloat | MulFloat | DivFloat
        | RemFloat | AddDouble | SubDouble | MulDouble | DivDouble | RemDouble => {
            Translator::binary
        }
        AddInt2addr | SubInt2addr | MulInt2addr | DivInt2addr | RemInt2addr | AndInt2addr
        | OrInt2addr | XorInt2addr | ShlInt2addr | ShrInt2addr | UshrInt2addr | AddLong2addr
        | SubLong2addr | MulLong2addr | DivLong2addr | RemLong2addr | AndLong2addr
        | OrLong2addr | XorLong2addr | ShlLong2addr | ShrLong2addr | UshrLong2addr
        | AddFloat2addr | SubFloat2addr | MulFloat2addr | DivFloat2addr | RemFloat2addr
        | AddDouble2addr | SubDouble2addr | MulDouble2addr | DivDouble2addr | RemDouble2addr => {
            Translator::binary_2addr
        }
        AddIntLit16 | RsubInt | MulIntLit16 | DivIntLit16 | RemIntLit16 | AndIntLit16
        | OrIntLit16 | XorIntLit16 | AddIntLit8 | RsubIntLit8 | MulIntLit8 | DivIntLit8
        | RemIntLit8 | AndIntLit8 | OrIntLit8 | XorIntLit8 | ShlIntLit8 | ShrIntLit8
        | UshrIntLit8 => Translator::binary_lit,
    }
}

/// Absolute target of a relative branch operand.
fn target(raw: &RawInstruction) -> u32 {
    (raw.addr as i64 + raw.offset as i64) as u32
}

fn inline_args(raw: &RawInstruction) -> Vec<u16> {
    raw.args[..raw.arg_count as usize].to_vec()
}

fn range_args(raw: &RawInstruction) -> Vec<u16> {
    let start = raw.b as u32;
    (start..start + raw.a as u32).map(|r| r as u16).collect()
}

/// The six register-access families are laid out seven opcodes apart with
/// the same width order, so one modular table covers them all.
fn access_kind(opcode: Opcode) -> AccessKind {
    const ORDER: [AccessKind; 7] = [
        AccessKind::Single,
        AccessKind::Wide,
        AccessKind::Object,
        AccessKind::Boolean,
        AccessKind::Byte,
        AccessKind::Char,
        AccessKind::Short,
    ];
    ORDER[((opcode.value() - Opcode::Aget.value()) % 7) as usize]
}

fn is_object_move(opcode: Opcode) -> bool {
    matches!(
        opcode,
        Opcode::MoveObject | Opcode::MoveObjectFrom16 | Opcode::MoveObject16
    )
}

impl Translator<'_> {
    fn translate(&mut self, raw: &RawInstruction) -> Result<()> {
        let op = family_of(raw.opcode)(self, raw)?;
        self.instructions.push(Instruction {
            addr: raw.addr,
            opcode: raw.opcode,
            op,
        });
        self.sizes.push(raw.units as u32);
        self.diagnostics.instructions_decoded += 1;
        Ok(())
    }

    fn type_at(&self, index: u32) -> Result<TypeRef> {
        self.pool
            .type_at(index)
            .ok_or(FrontError::BadPoolIndex { kind: "type", index })
    }

    fn field_at(&self, index: u32) -> Result<dexlift_ir::FieldRef> {
        self.pool
            .field_at(index)
            .ok_or(FrontError::BadPoolIndex { kind: "field", index })
    }

    fn method_at(&self, index: u32) -> Result<dexlift_ir::MethodRef> {
        self.pool.method_at(index).ok_or(FrontError::BadPoolIndex {
            kind: "method",
            index,
        })
    }

    fn string_at(&self, index: u32) -> Result<String> {
        self.pool.string_at(index).ok_or(FrontError::BadPoolIndex {
            kind: "string",
            index,
        })
    }

    fn nop(&mut self, _raw: &RawInstruction) -> Result<Op> {
        Ok(Op::Nop)
    }

    fn mov(&mut self, raw: &RawInstruction) -> Result<Op> {
        let wide = matches!(
            raw.opcode,
            Opcode::MoveWide | Opcode::MoveWideFrom16 | Opcode::MoveWide16
        );
        Ok(Op::Move {
            dest: raw.a,
            src: raw.b,
            wide,
        })
    }

    fn mov_result(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::Move {
            dest: raw.a,
            src: self.result_register,
            wide: raw.opcode == Opcode::MoveResultWide,
        })
    }

    fn mov_exception(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::MoveException {
            dest: raw.a,
            src: self.exception_register,
        })
    }

    fn ret(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(match raw.opcode {
            Opcode::ReturnVoid => Op::Return {
                value: None,
                wide: false,
                object: false,
            },
            _ => Op::Return {
                value: Some(raw.a),
                wide: raw.opcode == Opcode::ReturnWide,
                object: raw.opcode == Opcode::ReturnObject,
            },
        })
    }

    fn constant(&mut self, raw: &RawInstruction) -> Result<Op> {
        use Opcode::*;
        let value = match raw.opcode {
            Const4 | Const16 | Const | ConstHigh16 => ConstValue::Int(raw.literal as i32),
            ConstWide16 | ConstWide32 | ConstWide | ConstWideHigh16 => {
                ConstValue::Wide(raw.literal)
            }
            ConstString | ConstStringJumbo => ConstValue::String(self.string_at(raw.index)?),
            _ => ConstValue::Class(self.type_at(raw.index)?),
        };
        Ok(Op::Const { dest: raw.a, value })
    }

    fn monitor(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(if raw.opcode == Opcode::MonitorEnter {
            Op::MonitorEnter { object: raw.a }
        } else {
            Op::MonitorExit { object: raw.a }
        })
    }

    fn check_cast(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::CheckCast {
            object: raw.a,
            ty: self.type_at(raw.index)?,
        })
    }

    fn instance_of(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::InstanceOf {
            dest: raw.a,
            object: raw.b,
            ty: self.type_at(raw.index)?,
        })
    }

    fn array_length(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::ArrayLength {
            dest: raw.a,
            array: raw.b,
        })
    }

    fn new_instance(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::NewInstance {
            dest: raw.a,
            ty: self.type_at(raw.index)?,
        })
    }

    fn new_array(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::NewArray {
            dest: raw.a,
            size: raw.b,
            ty: self.type_at(raw.index)?,
        })
    }

    fn filled_new_array(&mut self, raw: &RawInstruction) -> Result<Op> {
        let ty = self.type_at(raw.index)?;
        let element_ty = ty.array_element_type().unwrap_or_else(|| ty.clone());
        let args = if raw.opcode == Opcode::FilledNewArray {
            inline_args(raw)
        } else {
            range_args(raw)
        };
        Ok(Op::FilledNewArray {
            dest: self.result_register,
            ty,
            element_ty,
            args,
        })
    }

    fn fill_array_data(&mut self, raw: &RawInstruction) -> Result<Op> {
        let element_ty = self.infer_fill_element_type(raw.addr, raw.a)?;
        Ok(Op::FillArrayData {
            array: raw.a,
            table_offset: raw.offset,
            element_ty,
            data: None,
        })
    }

    /// Backward walk from a `fill-array-data` to the `new-array` that made
    /// the array, following object moves of the tracked register. Bounded
    /// by the start of the method; falling off the front is fatal.
    fn infer_fill_element_type(&self, addr: u32, register: u16) -> Result<TypeRef> {
        let mut reg = register;
        for ins in self.instructions.iter().rev() {
            match &ins.op {
                Op::NewArray { dest, ty, .. } if *dest == reg => {
                    return Ok(ty.array_element_type().unwrap_or_else(|| ty.clone()));
                }
                Op::Move {
                    dest,
                    src,
                    wide: false,
                } if *dest == reg && is_object_move(ins.opcode) => {
                    reg = *src;
                }
                _ => {}
            }
        }
        Err(FrontError::UnresolvedArrayFill { addr })
    }

    fn throw(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::Throw { exception: raw.a })
    }

    fn goto(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::Goto {
            target: target(raw),
        })
    }

    fn switch(&mut self, raw: &RawInstruction) -> Result<Op> {
        // Case targets arrive when the payload is linked; the default is
        // the fallthrough.
        Ok(Op::Switch {
            value: raw.a,
            table_offset: raw.offset,
            targets: Vec::new(),
            default: raw.addr + raw.units as u32,
        })
    }

    fn compare(&mut self, raw: &RawInstruction) -> Result<Op> {
        let kind = match raw.opcode {
            Opcode::CmplFloat => CompareKind::CmplFloat,
            Opcode::CmpgFloat => CompareKind::CmpgFloat,
            Opcode::CmplDouble => CompareKind::CmplDouble,
            Opcode::CmpgDouble => CompareKind::CmpgDouble,
            _ => CompareKind::CmpLong,
        };
        Ok(Op::Compare {
            kind,
            dest: raw.a,
            left: raw.b,
            right: raw.c,
        })
    }

    fn if_test(&mut self, raw: &RawInstruction) -> Result<Op> {
        const ORDER: [IfTest; 6] = [
            IfTest::Eq,
            IfTest::Ne,
            IfTest::Lt,
            IfTest::Ge,
            IfTest::Gt,
            IfTest::Le,
        ];
        let two_register = raw.opcode.value() < Opcode::IfEqz.value();
        let base = if two_register {
            Opcode::IfEq.value()
        } else {
            Opcode::IfEqz.value()
        };
        Ok(Op::If {
            test: ORDER[(raw.opcode.value() - base) as usize],
            left: raw.a,
            right: two_register.then_some(raw.b),
            target: target(raw),
        })
    }

    fn aget(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::ArrayGet {
            kind: access_kind(raw.opcode),
            dest: raw.a,
            array: raw.b,
            index: raw.c,
        })
    }

    fn aput(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::ArrayPut {
            kind: access_kind(raw.opcode),
            src: raw.a,
            array: raw.b,
            index: raw.c,
        })
    }

    fn iget(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::InstanceGet {
            kind: access_kind(raw.opcode),
            dest: raw.a,
            object: raw.b,
            field: self.field_at(raw.index)?,
        })
    }

    fn iput(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::InstancePut {
            kind: access_kind(raw.opcode),
            src: raw.a,
            object: raw.b,
            field: self.field_at(raw.index)?,
        })
    }

    fn sget(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::StaticGet {
            kind: access_kind(raw.opcode),
            dest: raw.a,
            field: self.field_at(raw.index)?,
        })
    }

    fn sput(&mut self, raw: &RawInstruction) -> Result<Op> {
        Ok(Op::StaticPut {
            kind: access_kind(raw.opcode),
            src: raw.a,
            field: self.field_at(raw.index)?,
        })
    }

    fn invoke(&mut self, raw: &RawInstruction) -> Result<Op> {
        use Opcode::*;
        let (kind, range) = match raw.opcode {
            InvokeVirtual => (InvokeKind::Virtual, false),
            InvokeSuper => (InvokeKind::Super, false),
            InvokeDirect => (InvokeKind::Direct, false),
            InvokeStatic => (InvokeKind::Static, false),
            InvokeInterface => (InvokeKind::Interface, false),
            InvokeVirtualRange => (InvokeKind::Virtual, true),
            InvokeSuperRange => (InvokeKind::Super, true),
            InvokeDirectRange => (InvokeKind::Direct, true),
            InvokeStaticRange => (InvokeKind::Static, true),
            _ => (InvokeKind::Interface, true),
        };
        let args = if range {
            range_args(raw)
        } else {
            inline_args(raw)
        };
        Ok(Op::Invoke {
            kind,
            method: self.method_at(raw.index)?,
            args,
        })
    }

    fn unary(&mut self, raw: &RawInstruction) -> Result<Op> {
        const ORDER: [UnaryOp; 21] = [
            UnaryOp::NegInt,
            UnaryOp::NotInt,
            UnaryOp::NegLong,
            UnaryOp::NotLong,
            UnaryOp::NegFloat,
            UnaryOp::NegDouble,
            UnaryOp::IntToLong,
            UnaryOp::IntToFloat,
            UnaryOp::IntToDouble,
            UnaryOp::LongToInt,
            UnaryOp::LongToFloat,
            UnaryOp::LongToDouble,
            UnaryOp::FloatToInt,
            UnaryOp::FloatToLong,
            UnaryOp::FloatToDouble,
            UnaryOp::DoubleToInt,
            UnaryOp::DoubleToLong,
            UnaryOp::DoubleToFloat,
            UnaryOp::IntToByte,
            UnaryOp::IntToChar,
            UnaryOp::IntToShort,
        ];
        Ok(Op::Unary {
            op: ORDER[(raw.opcode.value() - Opcode::NegInt.value()) as usize],
            dest: raw.a,
            src: raw.b,
        })
    }

    fn binary(&mut self, raw: &RawInstruction) -> Result<Op> {
        let (op, ty) = binary_op(raw.opcode.value() - Opcode::AddInt.value());
        Ok(Op::Binary {
            op,
            ty,
            dest: raw.a,
            left: raw.b,
            right: raw.c,
        })
    }

    fn binary_2addr(&mut self, raw: &RawInstruction) -> Result<Op> {
        let (op, ty) = binary_op(raw.opcode.value() - Opcode::AddInt2addr.value());
        Ok(Op::Binary {
            op,
            ty,
            dest: raw.a,
            left: raw.a,
            right: raw.b,
        })
    }

    fn binary_lit(&mut self, raw: &RawInstruction) -> Result<Op> {
        use Opcode::*;
        let op = match raw.opcode {
            AddIntLit16 | AddIntLit8 => BinaryOp::Add,
            RsubInt | RsubIntLit8 => BinaryOp::Rsub,
            MulIntLit16 | MulIntLit8 => BinaryOp::Mul,
            DivIntLit16 | DivIntLit8 => BinaryOp::Div,
            RemIntLit16 | RemIntLit8 => BinaryOp::Rem,
            AndIntLit16 | AndIntLit8 => BinaryOp::And,
            OrIntLit16 | OrIntLit8 => BinaryOp::Or,
            XorIntLit16 | XorIntLit8 => BinaryOp::Xor,
            ShlIntLit8 => BinaryOp::Shl,
            ShrIntLit8 => BinaryOp::Shr,
            _ => BinaryOp::Ushr,
        };
        Ok(Op::BinaryLit {
            op,
            dest: raw.a,
            src: raw.b,
            literal: raw.literal as i32,
        })
    }

    fn link_packed(&mut self, payload: &PackedSwitchPayload) {
        let paddr = payload.addr as i64;
        for ins in &mut self.instructions {
            if ins.opcode != Opcode::PackedSwitch {
                continue;
            }
            let addr = ins.addr;
            if let Op::Switch {
                table_offset,
                targets,
                ..
            } = &mut ins.op
                && addr as i64 + *table_offset as i64 == paddr
            {
                *targets = payload
                    .targets
                    .iter()
                    .map(|off| (addr as i64 + *off as i64) as u32)
                    .collect();
                return;
            }
        }
        log::debug!("unreferenced packed-switch payload at {:#x}", payload.addr);
    }

    fn link_sparse(&mut self, payload: &SparseSwitchPayload) {
        let paddr = payload.addr as i64;
        for ins in &mut self.instructions {
            if ins.opcode != Opcode::SparseSwitch {
                continue;
            }
            let addr = ins.addr;
            if let Op::Switch {
                table_offset,
                targets,
                ..
            } = &mut ins.op
                && addr as i64 + *table_offset as i64 == paddr
            {
                *targets = payload
                    .targets
                    .iter()
                    .map(|off| (addr as i64 + *off as i64) as u32)
                    .collect();
                return;
            }
        }
        log::debug!("unreferenced sparse-switch payload at {:#x}", payload.addr);
    }

    fn link_array_data(&mut self, payload: &ArrayDataPayload) {
        let paddr = payload.addr as i64;
        for ins in &mut self.instructions {
            let addr = ins.addr;
            if let Op::FillArrayData {
                table_offset, data, ..
            } = &mut ins.op
                && addr as i64 + *table_offset as i64 == paddr
            {
                *data = Some(ArrayData {
                    element_width: payload.element_width,
                    data: payload.data.clone(),
                });
                return;
            }
        }
        log::debug!("unreferenced array-data payload at {:#x}", payload.addr);
    }
}

fn binary_op(offset: u8) -> (BinaryOp, NumType) {
    const INT_ORDER: [BinaryOp; 11] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Rem,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Shl,
        BinaryOp::Shr,
        BinaryOp::Ushr,
    ];
    const FLOAT_ORDER: [BinaryOp; 5] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Rem,
    ];
    match offset {
        0..=10 => (INT_ORDER[offset as usize], NumType::Int),
        11..=21 => (INT_ORDER[(offset - 11) as usize], NumType::Long),
        22..=26 => (FLOAT_ORDER[(offset - 22) as usize], NumType::Float),
        _ => (FLOAT_ORDER[(offset - 27) as usize], NumType::Double),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_kind_families_align() {
        assert_eq!(access_kind(Opcode::Aget), AccessKind::Single);
        assert_eq!(access_kind(Opcode::AputObject), AccessKind::Object);
        assert_eq!(access_kind(Opcode::IgetWide), AccessKind::Wide);
        assert_eq!(access_kind(Opcode::IputShort), AccessKind::Short);
        assert_eq!(access_kind(Opcode::SgetBoolean), AccessKind::Boolean);
        assert_eq!(access_kind(Opcode::SputChar), AccessKind::Char);
    }

    #[test]
    fn binary_op_bands() {
        assert_eq!(binary_op(0), (BinaryOp::Add, NumType::Int));
        assert_eq!(binary_op(10), (BinaryOp::Ushr, NumType::Int));
        assert_eq!(binary_op(14), (BinaryOp::Div, NumType::Long));
        assert_eq!(binary_op(25), (BinaryOp::Div, NumType::Float));
        assert_eq!(binary_op(31), (BinaryOp::Rem, NumType::Double));
    }
}
