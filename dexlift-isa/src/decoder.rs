//! Raw (format-level) decoding of a method's code-unit stream.
//!
//! Dalvik code is a little-endian stream of 16-bit code units; all addresses,
//! offsets and sizes here are in code units. The decoder yields real
//! instructions and payload pseudo-instructions in address order. Linking a
//! payload to its owning instruction is the caller's job: payloads occupy
//! address space but are not instructions.

use crate::format::Format;
use crate::opcode::{
    ARRAY_DATA_PAYLOAD_IDENT, Opcode, PACKED_SWITCH_PAYLOAD_IDENT, SPARSE_SWITCH_PAYLOAD_IDENT,
};

/// Errors from [`decode_units`]. All are fatal for the enclosing method.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Code byte length is not a whole number of 16-bit units.
    #[error("code length {0} is not a multiple of 2 bytes")]
    OddCodeLength(usize),
    /// Undefined opcode byte at the given code-unit address.
    #[error("unknown opcode {byte:#04x} at address {addr:#x}")]
    UnknownOpcode { addr: u32, byte: u8 },
    /// Instruction extends past the end of the code.
    #[error("truncated instruction at address {addr:#x}")]
    Truncated { addr: u32 },
    /// A unit with a zero opcode byte and an ident that is neither a nop
    /// nor a known payload kind.
    #[error("bad payload ident {ident:#06x} at address {addr:#x}")]
    BadPayloadIdent { addr: u32, ident: u16 },
    /// Payload table extends past the end of the code.
    #[error("truncated payload at address {addr:#x}")]
    TruncatedPayload { addr: u32 },
    /// Inline (35c-family) encoding carries at most five argument registers.
    #[error("inline encoding at address {addr:#x} claims {count} argument registers (max 5)")]
    TooManyArgs { addr: u32, count: u8 },
}

/// A format-decoded instruction. Field meaning depends on the format; unused
/// fields are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInstruction {
    /// Code-unit address.
    pub addr: u32,
    /// Size in code units.
    pub units: u8,
    pub opcode: Opcode,
    /// First register field (or the register count for 3rc).
    pub a: u16,
    /// Second register field (or the range start register for 3rc).
    pub b: u16,
    /// Third register field (23x only).
    pub c: u16,
    /// Sign-extended literal value.
    pub literal: i64,
    /// Branch or payload-table offset, relative to this instruction.
    pub offset: i32,
    /// Constant-pool index (string/type/field/method).
    pub index: u32,
    /// Inline argument registers in C,D,E,F,G order (35c family).
    pub args: [u16; 5],
    /// Number of valid entries in `args`.
    pub arg_count: u8,
}

/// A `packed-switch-payload` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSwitchPayload {
    pub addr: u32,
    pub units: u32,
    pub first_key: i32,
    /// Branch offsets relative to the owning switch instruction.
    pub targets: Vec<i32>,
}

/// A `sparse-switch-payload` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseSwitchPayload {
    pub addr: u32,
    pub units: u32,
    pub keys: Vec<i32>,
    pub targets: Vec<i32>,
}

/// A `fill-array-data-payload` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDataPayload {
    pub addr: u32,
    pub units: u32,
    pub element_width: u16,
    pub element_count: u32,
    pub data: Vec<u8>,
}

/// One element of the decoded stream, in address order.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    Insn(RawInstruction),
    PackedSwitch(PackedSwitchPayload),
    SparseSwitch(SparseSwitchPayload),
    ArrayData(ArrayDataPayload),
}

impl RawNode {
    /// Code-unit address of this node.
    pub fn addr(&self) -> u32 {
        match self {
            RawNode::Insn(i) => i.addr,
            RawNode::PackedSwitch(p) => p.addr,
            RawNode::SparseSwitch(p) => p.addr,
            RawNode::ArrayData(p) => p.addr,
        }
    }

    /// Size of this node in code units.
    pub fn units(&self) -> u32 {
        match self {
            RawNode::Insn(i) => i.units as u32,
            RawNode::PackedSwitch(p) => p.units,
            RawNode::SparseSwitch(p) => p.units,
            RawNode::ArrayData(p) => p.units,
        }
    }
}

/// Decode a raw little-endian code byte stream into raw nodes.
pub fn decode_units(bytes: &[u8]) -> Result<Vec<RawNode>, DecodeError> {
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddCodeLength(bytes.len()));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();

    let mut nodes = Vec::new();
    let mut addr = 0usize;
    while addr < units.len() {
        let u0 = units[addr];
        let byte = (u0 & 0xff) as u8;
        if byte == 0 && u0 != 0 {
            let payload = decode_payload(&units, bytes, addr, u0)?;
            addr += payload.units() as usize;
            nodes.push(payload);
            continue;
        }
        let opcode = Opcode::from_byte(byte).ok_or(DecodeError::UnknownOpcode {
            addr: addr as u32,
            byte,
        })?;
        // All table formats are fixed-size; only payloads vary.
        let size = opcode
            .format()
            .units()
            .expect("opcode table contains no variable-size format") as usize;
        if addr + size > units.len() {
            return Err(DecodeError::Truncated { addr: addr as u32 });
        }
        nodes.push(RawNode::Insn(decode_insn(&units, addr, opcode, size)?));
        addr += size;
    }
    Ok(nodes)
}

fn decode_insn(
    units: &[u16],
    addr: usize,
    opcode: Opcode,
    size: usize,
) -> Result<RawInstruction, DecodeError> {
    let u0 = units[addr];
    let mut raw = RawInstruction {
        addr: addr as u32,
        units: size as u8,
        opcode,
        a: 0,
        b: 0,
        c: 0,
        literal: 0,
        offset: 0,
        index: 0,
        args: [0; 5],
        arg_count: 0,
    };

    match opcode.format() {
        Format::Format10x => {}
        Format::Format12x => {
            raw.a = (u0 >> 8) & 0xf;
            raw.b = (u0 >> 12) & 0xf;
        }
        Format::Format11n => {
            raw.a = (u0 >> 8) & 0xf;
            // Top nibble, sign-extended.
            raw.literal = ((u0 as i16) >> 12) as i64;
        }
        Format::Format11x => {
            raw.a = u0 >> 8;
        }
        Format::Format10t => {
            raw.offset = ((u0 >> 8) as u8) as i8 as i32;
        }
        Format::Format20t => {
            raw.offset = units[addr + 1] as i16 as i32;
        }
        Format::Format22x => {
            raw.a = u0 >> 8;
            raw.b = units[addr + 1];
        }
        Format::Format21t => {
            raw.a = u0 >> 8;
            raw.offset = units[addr + 1] as i16 as i32;
        }
        Format::Format21s => {
            raw.a = u0 >> 8;
            raw.literal = units[addr + 1] as i16 as i64;
        }
        Format::Format21h => {
            raw.a = u0 >> 8;
            let shift = if opcode == Opcode::ConstWideHigh16 {
                48
            } else {
                16
            };
            raw.literal = ((units[addr + 1] as i16) as i64) << shift;
        }
        Format::Format21c => {
            raw.a = u0 >> 8;
            raw.index = units[addr + 1] as u32;
        }
        Format::Format23x => {
            raw.a = u0 >> 8;
            raw.b = units[addr + 1] & 0xff;
            raw.c = units[addr + 1] >> 8;
        }
        Format::Format22b => {
            raw.a = u0 >> 8;
            raw.b = units[addr + 1] & 0xff;
            raw.literal = ((units[addr + 1] >> 8) as u8) as i8 as i64;
        }
        Format::Format22t => {
            raw.a = (u0 >> 8) & 0xf;
            raw.b = (u0 >> 12) & 0xf;
            raw.offset = units[addr + 1] as i16 as i32;
        }
        Format::Format22s => {
            raw.a = (u0 >> 8) & 0xf;
            raw.b = (u0 >> 12) & 0xf;
            raw.literal = units[addr + 1] as i16 as i64;
        }
        Format::Format22c => {
            raw.a = (u0 >> 8) & 0xf;
            raw.b = (u0 >> 12) & 0xf;
            raw.index = units[addr + 1] as u32;
        }
        Format::Format30t => {
            raw.offset = read_u32(units, addr + 1) as i32;
        }
        Format::Format32x => {
            raw.a = units[addr + 1];
            raw.b = units[addr + 2];
        }
        Format::Format31i => {
            raw.a = u0 >> 8;
            raw.literal = read_u32(units, addr + 1) as i32 as i64;
        }
        Format::Format31t => {
            raw.a = u0 >> 8;
            raw.offset = read_u32(units, addr + 1) as i32;
        }
        Format::Format31c => {
            raw.a = u0 >> 8;
            raw.index = read_u32(units, addr + 1);
        }
        Format::Format35c => {
            let count = ((u0 >> 12) & 0xf) as u8;
            if count > 5 {
                return Err(DecodeError::TooManyArgs {
                    addr: addr as u32,
                    count,
                });
            }
            raw.index = units[addr + 1] as u32;
            let u2 = units[addr + 2];
            let regs = [
                u2 & 0xf,
                (u2 >> 4) & 0xf,
                (u2 >> 8) & 0xf,
                (u2 >> 12) & 0xf,
                (u0 >> 8) & 0xf,
            ];
            raw.args[..count as usize].copy_from_slice(&regs[..count as usize]);
            raw.arg_count = count;
        }
        Format::Format3rc => {
            raw.a = u0 >> 8;
            raw.index = units[addr + 1] as u32;
            raw.b = units[addr + 2];
        }
        Format::Format51l => {
            raw.a = u0 >> 8;
            raw.literal = (read_u32(units, addr + 1) as u64
                | ((read_u32(units, addr + 3) as u64) << 32)) as i64;
        }
        Format::PackedSwitchPayload
        | Format::SparseSwitchPayload
        | Format::ArrayDataPayload => unreachable!("payloads are decoded separately"),
    }
    Ok(raw)
}

fn decode_payload(
    units: &[u16],
    bytes: &[u8],
    addr: usize,
    ident: u16,
) -> Result<RawNode, DecodeError> {
    let a = addr as u32;
    let need = |end: usize| -> Result<(), DecodeError> {
        if end > units.len() {
            Err(DecodeError::TruncatedPayload { addr: a })
        } else {
            Ok(())
        }
    };
    match ident {
        PACKED_SWITCH_PAYLOAD_IDENT => {
            need(addr + 2)?;
            let size = units[addr + 1] as usize;
            let total = size * 2 + 4;
            need(addr + total)?;
            let first_key = read_u32(units, addr + 2) as i32;
            let targets = (0..size)
                .map(|i| read_u32(units, addr + 4 + i * 2) as i32)
                .collect();
            Ok(RawNode::PackedSwitch(PackedSwitchPayload {
                addr: a,
                units: total as u32,
                first_key,
                targets,
            }))
        }
        SPARSE_SWITCH_PAYLOAD_IDENT => {
            need(addr + 2)?;
            let size = units[addr + 1] as usize;
            let total = size * 4 + 2;
            need(addr + total)?;
            let keys = (0..size)
                .map(|i| read_u32(units, addr + 2 + i * 2) as i32)
                .collect();
            let targets = (0..size)
                .map(|i| read_u32(units, addr + 2 + size * 2 + i * 2) as i32)
                .collect();
            Ok(RawNode::SparseSwitch(SparseSwitchPayload {
                addr: a,
                units: total as u32,
                keys,
                targets,
            }))
        }
        ARRAY_DATA_PAYLOAD_IDENT => {
            need(addr + 4)?;
            let width = units[addr + 1];
            let count = read_u32(units, addr + 2);
            let byte_len = width as usize * count as usize;
            let total = 4 + byte_len.div_ceil(2);
            need(addr + total)?;
            let start = (addr + 4) * 2;
            Ok(RawNode::ArrayData(ArrayDataPayload {
                addr: a,
                units: total as u32,
                element_width: width,
                element_count: count,
                data: bytes[start..start + byte_len].to_vec(),
            }))
        }
        _ => Err(DecodeError::BadPayloadIdent { addr: a, ident }),
    }
}

fn read_u32(units: &[u16], at: usize) -> u32 {
    units[at] as u32 | ((units[at + 1] as u32) << 16)
}
