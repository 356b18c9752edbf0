//! Dalvik bytecode ISA definitions and raw decoding.
//!
//! This crate knows the instruction set: the total opcode table, the
//! encoding formats, and the format-level decoder that turns a method's raw
//! code-unit stream into address-ordered raw instructions and payload
//! pseudo-instructions. Everything semantic (operand meaning, control flow,
//! exceptions) lives upstream in `dexlift-ir` and `dexlift-front`.

mod decoder;
mod format;
mod opcode;

pub use decoder::{
    ArrayDataPayload, DecodeError, PackedSwitchPayload, RawInstruction, RawNode,
    SparseSwitchPayload, decode_units,
};
pub use format::Format;
pub use opcode::{
    ARRAY_DATA_PAYLOAD_IDENT, OpFlags, Opcode, PACKED_SWITCH_PAYLOAD_IDENT,
    SPARSE_SWITCH_PAYLOAD_IDENT,
};
