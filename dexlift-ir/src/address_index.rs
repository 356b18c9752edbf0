//! Bidirectional address/index map.
//!
//! Branch offsets and try boundaries speak code-unit addresses; everything
//! downstream wants dense instruction indices. Payload pseudo-instructions
//! occupy address space without an index, so the map has gaps.

use crate::error::{IrError, Result};
use crate::instruction::Instruction;

/// Address-to-index and index-to-address map for one method.
///
/// Addresses strictly increase with index.
#[derive(Debug, Clone)]
pub struct AddressIndex {
    addrs: Vec<u32>,
}

impl AddressIndex {
    /// Build from a strictly increasing address list.
    pub fn new(addrs: Vec<u32>) -> Self {
        debug_assert!(addrs.windows(2).all(|w| w[0] < w[1]));
        AddressIndex { addrs }
    }

    pub fn from_instructions(instructions: &[Instruction]) -> Self {
        Self::new(instructions.iter().map(|i| i.addr).collect())
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// The index of the instruction starting at `addr`.
    ///
    /// If no instruction starts there but one starts at `addr + 1`, that
    /// index is returned instead: references into an alignment nop in front
    /// of a payload table snap forward to the next real instruction.
    pub fn index_of(&self, addr: u32) -> Result<usize> {
        if let Ok(i) = self.addrs.binary_search(&addr) {
            return Ok(i);
        }
        self.addrs
            .binary_search(&(addr + 1))
            .map_err(|_| IrError::NoInstructionAt(addr))
    }

    /// The address of the instruction at `index`.
    pub fn address_of(&self, index: usize) -> Result<u32> {
        self.addrs
            .get(index)
            .copied()
            .ok_or(IrError::IndexOutOfRange {
                index,
                len: self.addrs.len(),
            })
    }
}
