//! SSA handoff.
//!
//! The SSA construction algorithm itself lives with the host engine; this
//! module fixes the contract: a pre-sized value table, the instruction
//! shapes the builder must emit, dead-phi cleanup, and the immutable
//! per-(method, context) IR bundle.

use std::collections::HashSet;
use std::sync::Arc;

use dexlift_ir::MethodRef;

use crate::MethodCfg;

/// SSA value numbers for one method. Values `1..=parameter_count` are
/// pre-allocated to the parameters; everything else is handed out in order.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    parameter_count: u16,
    next_value: u32,
}

impl SymbolTable {
    pub fn new(parameter_count: u16) -> Self {
        SymbolTable {
            parameter_count,
            next_value: parameter_count as u32 + 1,
        }
    }

    pub fn parameter_count(&self) -> u16 {
        self.parameter_count
    }

    /// The pre-allocated value number of parameter `i`.
    pub fn parameter_value(&self, i: u16) -> u32 {
        debug_assert!(i < self.parameter_count);
        i as u32 + 1
    }

    pub fn new_value(&mut self) -> u32 {
        let v = self.next_value;
        self.next_value += 1;
        v
    }

    pub fn value_count(&self) -> u32 {
        self.next_value - 1
    }
}

/// One SSA-level instruction as the builder hands it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsaInstruction {
    /// A phi at the head of `block`, merging one operand per predecessor.
    Phi {
        block: usize,
        dest: u32,
        operands: Vec<u32>,
    },
    /// A lifted instruction; `origin` is its index in the decoded sequence.
    Op {
        origin: usize,
        defs: Vec<u32>,
        uses: Vec<u32>,
    },
}

impl SsaInstruction {
    pub fn defs(&self) -> &[u32] {
        match self {
            SsaInstruction::Phi { dest, .. } => std::slice::from_ref(dest),
            SsaInstruction::Op { defs, .. } => defs,
        }
    }

    pub fn uses(&self) -> &[u32] {
        match self {
            SsaInstruction::Phi { operands, .. } => operands,
            SsaInstruction::Op { uses, .. } => uses,
        }
    }
}

/// Maps SSA values back to the source registers they were lifted from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalMap {
    entries: Vec<(u32, u16)>,
}

impl LocalMap {
    pub fn new(entries: Vec<(u32, u16)>) -> Self {
        LocalMap { entries }
    }

    pub fn register_of(&self, value: u32) -> Option<u16> {
        self.entries
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, r)| *r)
    }
}

/// The external SSA construction algorithm.
pub trait SsaBuilder {
    /// Lift the method into SSA form, drawing value numbers from `symbols`.
    fn build(&self, method: &MethodCfg, symbols: &mut SymbolTable) -> Vec<SsaInstruction>;

    /// Optional value-to-register map, when the host wants one.
    fn local_map(&self, _method: &MethodCfg, _ssa: &[SsaInstruction]) -> Option<LocalMap> {
        None
    }
}

/// Options for one IR build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrOptions {
    pub build_local_map: bool,
}

/// Calling context key. The front end's IR never varies by call site, so
/// one context serves everywhere; the key exists for host-cache symmetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Context(pub u64);

/// The immutable per-method IR bundle.
#[derive(Debug, Clone)]
pub struct Ir {
    pub method: MethodRef,
    pub ssa: Vec<SsaInstruction>,
    pub symbols: SymbolTable,
    /// The SSA-level graph shares the method's block structure.
    pub cfg: Arc<MethodCfg>,
    pub locals: Option<LocalMap>,
}

/// Remove phis whose value no surviving instruction uses, to a fixpoint:
/// dropping one phi can orphan another that only fed it.
pub fn eliminate_dead_phis(ssa: &mut Vec<SsaInstruction>) {
    loop {
        let used: HashSet<u32> = ssa.iter().flat_map(|i| i.uses().iter().copied()).collect();
        let before = ssa.len();
        ssa.retain(|i| match i {
            SsaInstruction::Phi { dest, .. } => used.contains(dest),
            SsaInstruction::Op { .. } => true,
        });
        if ssa.len() == before {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phi(block: usize, dest: u32, operands: Vec<u32>) -> SsaInstruction {
        SsaInstruction::Phi {
            block,
            dest,
            operands,
        }
    }

    #[test]
    fn symbol_table_preallocates_parameters() {
        let mut t = SymbolTable::new(3);
        assert_eq!(t.parameter_value(0), 1);
        assert_eq!(t.parameter_value(2), 3);
        assert_eq!(t.new_value(), 4);
        assert_eq!(t.new_value(), 5);
        assert_eq!(t.value_count(), 5);
    }

    #[test]
    fn dead_phi_chain_collapses() {
        // v10 feeds only v11, which feeds only v12; nothing uses v12.
        let mut ssa = vec![
            phi(1, 10, vec![1, 2]),
            phi(2, 11, vec![10, 3]),
            phi(3, 12, vec![11, 4]),
            SsaInstruction::Op {
                origin: 0,
                defs: vec![5],
                uses: vec![1],
            },
        ];
        eliminate_dead_phis(&mut ssa);
        assert_eq!(ssa.len(), 1);
        assert!(matches!(ssa[0], SsaInstruction::Op { .. }));
    }

    #[test]
    fn live_phi_survives() {
        let mut ssa = vec![
            phi(1, 10, vec![1, 2]),
            SsaInstruction::Op {
                origin: 0,
                defs: vec![],
                uses: vec![10],
            },
        ];
        eliminate_dead_phis(&mut ssa);
        assert_eq!(ssa.len(), 2);
    }

    #[test]
    fn self_feeding_loop_phi_terminates() {
        // A loop phi that feeds itself counts as used; the fixpoint must
        // keep it and still terminate.
        let mut ssa = vec![phi(1, 10, vec![1, 10])];
        eliminate_dead_phis(&mut ssa);
        assert_eq!(ssa.len(), 1);
    }
}
