//! Control-flow graph over basic blocks, with normal and exceptional edges.
//!
//! Built in a single stateless pass from the decoded instruction sequence,
//! the handler table, and the class hierarchy. Entry and exit are
//! content-free sentinel blocks: entry is block 0, code blocks follow in
//! instruction order, exit is last.

use crate::address_index::AddressIndex;
use crate::diag::{Diagnostics, ResolutionWarning};
use crate::error::Result;
use crate::handlers::HandlerTable;
use crate::hierarchy::ClassHierarchy;
use crate::instruction::{Instruction, Op};
use crate::types::{TypeRef, runtime_exceptions as rex};

/// Kind of a CFG edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Normal,
    Exceptional,
}

/// What a block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Entry,
    Exit,
    /// Inclusive instruction index range.
    Code { first: usize, last: usize },
}

/// A basic block. Code blocks tile the instruction indices exactly; the
/// two sentinels hold no instructions.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    number: usize,
    kind: BlockKind,
    is_catch: bool,
}

impl BasicBlock {
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn is_entry(&self) -> bool {
        matches!(self.kind, BlockKind::Entry)
    }

    pub fn is_exit(&self) -> bool {
        matches!(self.kind, BlockKind::Exit)
    }

    /// Whether this block is a catch-handler entry.
    pub fn is_catch_block(&self) -> bool {
        self.is_catch
    }

    pub fn first_index(&self) -> Option<usize> {
        match self.kind {
            BlockKind::Code { first, .. } => Some(first),
            _ => None,
        }
    }

    pub fn last_index(&self) -> Option<usize> {
        match self.kind {
            BlockKind::Code { last, .. } => Some(last),
            _ => None,
        }
    }
}

/// The control-flow graph of one method. Immutable once built.
#[derive(Debug, Clone)]
pub struct Cfg {
    blocks: Vec<BasicBlock>,
    normal_succs: Vec<Vec<usize>>,
    normal_preds: Vec<Vec<usize>>,
    except_succs: Vec<Vec<usize>>,
    except_preds: Vec<Vec<usize>>,
    insn_to_block: Vec<usize>,
}

impl Cfg {
    /// Build the CFG for a decoded method.
    ///
    /// Unresolvable catch types and call targets degrade to conservative
    /// edges with a warning in `diags`; only inconsistent addressing is a
    /// hard error.
    pub fn build(
        instructions: &[Instruction],
        index: &AddressIndex,
        handlers: &HandlerTable,
        hierarchy: &dyn ClassHierarchy,
        diags: &mut Diagnostics,
    ) -> Result<Cfg> {
        Builder {
            instructions,
            index,
            handlers,
            hierarchy,
            diags,
        }
        .build()
    }

    pub fn entry(&self) -> &BasicBlock {
        &self.blocks[0]
    }

    pub fn exit(&self) -> &BasicBlock {
        self.blocks.last().expect("cfg always has sentinels")
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Blocks in number order: entry, code blocks, exit.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter()
    }

    pub fn block(&self, number: usize) -> &BasicBlock {
        &self.blocks[number]
    }

    /// The block containing the instruction at `index`.
    pub fn block_of_index(&self, index: usize) -> &BasicBlock {
        &self.blocks[self.insn_to_block[index]]
    }

    pub fn succs(&self, number: usize, kind: EdgeKind) -> &[usize] {
        match kind {
            EdgeKind::Normal => &self.normal_succs[number],
            EdgeKind::Exceptional => &self.except_succs[number],
        }
    }

    pub fn preds(&self, number: usize, kind: EdgeKind) -> &[usize] {
        match kind {
            EdgeKind::Normal => &self.normal_preds[number],
            EdgeKind::Exceptional => &self.except_preds[number],
        }
    }

    /// All successors of a block, normal before exceptional, deduplicated.
    pub fn all_succs(&self, number: usize) -> Vec<usize> {
        let mut all = self.normal_succs[number].clone();
        for &s in &self.except_succs[number] {
            if !all.contains(&s) {
                all.push(s);
            }
        }
        all
    }
}

struct Builder<'a> {
    instructions: &'a [Instruction],
    index: &'a AddressIndex,
    handlers: &'a HandlerTable,
    hierarchy: &'a dyn ClassHierarchy,
    diags: &'a mut Diagnostics,
}

struct Edges {
    normal_succs: Vec<Vec<usize>>,
    normal_preds: Vec<Vec<usize>>,
    except_succs: Vec<Vec<usize>>,
    except_preds: Vec<Vec<usize>>,
}

impl Edges {
    fn new(num_blocks: usize) -> Self {
        Edges {
            normal_succs: vec![Vec::new(); num_blocks],
            normal_preds: vec![Vec::new(); num_blocks],
            except_succs: vec![Vec::new(); num_blocks],
            except_preds: vec![Vec::new(); num_blocks],
        }
    }

    fn add(&mut self, from: usize, to: usize, kind: EdgeKind, diags: &mut Diagnostics) {
        let (succs, preds) = match kind {
            EdgeKind::Normal => (&mut self.normal_succs, &mut self.normal_preds),
            EdgeKind::Exceptional => (&mut self.except_succs, &mut self.except_preds),
        };
        if !succs[from].contains(&to) {
            succs[from].push(to);
            preds[to].push(from);
            diags.edges_added += 1;
        }
    }
}

impl Builder<'_> {
    fn build(mut self) -> Result<Cfg> {
        let n = self.instructions.len();

        // Branch targets as instruction indices, resolved once.
        let mut target_indices: Vec<Vec<usize>> = Vec::with_capacity(n);
        for ins in self.instructions {
            let t = ins
                .branch_targets()
                .into_iter()
                .map(|a| self.index.index_of(a))
                .collect::<Result<Vec<_>>>()?;
            target_indices.push(t);
        }

        // Instruction i starts a block iff it is first, a branch target, a
        // catch entry, or follows an instruction that branches, does not
        // fall through, or may throw.
        let mut starts = vec![false; n];
        let mut catches = vec![false; n];
        if n > 0 {
            starts[0] = true;
        }
        for i in 0..n {
            let ins = &self.instructions[i];
            if !target_indices[i].is_empty() || !ins.falls_through() {
                if i + 1 < n {
                    starts[i + 1] = true;
                }
            }
            for &t in &target_indices[i] {
                starts[t] = true;
            }
            if ins.may_throw() {
                if i + 1 < n {
                    starts[i + 1] = true;
                }
                for h in self.handlers.handlers_at(i) {
                    starts[h.handler_index] = true;
                    catches[h.handler_index] = true;
                }
            }
        }

        let mut blocks = vec![BasicBlock {
            number: 0,
            kind: BlockKind::Entry,
            is_catch: false,
        }];
        let first_indices: Vec<usize> = (0..n).filter(|&i| starts[i]).collect();
        let mut insn_to_block = vec![0usize; n];
        for (k, &first) in first_indices.iter().enumerate() {
            let last = if k + 1 < first_indices.len() {
                first_indices[k + 1] - 1
            } else {
                n - 1
            };
            let number = blocks.len();
            for slot in &mut insn_to_block[first..=last] {
                *slot = number;
            }
            blocks.push(BasicBlock {
                number,
                kind: BlockKind::Code { first, last },
                is_catch: catches[first],
            });
        }
        let exit = blocks.len();
        blocks.push(BasicBlock {
            number: exit,
            kind: BlockKind::Exit,
            is_catch: false,
        });

        let mut edges = Edges::new(blocks.len());
        if n > 0 {
            edges.add(0, insn_to_block[0], EdgeKind::Normal, self.diags);
        }
        for b in &blocks {
            let Some(last_idx) = b.last_index() else {
                continue;
            };
            let ins = &self.instructions[last_idx];
            for &t in &target_indices[last_idx] {
                edges.add(b.number, insn_to_block[t], EdgeKind::Normal, self.diags);
            }
            self.add_exceptional_edges(&mut edges, b.number, last_idx, &insn_to_block, exit);
            if ins.falls_through() {
                edges.add(b.number, b.number + 1, EdgeKind::Normal, self.diags);
            }
            if ins.is_return() {
                edges.add(b.number, exit, EdgeKind::Normal, self.diags);
            }
        }

        Ok(Cfg {
            blocks,
            normal_succs: edges.normal_succs,
            normal_preds: edges.normal_preds,
            except_succs: edges.except_succs,
            except_preds: edges.except_preds,
            insn_to_block,
        })
    }

    /// Exceptional edges generated by the last instruction of a block.
    ///
    /// An explicit throw carries no type information at this level, so it
    /// edges to every reachable handler; narrowing is left to SSA type
    /// propagation. Everything else starts from the implicit-exception
    /// table; invokes additionally carry the unchecked-exception roots and
    /// the callee's declared exceptions.
    fn add_exceptional_edges(
        &mut self,
        edges: &mut Edges,
        block: usize,
        last_idx: usize,
        insn_to_block: &[usize],
        exit: usize,
    ) {
        let ins = &self.instructions[last_idx];
        if !ins.may_throw() {
            return;
        }
        let hs = self.handlers.handlers_at(last_idx).to_vec();
        if hs.is_empty() {
            // No handler in scope: the exception leaves the method.
            edges.add(block, exit, EdgeKind::Exceptional, self.diags);
            return;
        }

        let mut go_to_all_handlers = false;
        let mut remaining: Vec<TypeRef> = Vec::new();
        if ins.is_explicit_throw() {
            go_to_all_handlers = true;
        } else {
            remaining = ins
                .implicit_exceptions()
                .iter()
                .map(|d| TypeRef::from_descriptor(*d))
                .collect();
            if let Op::Invoke { method, .. } = &ins.op {
                // Every call can raise an unchecked exception or error; the
                // two roots stand in for that open set, so an invoke's
                // outstanding set is never empty.
                for d in [rex::RUNTIME_EXCEPTION, rex::ERROR] {
                    let t = TypeRef::from_descriptor(d);
                    if !remaining.contains(&t) {
                        remaining.push(t);
                    }
                }
                match self.hierarchy.resolve_declared_exceptions(method) {
                    Some(declared) => {
                        for t in declared {
                            if !remaining.contains(&t) {
                                remaining.push(t);
                            }
                        }
                    }
                    None => {
                        go_to_all_handlers = true;
                        self.diags
                            .warn(ResolutionWarning::UnresolvedCallTarget(method.clone()));
                    }
                }
            }
        }

        for h in &hs {
            let hb = insn_to_block[h.handler_index];
            if go_to_all_handlers {
                edges.add(block, hb, EdgeKind::Exceptional, self.diags);
                continue;
            }
            match &h.catch_type {
                // Catch-all: catches whatever is still outstanding.
                None => {
                    if !remaining.is_empty() {
                        edges.add(block, hb, EdgeKind::Exceptional, self.diags);
                        remaining.clear();
                    }
                }
                Some(caught) => {
                    if !self.hierarchy.resolves(caught) {
                        // Conservatively edge and warn.
                        edges.add(block, hb, EdgeKind::Exceptional, self.diags);
                        self.diags
                            .warn(ResolutionWarning::UnresolvedCatchType(caught.clone()));
                        continue;
                    }
                    let mut covered: Vec<TypeRef> = Vec::new();
                    for t in &remaining {
                        if !self.hierarchy.resolves(t) {
                            edges.add(block, hb, EdgeKind::Exceptional, self.diags);
                            self.diags
                                .warn(ResolutionWarning::UnresolvedCatchType(caught.clone()));
                            continue;
                        }
                        let is_subtype = self.hierarchy.subtype_of(t, caught);
                        if is_subtype || self.hierarchy.subtype_of(caught, t) {
                            edges.add(block, hb, EdgeKind::Exceptional, self.diags);
                            if is_subtype {
                                // The handler catches all of t: it no
                                // longer escapes past this handler.
                                covered.push(t.clone());
                            }
                        }
                    }
                    remaining.retain(|t| !covered.contains(t));
                }
            }
        }

        if go_to_all_handlers || !remaining.is_empty() {
            edges.add(block, exit, EdgeKind::Exceptional, self.diags);
        }
    }
}
