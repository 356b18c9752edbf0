//! Per-method pipeline: decode, resolve handlers, build the CFG, hand off
//! to SSA, and memoize the results.
//!
//! [`Frontend`] is the host's entry point. It owns the class-hierarchy
//! handle and two at-most-once caches: CFGs keyed by method reference, IRs
//! keyed by (method, context). A fatal build error is returned to the
//! caller and never published to a cache.

pub mod decode;
pub mod error;
pub mod ir;
pub mod method;

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use dexlift_ir::{
    AddressIndex, Cfg, ClassHierarchy, Diagnostics, HandlerTable, Instruction, MethodRef,
};

pub use decode::{DecodedMethod, decode_method};
pub use error::{FrontError, Result};
pub use ir::{
    Context, Ir, IrOptions, LocalMap, SsaBuilder, SsaInstruction, SymbolTable,
    eliminate_dead_phis,
};
pub use method::{ConstantPool, MethodBody, OwnedMethodBody, TablePool};

/// Everything the pipeline derives from one method, bundled immutably.
#[derive(Debug, Clone)]
pub struct MethodCfg {
    pub method: MethodRef,
    pub instructions: Vec<Instruction>,
    pub index: AddressIndex,
    pub handlers: HandlerTable,
    pub cfg: Cfg,
    pub diagnostics: Diagnostics,
}

/// A per-key build slot. The first caller builds under the slot lock;
/// concurrent callers for the same key block on it and share the result.
type Slot<T> = Arc<Mutex<Option<Arc<T>>>>;

pub struct Frontend<H> {
    hierarchy: H,
    ssa: Box<dyn SsaBuilder + Send + Sync>,
    cfgs: DashMap<MethodRef, Slot<MethodCfg>>,
    irs: DashMap<(MethodRef, Context), Slot<Ir>>,
}

impl<H: ClassHierarchy> Frontend<H> {
    pub fn new(hierarchy: H, ssa: Box<dyn SsaBuilder + Send + Sync>) -> Self {
        Frontend {
            hierarchy,
            ssa,
            cfgs: DashMap::new(),
            irs: DashMap::new(),
        }
    }

    pub fn hierarchy(&self) -> &H {
        &self.hierarchy
    }

    /// Build or fetch the method's CFG bundle. At most one build runs per
    /// method; repeat calls return the identical `Arc`.
    pub fn make_cfg(&self, body: &dyn MethodBody) -> Result<Arc<MethodCfg>> {
        let key = body.reference().clone();
        let slot = self.cfgs.entry(key.clone()).or_default().clone();
        let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(built) = guard.as_ref() {
            return Ok(built.clone());
        }
        match self.build_cfg(body) {
            Ok(built) => {
                let built = Arc::new(built);
                *guard = Some(built.clone());
                Ok(built)
            }
            Err(e) => {
                // Vacate the slot so no empty entry outlives the failure.
                drop(guard);
                self.cfgs.remove_if(&key, |_, s| Arc::ptr_eq(s, &slot));
                Err(e)
            }
        }
    }

    /// Build or fetch the method's IR for a calling context.
    pub fn make_ir(
        &self,
        body: &dyn MethodBody,
        context: Context,
        options: IrOptions,
    ) -> Result<Arc<Ir>> {
        let key = (body.reference().clone(), context);
        let slot = self.irs.entry(key.clone()).or_default().clone();
        let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(built) = guard.as_ref() {
            return Ok(built.clone());
        }
        match self.build_ir(body, options) {
            Ok(built) => {
                let built = Arc::new(built);
                *guard = Some(built.clone());
                Ok(built)
            }
            Err(e) => {
                drop(guard);
                self.irs.remove_if(&key, |_, s| Arc::ptr_eq(s, &slot));
                Err(e)
            }
        }
    }

    /// Whether IR for this method varies by calling context. It never
    /// does: one IR serves every call site.
    pub fn context_is_irrelevant(&self, _method: &MethodRef) -> bool {
        true
    }

    fn build_cfg(&self, body: &dyn MethodBody) -> Result<MethodCfg> {
        let decoded = decode_method(body)?;
        let handlers =
            HandlerTable::resolve(&body.try_regions(), &decoded.index, &decoded.sizes)?;
        let mut diagnostics = decoded.diagnostics;
        let cfg = Cfg::build(
            &decoded.instructions,
            &decoded.index,
            &handlers,
            &self.hierarchy,
            &mut diagnostics,
        )?;
        log::debug!(
            "built cfg for {}: {} instructions, {} blocks",
            body.reference(),
            decoded.instructions.len(),
            cfg.num_blocks()
        );
        Ok(MethodCfg {
            method: body.reference().clone(),
            instructions: decoded.instructions,
            index: decoded.index,
            handlers,
            cfg,
            diagnostics,
        })
    }

    fn build_ir(&self, body: &dyn MethodBody, options: IrOptions) -> Result<Ir> {
        let cfg = self.make_cfg(body)?;
        let mut symbols = SymbolTable::new(body.parameter_count());
        let mut ssa = self.ssa.build(&cfg, &mut symbols);
        eliminate_dead_phis(&mut ssa);
        let locals = if options.build_local_map {
            self.ssa.local_map(&cfg, &ssa)
        } else {
            None
        };
        Ok(Ir {
            method: body.reference().clone(),
            ssa,
            symbols,
            cfg,
            locals,
        })
    }
}
