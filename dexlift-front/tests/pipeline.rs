//! End-to-end Frontend tests: CFG pipeline, caching, and IR handoff.

mod common;

use std::sync::Arc;

use common::{Asm, CountingBody, body, body_with_regions};
use dexlift_front::{
    Context, Frontend, IrOptions, MethodCfg, SsaBuilder, SsaInstruction, SymbolTable,
};
use dexlift_ir::{
    ClassHierarchy, EdgeKind, MethodRef, RawHandler, ResolutionWarning, TryRegion, TypeRef,
    UnresolvingHierarchy, runtime_exceptions as rex,
};
use dexlift_isa::Opcode;

/// Resolves `java.*` types; callees declare one checked exception.
struct JavaHierarchy;

impl ClassHierarchy for JavaHierarchy {
    fn resolves(&self, ty: &TypeRef) -> bool {
        ty.descriptor().starts_with("Ljava/")
    }

    fn subtype_of(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        sub == sup || sup.descriptor() == "Ljava/lang/Throwable;"
    }

    fn resolve_declared_exceptions(&self, _callee: &MethodRef) -> Option<Vec<TypeRef>> {
        Some(vec![TypeRef::from_descriptor("Ljava/io/IOException;")])
    }
}

/// Emits one SSA op per instruction plus a dead phi nothing consumes.
struct LinearSsa;

impl SsaBuilder for LinearSsa {
    fn build(&self, method: &MethodCfg, symbols: &mut SymbolTable) -> Vec<SsaInstruction> {
        let mut out = vec![SsaInstruction::Phi {
            block: 1,
            dest: symbols.new_value(),
            operands: Vec::new(),
        }];
        for origin in 0..method.instructions.len() {
            out.push(SsaInstruction::Op {
                origin,
                defs: vec![symbols.new_value()],
                uses: Vec::new(),
            });
        }
        out
    }
}

fn frontend<H: ClassHierarchy>(hierarchy: H) -> Frontend<H> {
    common::init_logs();
    Frontend::new(hierarchy, Box::new(LinearSsa))
}

fn straight_line_code() -> Vec<u8> {
    Asm::new()
        .op(Opcode::Const4, 0x10)
        .op(Opcode::ReturnVoid, 0)
        .bytes()
}

/// invoke inside a try covered by a typed handler and a catch-all.
fn try_catch_body() -> dexlift_front::OwnedMethodBody {
    let code = Asm::new()
        .op(Opcode::Const4, 0x11)
        .op(Opcode::InvokeVirtual, 0x10)
        .unit(0)
        .unit(1)
        .op(Opcode::ReturnVoid, 0)
        .op(Opcode::MoveException, 0)
        .op(Opcode::ReturnVoid, 0)
        .op(Opcode::MoveException, 0)
        .op(Opcode::ReturnVoid, 0)
        .bytes();
    body_with_regions(
        code,
        vec![TryRegion {
            start_addr: 0,
            end_addr: 4,
            handlers: vec![
                RawHandler {
                    handler_addr: 5,
                    catch_type: Some(TypeRef::from_descriptor(rex::NULL_POINTER)),
                },
                RawHandler {
                    handler_addr: 7,
                    catch_type: None,
                },
            ],
        }],
    )
}

#[test]
fn straight_line_method_has_three_blocks() {
    let fe = frontend(UnresolvingHierarchy);
    let m = fe.make_cfg(&body(straight_line_code())).unwrap();

    assert_eq!(m.cfg.num_blocks(), 3);
    let entry = m.cfg.entry().number();
    let exit = m.cfg.exit().number();
    assert_eq!(m.cfg.succs(entry, EdgeKind::Normal), &[1]);
    assert_eq!(m.cfg.succs(1, EdgeKind::Normal), &[exit]);
    assert!(m.diagnostics.warnings().is_empty());
}

#[test]
fn conditional_and_fallthrough_converge_before_exit() {
    // if-eqz v0, +3; const/4 v1; return-void
    let code = Asm::new()
        .op(Opcode::IfEqz, 0)
        .unit(3)
        .op(Opcode::Const4, 0x11)
        .op(Opcode::ReturnVoid, 0)
        .bytes();
    let fe = frontend(UnresolvingHierarchy);
    let m = fe.make_cfg(&body(code)).unwrap();

    let b_if = m.cfg.block_of_index(0).number();
    let b_then = m.cfg.block_of_index(1).number();
    let b_ret = m.cfg.block_of_index(2).number();
    let mut if_succs = m.cfg.succs(b_if, EdgeKind::Normal).to_vec();
    if_succs.sort_unstable();
    assert_eq!(if_succs, vec![b_then, b_ret]);
    assert_eq!(m.cfg.succs(b_then, EdgeKind::Normal), &[b_ret]);
    assert_eq!(m.cfg.succs(b_ret, EdgeKind::Normal), &[m.cfg.exit().number()]);
}

#[test]
fn try_region_handlers_cover_in_declaration_order() {
    let fe = frontend(JavaHierarchy);
    let m = fe.make_cfg(&try_catch_body()).unwrap();

    // Indices 0 and 1 sit inside the try; both carry the typed handler
    // first, the catch-all second.
    for i in 0..=1 {
        let hs = m.handlers.handlers_at(i);
        assert_eq!(hs.len(), 2, "index {i}");
        assert_eq!(
            hs[0].catch_type.as_ref().unwrap().descriptor(),
            rex::NULL_POINTER
        );
        assert!(hs[1].catch_type.is_none());
    }
    assert!(m.handlers.handlers_at(2).is_empty());

    // The invoke raises NPE (caught by the typed handler); the declared
    // IOException and the unchecked roots all land in the catch-all: two
    // exceptional edges, none to exit.
    let b_invoke = m.cfg.block_of_index(1).number();
    let mut exc = m.cfg.succs(b_invoke, EdgeKind::Exceptional).to_vec();
    exc.sort_unstable();
    assert_eq!(
        exc,
        vec![
            m.cfg.block_of_index(3).number(),
            m.cfg.block_of_index(5).number(),
        ]
    );
    assert!(m.cfg.block_of_index(3).is_catch_block());
    assert!(m.diagnostics.warnings().is_empty());
}

#[test]
fn unresolvable_callee_warns_once_and_goes_wide() {
    let fe = frontend(UnresolvingHierarchy);
    let m = fe.make_cfg(&try_catch_body()).unwrap();

    let b_invoke = m.cfg.block_of_index(1).number();
    let mut exc = m.cfg.succs(b_invoke, EdgeKind::Exceptional).to_vec();
    exc.sort_unstable();
    assert_eq!(
        exc,
        vec![
            m.cfg.block_of_index(3).number(),
            m.cfg.block_of_index(5).number(),
            m.cfg.exit().number(),
        ]
    );
    assert_eq!(m.diagnostics.warnings().len(), 1);
    assert!(matches!(
        m.diagnostics.warnings()[0],
        ResolutionWarning::UnresolvedCallTarget(_)
    ));
}

#[test]
fn every_throwing_block_has_an_exceptional_edge() {
    let fe = frontend(JavaHierarchy);
    let m = fe.make_cfg(&try_catch_body()).unwrap();

    for b in m.cfg.blocks() {
        let Some(last) = b.last_index() else { continue };
        if m.instructions[last].may_throw() {
            assert!(
                !m.cfg.succs(b.number(), EdgeKind::Exceptional).is_empty(),
                "block {} throws but has no exceptional edge",
                b.number()
            );
        }
    }
}

#[test]
fn make_cfg_is_idempotent_and_decodes_once() {
    let fe = frontend(UnresolvingHierarchy);
    let counting = CountingBody::new(body(straight_line_code()));

    let first = fe.make_cfg(&counting).unwrap();
    let second = fe.make_cfg(&counting).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(counting.decodes.get(), 1);
}

#[test]
fn failed_builds_are_not_cached() {
    let fe = frontend(UnresolvingHierarchy);
    let counting = CountingBody::new(body(vec![0x3e, 0x00]));

    assert!(fe.make_cfg(&counting).is_err());
    assert!(fe.make_cfg(&counting).is_err());
    // Each call re-attempted the build: nothing was published.
    assert_eq!(counting.decodes.get(), 2);
}

#[test]
fn make_ir_eliminates_dead_phis_and_caches() {
    let fe = frontend(UnresolvingHierarchy);
    let b = body(straight_line_code());

    let ir = fe.make_ir(&b, Context::default(), IrOptions::default()).unwrap();
    // The builder's dead phi is gone; the per-instruction ops survive.
    assert_eq!(ir.ssa.len(), 2);
    assert!(ir.ssa.iter().all(|i| matches!(i, SsaInstruction::Op { .. })));
    assert!(ir.locals.is_none());

    let again = fe.make_ir(&b, Context::default(), IrOptions::default()).unwrap();
    assert!(Arc::ptr_eq(&ir, &again));
    assert!(fe.context_is_irrelevant(&ir.method));
}
