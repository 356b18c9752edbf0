//! Control-flow graph construction over hand-built instruction sequences.

use dexlift_ir::{
    AddressIndex, BlockKind, Cfg, ClassHierarchy, Diagnostics, EdgeKind, HandlerTable, Instruction,
    IfTest, InvokeKind, MethodRef, Op, RawHandler, ResolutionWarning, TryRegion, TypeRef,
    UnresolvingHierarchy, runtime_exceptions as rex,
};
use dexlift_isa::Opcode;

/// Resolves `java.lang` types; subtyping is identity plus Throwable on top.
struct JavaLangHierarchy {
    declared: Option<Vec<TypeRef>>,
}

impl JavaLangHierarchy {
    fn new() -> Self {
        JavaLangHierarchy {
            declared: Some(Vec::new()),
        }
    }

    fn unresolved_callees() -> Self {
        JavaLangHierarchy { declared: None }
    }
}

impl ClassHierarchy for JavaLangHierarchy {
    fn resolves(&self, ty: &TypeRef) -> bool {
        ty.descriptor().starts_with("Ljava/lang/")
    }

    fn subtype_of(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        sub == sup || sup.descriptor() == "Ljava/lang/Throwable;"
    }

    fn resolve_declared_exceptions(&self, _callee: &MethodRef) -> Option<Vec<TypeRef>> {
        self.declared.clone()
    }
}

fn ins(addr: u32, opcode: Opcode, op: Op) -> Instruction {
    Instruction { addr, opcode, op }
}

fn invoke(addr: u32) -> Instruction {
    ins(
        addr,
        Opcode::InvokeVirtual,
        Op::Invoke {
            kind: InvokeKind::Virtual,
            method: MethodRef {
                class: TypeRef::from_descriptor("LFoo;"),
                name: "bar".into(),
                descriptor: "()V".into(),
            },
            args: vec![1],
        },
    )
}

fn ret(addr: u32) -> Instruction {
    ins(
        addr,
        Opcode::ReturnVoid,
        Op::Return {
            value: None,
            wide: false,
            object: false,
        },
    )
}

fn catch_entry(addr: u32, dest: u16) -> Instruction {
    ins(
        addr,
        Opcode::MoveException,
        Op::MoveException { dest, src: 0 },
    )
}

fn build(
    instructions: &[Instruction],
    sizes: &[u32],
    regions: &[TryRegion],
    hierarchy: &dyn ClassHierarchy,
) -> (Cfg, Diagnostics) {
    let index = AddressIndex::from_instructions(instructions);
    let handlers = HandlerTable::resolve(regions, &index, sizes).unwrap();
    let mut diags = Diagnostics::new();
    let cfg = Cfg::build(instructions, &index, &handlers, hierarchy, &mut diags).unwrap();
    (cfg, diags)
}

fn assert_tiles_indices(cfg: &Cfg, n: usize) {
    let mut seen = vec![false; n];
    for b in cfg.blocks() {
        if let BlockKind::Code { first, last } = b.kind() {
            for i in first..=last {
                assert!(!seen[i], "instruction {i} in two blocks");
                seen[i] = true;
                assert_eq!(cfg.block_of_index(i).number(), b.number());
            }
        }
    }
    assert!(seen.iter().all(|&s| s), "every instruction in some block");
}

#[test]
fn diamond_branch() {
    let instructions = [
        ins(
            0,
            Opcode::IfEqz,
            Op::If {
                test: IfTest::Eq,
                left: 0,
                right: None,
                target: 3,
            },
        ),
        ins(
            2,
            Opcode::Const4,
            Op::Const {
                dest: 1,
                value: dexlift_ir::ConstValue::Int(1),
            },
        ),
        ret(3),
    ];
    let (cfg, diags) = build(&instructions, &[2, 1, 1], &[], &UnresolvingHierarchy);

    assert_eq!(cfg.num_blocks(), 5);
    assert_tiles_indices(&cfg, 3);
    assert!(cfg.entry().is_entry());
    assert!(cfg.exit().is_exit());

    let b_if = cfg.block_of_index(0).number();
    let b_const = cfg.block_of_index(1).number();
    let b_ret = cfg.block_of_index(2).number();
    assert_eq!(cfg.succs(cfg.entry().number(), EdgeKind::Normal), &[b_if]);
    let mut if_succs = cfg.succs(b_if, EdgeKind::Normal).to_vec();
    if_succs.sort_unstable();
    assert_eq!(if_succs, vec![b_const, b_ret]);
    assert_eq!(cfg.succs(b_const, EdgeKind::Normal), &[b_ret]);
    assert_eq!(cfg.succs(b_ret, EdgeKind::Normal), &[cfg.exit().number()]);
    for b in 0..cfg.num_blocks() {
        assert!(cfg.succs(b, EdgeKind::Exceptional).is_empty());
    }
    assert!(diags.warnings().is_empty());
}

#[test]
fn invoke_in_try_edges_to_matching_handler() {
    let instructions = [invoke(0), ret(3), catch_entry(4, 0), ret(5)];
    let regions = [TryRegion {
        start_addr: 0,
        end_addr: 4,
        handlers: vec![RawHandler {
            handler_addr: 4,
            catch_type: Some(TypeRef::from_descriptor(rex::NULL_POINTER)),
        }],
    }];
    let (cfg, diags) = build(
        &instructions,
        &[3, 1, 1, 1],
        &regions,
        &JavaLangHierarchy::new(),
    );

    let b_invoke = cfg.block_of_index(0).number();
    let b_handler = cfg.block_of_index(2).number();
    assert!(cfg.block(b_handler).is_catch_block());
    // The NPE is proven caught; the unchecked-exception roots are not, so
    // the call can still leave the method.
    let mut exc = cfg.succs(b_invoke, EdgeKind::Exceptional).to_vec();
    exc.sort_unstable();
    assert_eq!(exc, vec![b_handler, cfg.exit().number()]);
    assert_eq!(
        cfg.succs(b_invoke, EdgeKind::Normal),
        &[cfg.block_of_index(1).number()]
    );
    assert!(diags.warnings().is_empty());
}

#[test]
fn static_invoke_with_no_declared_exceptions_still_throws() {
    // A static call carries no implicit NPE and here declares nothing, yet
    // it can still raise an unchecked exception into the catch-all.
    let instructions = [
        ins(
            0,
            Opcode::InvokeStatic,
            Op::Invoke {
                kind: InvokeKind::Static,
                method: MethodRef {
                    class: TypeRef::from_descriptor("LFoo;"),
                    name: "baz".into(),
                    descriptor: "()V".into(),
                },
                args: vec![],
            },
        ),
        ret(3),
        catch_entry(4, 0),
        ret(5),
    ];
    let regions = [TryRegion {
        start_addr: 0,
        end_addr: 4,
        handlers: vec![RawHandler {
            handler_addr: 4,
            catch_type: None,
        }],
    }];
    let (cfg, diags) = build(
        &instructions,
        &[3, 1, 1, 1],
        &regions,
        &JavaLangHierarchy::new(),
    );

    let b_invoke = cfg.block_of_index(0).number();
    let b_handler = cfg.block_of_index(2).number();
    assert_eq!(cfg.succs(b_invoke, EdgeKind::Exceptional), &[b_handler]);
    assert!(diags.warnings().is_empty());
}

#[test]
fn unresolved_callee_goes_to_all_handlers_and_exit() {
    let instructions = [invoke(0), ret(3), catch_entry(4, 0), ret(5)];
    let regions = [TryRegion {
        start_addr: 0,
        end_addr: 4,
        handlers: vec![RawHandler {
            handler_addr: 4,
            catch_type: Some(TypeRef::from_descriptor(rex::NULL_POINTER)),
        }],
    }];
    let hierarchy = JavaLangHierarchy::unresolved_callees();
    let (cfg, diags) = build(&instructions, &[3, 1, 1, 1], &regions, &hierarchy);

    let b_invoke = cfg.block_of_index(0).number();
    let b_handler = cfg.block_of_index(2).number();
    let mut exc = cfg.succs(b_invoke, EdgeKind::Exceptional).to_vec();
    exc.sort_unstable();
    assert_eq!(exc, vec![b_handler, cfg.exit().number()]);
    assert_eq!(
        diags.warnings(),
        &[ResolutionWarning::UnresolvedCallTarget(MethodRef {
            class: TypeRef::from_descriptor("LFoo;"),
            name: "bar".into(),
            descriptor: "()V".into(),
        })]
    );
}

#[test]
fn explicit_throw_reaches_every_handler_and_exit() {
    let instructions = [
        ins(0, Opcode::Throw, Op::Throw { exception: 0 }),
        catch_entry(1, 1),
        ret(2),
        catch_entry(3, 2),
        ret(4),
    ];
    let regions = [TryRegion {
        start_addr: 0,
        end_addr: 1,
        handlers: vec![
            RawHandler {
                handler_addr: 1,
                catch_type: Some(TypeRef::from_descriptor(rex::NULL_POINTER)),
            },
            RawHandler {
                handler_addr: 3,
                catch_type: None,
            },
        ],
    }];
    let (cfg, diags) = build(
        &instructions,
        &[1, 1, 1, 1, 1],
        &regions,
        &JavaLangHierarchy::new(),
    );

    let b_throw = cfg.block_of_index(0).number();
    let mut exc = cfg.succs(b_throw, EdgeKind::Exceptional).to_vec();
    exc.sort_unstable();
    assert_eq!(
        exc,
        vec![
            cfg.block_of_index(1).number(),
            cfg.block_of_index(3).number(),
            cfg.exit().number(),
        ]
    );
    assert!(cfg.succs(b_throw, EdgeKind::Normal).is_empty());
    assert!(diags.warnings().is_empty());
}

#[test]
fn catch_all_clears_remaining_types() {
    // Catch-all declared before a typed handler: the typed one is dead.
    let instructions = [
        ins(
            0,
            Opcode::DivInt,
            Op::Binary {
                op: dexlift_ir::BinaryOp::Div,
                ty: dexlift_ir::NumType::Int,
                dest: 0,
                left: 1,
                right: 2,
            },
        ),
        ret(2),
        catch_entry(3, 0),
        ret(4),
        catch_entry(5, 0),
        ret(6),
    ];
    let regions = [TryRegion {
        start_addr: 0,
        end_addr: 2,
        handlers: vec![
            RawHandler {
                handler_addr: 3,
                catch_type: None,
            },
            RawHandler {
                handler_addr: 5,
                catch_type: Some(TypeRef::from_descriptor(rex::ARITHMETIC)),
            },
        ],
    }];
    let (cfg, diags) = build(
        &instructions,
        &[2, 1, 1, 1, 1, 1],
        &regions,
        &JavaLangHierarchy::new(),
    );

    let b_div = cfg.block_of_index(0).number();
    assert_eq!(
        cfg.succs(b_div, EdgeKind::Exceptional),
        &[cfg.block_of_index(2).number()]
    );
    assert!(diags.warnings().is_empty());
}

#[test]
fn unresolved_catch_type_edges_conservatively() {
    let instructions = [invoke(0), ret(3), catch_entry(4, 0), ret(5)];
    let regions = [TryRegion {
        start_addr: 0,
        end_addr: 4,
        handlers: vec![RawHandler {
            handler_addr: 4,
            catch_type: Some(TypeRef::from_descriptor("Lcom/missing/Oops;")),
        }],
    }];
    let (cfg, diags) = build(
        &instructions,
        &[3, 1, 1, 1],
        &regions,
        &JavaLangHierarchy::new(),
    );

    let b_invoke = cfg.block_of_index(0).number();
    let b_handler = cfg.block_of_index(2).number();
    let mut exc = cfg.succs(b_invoke, EdgeKind::Exceptional).to_vec();
    exc.sort_unstable();
    // Edge to the handler, but the NPE was never proven caught.
    assert_eq!(exc, vec![b_handler, cfg.exit().number()]);
    assert_eq!(
        diags.warnings(),
        &[ResolutionWarning::UnresolvedCatchType(
            TypeRef::from_descriptor("Lcom/missing/Oops;")
        )]
    );
}

#[test]
fn pei_outside_any_try_edges_to_exit() {
    let instructions = [invoke(0), ret(3)];
    let (cfg, diags) = build(&instructions, &[3, 1], &[], &JavaLangHierarchy::new());

    let b_invoke = cfg.block_of_index(0).number();
    assert_eq!(
        cfg.succs(b_invoke, EdgeKind::Exceptional),
        &[cfg.exit().number()]
    );
    assert!(diags.warnings().is_empty());
    assert!(diags.edges_added > 0);
}
