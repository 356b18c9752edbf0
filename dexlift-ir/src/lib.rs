//! Method-level IR for Dalvik bytecode.
//!
//! This crate holds everything between raw decoding and SSA construction:
//! structured [`Instruction`]s, the address/index bijection, resolved
//! exception-handler scopes, and the basic-block [`Cfg`] with normal and
//! exceptional edges. Name resolution is abstracted behind the
//! [`ClassHierarchy`] trait so the graph can be built with or without a
//! loaded class universe.

pub mod address_index;
pub mod cfg;
pub mod diag;
pub mod error;
pub mod handlers;
pub mod hierarchy;
pub mod instruction;
pub mod types;

pub use address_index::AddressIndex;
pub use cfg::{BasicBlock, BlockKind, Cfg, EdgeKind};
pub use diag::{Diagnostics, ResolutionWarning};
pub use error::{IrError, Result};
pub use handlers::{Handler, HandlerTable, RawHandler, TryRegion};
pub use hierarchy::{ClassHierarchy, UnresolvingHierarchy};
pub use instruction::{
    AccessKind, ArrayData, BinaryOp, CompareKind, ConstValue, IfTest, Instruction, InvokeKind,
    NumType, Op, UnaryOp,
};
pub use types::{FieldRef, MethodRef, TypeRef, runtime_exceptions};
