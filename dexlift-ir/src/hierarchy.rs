//! The class-hierarchy seam.
//!
//! The host engine owns the real hierarchy; this front end only queries it,
//! and every query may legitimately answer "not found". Unresolvable types
//! and call targets widen the CFG conservatively instead of failing.

use crate::types::{MethodRef, TypeRef};

pub trait ClassHierarchy {
    /// Whether `ty` resolves to a known class.
    fn resolves(&self, ty: &TypeRef) -> bool;

    /// Whether `sub` is `sup` or one of its subclasses. Only meaningful
    /// when both types resolve.
    fn subtype_of(&self, sub: &TypeRef, sup: &TypeRef) -> bool;

    /// The declared (checked) exceptions of the callee, or `None` when the
    /// callee cannot be resolved.
    fn resolve_declared_exceptions(&self, callee: &MethodRef) -> Option<Vec<TypeRef>>;
}

/// A hierarchy that resolves nothing. Every catch edge and call site
/// degrades to its conservative form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnresolvingHierarchy;

impl ClassHierarchy for UnresolvingHierarchy {
    fn resolves(&self, _ty: &TypeRef) -> bool {
        false
    }

    fn subtype_of(&self, _sub: &TypeRef, _sup: &TypeRef) -> bool {
        false
    }

    fn resolve_declared_exceptions(&self, _callee: &MethodRef) -> Option<Vec<TypeRef>> {
        None
    }
}
