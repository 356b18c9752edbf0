//! Per-build-session diagnostics.
//!
//! Warnings and counters are collected per build and returned with the
//! result; there is no process-wide diagnostic state, so concurrent builds
//! never share counters.

use crate::types::{MethodRef, TypeRef};

/// A recoverable resolution failure. The build continues with a
/// conservative, over-approximating edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    /// A catch clause names a type the hierarchy cannot resolve.
    UnresolvedCatchType(TypeRef),
    /// A call site's target method cannot be resolved.
    UnresolvedCallTarget(MethodRef),
}

impl std::fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionWarning::UnresolvedCatchType(t) => {
                write!(f, "failed to resolve catch type {t}")
            }
            ResolutionWarning::UnresolvedCallTarget(m) => {
                write!(f, "failed to resolve call target {m}")
            }
        }
    }
}

/// Diagnostics for one method build: a deduplicated, ordered warning set
/// plus counters.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: Vec<ResolutionWarning>,
    pub instructions_decoded: u64,
    pub edges_added: u64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning, once per distinct condition.
    pub fn warn(&mut self, warning: ResolutionWarning) {
        if !self.warnings.contains(&warning) {
            log::warn!("{warning}");
            self.warnings.push(warning);
        }
    }

    pub fn warnings(&self) -> &[ResolutionWarning] {
        &self.warnings
    }

    /// Fold another session's diagnostics into this one.
    pub fn merge(&mut self, other: &Diagnostics) {
        for w in &other.warnings {
            if !self.warnings.contains(w) {
                self.warnings.push(w.clone());
            }
        }
        self.instructions_decoded += other.instructions_decoded;
        self.edges_added += other.edges_added;
    }
}
