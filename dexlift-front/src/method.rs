//! The external method and constant-pool collaborators.
//!
//! The front end never opens a container file itself; the host hands it one
//! method's raw code plus index-to-symbol resolution through these traits.

use dexlift_ir::{FieldRef, MethodRef, TryRegion, TypeRef};

/// Index-to-symbol resolution. Every accessor may legitimately answer
/// `None`; the translator turns that into a fatal bad-pool-index error.
pub trait ConstantPool {
    fn type_at(&self, index: u32) -> Option<TypeRef>;
    fn field_at(&self, index: u32) -> Option<FieldRef>;
    fn method_at(&self, index: u32) -> Option<MethodRef>;
    fn string_at(&self, index: u32) -> Option<String>;
}

/// One method's body as the host exposes it.
///
/// Register numbering follows the code; two pseudo-registers above
/// `register_count` carry the last invoke result and the in-flight
/// exception, so translated moves can name them like ordinary registers.
pub trait MethodBody {
    fn reference(&self) -> &MethodRef;

    /// Raw little-endian code bytes.
    fn code(&self) -> &[u8];

    fn register_count(&self) -> u16;

    fn parameter_count(&self) -> u16;

    fn try_regions(&self) -> Vec<TryRegion>;

    fn pool(&self) -> &dyn ConstantPool;

    /// Pseudo-register holding the most recent invoke/filled-new-array
    /// result.
    fn result_register(&self) -> u16 {
        self.register_count()
    }

    /// Pseudo-register holding the exception at a catch entry.
    fn exception_register(&self) -> u16 {
        self.register_count() + 1
    }

    /// Total register slots including the two pseudo-registers.
    fn local_count(&self) -> u16 {
        self.register_count() + 2
    }
}

/// A constant pool backed by plain vectors, indexed positionally.
#[derive(Debug, Clone, Default)]
pub struct TablePool {
    pub types: Vec<TypeRef>,
    pub fields: Vec<FieldRef>,
    pub methods: Vec<MethodRef>,
    pub strings: Vec<String>,
}

impl ConstantPool for TablePool {
    fn type_at(&self, index: u32) -> Option<TypeRef> {
        self.types.get(index as usize).cloned()
    }

    fn field_at(&self, index: u32) -> Option<FieldRef> {
        self.fields.get(index as usize).cloned()
    }

    fn method_at(&self, index: u32) -> Option<MethodRef> {
        self.methods.get(index as usize).cloned()
    }

    fn string_at(&self, index: u32) -> Option<String> {
        self.strings.get(index as usize).cloned()
    }
}

/// A self-contained method body, for hosts that already hold everything in
/// memory (and for the command-line driver).
#[derive(Debug, Clone)]
pub struct OwnedMethodBody {
    pub reference: MethodRef,
    pub code: Vec<u8>,
    pub register_count: u16,
    pub parameter_count: u16,
    pub try_regions: Vec<TryRegion>,
    pub pool: TablePool,
}

impl MethodBody for OwnedMethodBody {
    fn reference(&self) -> &MethodRef {
        &self.reference
    }

    fn code(&self) -> &[u8] {
        &self.code
    }

    fn register_count(&self) -> u16 {
        self.register_count
    }

    fn parameter_count(&self) -> u16 {
        self.parameter_count
    }

    fn try_regions(&self) -> Vec<TryRegion> {
        self.try_regions.clone()
    }

    fn pool(&self) -> &dyn ConstantPool {
        &self.pool
    }
}
