#![allow(dead_code)]

//! Hand-built bytecode for tests: a tiny code-unit assembler plus canned
//! method bodies and pools.

use std::cell::Cell;

use dexlift_front::{ConstantPool, MethodBody, OwnedMethodBody, TablePool};
use dexlift_ir::{FieldRef, MethodRef, TryRegion, TypeRef};
use dexlift_isa::Opcode;

/// Route `log` output through the test harness's captured stderr.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds a little-endian code-unit stream.
#[derive(Default)]
pub struct Asm {
    units: Vec<u16>,
}

impl Asm {
    pub fn new() -> Self {
        Asm::default()
    }

    /// Current address in code units.
    pub fn here(&self) -> u32 {
        self.units.len() as u32
    }

    pub fn unit(mut self, unit: u16) -> Self {
        self.units.push(unit);
        self
    }

    /// An opcode unit with the given high byte.
    pub fn op(self, opcode: Opcode, high: u8) -> Self {
        self.unit(opcode.value() as u16 | ((high as u16) << 8))
    }

    /// A 32-bit operand as two units, low first.
    pub fn wide(self, value: u32) -> Self {
        self.unit(value as u16).unit((value >> 16) as u16)
    }

    pub fn bytes(self) -> Vec<u8> {
        self.units
            .into_iter()
            .flat_map(u16::to_le_bytes)
            .collect()
    }
}

pub fn type_ref(desc: &str) -> TypeRef {
    TypeRef::from_descriptor(desc)
}

pub fn method_ref(class: &str, name: &str, descriptor: &str) -> MethodRef {
    MethodRef {
        class: type_ref(class),
        name: name.into(),
        descriptor: descriptor.into(),
    }
}

pub fn field_ref(class: &str, name: &str, field_type: &str) -> FieldRef {
    FieldRef {
        class: type_ref(class),
        name: name.into(),
        field_type: type_ref(field_type),
    }
}

/// Pool slot 0 of each table is the one tests reference by default.
pub fn test_pool() -> TablePool {
    TablePool {
        types: vec![type_ref("[I"), type_ref("Ljava/lang/String;")],
        fields: vec![field_ref("LFoo;", "count", "I")],
        methods: vec![method_ref("LFoo;", "bar", "()V")],
        strings: vec!["hello".into()],
    }
}

/// A method body with eight registers and one parameter.
pub fn body(code: Vec<u8>) -> OwnedMethodBody {
    body_with_regions(code, Vec::new())
}

pub fn body_with_regions(code: Vec<u8>, try_regions: Vec<TryRegion>) -> OwnedMethodBody {
    OwnedMethodBody {
        reference: method_ref("LTest;", "run", "()V"),
        code,
        register_count: 8,
        parameter_count: 1,
        try_regions,
        pool: test_pool(),
    }
}

/// Wraps a body and counts how many times the pipeline pulls its code,
/// i.e. how many decodes actually ran.
pub struct CountingBody {
    pub inner: OwnedMethodBody,
    pub decodes: Cell<usize>,
}

impl CountingBody {
    pub fn new(inner: OwnedMethodBody) -> Self {
        CountingBody {
            inner,
            decodes: Cell::new(0),
        }
    }
}

impl MethodBody for CountingBody {
    fn reference(&self) -> &MethodRef {
        &self.inner.reference
    }

    fn code(&self) -> &[u8] {
        self.decodes.set(self.decodes.get() + 1);
        &self.inner.code
    }

    fn register_count(&self) -> u16 {
        self.inner.register_count
    }

    fn parameter_count(&self) -> u16 {
        self.inner.parameter_count
    }

    fn try_regions(&self) -> Vec<TryRegion> {
        self.inner.try_regions.clone()
    }

    fn pool(&self) -> &dyn ConstantPool {
        &self.inner.pool
    }
}
