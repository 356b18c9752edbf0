//! Symbolic references: types, fields, methods.
//!
//! Types are JVM-style descriptors (`Ljava/lang/String;`, `[I`, `D`). The
//! front end never interprets them beyond array element stripping; resolving
//! them against a class hierarchy is the collaborator's job.

/// A type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn from_descriptor(desc: impl Into<String>) -> Self {
        TypeRef(desc.into())
    }

    pub fn descriptor(&self) -> &str {
        &self.0
    }

    pub fn is_array(&self) -> bool {
        self.0.starts_with('[')
    }

    /// The element type of an array descriptor, or `None` for non-arrays.
    pub fn array_element_type(&self) -> Option<TypeRef> {
        self.0
            .strip_prefix('[')
            .map(|rest| TypeRef(rest.to_string()))
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A field reference: declaring class, name, field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub class: TypeRef,
    pub name: String,
    pub field_type: TypeRef,
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}:{}", self.class, self.name, self.field_type)
    }
}

/// A method reference: declaring class, name, JVM signature descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodRef {
    pub class: TypeRef,
    pub name: String,
    pub descriptor: String,
}

impl std::fmt::Display for MethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}{}", self.class, self.name, self.descriptor)
    }
}

/// Descriptors of the runtime exception types raised implicitly by
/// bytecode instructions.
pub mod runtime_exceptions {
    pub const NULL_POINTER: &str = "Ljava/lang/NullPointerException;";
    pub const RUNTIME_EXCEPTION: &str = "Ljava/lang/RuntimeException;";
    pub const ERROR: &str = "Ljava/lang/Error;";
    pub const ARRAY_INDEX_OUT_OF_BOUNDS: &str = "Ljava/lang/ArrayIndexOutOfBoundsException;";
    pub const ARRAY_STORE: &str = "Ljava/lang/ArrayStoreException;";
    pub const ARITHMETIC: &str = "Ljava/lang/ArithmeticException;";
    pub const CLASS_CAST: &str = "Ljava/lang/ClassCastException;";
    pub const EXCEPTION_IN_INITIALIZER: &str = "Ljava/lang/ExceptionInInitializerError;";
    pub const OUT_OF_MEMORY: &str = "Ljava/lang/OutOfMemoryError;";
    pub const NEGATIVE_ARRAY_SIZE: &str = "Ljava/lang/NegativeArraySizeException;";
}

#[cfg(test)]
mod tests {
    use super::TypeRef;

    #[test]
    fn array_element_stripping() {
        let t = TypeRef::from_descriptor("[[I");
        assert!(t.is_array());
        assert_eq!(t.array_element_type().unwrap().descriptor(), "[I");
        assert_eq!(
            t.array_element_type()
                .unwrap()
                .array_element_type()
                .unwrap()
                .descriptor(),
            "I"
        );
        assert_eq!(TypeRef::from_descriptor("I").array_element_type(), None);
    }
}
