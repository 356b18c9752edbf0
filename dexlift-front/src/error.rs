use thiserror::Error;

/// Fatal per-method front-end errors. A method that fails here is excluded
/// from the analyzable set; nothing is published to any cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontError {
    #[error(transparent)]
    Decode(#[from] dexlift_isa::DecodeError),

    #[error(transparent)]
    Ir(#[from] dexlift_ir::IrError),

    /// A translated instruction references a constant-pool slot the pool
    /// does not have.
    #[error("bad {kind} pool index {index}")]
    BadPoolIndex { kind: &'static str, index: u32 },

    /// The backward walk from a `fill-array-data` found no `new-array`
    /// supplying the element type.
    #[error("cannot infer element type for fill-array-data at address {addr:#x}")]
    UnresolvedArrayFill { addr: u32 },
}

pub type Result<T> = std::result::Result<T, FrontError>;
