use thiserror::Error;

/// Fatal errors from the method-level model. These abort the enclosing
/// method's construction; nothing partial is ever published.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    /// Address lookup failed even after the forward-snap rule.
    #[error("no instruction starts at address {0:#x}")]
    NoInstructionAt(u32),

    #[error("instruction index {index} out of range ({len} instructions)")]
    IndexOutOfRange { index: usize, len: usize },

    /// A try region's address range covers no instructions.
    #[error("try region [{start:#x}, {end:#x}) covers no instructions")]
    EmptyTryRegion { start: u32, end: u32 },

    /// A try region's end address disagrees with the computed size of the
    /// method's last instruction.
    #[error(
        "try region end address {end:#x} does not match the end of the last instruction {expected:#x}"
    )]
    TryEndMismatch { end: u32, expected: u32 },
}

pub type Result<T> = std::result::Result<T, IrError>;
