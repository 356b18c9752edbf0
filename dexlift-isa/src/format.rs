//! Dalvik instruction formats.
//!
//! Format names follow the dex-format convention: the first digit is the
//! size in 16-bit code units, the second the number of registers, and the
//! trailing letter the kind of extra payload (`t` branch target, `c` pool
//! index, `s`/`b`/`n`/`h`/`i`/`l` literals, `x` none).

/// Encoding format of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Format10x,
    Format12x,
    Format11n,
    Format11x,
    Format10t,
    Format20t,
    Format22x,
    Format21t,
    Format21s,
    Format21h,
    Format21c,
    Format23x,
    Format22b,
    Format22t,
    Format22s,
    Format22c,
    Format30t,
    Format32x,
    Format31i,
    Format31t,
    Format31c,
    Format35c,
    Format3rc,
    Format51l,
    /// `packed-switch-payload` pseudo-instruction (variable size).
    PackedSwitchPayload,
    /// `sparse-switch-payload` pseudo-instruction (variable size).
    SparseSwitchPayload,
    /// `fill-array-data-payload` pseudo-instruction (variable size).
    ArrayDataPayload,
}

impl Format {
    /// Size in 16-bit code units, or `None` for the variable-size payloads.
    pub const fn units(self) -> Option<u8> {
        match self {
            Format::Format10x
            | Format::Format12x
            | Format::Format11n
            | Format::Format11x
            | Format::Format10t => Some(1),
            Format::Format20t
            | Format::Format22x
            | Format::Format21t
            | Format::Format21s
            | Format::Format21h
            | Format::Format21c
            | Format::Format23x
            | Format::Format22b
            | Format::Format22t
            | Format::Format22s
            | Format::Format22c => Some(2),
            Format::Format30t
            | Format::Format32x
            | Format::Format31i
            | Format::Format31t
            | Format::Format31c
            | Format::Format35c
            | Format::Format3rc => Some(3),
            Format::Format51l => Some(5),
            Format::PackedSwitchPayload
            | Format::SparseSwitchPayload
            | Format::ArrayDataPayload => None,
        }
    }
}
