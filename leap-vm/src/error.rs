//! Execution error variants.

use leap_asm::RawOpcode;

/// Conditions under which the model refuses an instruction.
///
/// Either way the register-file context is left untouched; conformance
/// harnesses count both variants as not-implemented rather than as
/// mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ExecuteError {
    /// The opcode is outside the modeled instruction table.
    #[error("opcode {0:#05x} is not modeled")]
    NotImplemented(RawOpcode),
    /// The opcode reads or writes an I/O port. Port traffic has side
    /// effects outside the register-file context and is never modeled.
    #[error("opcode {0:#05x} accesses an I/O port and is not modeled")]
    PortAccess(RawOpcode),
}

impl ExecuteError {
    /// The raw opcode the model refused.
    pub const fn raw_opcode(&self) -> RawOpcode {
        match self {
            Self::NotImplemented(raw) | Self::PortAccess(raw) => *raw,
        }
    }
}
