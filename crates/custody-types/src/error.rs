use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unknown item status: {0}")]
    UnknownStatus(String),

    #[error("unknown removal reason: {0} (expected RELEASED, DISPOSED, or DESTROYED)")]
    UnknownReason(String),
}
