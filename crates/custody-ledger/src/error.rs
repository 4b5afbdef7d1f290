use crate::machine::TransitionError;

/// Errors produced by ledger operations.
///
/// Storage failures are fatal to the command that hit them; transition
/// failures abort only the offending action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("persisted store is corrupt: {reason}")]
    StorageCorrupt { reason: String },

    #[error("failed to persist chain: {reason}")]
    StorageWrite { reason: String },

    #[error(transparent)]
    IllegalTransition(#[from] TransitionError),

    #[error("serialization error: {0}")]
    Serialization(String),
}
