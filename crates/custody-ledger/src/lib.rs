//! Append-only chain-of-custody ledger.
//!
//! This crate is the heart of the custody system. It provides:
//! - Hash-linked [`Entry`] records with a tagged genesis/custody payload
//! - [`Ledger`] load-or-init, append, and case lookup over an atomic
//!   persisted store
//! - The item status state machine governing custody transitions
//! - [`IntegrityVerifier`], a read-only replay of the whole chain
//! - [`QueryEngine`], current-status and filtered log projections

pub mod actions;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod machine;
pub mod query;
pub mod store;
pub mod verify;

pub use actions::ActionOutcome;
pub use entry::{Entry, Payload, GENESIS_MARKER};
pub use error::LedgerError;
pub use ledger::Ledger;
pub use machine::{CustodyAction, CustodyWarning, Transition, TransitionError};
pub use query::{LogFilter, LogLine, QueryEngine};
pub use store::FileStore;
pub use verify::{Finding, FindingKind, IntegrityVerifier, VerificationReport};
