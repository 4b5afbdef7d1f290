//! Foundation types for the custody ledger.
//!
//! This crate provides the identifiers, status machinery inputs, and
//! record types shared by every other custody crate.
//!
//! # Key Types
//!
//! - [`CaseId`] / [`ItemId`]: opaque stable identifiers
//! - [`ItemStatus`]: lifecycle status of one evidence item
//! - [`RemovalReason`]: terminal disposition chosen on removal
//! - [`ItemRecord`]: one historical action taken on one item
//! - [`CustodyRecord`]: one case's accumulated item-action history
//! - [`EntryHash`]: BLAKE3 hash linking ledger entries

pub mod error;
pub mod hash;
pub mod record;
pub mod status;
pub mod temporal;

pub use error::TypeError;
pub use hash::EntryHash;
pub use record::{CaseId, CustodyRecord, ItemId, ItemRecord};
pub use status::{ItemStatus, RemovalReason};
pub use temporal::monotonic_now;
