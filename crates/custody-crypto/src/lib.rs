//! Hash-link primitives for the custody ledger.
//!
//! Provides [`EntryHasher`], the single place where an entry's digest is
//! computed from its canonical bytes. Both append and verification go
//! through it, so a hash computed at append time is always reproducible
//! during a later integrity walk.

pub mod hasher;

pub use hasher::{EntryHasher, HasherError};
