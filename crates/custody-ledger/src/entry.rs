use chrono::{DateTime, Utc};
use custody_crypto::EntryHasher;
use custody_types::{CustodyRecord, EntryHash};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Well-known payload value anchoring the chain's first entry.
pub const GENESIS_MARKER: &str = "Genesis Block";

/// Payload carried by one ledger entry.
///
/// Matched exhaustively everywhere; there is no other payload shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// The fixed sentinel payload of the first entry. Serializes to
    /// [`GENESIS_MARKER`] in the canonical JSON fed to the hasher.
    #[serde(rename = "Genesis Block")]
    Genesis,
    /// A snapshot of one case's accumulated custody history.
    Custody(CustodyRecord),
}

impl Payload {
    /// The custody record, if this is not the genesis sentinel.
    pub fn custody(&self) -> Option<&CustodyRecord> {
        match self {
            Self::Genesis => None,
            Self::Custody(record) => Some(record),
        }
    }
}

/// One immutable node in the ledger.
///
/// `hash` is a pure function of the other three fields; nothing in an
/// entry is ever edited after it has been appended. A custody action is
/// recorded by appending a *new* entry carrying the updated snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Creation instant; non-decreasing across the chain.
    pub timestamp: DateTime<Utc>,
    /// Genesis sentinel or custody snapshot.
    pub payload: Payload,
    /// Hash of the predecessor entry (null for genesis).
    pub previous_hash: EntryHash,
    /// Digest over (timestamp, payload, previous_hash).
    pub hash: EntryHash,
}

impl Entry {
    /// Build a sealed entry: compute the digest and freeze the fields.
    pub fn sealed(
        timestamp: DateTime<Utc>,
        payload: Payload,
        previous_hash: EntryHash,
    ) -> Result<Self, LedgerError> {
        let hash = EntryHasher::ENTRY
            .compute(timestamp, &payload, &previous_hash)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Ok(Self {
            timestamp,
            payload,
            previous_hash,
            hash,
        })
    }

    /// Build the sentinel first entry of a fresh chain.
    pub fn genesis(timestamp: DateTime<Utc>) -> Result<Self, LedgerError> {
        Self::sealed(timestamp, Payload::Genesis, EntryHash::null())
    }

    /// Recompute the digest from the stored fields.
    pub fn recompute_hash(&self) -> Result<EntryHash, LedgerError> {
        EntryHasher::ENTRY
            .compute(self.timestamp, &self.payload, &self.previous_hash)
            .map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Returns `true` for the genesis sentinel entry.
    pub fn is_genesis(&self) -> bool {
        matches!(self.payload, Payload::Genesis)
    }

    /// The custody record, if any.
    pub fn custody(&self) -> Option<&CustodyRecord> {
        self.payload.custody()
    }
}
