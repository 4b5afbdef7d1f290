use chrono::{DateTime, Utc};
use custody_types::{monotonic_now, CaseId, CustodyRecord, EntryHash};
use tracing::debug;

use crate::entry::{Entry, Payload};
use crate::error::LedgerError;
use crate::store::FileStore;

/// The append-only hash-linked chain of custody.
///
/// A `Ledger` always holds at least the genesis entry. Appends persist
/// the whole chain before the in-memory chain is extended, so a failed
/// write never leaves memory and disk divergent.
#[derive(Debug)]
pub struct Ledger {
    store: FileStore,
    entries: Vec<Entry>,
}

impl Ledger {
    /// Load the persisted chain, or create and persist a fresh one-entry
    /// genesis chain. The flag is `true` when a fresh chain was created.
    pub fn load_or_init(store: FileStore) -> Result<(Self, bool), LedgerError> {
        if store.exists() {
            let entries = store.load()?;
            if entries.is_empty() {
                return Err(LedgerError::StorageCorrupt {
                    reason: "store holds an empty chain (missing genesis entry)".into(),
                });
            }
            debug!(entries = entries.len(), "opened existing chain");
            Ok((Self { store, entries }, false))
        } else {
            let genesis = Entry::genesis(monotonic_now(None))?;
            let entries = vec![genesis];
            store.save(&entries)?;
            debug!("created fresh chain with genesis entry");
            Ok((Self { store, entries }, true))
        }
    }

    /// Append a custody snapshot as a new entry and persist the chain.
    ///
    /// All-or-nothing: on a storage failure the in-memory chain is left
    /// exactly as it was.
    pub fn append(&mut self, record: CustodyRecord) -> Result<Entry, LedgerError> {
        let entry = Entry::sealed(
            self.next_timestamp(),
            Payload::Custody(record),
            self.tail_hash(),
        )?;

        self.entries.push(entry);
        if let Err(e) = self.store.save(&self.entries) {
            self.entries.pop();
            return Err(e);
        }

        debug!(seq = self.entries.len() - 1, "appended custody entry");
        // Just pushed; the chain is never empty.
        Ok(self.entries[self.entries.len() - 1].clone())
    }

    /// Read-only view of the chain in insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries on the chain (genesis included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A chain always carries at least the genesis entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hash of the current tail entry.
    pub fn tail_hash(&self) -> EntryHash {
        self.entries.last().map(|e| e.hash).unwrap_or_else(EntryHash::null)
    }

    /// The most recent custody snapshot for a case, if any.
    ///
    /// Last match in chain order: later snapshots supersede earlier ones.
    pub fn find_case(&self, case_id: &CaseId) -> Option<&CustodyRecord> {
        self.entries
            .iter()
            .rev()
            .filter_map(Entry::custody)
            .find(|record| &record.case_id == case_id)
    }

    /// Timestamp for the next entry, clamped non-decreasing.
    fn next_timestamp(&self) -> DateTime<Utc> {
        monotonic_now(self.entries.last().map(|e| e.timestamp))
    }

    /// Consume the ledger, returning its store handle.
    pub fn into_store(self) -> FileStore {
        self.store
    }
}
