use std::collections::HashMap;
use std::fmt;

use custody_types::{CaseId, ItemId, ItemRecord, ItemStatus, RemovalReason};

use crate::entry::Entry;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::machine::{self, CustodyAction, CustodyWarning};

/// Result of a full-chain verification walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationReport {
    pub entry_count: usize,
    pub findings: Vec<Finding>,
}

impl VerificationReport {
    /// Returns `true` if the walk raised no findings at all.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Returns `true` if every finding is a warning (no structural damage
    /// and no illegal history).
    pub fn warnings_only(&self) -> bool {
        self.findings.iter().all(|f| f.kind.is_warning())
    }
}

/// One issue found at one entry index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    pub index: usize,
    pub kind: FindingKind,
    pub detail: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry {}: {}: {}", self.index, self.kind, self.detail)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FindingKind {
    /// Stored hash does not match the recomputed digest (data tampered).
    HashMismatch,
    /// Previous-hash link does not match the prior entry (chain spliced).
    LinkBreak,
    /// The chain does not start with a well-formed genesis entry, or a
    /// genesis payload appears past index 0.
    BadGenesis,
    /// A case snapshot does not extend its predecessor verbatim.
    HistoryRewrite,
    /// An item's observed status sequence is not a legal machine path.
    IllegalHistory,
    /// An item was added while already checked in.
    DuplicateItem,
    /// An item was released with no owner recorded.
    OwnershipMissing,
}

impl FindingKind {
    /// Warnings flag compliance issues; everything else is damage.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::DuplicateItem | Self::OwnershipMissing)
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HashMismatch => write!(f, "hash mismatch"),
            Self::LinkBreak => write!(f, "link break"),
            Self::BadGenesis => write!(f, "bad genesis"),
            Self::HistoryRewrite => write!(f, "history rewrite"),
            Self::IllegalHistory => write!(f, "illegal history"),
            Self::DuplicateItem => write!(f, "duplicate item"),
            Self::OwnershipMissing => write!(f, "ownership missing"),
        }
    }
}

/// Read-only full-chain verifier.
///
/// Walks the chain in order, recomputing every entry hash and link, then
/// replays all custody history per `(case, item)` against the state
/// machine. Never mutates the ledger; running it twice over an
/// unmodified store yields identical reports.
pub struct IntegrityVerifier;

impl IntegrityVerifier {
    pub fn verify(ledger: &Ledger) -> Result<VerificationReport, LedgerError> {
        let entries = ledger.entries();
        let mut findings = Vec::new();

        Self::check_chain(entries, &mut findings)?;
        Self::replay_history(entries, &mut findings);

        Ok(VerificationReport {
            entry_count: entries.len(),
            findings,
        })
    }

    fn check_chain(entries: &[Entry], findings: &mut Vec<Finding>) -> Result<(), LedgerError> {
        for (index, entry) in entries.iter().enumerate() {
            if index == 0 {
                if !entry.is_genesis() {
                    findings.push(Finding {
                        index,
                        kind: FindingKind::BadGenesis,
                        detail: "first entry does not carry the genesis payload".into(),
                    });
                }
                if !entry.previous_hash.is_null() {
                    findings.push(Finding {
                        index,
                        kind: FindingKind::BadGenesis,
                        detail: "genesis previous hash is not the null sentinel".into(),
                    });
                }
            } else {
                if entry.is_genesis() {
                    findings.push(Finding {
                        index,
                        kind: FindingKind::BadGenesis,
                        detail: "genesis payload appears past the first entry".into(),
                    });
                }
                if entry.previous_hash != entries[index - 1].hash {
                    findings.push(Finding {
                        index,
                        kind: FindingKind::LinkBreak,
                        detail: "previous hash does not match the prior entry".into(),
                    });
                }
            }

            let computed = entry.recompute_hash()?;
            if computed != entry.hash {
                findings.push(Finding {
                    index,
                    kind: FindingKind::HashMismatch,
                    detail: format!(
                        "stored {} but content hashes to {}",
                        entry.hash.short_hex(),
                        computed.short_hex()
                    ),
                });
            }
        }
        Ok(())
    }

    fn replay_history(entries: &[Entry], findings: &mut Vec<Finding>) {
        // Snapshots grow append-only, so each new snapshot for a case must
        // repeat the previous one verbatim; only the suffix is new action.
        let mut seen: HashMap<CaseId, Vec<ItemRecord>> = HashMap::new();
        let mut status: HashMap<(CaseId, ItemId), ItemStatus> = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            let Some(record) = entry.custody() else {
                continue;
            };

            let prior = seen.get(&record.case_id).map(Vec::as_slice).unwrap_or(&[]);
            if record.items.len() < prior.len() || record.items[..prior.len()] != *prior {
                findings.push(Finding {
                    index,
                    kind: FindingKind::HistoryRewrite,
                    detail: format!(
                        "snapshot for case {} does not extend its predecessor",
                        record.case_id
                    ),
                });
                seen.insert(record.case_id.clone(), record.items.clone());
                continue;
            }

            for item_record in &record.items[prior.len()..] {
                Self::replay_action(index, &record.case_id, item_record, &mut status, findings);
            }
            seen.insert(record.case_id.clone(), record.items.clone());
        }
    }

    fn replay_action(
        index: usize,
        case_id: &CaseId,
        record: &ItemRecord,
        status: &mut HashMap<(CaseId, ItemId), ItemStatus>,
        findings: &mut Vec<Finding>,
    ) {
        let key = (case_id.clone(), record.item_id.clone());
        let current = status.get(&key).copied();

        let Some(action) = observed_action(record, current) else {
            findings.push(Finding {
                index,
                kind: FindingKind::IllegalHistory,
                detail: format!(
                    "item {}: removal reason does not match terminal status {}",
                    record.item_id, record.status
                ),
            });
            status.insert(key, record.status);
            return;
        };

        match machine::transition(&record.item_id, current, action) {
            Ok(transition) => {
                if let Some(CustodyWarning::DuplicateItem { item_id }) = transition.warning {
                    findings.push(Finding {
                        index,
                        kind: FindingKind::DuplicateItem,
                        detail: format!("item {item_id} added while already checked in"),
                    });
                }
                if record.status == ItemStatus::Released && record.owner_info.is_none() {
                    findings.push(Finding {
                        index,
                        kind: FindingKind::OwnershipMissing,
                        detail: format!("item {} released but no owner given", record.item_id),
                    });
                }
            }
            Err(violation) => {
                findings.push(Finding {
                    index,
                    kind: FindingKind::IllegalHistory,
                    detail: violation.to_string(),
                });
            }
        }

        status.insert(key, record.status);
    }
}

/// Map an observed record back to the action that must have produced it.
///
/// `None` when the record is internally inconsistent (terminal status
/// with a mismatched removal reason).
fn observed_action(record: &ItemRecord, current: Option<ItemStatus>) -> Option<CustodyAction> {
    match record.status {
        ItemStatus::CheckedIn => {
            if current == Some(ItemStatus::CheckedOut) {
                Some(CustodyAction::Checkin)
            } else {
                Some(CustodyAction::Add)
            }
        }
        ItemStatus::CheckedOut => Some(CustodyAction::Checkout),
        terminal => {
            let reason = record.reason.or(match terminal {
                ItemStatus::Released => Some(RemovalReason::Released),
                ItemStatus::Disposed => Some(RemovalReason::Disposed),
                ItemStatus::Destroyed => Some(RemovalReason::Destroyed),
                _ => None,
            })?;
            if reason.terminal_status() != terminal {
                return None;
            }
            Some(CustodyAction::Remove(reason))
        }
    }
}
