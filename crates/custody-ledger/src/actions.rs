//! Custody operations.
//!
//! Each operation reads the ledger (passed explicitly; there is no
//! ambient chain), applies the state machine, and returns the *new*
//! custody snapshot to append. Historical records are never edited:
//! a transition is one more [`ItemRecord`] on a grown snapshot, wrapped
//! by the caller in a fresh ledger entry.

use custody_types::{monotonic_now, CaseId, CustodyRecord, ItemId, ItemRecord, RemovalReason};

use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::machine::{self, CustodyAction, CustodyWarning};

/// A prepared custody action: the snapshot to append, the record the
/// action produced, and any compliance warnings raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionOutcome {
    /// New case snapshot to pass to [`Ledger::append`].
    pub record: CustodyRecord,
    /// The action record this operation appended to the snapshot.
    pub applied: ItemRecord,
    /// Non-fatal flags (duplicate add, missing owner).
    pub warnings: Vec<CustodyWarning>,
}

/// Take an item into custody under a case.
///
/// Re-adding an item that is currently checked in warns but proceeds.
pub fn add_item(
    ledger: &Ledger,
    case_id: &CaseId,
    item_id: &ItemId,
) -> Result<ActionOutcome, LedgerError> {
    let snapshot = ledger
        .find_case(case_id)
        .cloned()
        .unwrap_or_else(|| CustodyRecord::new(case_id.clone()));

    let current = snapshot.latest_status(item_id);
    let transition = machine::transition(item_id, current, CustodyAction::Add)?;

    let applied = ItemRecord::action(
        item_id.clone(),
        transition.status,
        monotonic_now(ledger.entries().last().map(|e| e.timestamp)),
    );
    Ok(ActionOutcome {
        record: snapshot.with_action(applied.clone()),
        applied,
        warnings: transition.warning.into_iter().collect(),
    })
}

/// Check an item out of the evidence locker.
pub fn checkout(ledger: &Ledger, item_id: &ItemId) -> Result<ActionOutcome, LedgerError> {
    apply_to_owning_case(ledger, item_id, CustodyAction::Checkout, None)
}

/// Check an item back in.
pub fn checkin(ledger: &Ledger, item_id: &ItemId) -> Result<ActionOutcome, LedgerError> {
    apply_to_owning_case(ledger, item_id, CustodyAction::Checkin, None)
}

/// Remove an item from custody into a terminal disposition.
///
/// Releasing with no owner recorded raises an ownership warning but
/// still performs the transition.
pub fn remove(
    ledger: &Ledger,
    item_id: &ItemId,
    reason: RemovalReason,
    owner_info: Option<String>,
) -> Result<ActionOutcome, LedgerError> {
    apply_to_owning_case(ledger, item_id, CustodyAction::Remove(reason), owner_info)
}

fn apply_to_owning_case(
    ledger: &Ledger,
    item_id: &ItemId,
    action: CustodyAction,
    owner_info: Option<String>,
) -> Result<ActionOutcome, LedgerError> {
    let snapshot = owning_case(ledger, item_id)
        .cloned()
        .ok_or_else(|| machine::TransitionError::NotInCustody {
            item_id: item_id.clone(),
        })
        .map_err(LedgerError::from)?;

    let current = snapshot.latest_status(item_id);
    let transition = machine::transition(item_id, current, action)?;
    let action_time = monotonic_now(ledger.entries().last().map(|e| e.timestamp));

    let mut warnings: Vec<CustodyWarning> = transition.warning.into_iter().collect();
    let applied = match action {
        CustodyAction::Remove(reason) => {
            if reason == RemovalReason::Released && owner_info.is_none() {
                warnings.push(CustodyWarning::OwnershipMissing {
                    item_id: item_id.clone(),
                });
            }
            ItemRecord::removal(item_id.clone(), reason, action_time, owner_info)
        }
        _ => ItemRecord::action(item_id.clone(), transition.status, action_time),
    };

    Ok(ActionOutcome {
        record: snapshot.with_action(applied.clone()),
        applied,
        warnings,
    })
}

/// The most recent case snapshot holding any action for the item.
fn owning_case<'a>(ledger: &'a Ledger, item_id: &ItemId) -> Option<&'a CustodyRecord> {
    ledger
        .entries()
        .iter()
        .rev()
        .filter_map(|entry| entry.custody())
        .find(|record| record.actions_for(item_id).next().is_some())
}
