use std::fmt;

use custody_types::{ItemId, ItemStatus, RemovalReason};

/// A requested custody action on one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustodyAction {
    /// Take the item into custody.
    Add,
    /// Hand the item out for analysis.
    Checkout,
    /// Return the item to the evidence locker.
    Checkin,
    /// Remove the item from custody into a terminal disposition.
    Remove(RemovalReason),
}

impl fmt::Display for CustodyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Checkout => write!(f, "checkout"),
            Self::Checkin => write!(f, "checkin"),
            Self::Remove(reason) => write!(f, "remove ({reason})"),
        }
    }
}

/// A requested action that violates the transition table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("item {item_id} is not in custody on this chain")]
    NotInCustody { item_id: ItemId },

    #[error("cannot check out item {item_id}: must check in before checking out again")]
    AlreadyCheckedOut { item_id: ItemId },

    #[error("cannot check in item {item_id}: it is not checked out")]
    NotCheckedOut { item_id: ItemId },

    #[error("cannot remove item {item_id} while it is checked out: must check it in first")]
    RemoveWhileCheckedOut { item_id: ItemId },

    #[error("item {item_id} already reached terminal status {status}; no further action is legal")]
    Terminal { item_id: ItemId, status: ItemStatus },
}

/// Non-fatal compliance flag raised by a transition.
///
/// Warnings never block the action; they are noted at action time and
/// re-derived by the integrity verifier so they cannot be lost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CustodyWarning {
    /// An item already checked in to the case was added again.
    DuplicateItem { item_id: ItemId },
    /// An item was released with no receiving owner recorded.
    OwnershipMissing { item_id: ItemId },
}

impl fmt::Display for CustodyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateItem { item_id } => {
                write!(f, "duplicate add: item {item_id} is already checked in")
            }
            Self::OwnershipMissing { item_id } => {
                write!(f, "item {item_id} released but no owner given")
            }
        }
    }
}

/// Result of a legal transition: the status entered, plus any warning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub status: ItemStatus,
    pub warning: Option<CustodyWarning>,
}

/// Apply the transition table to one item's current status.
///
/// | current      | action   | next        |
/// |--------------|----------|-------------|
/// | none         | add      | CHECKEDIN   |
/// | CHECKEDIN    | add      | CHECKEDIN (duplicate warning) |
/// | CHECKEDIN    | checkout | CHECKEDOUT  |
/// | CHECKEDOUT   | checkin  | CHECKEDIN   |
/// | CHECKEDIN    | remove   | reason's terminal status |
///
/// Everything else is illegal; terminal statuses admit no action at all.
pub fn transition(
    item_id: &ItemId,
    current: Option<ItemStatus>,
    action: CustodyAction,
) -> Result<Transition, TransitionError> {
    if let Some(status) = current {
        if status.is_terminal() {
            return Err(TransitionError::Terminal {
                item_id: item_id.clone(),
                status,
            });
        }
    }

    match (action, current) {
        (CustodyAction::Add, current) => Ok(Transition {
            status: ItemStatus::CheckedIn,
            warning: (current == Some(ItemStatus::CheckedIn)).then(|| {
                CustodyWarning::DuplicateItem {
                    item_id: item_id.clone(),
                }
            }),
        }),

        (CustodyAction::Checkout, Some(ItemStatus::CheckedIn)) => Ok(Transition {
            status: ItemStatus::CheckedOut,
            warning: None,
        }),
        (CustodyAction::Checkout, Some(ItemStatus::CheckedOut)) => {
            Err(TransitionError::AlreadyCheckedOut {
                item_id: item_id.clone(),
            })
        }

        (CustodyAction::Checkin, Some(ItemStatus::CheckedOut)) => Ok(Transition {
            status: ItemStatus::CheckedIn,
            warning: None,
        }),
        (CustodyAction::Checkin, Some(ItemStatus::CheckedIn)) => {
            Err(TransitionError::NotCheckedOut {
                item_id: item_id.clone(),
            })
        }

        (CustodyAction::Remove(reason), Some(ItemStatus::CheckedIn)) => Ok(Transition {
            status: reason.terminal_status(),
            warning: None,
        }),
        (CustodyAction::Remove(_), Some(ItemStatus::CheckedOut)) => {
            Err(TransitionError::RemoveWhileCheckedOut {
                item_id: item_id.clone(),
            })
        }

        (_, None) => Err(TransitionError::NotInCustody {
            item_id: item_id.clone(),
        }),

        // Already rejected above; listed so the match stays exhaustive
        // without a catch-all that could mislabel a non-terminal status.
        (
            _,
            Some(
                status @ (ItemStatus::Released | ItemStatus::Disposed | ItemStatus::Destroyed),
            ),
        ) => Err(TransitionError::Terminal {
            item_id: item_id.clone(),
            status,
        }),
    }
}
