use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{ItemStatus, RemovalReason};

/// Opaque stable identifier for an investigative case (typically a UUID
/// string, but any stable token is accepted).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseId(String);

impl CaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CaseId({})", self.0)
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier for one evidence item. Intake forms use both
/// numeric and alphanumeric labels, so this is a string newtype.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One historical action taken on one evidence item.
///
/// Records are never edited after creation; each custody action appends a
/// new `ItemRecord`, so an item's full status history stays reconstructible.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// The item this action concerns.
    pub item_id: ItemId,
    /// Status the item entered through this action.
    pub status: ItemStatus,
    /// Instant this specific action was taken.
    pub action_time: DateTime<Utc>,
    /// Removal reason, present only for terminal actions.
    ///
    /// Always serialized, even when `None`: the binary store encoding is
    /// not self-describing, so skipping absent fields would desynchronize
    /// the record stream on reload.
    #[serde(default)]
    pub reason: Option<RemovalReason>,
    /// Receiving owner, present when known for a release.
    #[serde(default)]
    pub owner_info: Option<String>,
}

impl ItemRecord {
    /// A non-terminal action record (add, checkout, checkin).
    pub fn action(item_id: ItemId, status: ItemStatus, action_time: DateTime<Utc>) -> Self {
        Self {
            item_id,
            status,
            action_time,
            reason: None,
            owner_info: None,
        }
    }

    /// A terminal removal record.
    pub fn removal(
        item_id: ItemId,
        reason: RemovalReason,
        action_time: DateTime<Utc>,
        owner_info: Option<String>,
    ) -> Self {
        Self {
            item_id,
            status: reason.terminal_status(),
            action_time,
            reason: Some(reason),
            owner_info,
        }
    }
}

/// One case's accumulated item-action history.
///
/// `items` is ordered by custody action, not by unique item: an item
/// appears once per action taken on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyRecord {
    pub case_id: CaseId,
    pub items: Vec<ItemRecord>,
}

impl CustodyRecord {
    /// Create an empty record for a case.
    pub fn new(case_id: CaseId) -> Self {
        Self {
            case_id,
            items: Vec::new(),
        }
    }

    /// Append an action record, returning the updated snapshot.
    pub fn with_action(mut self, record: ItemRecord) -> Self {
        self.items.push(record);
        self
    }

    /// The status of the item's *last* action in this record, if any.
    pub fn latest_status(&self, item_id: &ItemId) -> Option<ItemStatus> {
        self.items
            .iter()
            .rev()
            .find(|record| &record.item_id == item_id)
            .map(|record| record.status)
    }

    /// All actions taken on one item, in order.
    pub fn actions_for<'a>(
        &'a self,
        item_id: &'a ItemId,
    ) -> impl Iterator<Item = &'a ItemRecord> {
        self.items
            .iter()
            .filter(move |record| &record.item_id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn when(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn latest_status_is_last_match_not_first() {
        let item = ItemId::new("100");
        let record = CustodyRecord::new(CaseId::new("CASE1"))
            .with_action(ItemRecord::action(
                item.clone(),
                ItemStatus::CheckedIn,
                when(1),
            ))
            .with_action(ItemRecord::action(
                item.clone(),
                ItemStatus::CheckedOut,
                when(2),
            ));

        assert_eq!(record.latest_status(&item), Some(ItemStatus::CheckedOut));
    }

    #[test]
    fn latest_status_missing_item() {
        let record = CustodyRecord::new(CaseId::new("CASE1"));
        assert_eq!(record.latest_status(&ItemId::new("missing")), None);
    }

    #[test]
    fn actions_preserve_insertion_order() {
        let item = ItemId::new("7");
        let other = ItemId::new("8");
        let record = CustodyRecord::new(CaseId::new("C"))
            .with_action(ItemRecord::action(item.clone(), ItemStatus::CheckedIn, when(1)))
            .with_action(ItemRecord::action(other, ItemStatus::CheckedIn, when(2)))
            .with_action(ItemRecord::action(
                item.clone(),
                ItemStatus::CheckedOut,
                when(3),
            ));

        let statuses: Vec<_> = record.actions_for(&item).map(|r| r.status).collect();
        assert_eq!(statuses, vec![ItemStatus::CheckedIn, ItemStatus::CheckedOut]);
    }

    #[test]
    fn removal_record_carries_reason_and_owner() {
        let record = ItemRecord::removal(
            ItemId::new("9"),
            RemovalReason::Released,
            when(5),
            Some("john doe".into()),
        );
        assert_eq!(record.status, ItemStatus::Released);
        assert_eq!(record.reason, Some(RemovalReason::Released));
        assert_eq!(record.owner_info.as_deref(), Some("john doe"));
    }

    #[test]
    fn serde_roundtrip() {
        let record = CustodyRecord::new(CaseId::new("CASE1")).with_action(ItemRecord::removal(
            ItemId::new("100"),
            RemovalReason::Disposed,
            when(10),
            None,
        ));
        let json = serde_json::to_string(&record).unwrap();
        let parsed: CustodyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }

    #[test]
    fn canonical_json_is_stable() {
        let record = ItemRecord::action(ItemId::new("1"), ItemStatus::CheckedIn, when(42));
        let a = serde_json::to_vec(&record).unwrap();
        let b = serde_json::to_vec(&record.clone()).unwrap();
        assert_eq!(a, b);
    }
}
