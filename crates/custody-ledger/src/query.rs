//! Read-only projections over the chain.
//!
//! Queries never mutate the ledger and never re-verify it; they project
//! whatever history the chain currently carries. Because snapshots grow
//! append-only, each entry contributes only the action records its
//! snapshot added beyond the case's previous snapshot.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use custody_types::{CaseId, ItemId, ItemStatus};

use crate::ledger::Ledger;

/// Selection and ordering options for [`QueryEngine::log`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Only actions on this item.
    pub item_id: Option<ItemId>,
    /// Newest first instead of chain order.
    pub reverse: bool,
    /// At most this many lines, keeping the most recent.
    pub limit: Option<usize>,
}

/// One custody action as shown in the audit log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    pub case_id: CaseId,
    pub item_id: ItemId,
    pub action: ItemStatus,
    pub time: DateTime<Utc>,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Case: {}", self.case_id)?;
        writeln!(f, "Item: {}", self.item_id)?;
        writeln!(f, "Action: {}", self.action)?;
        write!(
            f,
            "Time: {}",
            self.time.to_rfc3339_opts(SecondsFormat::Micros, true)
        )
    }
}

/// Stateless projections over a [`Ledger`].
pub struct QueryEngine;

impl QueryEngine {
    /// The item's current status within a case: the status set by the
    /// last action on that item in the case's most recent snapshot.
    pub fn current_status(
        ledger: &Ledger,
        case_id: &CaseId,
        item_id: &ItemId,
    ) -> Option<ItemStatus> {
        ledger.find_case(case_id)?.latest_status(item_id)
    }

    /// Every case seen on the chain, in first-appearance order, once each.
    pub fn cases(ledger: &Ledger) -> Vec<CaseId> {
        let mut seen = Vec::new();
        for entry in ledger.entries() {
            if let Some(record) = entry.custody() {
                if !seen.contains(&record.case_id) {
                    seen.push(record.case_id.clone());
                }
            }
        }
        seen
    }

    /// The audit log: one line per custody action, in chain order.
    ///
    /// The limit keeps the *most recent* matching lines; reversal is
    /// applied after limiting, so `reverse` only changes presentation
    /// order, never which lines are shown.
    pub fn log(ledger: &Ledger, filter: &LogFilter) -> Vec<LogLine> {
        let mut lines: Vec<LogLine> = Self::actions(ledger)
            .into_iter()
            .filter(|line| {
                filter
                    .item_id
                    .as_ref()
                    .map_or(true, |wanted| &line.item_id == wanted)
            })
            .collect();

        if let Some(limit) = filter.limit {
            let skip = lines.len().saturating_sub(limit);
            lines.drain(..skip);
        }
        if filter.reverse {
            lines.reverse();
        }
        lines
    }

    /// Flatten the chain into one line per action.
    ///
    /// Each snapshot repeats its case's prior history, so only records
    /// past the previously seen length for that case are new actions.
    fn actions(ledger: &Ledger) -> Vec<LogLine> {
        let mut seen: HashMap<CaseId, usize> = HashMap::new();
        let mut lines = Vec::new();

        for entry in ledger.entries() {
            let Some(record) = entry.custody() else {
                continue;
            };
            let prior = seen.get(&record.case_id).copied().unwrap_or(0);
            let start = prior.min(record.items.len());
            for item_record in &record.items[start..] {
                lines.push(LogLine {
                    case_id: record.case_id.clone(),
                    item_id: item_record.item_id.clone(),
                    action: item_record.status,
                    time: item_record.action_time,
                });
            }
            seen.insert(record.case_id.clone(), record.items.len());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_types::RemovalReason;

    use crate::actions;
    use crate::store::FileStore;

    fn case(id: &str) -> CaseId {
        CaseId::new(id)
    }

    fn item(id: &str) -> ItemId {
        ItemId::new(id)
    }

    fn fresh_ledger(dir: &tempfile::TempDir) -> Ledger {
        let (ledger, _) =
            Ledger::load_or_init(FileStore::new(dir.path().join("blocks.bin"))).unwrap();
        ledger
    }

    fn add(ledger: &mut Ledger, case_id: &str, item_id: &str) {
        let out = actions::add_item(ledger, &case(case_id), &item(item_id)).unwrap();
        ledger.append(out.record).unwrap();
    }

    fn populated(dir: &tempfile::TempDir) -> Ledger {
        let mut ledger = fresh_ledger(dir);
        add(&mut ledger, "CASE1", "100");
        add(&mut ledger, "CASE1", "200");
        let out = actions::checkout(&ledger, &item("100")).unwrap();
        ledger.append(out.record).unwrap();
        let out = actions::checkin(&ledger, &item("100")).unwrap();
        ledger.append(out.record).unwrap();
        add(&mut ledger, "CASE2", "300");
        ledger
    }

    #[test]
    fn current_status_is_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = populated(&dir);

        assert_eq!(
            QueryEngine::current_status(&ledger, &case("CASE1"), &item("100")),
            Some(ItemStatus::CheckedIn)
        );
        assert_eq!(
            QueryEngine::current_status(&ledger, &case("CASE1"), &item("200")),
            Some(ItemStatus::CheckedIn)
        );
        assert_eq!(
            QueryEngine::current_status(&ledger, &case("CASE1"), &item("300")),
            None
        );
        assert_eq!(
            QueryEngine::current_status(&ledger, &case("NOPE"), &item("100")),
            None
        );
    }

    #[test]
    fn cases_lists_each_case_once_in_first_appearance_order() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = populated(&dir);
        assert_eq!(QueryEngine::cases(&ledger), vec![case("CASE1"), case("CASE2")]);
    }

    #[test]
    fn log_emits_one_line_per_action_in_chain_order() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = populated(&dir);

        let lines = QueryEngine::log(&ledger, &LogFilter::default());
        let actions: Vec<_> = lines
            .iter()
            .map(|l| (l.item_id.as_str().to_owned(), l.action))
            .collect();
        assert_eq!(
            actions,
            vec![
                ("100".into(), ItemStatus::CheckedIn),
                ("200".into(), ItemStatus::CheckedIn),
                ("100".into(), ItemStatus::CheckedOut),
                ("100".into(), ItemStatus::CheckedIn),
                ("300".into(), ItemStatus::CheckedIn),
            ]
        );
    }

    #[test]
    fn log_filters_by_item() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = populated(&dir);

        let filter = LogFilter {
            item_id: Some(item("100")),
            ..LogFilter::default()
        };
        let lines = QueryEngine::log(&ledger, &filter);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.item_id == item("100")));
    }

    #[test]
    fn log_limit_keeps_most_recent_then_reverse_flips_presentation() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = populated(&dir);

        let limited = QueryEngine::log(
            &ledger,
            &LogFilter {
                limit: Some(2),
                ..LogFilter::default()
            },
        );
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].item_id, item("100"));
        assert_eq!(limited[1].item_id, item("300"));

        let reversed = QueryEngine::log(
            &ledger,
            &LogFilter {
                limit: Some(2),
                reverse: true,
                ..LogFilter::default()
            },
        );
        assert_eq!(reversed[0].item_id, item("300"));
        assert_eq!(reversed[1].item_id, item("100"));
    }

    #[test]
    fn log_limit_larger_than_history_shows_everything() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = populated(&dir);
        let lines = QueryEngine::log(
            &ledger,
            &LogFilter {
                limit: Some(999),
                ..LogFilter::default()
            },
        );
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn removal_appears_with_terminal_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = fresh_ledger(&dir);
        add(&mut ledger, "CASE1", "100");
        let out = actions::remove(
            &ledger,
            &item("100"),
            RemovalReason::Destroyed,
            None,
        )
        .unwrap();
        ledger.append(out.record).unwrap();

        let lines = QueryEngine::log(&ledger, &LogFilter::default());
        assert_eq!(lines.last().unwrap().action, ItemStatus::Destroyed);
    }

    #[test]
    fn log_line_display_shape() {
        use chrono::TimeZone;
        let line = LogLine {
            case_id: case("65cc391d-6568-4dcc-a3f1-86a2f04140f3"),
            item_id: item("987"),
            action: ItemStatus::CheckedIn,
            time: Utc.with_ymd_and_hms(2022, 11, 27, 22, 48, 10).unwrap(),
        };
        assert_eq!(
            line.to_string(),
            "Case: 65cc391d-6568-4dcc-a3f1-86a2f04140f3\n\
             Item: 987\n\
             Action: CHECKEDIN\n\
             Time: 2022-11-27T22:48:10.000000Z"
        );
    }

    #[test]
    fn empty_chain_projects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = fresh_ledger(&dir);
        assert!(QueryEngine::log(&ledger, &LogFilter::default()).is_empty());
        assert!(QueryEngine::cases(&ledger).is_empty());
    }
}
