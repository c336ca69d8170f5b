//! Status history ledger.
//!
//! An append-only audit trail: one entry per status change, keyed by
//! complaint. Entries are never updated or deleted. A complaint's timeline,
//! read oldest first, is a path through [`ComplaintStatus`] values that
//! starts at the initial `Pending` status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::complaint::{ComplaintStatus, StatusHistoryEntry};
use crate::error::Result;

/// Storage for status history entries.
pub trait StatusLedger: Send + Sync {
    /// Record one status change. Never touches existing entries.
    fn append(
        &self,
        complaint_id: &str,
        old_status: ComplaintStatus,
        new_status: ComplaintStatus,
        changed_by: &str,
        remarks: Option<&str>,
        changed_at: DateTime<Utc>,
    ) -> Result<StatusHistoryEntry>;

    /// All entries for a complaint, oldest first.
    fn timeline(&self, complaint_id: &str) -> Result<Timeline>;
}

/// Ordered status history of a single complaint.
///
/// Finite and restartable: iterate it as many times as needed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Timeline {
    entries: Vec<StatusHistoryEntry>,
}

impl Timeline {
    /// Build a timeline, ordering entries by timestamp then insertion sequence.
    pub fn new(mut entries: Vec<StatusHistoryEntry>) -> Self {
        entries.sort_by(|a, b| a.changed_at.cmp(&b.changed_at).then(a.id.cmp(&b.id)));
        Self { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatusHistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&StatusHistoryEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&StatusHistoryEntry> {
        self.entries.last()
    }

    /// Status the complaint should currently hold according to its history.
    pub fn current_status(&self) -> Option<ComplaintStatus> {
        self.last().map(|entry| entry.new_status)
    }

    /// True when the entries chain from `initial`: the first entry leaves
    /// `initial` and each later entry leaves the status the previous one
    /// entered. Timestamps must not go backwards.
    pub fn is_consistent_path(&self, initial: ComplaintStatus) -> bool {
        let mut expected = initial;
        let mut previous_at: Option<DateTime<Utc>> = None;
        for entry in &self.entries {
            if entry.old_status != expected {
                return false;
            }
            if previous_at.is_some_and(|at| entry.changed_at < at) {
                return false;
            }
            expected = entry.new_status;
            previous_at = Some(entry.changed_at);
        }
        true
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a StatusHistoryEntry;
    type IntoIter = std::slice::Iter<'a, StatusHistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Timeline {
    type Item = StatusHistoryEntry;
    type IntoIter = std::vec::IntoIter<StatusHistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(
        id: i64,
        old: ComplaintStatus,
        new: ComplaintStatus,
        at: DateTime<Utc>,
    ) -> StatusHistoryEntry {
        StatusHistoryEntry {
            id,
            complaint_id: "c1".to_string(),
            old_status: old,
            new_status: new,
            changed_by: "staff1".to_string(),
            remarks: None,
            changed_at: at,
        }
    }

    #[test]
    fn orders_by_timestamp_then_sequence() {
        let t0 = Utc::now();
        let timeline = Timeline::new(vec![
            entry(3, ComplaintStatus::InProgress, ComplaintStatus::Resolved, t0 + Duration::minutes(5)),
            entry(2, ComplaintStatus::Pending, ComplaintStatus::InProgress, t0),
            entry(1, ComplaintStatus::Pending, ComplaintStatus::Pending, t0),
        ]);
        let ids: Vec<i64> = timeline.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(timeline.is_consistent_path(ComplaintStatus::Pending));
        assert_eq!(timeline.current_status(), Some(ComplaintStatus::Resolved));
    }

    #[test]
    fn restartable_iteration() {
        let t0 = Utc::now();
        let timeline = Timeline::new(vec![entry(
            1,
            ComplaintStatus::Pending,
            ComplaintStatus::Pending,
            t0,
        )]);
        assert_eq!(timeline.iter().count(), 1);
        assert_eq!((&timeline).into_iter().count(), 1);
        assert_eq!(timeline.iter().count(), 1);
    }

    #[test]
    fn broken_chain_is_detected() {
        let t0 = Utc::now();
        let timeline = Timeline::new(vec![
            entry(1, ComplaintStatus::Pending, ComplaintStatus::Pending, t0),
            entry(2, ComplaintStatus::Resolved, ComplaintStatus::Closed, t0 + Duration::seconds(1)),
        ]);
        assert!(!timeline.is_consistent_path(ComplaintStatus::Pending));
    }

    #[test]
    fn empty_timeline_is_trivially_consistent() {
        let timeline = Timeline::default();
        assert!(timeline.is_empty());
        assert!(timeline.is_consistent_path(ComplaintStatus::Pending));
        assert_eq!(timeline.current_status(), None);
    }
}
