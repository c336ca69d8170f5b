//! Complaint status enumeration.
//!
//! One enumeration is used for storage, serialization and display. Stored
//! and serialized values are the upper-case codes (`IN_PROGRESS`); the
//! human-readable label (`In Progress`) is only produced by [`ComplaintStatus::label`].
//!
//! No transition graph is enforced: staff may move a complaint from any
//! status to any other.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    /// Initial status of every submitted complaint
    Pending,
    /// Being worked on by staff
    InProgress,
    /// Fixed; the only status that accepts feedback
    Resolved,
    /// Handed to a senior team member
    Escalated,
    /// Closed without further action
    Closed,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 5] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Escalated,
        ComplaintStatus::Closed,
    ];

    /// Status assigned on submission.
    pub const INITIAL: ComplaintStatus = ComplaintStatus::Pending;

    /// Storage code, e.g. `IN_PROGRESS`.
    pub fn code(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "PENDING",
            ComplaintStatus::InProgress => "IN_PROGRESS",
            ComplaintStatus::Resolved => "RESOLVED",
            ComplaintStatus::Escalated => "ESCALATED",
            ComplaintStatus::Closed => "CLOSED",
        }
    }

    /// Display label, e.g. `In Progress`.
    pub fn label(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Escalated => "Escalated",
            ComplaintStatus::Closed => "Closed",
        }
    }

    /// Whether the owner may leave feedback in this status.
    pub fn accepts_feedback(&self) -> bool {
        matches!(self, ComplaintStatus::Resolved)
    }
}

impl Default for ComplaintStatus {
    fn default() -> Self {
        ComplaintStatus::INITIAL
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the storage code or the display label, case-insensitively, with
/// `-`, `_` and spaces treated alike (`in-progress`, `In Progress`, `IN_PROGRESS`).
impl FromStr for ComplaintStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        ComplaintStatus::ALL
            .into_iter()
            .find(|status| status.code() == normalized)
            .ok_or_else(|| ValidationError::invalid("status", format!("unknown status '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_and_labels() {
        assert_eq!("IN_PROGRESS".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::InProgress);
        assert_eq!("In Progress".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::InProgress);
        assert_eq!("in-progress".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::InProgress);
        assert_eq!("resolved".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::Resolved);
        assert!("done".parse::<ComplaintStatus>().is_err());
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&ComplaintStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }

    #[test]
    fn only_resolved_accepts_feedback() {
        let open: Vec<_> = ComplaintStatus::ALL
            .into_iter()
            .filter(ComplaintStatus::accepts_feedback)
            .collect();
        assert_eq!(open, vec![ComplaintStatus::Resolved]);
    }

    #[test]
    fn code_and_parse_agree() {
        for status in ComplaintStatus::ALL {
            assert_eq!(status.code().parse::<ComplaintStatus>().unwrap(), status);
            assert_eq!(status.label().parse::<ComplaintStatus>().unwrap(), status);
        }
    }
}
