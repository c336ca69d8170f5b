//! Complaint records and the reference data they point at.
//!
//! Records here are plain data; every mutation goes through
//! [`crate::engine::ComplaintEngine`] so that status changes always leave a
//! ledger entry behind.

pub mod forms;
mod status;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use forms::{NewCategory, NewComplaint, NewDepartment, NewFeedback, NewUser};
pub use status::ComplaintStatus;

/// A registered user, as supplied by the identity collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub phone: Option<String>,
    /// Staff may view every complaint and update statuses.
    pub is_staff: bool,
}

impl User {
    /// Name used in greetings: first name when set, otherwise the username.
    pub fn greeting_name(&self) -> &str {
        self.first_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub contact_info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub contact_info: String,
}

/// A citizen-filed issue report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Complaint {
    /// Opaque identifier minted by the store
    pub id: String,
    pub title: String,
    pub category_id: String,
    pub department_id: String,
    /// Submitting user; never changes after creation
    pub user_id: String,
    pub description: String,
    pub location: String,
    pub status: ComplaintStatus,
    /// Latest official remarks left by staff
    pub admin_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.user_id == user.id
    }
}

/// One immutable record of a status change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusHistoryEntry {
    /// Insertion sequence; breaks ties between equal timestamps
    pub id: i64,
    pub complaint_id: String,
    pub old_status: ComplaintStatus,
    pub new_status: ComplaintStatus,
    pub changed_by: String,
    pub remarks: Option<String>,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feedback {
    pub id: String,
    pub complaint_id: String,
    pub comments: Option<String>,
    /// 1 (poor) to 5 (excellent)
    pub rating: u8,
    pub created_at: DateTime<Utc>,
}

/// Optional filters for staff listings. `None` matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplaintFilter {
    pub user_id: Option<String>,
    pub status: Option<ComplaintStatus>,
    pub category_id: Option<String>,
    pub department_id: Option<String>,
    pub limit: Option<usize>,
}

impl ComplaintFilter {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            ..Self::default()
        }
    }

    pub fn matches(&self, complaint: &Complaint) -> bool {
        self.user_id.as_ref().map_or(true, |id| *id == complaint.user_id)
            && self.status.map_or(true, |s| s == complaint.status)
            && self
                .category_id
                .as_ref()
                .map_or(true, |id| *id == complaint.category_id)
            && self
                .department_id
                .as_ref()
                .map_or(true, |id| *id == complaint.department_id)
    }
}
