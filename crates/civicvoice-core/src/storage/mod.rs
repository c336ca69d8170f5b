mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DatabaseConfig, NotificationsConfig, SmtpConfig};
pub use database::SqliteStore;

use chrono::{DateTime, SubsecRound, Utc};
use std::path::PathBuf;

use crate::complaint::{
    Category, Complaint, ComplaintFilter, ComplaintStatus, Department, Feedback, NewCategory,
    NewComplaint, NewDepartment, NewFeedback, NewUser, StatusHistoryEntry, User,
};
use crate::error::{ConfigError, Result};

/// Record store the engine runs against.
///
/// Single-record writes are assumed atomic, and the `record_*` writes commit
/// the complaint row and its history entry together or not at all.
/// Identifiers are minted by the store and are opaque to callers.
pub trait ComplaintStore: Send + Sync {
    // === Complaints ===

    fn get_complaint(&self, id: &str) -> Result<Option<Complaint>>;

    /// Insert a `Pending` complaint together with its `Pending -> Pending`
    /// history entry, recorded as changed by the submitter.
    fn record_submission(
        &self,
        form: &NewComplaint,
        user_id: &str,
        created_at: DateTime<Utc>,
        remarks: Option<&str>,
    ) -> Result<Complaint>;

    /// Persist `complaint`'s status, remarks and `updated_at` together with
    /// the `old_status -> complaint.status` history entry. Other fields are
    /// immutable.
    fn record_transition(
        &self,
        complaint: &Complaint,
        old_status: ComplaintStatus,
        changed_by: &str,
        remarks: Option<&str>,
    ) -> Result<StatusHistoryEntry>;

    /// Complaints matching `filter`, newest first.
    fn list_complaints(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>>;

    // === Feedback ===

    fn create_feedback(
        &self,
        complaint_id: &str,
        form: &NewFeedback,
        created_at: DateTime<Utc>,
    ) -> Result<Feedback>;

    fn get_feedback(&self, complaint_id: &str) -> Result<Option<Feedback>>;

    // === Users ===

    fn create_user(&self, form: &NewUser) -> Result<User>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;

    // === Reference data ===

    fn create_category(&self, form: &NewCategory) -> Result<Category>;
    fn get_category(&self, id: &str) -> Result<Option<Category>>;
    fn list_categories(&self) -> Result<Vec<Category>>;

    fn create_department(&self, form: &NewDepartment) -> Result<Department>;
    fn get_department(&self, id: &str) -> Result<Option<Department>>;
    fn list_departments(&self) -> Result<Vec<Department>>;
}

/// Returns `~/.config/civicvoice[-dev]/` based on CIVICVOICE_ENV.
///
/// Set CIVICVOICE_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CIVICVOICE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("civicvoice-dev")
    } else {
        base_dir.join("civicvoice")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

/// Current time at the precision the store keeps (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
