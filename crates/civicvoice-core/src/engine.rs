//! Status transition engine.
//!
//! Every operation takes the acting user explicitly. A complaint row and its
//! ledger entry are committed together, and only then is a notification
//! attempted; a failed notification never turns a committed change into an
//! error.

use serde::{Deserialize, Serialize};

use crate::complaint::{
    Category, Complaint, ComplaintFilter, ComplaintStatus, Department, Feedback, NewCategory,
    NewComplaint, NewDepartment, NewFeedback, NewUser, User,
};
use crate::error::{CoreError, Result, ValidationError};
use crate::ledger::{StatusLedger, Timeline};
use crate::notify::NotificationDispatcher;
use crate::storage::{self, ComplaintStore};

/// Remarks recorded on the initial ledger entry of every complaint.
pub const SUBMITTED_REMARKS: &str = "Complaint submitted by user";

/// Number of complaints shown on the dashboard.
pub const DASHBOARD_RECENT: usize = 5;

/// Everything shown on a complaint's page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintDetail {
    pub complaint: Complaint,
    pub category: Option<Category>,
    pub department: Option<Department>,
    pub timeline: Timeline,
    pub feedback: Option<Feedback>,
    /// Owner, resolved, and no feedback yet
    pub can_give_feedback: bool,
}

/// A citizen's overview of their own complaints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dashboard {
    pub recent: Vec<Complaint>,
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

pub struct ComplaintEngine<S> {
    store: S,
    notifications: NotificationDispatcher,
}

impl<S: ComplaintStore + StatusLedger> ComplaintEngine<S> {
    pub fn new(store: S, notifications: NotificationDispatcher) -> Self {
        Self {
            store,
            notifications,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifications(&self) -> &NotificationDispatcher {
        &self.notifications
    }

    // === Status transitions ===

    /// File a new complaint as `actor`.
    ///
    /// The complaint starts `Pending` with a single `Pending -> Pending`
    /// ledger entry, and a confirmation is sent to the submitter.
    ///
    /// # Errors
    /// `Validation` if a field is malformed or the category/department does not exist.
    pub fn submit(&self, form: &NewComplaint, actor: &User) -> Result<Complaint> {
        let form = form.trimmed();
        let mut errors = match form.validate() {
            Ok(()) => Vec::new(),
            Err(ValidationError::Multiple(errors)) => errors,
            Err(e) => vec![e],
        };

        let category = if form.category_id.is_empty() {
            None
        } else {
            self.store.get_category(&form.category_id)?
        };
        if category.is_none() && !form.category_id.is_empty() {
            errors.push(ValidationError::UnknownReference {
                field: "category".to_string(),
                id: form.category_id.clone(),
            });
        }
        if !form.department_id.is_empty() && self.store.get_department(&form.department_id)?.is_none() {
            errors.push(ValidationError::UnknownReference {
                field: "department".to_string(),
                id: form.department_id.clone(),
            });
        }
        ValidationError::collect(errors)?;

        let created_at = storage::now();
        let complaint =
            self.store
                .record_submission(&form, &actor.id, created_at, Some(SUBMITTED_REMARKS))?;
        tracing::info!(complaint_id = %complaint.id, user = %actor.username, "complaint submitted");

        let category_name = category.map(|c| c.name).unwrap_or_default();
        let outcome = self
            .notifications
            .submission(&complaint, actor, &category_name);
        tracing::debug!(complaint_id = %complaint.id, ?outcome, "submission notification");

        Ok(complaint)
    }

    /// Move a complaint to `new_status`. Any status may follow any other.
    ///
    /// Non-empty `remarks` become the complaint's official remarks and are
    /// recorded on the ledger entry.
    ///
    /// # Errors
    /// `NotFound` if no complaint has this id.
    pub fn transition(
        &self,
        complaint_id: &str,
        new_status: ComplaintStatus,
        actor: &User,
        remarks: Option<&str>,
    ) -> Result<Complaint> {
        let mut complaint = self.track(complaint_id)?;
        let remarks = remarks.map(str::trim).filter(|r| !r.is_empty());

        let old_status = complaint.status;
        complaint.status = new_status;
        complaint.updated_at = storage::now();
        if let Some(remarks) = remarks {
            complaint.admin_remarks = Some(remarks.to_string());
        }

        self.store
            .record_transition(&complaint, old_status, &actor.id, remarks)?;
        tracing::info!(
            complaint_id = %complaint.id,
            from = old_status.code(),
            to = new_status.code(),
            actor = %actor.username,
            "complaint status changed"
        );

        match self.store.get_user(&complaint.user_id) {
            Ok(Some(owner)) => {
                let outcome = self
                    .notifications
                    .status_update(&complaint, &owner, old_status);
                tracing::debug!(complaint_id = %complaint.id, ?outcome, "status notification");
            }
            Ok(None) => {
                tracing::warn!(complaint_id = %complaint.id, user_id = %complaint.user_id, "complaint owner not found; notification skipped");
            }
            Err(e) => {
                tracing::warn!(complaint_id = %complaint.id, error = %e, "could not load complaint owner; notification skipped");
            }
        }

        Ok(complaint)
    }

    /// Leave feedback on a resolved complaint as its owner.
    ///
    /// # Errors
    /// - `NotFound` if the complaint does not exist or `actor` does not own it
    /// - `InvalidState` unless the complaint is `Resolved`
    /// - `AlreadyExists` if feedback was already given
    /// - `Validation` if the rating is out of range
    pub fn request_feedback(
        &self,
        complaint_id: &str,
        actor: &User,
        form: &NewFeedback,
    ) -> Result<Feedback> {
        let complaint = self
            .store
            .get_complaint(complaint_id)?
            .filter(|c| c.is_owned_by(actor))
            .ok_or_else(|| CoreError::not_found("Complaint", complaint_id))?;

        if !complaint.status.accepts_feedback() {
            return Err(CoreError::InvalidState(
                "You can only give feedback for resolved complaints.".to_string(),
            ));
        }
        if self.store.get_feedback(complaint_id)?.is_some() {
            return Err(CoreError::already_exists("Feedback", complaint_id));
        }

        let form = NewFeedback {
            comments: form
                .comments
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            rating: form.rating,
        };
        form.validate()?;

        let feedback = self
            .store
            .create_feedback(complaint_id, &form, storage::now())?;
        tracing::info!(complaint_id, rating = feedback.rating, "feedback recorded");
        Ok(feedback)
    }

    // === Read side ===

    /// Public lookup by id.
    pub fn track(&self, complaint_id: &str) -> Result<Complaint> {
        self.store
            .get_complaint(complaint_id.trim())?
            .ok_or_else(|| CoreError::not_found("Complaint", complaint_id))
    }

    /// Status history of an existing complaint, oldest first.
    pub fn timeline(&self, complaint_id: &str) -> Result<Timeline> {
        let complaint = self.track(complaint_id)?;
        self.store.timeline(&complaint.id)
    }

    /// Full view of a complaint for its owner or staff.
    ///
    /// # Errors
    /// `NotFound` if absent, `PermissionDenied` for anyone else.
    pub fn detail(&self, complaint_id: &str, actor: &User) -> Result<ComplaintDetail> {
        let complaint = self.track(complaint_id)?;
        let is_owner = complaint.is_owned_by(actor);
        if !is_owner && !actor.is_staff {
            return Err(CoreError::PermissionDenied(format!(
                "{} may not view complaint {}",
                actor.username, complaint.id
            )));
        }

        let timeline = self.store.timeline(&complaint.id)?;
        let feedback = self.store.get_feedback(&complaint.id)?;
        let can_give_feedback =
            is_owner && complaint.status.accepts_feedback() && feedback.is_none();

        Ok(ComplaintDetail {
            category: self.store.get_category(&complaint.category_id)?,
            department: self.store.get_department(&complaint.department_id)?,
            complaint,
            timeline,
            feedback,
            can_give_feedback,
        })
    }

    /// The actor's complaints, newest first.
    pub fn my_complaints(&self, actor: &User) -> Result<Vec<Complaint>> {
        self.store.list_complaints(&ComplaintFilter::for_user(&actor.id))
    }

    pub fn dashboard(&self, actor: &User) -> Result<Dashboard> {
        let complaints = self.my_complaints(actor)?;
        let count = |status: ComplaintStatus| complaints.iter().filter(|c| c.status == status).count();

        Ok(Dashboard {
            total: complaints.len(),
            pending: count(ComplaintStatus::Pending),
            in_progress: count(ComplaintStatus::InProgress),
            resolved: count(ComplaintStatus::Resolved),
            recent: complaints.iter().take(DASHBOARD_RECENT).cloned().collect(),
        })
    }

    /// Staff listing.
    pub fn list_complaints(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>> {
        self.store.list_complaints(filter)
    }

    // === Users and reference data ===

    pub fn register_user(&self, form: &NewUser) -> Result<User> {
        let form = NewUser {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            first_name: trimmed_opt(form.first_name.as_deref()),
            phone: trimmed_opt(form.phone.as_deref()),
            is_staff: form.is_staff,
        };
        form.validate()?;
        if self.store.find_user_by_username(&form.username)?.is_some() {
            return Err(CoreError::already_exists("User", &form.username));
        }
        let user = self.store.create_user(&form)?;
        tracing::info!(username = %user.username, is_staff = user.is_staff, "user registered");
        Ok(user)
    }

    /// Resolve a username to a user.
    pub fn find_user(&self, username: &str) -> Result<User> {
        self.store
            .find_user_by_username(username.trim())?
            .ok_or_else(|| CoreError::not_found("User", username))
    }

    pub fn users(&self) -> Result<Vec<User>> {
        self.store.list_users()
    }

    pub fn add_category(&self, form: &NewCategory) -> Result<Category> {
        let form = NewCategory {
            name: form.name.trim().to_string(),
            contact_info: form.contact_info.trim().to_string(),
        };
        form.validate()?;
        self.store.create_category(&form)
    }

    pub fn categories(&self) -> Result<Vec<Category>> {
        self.store.list_categories()
    }

    pub fn add_department(&self, form: &NewDepartment) -> Result<Department> {
        let form = NewDepartment {
            name: form.name.trim().to_string(),
            contact_info: form.contact_info.trim().to_string(),
        };
        form.validate()?;
        self.store.create_department(&form)
    }

    pub fn departments(&self) -> Result<Vec<Department>> {
        self.store.list_departments()
    }
}

fn trimmed_opt(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
