//! SQLite-backed complaint store and status ledger.
//!
//! Provides persistent storage for:
//! - Users, categories and departments
//! - Complaints and their feedback
//! - The append-only status history

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use uuid::Uuid;

use super::{data_dir, migrations, ComplaintStore};
use crate::complaint::{
    Category, Complaint, ComplaintFilter, ComplaintStatus, Department, Feedback, NewCategory,
    NewComplaint, NewDepartment, NewFeedback, NewUser, StatusHistoryEntry, User,
};
use crate::error::{CoreError, DatabaseError, Result};
use crate::ledger::{StatusLedger, Timeline};

const COMPLAINT_COLUMNS: &str = "id, title, category_id, department_id, user_id, description,
     location, status, admin_remarks, created_at, updated_at";

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_datetime(row: &rusqlite::Row, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_status(row: &rusqlite::Row, idx: usize) -> Result<ComplaintStatus, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    raw.parse::<ComplaintStatus>()
        .map_err(|e| conversion_error(idx, e))
}

fn row_to_complaint(row: &rusqlite::Row) -> Result<Complaint, rusqlite::Error> {
    Ok(Complaint {
        id: row.get(0)?,
        title: row.get(1)?,
        category_id: row.get(2)?,
        department_id: row.get(3)?,
        user_id: row.get(4)?,
        description: row.get(5)?,
        location: row.get(6)?,
        status: parse_status(row, 7)?,
        admin_remarks: row.get(8)?,
        created_at: parse_datetime(row, 9)?,
        updated_at: parse_datetime(row, 10)?,
    })
}

fn row_to_history_entry(row: &rusqlite::Row) -> Result<StatusHistoryEntry, rusqlite::Error> {
    Ok(StatusHistoryEntry {
        id: row.get(0)?,
        complaint_id: row.get(1)?,
        old_status: parse_status(row, 2)?,
        new_status: parse_status(row, 3)?,
        changed_by: row.get(4)?,
        remarks: row.get(5)?,
        changed_at: parse_datetime(row, 6)?,
    })
}

fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        phone: row.get(4)?,
        is_staff: row.get(5)?,
    })
}

fn row_to_feedback(row: &rusqlite::Row) -> Result<Feedback, rusqlite::Error> {
    let rating: Option<u8> = row.get(3)?;
    Ok(Feedback {
        id: row.get(0)?,
        complaint_id: row.get(1)?,
        comments: row.get(2)?,
        rating: rating.ok_or(rusqlite::Error::InvalidColumnType(
            3,
            "rating".to_string(),
            Type::Null,
        ))?,
        created_at: parse_datetime(row, 4)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn new_complaint(
    form: &NewComplaint,
    user_id: &str,
    status: ComplaintStatus,
    created_at: DateTime<Utc>,
) -> Complaint {
    Complaint {
        id: new_id(),
        title: form.title.clone(),
        category_id: form.category_id.clone(),
        department_id: form.department_id.clone(),
        user_id: user_id.to_string(),
        description: form.description.clone(),
        location: form.location.clone(),
        status,
        admin_remarks: None,
        created_at,
        updated_at: created_at,
    }
}

fn insert_complaint(conn: &Connection, complaint: &Complaint) -> Result<()> {
    conn.execute(
        "INSERT INTO complaints (id, title, category_id, department_id, user_id, description,
            location, status, admin_remarks, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            complaint.id,
            complaint.title,
            complaint.category_id,
            complaint.department_id,
            complaint.user_id,
            complaint.description,
            complaint.location,
            complaint.status.code(),
            complaint.admin_remarks,
            format_datetime(complaint.created_at),
            format_datetime(complaint.updated_at),
        ],
    )?;
    Ok(())
}

fn write_complaint_status(conn: &Connection, complaint: &Complaint) -> Result<()> {
    let changed = conn.execute(
        "UPDATE complaints SET status = ?1, admin_remarks = ?2, updated_at = ?3 WHERE id = ?4",
        params![
            complaint.status.code(),
            complaint.admin_remarks,
            format_datetime(complaint.updated_at),
            complaint.id,
        ],
    )?;
    if changed == 0 {
        return Err(CoreError::not_found("Complaint", &complaint.id));
    }
    Ok(())
}

/// Insert a history entry. Timestamps earlier than the complaint's latest
/// entry are raised to it, so a timeline never runs backwards even if
/// clocks do.
fn insert_entry(
    conn: &Connection,
    complaint_id: &str,
    old_status: ComplaintStatus,
    new_status: ComplaintStatus,
    changed_by: &str,
    remarks: Option<&str>,
    changed_at: DateTime<Utc>,
) -> Result<StatusHistoryEntry> {
    let latest: Option<String> = conn.query_row(
        "SELECT MAX(changed_at) FROM complaint_status_history WHERE complaint_id = ?1",
        params![complaint_id],
        |row| row.get(0),
    )?;
    let changed_at = match latest {
        Some(raw) => {
            let latest = DateTime::parse_from_rfc3339(&raw)
                .map_err(|_| DatabaseError::CorruptValue {
                    column: "changed_at",
                    value: raw.clone(),
                })?
                .with_timezone(&Utc);
            changed_at.max(latest)
        }
        None => changed_at,
    };

    conn.execute(
        "INSERT INTO complaint_status_history
            (complaint_id, old_status, new_status, changed_by, remarks, changed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            complaint_id,
            old_status.code(),
            new_status.code(),
            changed_by,
            remarks,
            format_datetime(changed_at),
        ],
    )?;

    Ok(StatusHistoryEntry {
        id: conn.last_insert_rowid(),
        complaint_id: complaint_id.to_string(),
        old_status,
        new_status,
        changed_by: changed_by.to_string(),
        remarks: remarks.map(str::to_string),
        changed_at,
    })
}

/// SQLite database holding every civicvoice record.
///
/// The connection sits behind a mutex so one store can be shared by
/// concurrent callers; each statement runs while holding the lock.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the database at `~/.config/civicvoice/civicvoice.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("civicvoice.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DatabaseError::QueryFailed("connection lock poisoned".to_string()).into())
    }

    /// Number of status history entries across all complaints.
    pub fn history_len(&self) -> Result<u64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM complaint_status_history", [], |row| {
            row.get::<_, u64>(0)
        })?;
        Ok(count)
    }
}

impl ComplaintStore for SqliteStore {
    fn get_complaint(&self, id: &str) -> Result<Option<Complaint>> {
        let conn = self.conn()?;
        let complaint = conn
            .query_row(
                &format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE id = ?1"),
                params![id],
                row_to_complaint,
            )
            .optional()?;
        Ok(complaint)
    }

    fn record_submission(
        &self,
        form: &NewComplaint,
        user_id: &str,
        created_at: DateTime<Utc>,
        remarks: Option<&str>,
    ) -> Result<Complaint> {
        let complaint = new_complaint(form, user_id, ComplaintStatus::INITIAL, created_at);
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        insert_complaint(&tx, &complaint)?;
        insert_entry(
            &tx,
            &complaint.id,
            complaint.status,
            complaint.status,
            user_id,
            remarks,
            created_at,
        )?;
        tx.commit()?;
        Ok(complaint)
    }

    fn record_transition(
        &self,
        complaint: &Complaint,
        old_status: ComplaintStatus,
        changed_by: &str,
        remarks: Option<&str>,
    ) -> Result<StatusHistoryEntry> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        write_complaint_status(&tx, complaint)?;
        let entry = insert_entry(
            &tx,
            &complaint.id,
            old_status,
            complaint.status,
            changed_by,
            remarks,
            complaint.updated_at,
        )?;
        tx.commit()?;
        Ok(entry)
    }

    fn list_complaints(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>> {
        let mut clauses = Vec::new();
        let mut values: Vec<String> = Vec::new();
        let mut push = |column: &str, value: &str| {
            values.push(value.to_string());
            clauses.push(format!("{column} = ?{}", values.len()));
        };
        if let Some(user_id) = &filter.user_id {
            push("user_id", user_id);
        }
        if let Some(status) = filter.status {
            push("status", status.code());
        }
        if let Some(category_id) = &filter.category_id {
            push("category_id", category_id);
        }
        if let Some(department_id) = &filter.department_id {
            push("department_id", department_id);
        }

        let mut sql = format!("SELECT {COMPLAINT_COLUMNS} FROM complaints");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let complaints = stmt
            .query_map(params_from_iter(values.iter()), row_to_complaint)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(complaints)
    }

    fn create_feedback(
        &self,
        complaint_id: &str,
        form: &NewFeedback,
        created_at: DateTime<Utc>,
    ) -> Result<Feedback> {
        let feedback = Feedback {
            id: new_id(),
            complaint_id: complaint_id.to_string(),
            comments: form.comments.clone(),
            rating: form.rating,
            created_at,
        };

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO feedback (id, complaint_id, comments, rating, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                feedback.id,
                feedback.complaint_id,
                feedback.comments,
                feedback.rating,
                format_datetime(feedback.created_at),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::already_exists("Feedback", complaint_id)
            } else {
                e.into()
            }
        })?;
        Ok(feedback)
    }

    fn get_feedback(&self, complaint_id: &str) -> Result<Option<Feedback>> {
        let conn = self.conn()?;
        let feedback = conn
            .query_row(
                "SELECT id, complaint_id, comments, rating, created_at
                 FROM feedback WHERE complaint_id = ?1",
                params![complaint_id],
                row_to_feedback,
            )
            .optional()?;
        Ok(feedback)
    }

    fn create_user(&self, form: &NewUser) -> Result<User> {
        let user = User {
            id: new_id(),
            username: form.username.clone(),
            email: form.email.clone(),
            first_name: form.first_name.clone(),
            phone: form.phone.clone(),
            is_staff: form.is_staff,
        };

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (id, username, email, first_name, phone, is_staff)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.username,
                user.email,
                user.first_name,
                user.phone,
                user.is_staff,
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::already_exists("User", &form.username)
            } else {
                e.into()
            }
        })?;
        Ok(user)
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, email, first_name, phone, is_staff FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, email, first_name, phone, is_staff
                 FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, username, email, first_name, phone, is_staff FROM users ORDER BY username",
        )?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn create_category(&self, form: &NewCategory) -> Result<Category> {
        let category = Category {
            id: new_id(),
            name: form.name.clone(),
            contact_info: form.contact_info.clone(),
        };
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (id, name, contact_info) VALUES (?1, ?2, ?3)",
            params![category.id, category.name, category.contact_info],
        )?;
        Ok(category)
    }

    fn get_category(&self, id: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT id, name, contact_info FROM categories WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        contact_info: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }

    fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, contact_info FROM categories ORDER BY name")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    contact_info: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn create_department(&self, form: &NewDepartment) -> Result<Department> {
        let department = Department {
            id: new_id(),
            name: form.name.clone(),
            contact_info: form.contact_info.clone(),
        };
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO departments (id, name, contact_info) VALUES (?1, ?2, ?3)",
            params![department.id, department.name, department.contact_info],
        )?;
        Ok(department)
    }

    fn get_department(&self, id: &str) -> Result<Option<Department>> {
        let conn = self.conn()?;
        let department = conn
            .query_row(
                "SELECT id, name, contact_info FROM departments WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Department {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        contact_info: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(department)
    }

    fn list_departments(&self) -> Result<Vec<Department>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, contact_info FROM departments ORDER BY name")?;
        let departments = stmt
            .query_map([], |row| {
                Ok(Department {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    contact_info: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(departments)
    }
}

impl StatusLedger for SqliteStore {
    fn append(
        &self,
        complaint_id: &str,
        old_status: ComplaintStatus,
        new_status: ComplaintStatus,
        changed_by: &str,
        remarks: Option<&str>,
        changed_at: DateTime<Utc>,
    ) -> Result<StatusHistoryEntry> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let entry = insert_entry(
            &tx,
            complaint_id,
            old_status,
            new_status,
            changed_by,
            remarks,
            changed_at,
        )?;
        tx.commit()?;
        Ok(entry)
    }

    fn timeline(&self, complaint_id: &str) -> Result<Timeline> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, complaint_id, old_status, new_status, changed_by, remarks, changed_at
             FROM complaint_status_history
             WHERE complaint_id = ?1
             ORDER BY changed_at ASC, id ASC",
        )?;
        let entries = stmt
            .query_map(params![complaint_id], row_to_history_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Timeline::new(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::now;
    use chrono::Duration;

    fn seeded() -> (SqliteStore, User, Category, Department) {
        let store = SqliteStore::open_memory().unwrap();
        let user = store
            .create_user(&NewUser {
                username: "asha".to_string(),
                email: "asha@example.org".to_string(),
                first_name: Some("Asha".to_string()),
                phone: None,
                is_staff: false,
            })
            .unwrap();
        let category = store
            .create_category(&NewCategory {
                name: "Roads".to_string(),
                contact_info: String::new(),
            })
            .unwrap();
        let department = store
            .create_department(&NewDepartment {
                name: "Public Works".to_string(),
                contact_info: "pw@city.gov".to_string(),
            })
            .unwrap();
        (store, user, category, department)
    }

    fn form(category: &Category, department: &Department) -> NewComplaint {
        NewComplaint {
            title: "Pothole".to_string(),
            category_id: category.id.clone(),
            department_id: department.id.clone(),
            description: "Deep pothole".to_string(),
            location: "Main St".to_string(),
        }
    }

    fn submitted(
        store: &SqliteStore,
        user: &User,
        category: &Category,
        department: &Department,
        at: DateTime<Utc>,
    ) -> Complaint {
        store
            .record_submission(&form(category, department), &user.id, at, Some("submitted"))
            .unwrap()
    }

    #[test]
    fn record_submission_writes_complaint_and_initial_entry() {
        let (store, user, category, department) = seeded();
        let created = submitted(&store, &user, &category, &department, now());
        assert_eq!(created.status, ComplaintStatus::Pending);

        let loaded = store.get_complaint(&created.id).unwrap().unwrap();
        assert_eq!(loaded, created);
        assert!(store.get_complaint("missing").unwrap().is_none());

        let timeline = store.timeline(&created.id).unwrap();
        assert_eq!(timeline.len(), 1);
        let entry = timeline.first().unwrap();
        assert_eq!(entry.old_status, ComplaintStatus::Pending);
        assert_eq!(entry.new_status, ComplaintStatus::Pending);
        assert_eq!(entry.changed_by, user.id);
        assert_eq!(entry.changed_at, created.created_at);
    }

    #[test]
    fn record_submission_for_unknown_user_writes_nothing() {
        let (store, _, category, department) = seeded();
        let result = store.record_submission(&form(&category, &department), "ghost", now(), None);
        assert!(matches!(result, Err(CoreError::Database(_))));

        assert!(store.list_complaints(&ComplaintFilter::default()).unwrap().is_empty());
        assert_eq!(store.history_len().unwrap(), 0);
    }

    #[test]
    fn record_transition_persists_status_and_entry() {
        let (store, user, category, department) = seeded();
        let mut complaint = submitted(&store, &user, &category, &department, now());

        complaint.status = ComplaintStatus::Resolved;
        complaint.admin_remarks = Some("Fixed".to_string());
        complaint.updated_at = now();
        let entry = store
            .record_transition(&complaint, ComplaintStatus::Pending, &user.id, Some("Fixed"))
            .unwrap();
        assert_eq!(entry.new_status, ComplaintStatus::Resolved);

        let loaded = store.get_complaint(&complaint.id).unwrap().unwrap();
        assert_eq!(loaded.status, ComplaintStatus::Resolved);
        assert_eq!(loaded.admin_remarks.as_deref(), Some("Fixed"));

        let timeline = store.timeline(&complaint.id).unwrap();
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.current_status(), Some(loaded.status));
    }

    #[test]
    fn record_transition_rolls_back_when_entry_is_rejected() {
        let (store, user, category, department) = seeded();
        let mut complaint = submitted(&store, &user, &category, &department, now());

        complaint.status = ComplaintStatus::Resolved;
        complaint.admin_remarks = Some("Fixed".to_string());
        complaint.updated_at = now();
        let result = store.record_transition(
            &complaint,
            ComplaintStatus::Pending,
            "staff-from-directory",
            Some("Fixed"),
        );
        assert!(matches!(result, Err(CoreError::Database(_))));

        let loaded = store.get_complaint(&complaint.id).unwrap().unwrap();
        assert_eq!(loaded.status, ComplaintStatus::Pending);
        assert_eq!(loaded.admin_remarks, None);

        let timeline = store.timeline(&complaint.id).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.current_status(), Some(loaded.status));
    }

    #[test]
    fn record_transition_of_missing_complaint_is_not_found() {
        let (store, user, category, department) = seeded();
        let mut complaint = submitted(&store, &user, &category, &department, now());
        complaint.id = "missing".to_string();
        assert!(matches!(
            store.record_transition(&complaint, ComplaintStatus::Pending, &user.id, None),
            Err(CoreError::NotFound { .. })
        ));
        assert_eq!(store.history_len().unwrap(), 1);
    }

    #[test]
    fn list_filters_and_orders_newest_first() {
        let (store, user, category, department) = seeded();
        let t0 = now();
        let older = submitted(&store, &user, &category, &department, t0);
        let newer = submitted(&store, &user, &category, &department, t0 + Duration::minutes(1));

        let all = store.list_complaints(&ComplaintFilter::default()).unwrap();
        let ids: Vec<&str> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);

        let limited = store
            .list_complaints(&ComplaintFilter {
                limit: Some(1),
                ..ComplaintFilter::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 1);

        let resolved = store
            .list_complaints(&ComplaintFilter {
                status: Some(ComplaintStatus::Resolved),
                ..ComplaintFilter::default()
            })
            .unwrap();
        assert!(resolved.is_empty());

        assert!(store
            .list_complaints(&ComplaintFilter::for_user("someone-else"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn duplicate_username_is_already_exists() {
        let (store, ..) = seeded();
        let err = store
            .create_user(&NewUser {
                username: "asha".to_string(),
                email: "other@example.org".to_string(),
                first_name: None,
                phone: None,
                is_staff: false,
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists { entity: "User", .. }));
    }

    #[test]
    fn feedback_is_unique_per_complaint() {
        let (store, user, category, department) = seeded();
        let complaint = submitted(&store, &user, &category, &department, now());
        let feedback = NewFeedback {
            comments: Some("Quick fix".to_string()),
            rating: 5,
        };

        store.create_feedback(&complaint.id, &feedback, now()).unwrap();
        let err = store.create_feedback(&complaint.id, &feedback, now()).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists { entity: "Feedback", .. }));

        let stored = store.get_feedback(&complaint.id).unwrap().unwrap();
        assert_eq!(stored.rating, 5);
    }

    #[test]
    fn append_and_read_timeline() {
        let (store, user, category, department) = seeded();
        let t0 = now();
        let complaint = submitted(&store, &user, &category, &department, t0);

        store
            .append(
                &complaint.id,
                ComplaintStatus::Pending,
                ComplaintStatus::InProgress,
                &user.id,
                Some("Crew assigned"),
                t0 + Duration::seconds(1),
            )
            .unwrap();

        let timeline = store.timeline(&complaint.id).unwrap();
        assert_eq!(timeline.len(), 2);
        assert!(timeline.is_consistent_path(ComplaintStatus::Pending));
        assert_eq!(timeline.last().unwrap().remarks.as_deref(), Some("Crew assigned"));
        assert_eq!(timeline.first().unwrap().changed_at, t0);
        assert_eq!(store.history_len().unwrap(), 2);

        assert!(store.timeline("missing").unwrap().is_empty());
    }

    #[test]
    fn append_never_goes_back_in_time() {
        let (store, user, category, department) = seeded();
        let t0 = now();
        let complaint = submitted(&store, &user, &category, &department, t0);

        let entry = store
            .append(
                &complaint.id,
                ComplaintStatus::Pending,
                ComplaintStatus::Escalated,
                &user.id,
                None,
                t0 - Duration::hours(1),
            )
            .unwrap();
        assert_eq!(entry.changed_at, t0);

        let timeline = store.timeline(&complaint.id).unwrap();
        assert_eq!(timeline.current_status(), Some(ComplaintStatus::Escalated));
    }

    #[test]
    fn open_at_persists_between_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("civicvoice.db");
        {
            let store = SqliteStore::open_at(&path).unwrap();
            store
                .create_category(&NewCategory {
                    name: "Water".to_string(),
                    contact_info: String::new(),
                })
                .unwrap();
        }
        let store = SqliteStore::open_at(&path).unwrap();
        let names: Vec<String> = store
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Water"]);
    }
}
