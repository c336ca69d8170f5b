//! Database schema migrations for civicvoice.
//!
//! Migrations are versioned and applied automatically when opening the store.
//! The `schema_version` table tracks the current migration version.
//!
//! - v1: users, categories, departments, complaints, one feedback row per
//!   complaint, and the status history ledger

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;
    tracing::debug!(current_version, latest = SCHEMA_VERSION, "checking schema version");

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Current schema version, or 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    tracing::debug!(version, "schema version recorded");
    Ok(())
}

/// Migration v1: baseline schema.
///
/// Status columns only admit the stored status codes, and feedback is
/// limited to one row per complaint.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            email       TEXT NOT NULL,
            first_name  TEXT,
            phone       TEXT,
            is_staff    INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS categories (
            id            TEXT PRIMARY KEY,
            name          TEXT NOT NULL,
            contact_info  TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS departments (
            id            TEXT PRIMARY KEY,
            name          TEXT NOT NULL,
            contact_info  TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS complaints (
            id             TEXT PRIMARY KEY,
            title          TEXT NOT NULL,
            category_id    TEXT NOT NULL REFERENCES categories(id),
            department_id  TEXT NOT NULL REFERENCES departments(id),
            user_id        TEXT NOT NULL REFERENCES users(id),
            description    TEXT NOT NULL,
            location       TEXT NOT NULL,
            status         TEXT NOT NULL DEFAULT 'PENDING'
                CHECK (status IN ('PENDING', 'IN_PROGRESS', 'RESOLVED', 'ESCALATED', 'CLOSED')),
            admin_remarks  TEXT,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS feedback (
            id            TEXT PRIMARY KEY,
            complaint_id  TEXT NOT NULL UNIQUE REFERENCES complaints(id),
            comments      TEXT,
            rating        INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS complaint_status_history (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            complaint_id  TEXT NOT NULL REFERENCES complaints(id),
            old_status    TEXT NOT NULL,
            new_status    TEXT NOT NULL,
            changed_by    TEXT NOT NULL REFERENCES users(id),
            remarks       TEXT,
            changed_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_complaints_user_id ON complaints(user_id);
        CREATE INDEX IF NOT EXISTS idx_complaints_status ON complaints(status);
        CREATE INDEX IF NOT EXISTS idx_complaints_created_at ON complaints(created_at);
        CREATE INDEX IF NOT EXISTS idx_history_complaint_changed_at
            ON complaint_status_history(complaint_id, changed_at);",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrated_with_complaint() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO users (id, username, email) VALUES ('u1', 'asha', 'asha@example.org');
             INSERT INTO categories (id, name) VALUES ('cat', 'Roads');
             INSERT INTO departments (id, name) VALUES ('dep', 'Public Works');
             INSERT INTO complaints (id, title, category_id, department_id, user_id, description,
                    location, created_at, updated_at)
                VALUES ('c1', 'Pothole', 'cat', 'dep', 'u1', 'Deep pothole', 'Main St',
                    '2024-01-01T12:00:00.000000Z', '2024-01-01T12:00:00.000000Z');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        conn.prepare(
            "SELECT id, title, location, admin_remarks, updated_at, status FROM complaints",
        )
        .unwrap();
        conn.prepare("SELECT id, old_status, new_status FROM complaint_status_history")
            .unwrap();
    }

    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_new_complaint_defaults_to_pending() {
        let conn = migrated_with_complaint();
        let status: String = conn
            .query_row("SELECT status FROM complaints WHERE id = 'c1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(status, "PENDING");
    }

    #[test]
    fn test_unknown_status_rejected() {
        let conn = migrated_with_complaint();
        let result = conn.execute(
            "UPDATE complaints SET status = 'In Progress' WHERE id = 'c1'",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unique_feedback_enforced() {
        let conn = migrated_with_complaint();
        conn.execute(
            "INSERT INTO feedback (id, complaint_id, rating, created_at) VALUES ('f1', 'c1', 4, 'x')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO feedback (id, complaint_id, rating, created_at) VALUES ('f2', 'c1', 5, 'x')",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let conn = migrated_with_complaint();
        let result = conn.execute(
            "INSERT INTO feedback (id, complaint_id, rating, created_at) VALUES ('f1', 'c1', 9, 'x')",
            [],
        );
        assert!(result.is_err());
    }
}
