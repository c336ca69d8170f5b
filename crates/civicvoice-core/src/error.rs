//! Core error types for civicvoice-core.
//!
//! Every fallible engine operation returns [`CoreError`]. The variants map
//! onto the outcomes a caller has to tell apart: a missing record, a request
//! that is not allowed in the complaint's current status, a duplicate, and a
//! malformed form. Storage and configuration failures are wrapped so the
//! boundary can still print something sensible.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for civicvoice-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Referenced record does not exist (or is not visible to the actor).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation is not permitted in the record's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A unique record already exists.
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    /// Submitted fields failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Actor may not see or act on the record.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn already_exists(entity: &'static str, key: impl Into<String>) -> Self {
        CoreError::AlreadyExists {
            entity,
            key: key.into(),
        }
    }

    /// Message suitable for showing to the person who made the request.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::NotFound { entity, id } => format!("No {} found with ID: {id}", entity.to_lowercase()),
            CoreError::InvalidState(reason) => reason.clone(),
            CoreError::AlreadyExists { entity, .. } if *entity == "Feedback" => {
                "You have already provided feedback for this complaint.".to_string()
            }
            CoreError::AlreadyExists { entity, key } => format!("{entity} '{key}' already exists."),
            CoreError::Validation(err) => format!("Please correct the errors below: {err}"),
            CoreError::PermissionDenied(_) => {
                "You do not have permission to view this complaint.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored value could not be interpreted
    #[error("Corrupt value in column '{column}': {value}")]
    CorruptValue { column: &'static str, value: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Validation errors for submitted forms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Form references a category/department/user that does not exist
    #[error("Unknown {field}: {id}")]
    UnknownReference { field: String, id: String },

    /// Several fields failed at once
    #[error("{}", join_errors(.0))]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Collapse a list of field errors into one error, or `Ok` if empty.
    pub fn collect(mut errors: Vec<ValidationError>) -> Result<(), ValidationError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }

    /// Names of the offending fields.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::InvalidValue { field, .. }
            | ValidationError::UnknownReference { field, .. } => vec![field.as_str()],
            ValidationError::Multiple(errors) => errors.iter().flat_map(|e| e.fields()).collect(),
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by a notification transport. These never leave the
/// dispatcher; they are logged and dropped there.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Invalid email address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Transport failure: {0}")]
    Transport(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
