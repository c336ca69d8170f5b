//! # CivicVoice Core Library
//!
//! Core logic for CivicVoice, a citizen-complaint tracker: citizens file
//! complaints, staff move them through a status lifecycle, and citizens leave
//! feedback once a complaint is resolved. The CLI binary is a thin layer over
//! this library.
//!
//! ## Architecture
//!
//! - **Engine**: submit / transition / feedback operations, each taking the
//!   acting user explicitly
//! - **Ledger**: append-only status history, read back as a [`Timeline`]
//! - **Notifications**: submission and status-update emails, best-effort
//! - **Storage**: SQLite records and TOML configuration
//!
//! ## Key Components
//!
//! - [`ComplaintEngine`]: status transition engine
//! - [`StatusLedger`]: trait for the status history
//! - [`ComplaintStore`]: trait for complaint, user and reference records
//! - [`SqliteStore`]: SQLite implementation of both storage traits
//! - [`NotificationDispatcher`]: renders and sends notifications
//! - [`Config`]: application configuration management

pub mod complaint;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod notify;
pub mod storage;

pub use complaint::{
    Category, Complaint, ComplaintFilter, ComplaintStatus, Department, Feedback, NewCategory,
    NewComplaint, NewDepartment, NewFeedback, NewUser, StatusHistoryEntry, User,
};
pub use engine::{ComplaintDetail, ComplaintEngine, Dashboard};
pub use error::{ConfigError, CoreError, DatabaseError, NotificationError, ValidationError};
pub use ledger::{StatusLedger, Timeline};
pub use notify::{DispatchOutcome, LogNotifier, NotificationDispatcher, Notifier, SmtpNotifier};
pub use storage::{ComplaintStore, Config, SqliteStore};
