//! Email notifications for complaint events.
//!
//! The [`NotificationDispatcher`] renders a message and hands it to a
//! [`Notifier`] transport. Delivery is best-effort: a failed send is logged
//! and reported as [`DispatchOutcome::Failed`], never returned as an error,
//! so a committed status change can not be undone by a mail problem.

pub mod message;
mod smtp;

pub use message::RenderedMessage;
pub use smtp::SmtpNotifier;

use serde::{Deserialize, Serialize};

use crate::complaint::{Complaint, ComplaintStatus, User};
use crate::error::NotificationError;
use crate::storage::NotificationsConfig;

/// Mail transport.
pub trait Notifier: Send + Sync {
    /// Deliver one message. Called at most once per event.
    fn send(
        &self,
        to: &str,
        subject: &str,
        plain_body: &str,
        html_body: &str,
    ) -> Result<(), NotificationError>;
}

/// Transport that writes messages to the log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(
        &self,
        to: &str,
        subject: &str,
        plain_body: &str,
        _html_body: &str,
    ) -> Result<(), NotificationError> {
        tracing::info!(to, subject, body = plain_body, "email notification (log transport)");
        Ok(())
    }
}

/// Result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent,
    /// Notifications are switched off in configuration
    Disabled,
    /// Delivery failed; the reason has already been logged
    Failed(String),
}

pub struct NotificationDispatcher {
    config: NotificationsConfig,
    transport: Box<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(config: NotificationsConfig, transport: Box<dyn Notifier>) -> Self {
        Self { config, transport }
    }

    /// Dispatcher that never sends anything.
    pub fn disabled() -> Self {
        Self::new(
            NotificationsConfig {
                enabled: false,
                ..NotificationsConfig::default()
            },
            Box::new(LogNotifier),
        )
    }

    pub fn config(&self) -> &NotificationsConfig {
        &self.config
    }

    pub fn submission(
        &self,
        complaint: &Complaint,
        recipient: &User,
        category_name: &str,
    ) -> DispatchOutcome {
        if !self.config.enabled {
            return DispatchOutcome::Disabled;
        }
        let message = message::submission(complaint, recipient, category_name, &self.config.site_url);
        self.deliver(&recipient.email, &message)
    }

    pub fn status_update(
        &self,
        complaint: &Complaint,
        recipient: &User,
        old_status: ComplaintStatus,
    ) -> DispatchOutcome {
        if !self.config.enabled {
            return DispatchOutcome::Disabled;
        }
        let message = message::status_update(complaint, recipient, old_status, &self.config.site_url);
        self.deliver(&recipient.email, &message)
    }

    fn deliver(&self, to: &str, message: &RenderedMessage) -> DispatchOutcome {
        if to.trim().is_empty() {
            tracing::warn!(subject = %message.subject, "recipient has no email address; notification skipped");
            return DispatchOutcome::Failed("recipient has no email address".to_string());
        }
        match self
            .transport
            .send(to, &message.subject, &message.plain, &message.html)
        {
            Ok(()) => {
                tracing::debug!(to, subject = %message.subject, "notification sent");
                DispatchOutcome::Sent
            }
            Err(e) => {
                tracing::warn!(to, subject = %message.subject, error = %e, "failed to send notification");
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Recorder {
        sent: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl Notifier for Recorder {
        fn send(&self, to: &str, subject: &str, _: &str, _: &str) -> Result<(), NotificationError> {
            self.sent.lock().unwrap().push((to.to_string(), subject.to_string()));
            Ok(())
        }
    }

    struct Broken;

    impl Notifier for Broken {
        fn send(&self, _: &str, _: &str, _: &str, _: &str) -> Result<(), NotificationError> {
            Err(NotificationError::Transport("connection refused".to_string()))
        }
    }

    fn fixtures() -> (Complaint, User) {
        let now = Utc::now();
        let complaint = Complaint {
            id: "c1".to_string(),
            title: "Pothole".to_string(),
            category_id: "cat".to_string(),
            department_id: "dep".to_string(),
            user_id: "u1".to_string(),
            description: "Deep".to_string(),
            location: "Main St".to_string(),
            status: ComplaintStatus::Pending,
            admin_remarks: None,
            created_at: now,
            updated_at: now,
        };
        let user = User {
            id: "u1".to_string(),
            username: "asha".to_string(),
            email: "asha@example.org".to_string(),
            first_name: None,
            phone: None,
            is_staff: false,
        };
        (complaint, user)
    }

    #[test]
    fn sends_through_transport() {
        let recorder = Recorder::default();
        let dispatcher =
            NotificationDispatcher::new(NotificationsConfig::default(), Box::new(recorder.clone()));
        let (complaint, user) = fixtures();

        assert_eq!(dispatcher.submission(&complaint, &user, "Roads"), DispatchOutcome::Sent);
        let sent = recorder.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![("asha@example.org".to_string(), "Complaint Submitted - c1".to_string())]
        );
    }

    #[test]
    fn disabled_config_sends_nothing() {
        let recorder = Recorder::default();
        let config = NotificationsConfig {
            enabled: false,
            ..NotificationsConfig::default()
        };
        let dispatcher = NotificationDispatcher::new(config, Box::new(recorder.clone()));
        let (complaint, user) = fixtures();

        assert_eq!(
            dispatcher.status_update(&complaint, &user, ComplaintStatus::Pending),
            DispatchOutcome::Disabled
        );
        assert!(recorder.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn transport_failure_is_reported_not_raised() {
        let dispatcher = NotificationDispatcher::new(NotificationsConfig::default(), Box::new(Broken));
        let (complaint, user) = fixtures();

        match dispatcher.submission(&complaint, &user, "Roads") {
            DispatchOutcome::Failed(reason) => assert!(reason.contains("connection refused")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn missing_address_is_a_failure() {
        let dispatcher = NotificationDispatcher::new(NotificationsConfig::default(), Box::new(LogNotifier));
        let (complaint, mut user) = fixtures();
        user.email = String::new();
        assert!(matches!(
            dispatcher.submission(&complaint, &user, "Roads"),
            DispatchOutcome::Failed(_)
        ));
    }
}
