//! SMTP transport built on `lettre`.

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::Notifier;
use crate::error::NotificationError;
use crate::storage::SmtpConfig;

/// Sends multipart/alternative (plain + HTML) mail through an SMTP relay.
pub struct SmtpNotifier {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build a transport from the `[smtp]` section.
    ///
    /// With credentials the relay is reached over TLS; without them a plain
    /// connection is used, as for a local relay.
    ///
    /// # Errors
    /// Returns an error if no host is configured, the sender address does
    /// not parse, or the relay cannot be set up.
    pub fn from_config(smtp: &SmtpConfig, from_address: &str) -> Result<Self, NotificationError> {
        let host = smtp
            .host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| NotificationError::Build("smtp.host is not set".to_string()))?;
        let from = parse_mailbox(from_address)?;

        let mailer = match (&smtp.username, &smtp.password) {
            (Some(user), Some(pass)) => SmtpTransport::relay(host)
                .map_err(|e| NotificationError::Transport(e.to_string()))?
                .port(smtp.port)
                .credentials(Credentials::new(user.clone(), pass.clone()))
                .build(),
            _ => SmtpTransport::builder_dangerous(host).port(smtp.port).build(),
        };
        tracing::debug!(host, port = smtp.port, "smtp transport configured");

        Ok(Self { mailer, from })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotificationError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| NotificationError::InvalidAddress {
            address: address.to_string(),
            message: e.to_string(),
        })
}

/// Assemble the multipart message without sending it.
fn build_message(
    from: &Mailbox,
    to: &str,
    subject: &str,
    plain_body: &str,
    html_body: &str,
) -> Result<Message, NotificationError> {
    Message::builder()
        .from(from.clone())
        .to(parse_mailbox(to)?)
        .subject(subject)
        .multipart(MultiPart::alternative_plain_html(
            plain_body.to_string(),
            html_body.to_string(),
        ))
        .map_err(|e| NotificationError::Build(e.to_string()))
}

impl Notifier for SmtpNotifier {
    fn send(
        &self,
        to: &str,
        subject: &str,
        plain_body: &str,
        html_body: &str,
    ) -> Result<(), NotificationError> {
        let email = build_message(&self.from, to, subject, plain_body, html_body)?;
        self.mailer
            .send(&email)
            .map_err(|e| NotificationError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_host() {
        let err = SmtpNotifier::from_config(&SmtpConfig::default(), "noreply@city.gov")
            .err()
            .unwrap();
        assert!(matches!(err, NotificationError::Build(_)));
    }

    #[test]
    fn rejects_bad_sender() {
        let smtp = SmtpConfig {
            host: Some("localhost".to_string()),
            ..SmtpConfig::default()
        };
        let err = SmtpNotifier::from_config(&smtp, "not an address").err().unwrap();
        assert!(matches!(err, NotificationError::InvalidAddress { .. }));
    }

    #[test]
    fn local_relay_without_credentials() {
        let smtp = SmtpConfig {
            host: Some("localhost".to_string()),
            port: 2525,
            ..SmtpConfig::default()
        };
        assert!(SmtpNotifier::from_config(&smtp, "CivicVoice <noreply@civicvoice.local>").is_ok());
    }

    #[test]
    fn message_is_multipart_alternative() {
        let from = parse_mailbox("CivicVoice <noreply@civicvoice.local>").unwrap();
        let email = build_message(&from, "asha@example.org", "Complaint Submitted - c1", "plain", "<p>html</p>")
            .unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("Subject: Complaint Submitted - c1"));
    }

    #[test]
    fn bad_recipient_is_invalid_address() {
        let from = parse_mailbox("noreply@civicvoice.local").unwrap();
        let err = build_message(&from, "nobody", "s", "p", "h").unwrap_err();
        assert!(matches!(err, NotificationError::InvalidAddress { .. }));
    }
}
