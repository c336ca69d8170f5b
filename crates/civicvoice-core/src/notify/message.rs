//! Rendering of the two notification kinds.
//!
//! Each message is first reduced to a [`MessageBody`] (greeting, intro, a
//! list of labelled fields, an optional note and a link). The plain-text and
//! HTML renderings are both produced from that one body, so they always
//! carry the same information.

use chrono::{DateTime, Utc};

use crate::complaint::{Complaint, ComplaintStatus, User};

const DATE_FORMAT: &str = "%B %d, %Y at %I:%M %p";
const SIGNATURE: &str = "CivicVoice Team";

/// A message ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub plain: String,
    pub html: String,
}

/// Human-readable explanation of what a status means for the citizen.
pub fn status_explanation(status: ComplaintStatus) -> &'static str {
    match status {
        ComplaintStatus::Pending => "Your complaint is awaiting review by our team.",
        ComplaintStatus::InProgress => {
            "Your complaint is now being actively reviewed and processed by our team."
        }
        ComplaintStatus::Resolved => {
            "Great news! Your complaint has been resolved. You can now provide feedback about your experience."
        }
        ComplaintStatus::Escalated => {
            "Your complaint has been escalated to a senior team member for priority handling."
        }
        ComplaintStatus::Closed => "Your complaint has been closed. Thank you for using CivicVoice.",
    }
}

/// Accent colour used for a status in HTML messages.
pub fn status_color(status: ComplaintStatus) -> &'static str {
    match status {
        ComplaintStatus::Pending => "#ffc107",
        ComplaintStatus::InProgress => "#007bff",
        ComplaintStatus::Resolved => "#28a745",
        ComplaintStatus::Escalated => "#dc3545",
        ComplaintStatus::Closed => "#6c757d",
    }
}

/// e.g. `January 05, 2024 at 02:30 PM`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

/// Public page of a complaint.
pub fn complaint_url(site_url: &str, complaint_id: &str) -> String {
    format!("{}/complaint/{complaint_id}/", site_url.trim_end_matches('/'))
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Shared content of a message before rendering.
#[derive(Debug, Clone)]
struct MessageBody {
    heading: &'static str,
    greeting_name: String,
    intro: &'static str,
    fields: Vec<(&'static str, String)>,
    note: Option<&'static str>,
    link_label: &'static str,
    link: String,
    accent: &'static str,
}

impl MessageBody {
    fn plain(&self) -> String {
        let mut out = format!("Dear {},\n\n{}\n\nComplaint Details:\n", self.greeting_name, self.intro);
        for (label, value) in &self.fields {
            out.push_str(&format!("- {label}: {value}\n"));
        }
        if let Some(note) = self.note {
            out.push_str(&format!("\n{note}\n"));
        }
        out.push_str(&format!(
            "\n{}: {}\n\nBest regards,\n{SIGNATURE}\n",
            self.link_label, self.link
        ));
        out
    }

    fn html(&self) -> String {
        let mut rows = String::new();
        for (label, value) in &self.fields {
            rows.push_str(&format!(
                "<tr><td style=\"padding:4px 12px 4px 0;font-weight:bold;\">{label}:</td><td style=\"padding:4px 0;\">{}</td></tr>\n",
                escape_html(value)
            ));
        }
        let note = self
            .note
            .map(|note| {
                format!(
                    "<p style=\"padding:12px;border-left:4px solid {};background:#f8f9fa;\">{}</p>\n",
                    self.accent,
                    escape_html(note)
                )
            })
            .unwrap_or_default();
        let link = escape_html(&self.link);

        format!(
            "<!DOCTYPE html>\n<html>\n<body style=\"font-family:Arial,sans-serif;color:#333;\">\n\
             <h2 style=\"color:{accent};\">{heading}</h2>\n\
             <p>Dear {name},</p>\n\
             <p>{intro}</p>\n\
             <h3>Complaint Details:</h3>\n\
             <table>\n{rows}</table>\n\
             {note}\
             <p>{link_label}: <a href=\"{link}\" style=\"color:{accent};\">{link}</a></p>\n\
             <p>Best regards,<br>{SIGNATURE}</p>\n\
             </body>\n</html>\n",
            accent = self.accent,
            heading = self.heading,
            name = escape_html(&self.greeting_name),
            intro = escape_html(self.intro),
            link_label = self.link_label,
        )
    }
}

/// Confirmation sent to the citizen right after a complaint is filed.
pub fn submission(
    complaint: &Complaint,
    recipient: &User,
    category_name: &str,
    site_url: &str,
) -> RenderedMessage {
    let body = MessageBody {
        heading: "Complaint Submitted",
        greeting_name: recipient.greeting_name().to_string(),
        intro: "Thank you for submitting your complaint. We have received it and will review it shortly.",
        fields: vec![
            ("Complaint ID", complaint.id.clone()),
            ("Title", complaint.title.clone()),
            ("Category", category_name.to_string()),
            ("Location", complaint.location.clone()),
            ("Status", complaint.status.label().to_string()),
            ("Submitted", format_timestamp(complaint.created_at)),
        ],
        note: None,
        link_label: "Track your complaint",
        link: complaint_url(site_url, &complaint.id),
        accent: status_color(complaint.status),
    };

    RenderedMessage {
        subject: format!("Complaint Submitted - {}", complaint.id),
        plain: body.plain(),
        html: body.html(),
    }
}

/// Sent to the complaint's owner after a status change.
///
/// `complaint` carries the new status; official remarks are the complaint's
/// current admin remarks.
pub fn status_update(
    complaint: &Complaint,
    recipient: &User,
    old_status: ComplaintStatus,
    site_url: &str,
) -> RenderedMessage {
    let mut fields = vec![
        ("Complaint ID", complaint.id.clone()),
        ("Title", complaint.title.clone()),
        ("Previous Status", old_status.label().to_string()),
        ("New Status", complaint.status.label().to_string()),
        ("Updated", format_timestamp(complaint.updated_at)),
    ];
    if let Some(remarks) = complaint
        .admin_remarks
        .as_deref()
        .filter(|r| !r.trim().is_empty())
    {
        fields.push(("Official Remarks", remarks.to_string()));
    }

    let body = MessageBody {
        heading: "Complaint Status Update",
        greeting_name: recipient.greeting_name().to_string(),
        intro: "The status of your complaint has been updated.",
        fields,
        note: Some(status_explanation(complaint.status)),
        link_label: "View your complaint",
        link: complaint_url(site_url, &complaint.id),
        accent: status_color(complaint.status),
    };

    RenderedMessage {
        subject: format!("Complaint Status Update - {}", complaint.id),
        plain: body.plain(),
        html: body.html(),
    }
}
