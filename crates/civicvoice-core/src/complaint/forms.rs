//! Input forms and their field validation.
//!
//! `validate()` checks shape only (lengths, ranges, formats). Whether a
//! referenced category or department exists is checked by the engine against
//! the store.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const TITLE_MAX: usize = 200;
pub const LOCATION_MAX: usize = 255;
pub const USERNAME_MAX: usize = 150;
pub const PHONE_MAX: usize = 15;
pub const REFERENCE_NAME_MAX: usize = 100;
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Citizen-submitted complaint form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewComplaint {
    pub title: String,
    pub category_id: String,
    pub department_id: String,
    pub description: String,
    pub location: String,
}

impl NewComplaint {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        check_text("title", &self.title, TITLE_MAX, &mut errors);
        check_required("category", &self.category_id, &mut errors);
        check_required("department", &self.department_id, &mut errors);
        check_required("description", &self.description, &mut errors);
        check_text("location", &self.location, LOCATION_MAX, &mut errors);
        ValidationError::collect(errors)
    }

    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            category_id: self.category_id.trim().to_string(),
            department_id: self.department_id.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
        }
    }
}

/// Feedback left by the owner of a resolved complaint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewFeedback {
    pub comments: Option<String>,
    pub rating: u8,
}

impl NewFeedback {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if RATING_RANGE.contains(&self.rating) {
            Ok(())
        } else {
            Err(ValidationError::invalid(
                "rating",
                format!(
                    "must be between {} and {}, got {}",
                    RATING_RANGE.start(),
                    RATING_RANGE.end(),
                    self.rating
                ),
            ))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub phone: Option<String>,
    pub is_staff: bool,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        check_text("username", &self.username, USERNAME_MAX, &mut errors);
        if self
            .username
            .chars()
            .any(|c| !(c.is_alphanumeric() || "@.+-_".contains(c)))
        {
            errors.push(ValidationError::invalid(
                "username",
                "may contain only letters, digits and @/./+/-/_",
            ));
        }
        if !is_plausible_email(&self.email) {
            errors.push(ValidationError::invalid("email", "enter a valid email address"));
        }
        if let Some(phone) = &self.phone {
            if phone.chars().count() > PHONE_MAX {
                errors.push(ValidationError::invalid(
                    "phone",
                    format!("must be at most {PHONE_MAX} characters"),
                ));
            }
        }
        ValidationError::collect(errors)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub contact_info: String,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_reference(&self.name, &self.contact_info)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewDepartment {
    pub name: String,
    #[serde(default)]
    pub contact_info: String,
}

impl NewDepartment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_reference(&self.name, &self.contact_info)
    }
}

fn validate_reference(name: &str, contact_info: &str) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    check_text("name", name, REFERENCE_NAME_MAX, &mut errors);
    if contact_info.chars().count() > REFERENCE_NAME_MAX {
        errors.push(ValidationError::invalid(
            "contact_info",
            format!("must be at most {REFERENCE_NAME_MAX} characters"),
        ));
    }
    ValidationError::collect(errors)
}

fn check_required(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.trim().is_empty() {
        errors.push(ValidationError::invalid(field, "this field is required"));
    }
}

fn check_text(field: &str, value: &str, max: usize, errors: &mut Vec<ValidationError>) {
    if value.trim().is_empty() {
        errors.push(ValidationError::invalid(field, "this field is required"));
    } else if value.chars().count() > max {
        errors.push(ValidationError::invalid(
            field,
            format!("must be at most {max} characters"),
        ));
    }
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complaint() -> NewComplaint {
        NewComplaint {
            title: "Pothole on Main St".to_string(),
            category_id: "roads".to_string(),
            department_id: "public-works".to_string(),
            description: "Large pothole near the bus stop".to_string(),
            location: "Main St".to_string(),
        }
    }

    #[test]
    fn valid_complaint_passes() {
        assert!(complaint().validate().is_ok());
    }

    #[test]
    fn blank_fields_are_reported_together() {
        let mut form = complaint();
        form.title = "   ".to_string();
        form.location = String::new();
        let err = form.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["title", "location"]);
    }

    #[test]
    fn overlong_title_is_rejected() {
        let mut form = complaint();
        form.title = "x".repeat(TITLE_MAX + 1);
        assert_eq!(form.validate().unwrap_err().fields(), vec!["title"]);
    }

    #[test]
    fn trimmed_strips_whitespace() {
        let mut form = complaint();
        form.location = "  Main St \n".to_string();
        assert_eq!(form.trimmed().location, "Main St");
    }

    #[test]
    fn rating_bounds() {
        for rating in [1, 3, 5] {
            assert!(NewFeedback { comments: None, rating }.validate().is_ok());
        }
        for rating in [0, 6, 255] {
            assert!(NewFeedback { comments: None, rating }.validate().is_err());
        }
    }

    #[test]
    fn user_email_and_username_rules() {
        let mut user = NewUser {
            username: "staff1".to_string(),
            email: "staff1@city.gov".to_string(),
            first_name: None,
            phone: Some("+15550100".to_string()),
            is_staff: true,
        };
        assert!(user.validate().is_ok());

        user.email = "not-an-email".to_string();
        user.username = "bad name".to_string();
        let err = user.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["username", "email"]);
    }

    #[test]
    fn email_shapes() {
        assert!(is_plausible_email("a@b.c"));
        assert!(!is_plausible_email("a@@b.c"));
        assert!(!is_plausible_email("@b.c"));
        assert!(!is_plausible_email("a@"));
        assert!(!is_plausible_email("a b@c.d"));
    }

    #[test]
    fn reference_name_required() {
        let category = NewCategory {
            name: String::new(),
            contact_info: "roads@city.gov".to_string(),
        };
        assert_eq!(category.validate().unwrap_err().fields(), vec!["name"]);
    }
}
