//! Field-level validation for the doctor form.
//!
//! Runs once before any persistence step. Each failure is reported
//! against the form field name so the caller can show it next to the input.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use super::form::{DoctorForm, FORM_DATE_FORMAT};

pub const ID_LEN: usize = 10;
pub const PHONE_LEN: usize = 10;
pub const NAME_MAX: usize = 200;
pub const EMAIL_MAX: usize = 200;
pub const ADDRESS_MAX: usize = 200;
pub const GENDER_MAX: usize = 10;
pub const AVATAR_MAX: usize = 255;

const REQUIRED: &str = "Required";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap_or_else(|e| panic!("email regex: {e}"))
    })
}

/// Validate every field of the form and collect all failures.
pub fn validate_doctor(form: &DoctorForm) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if form.id.trim().is_empty() {
        errors.push(FieldError::new("Id", REQUIRED));
    } else if form.id.chars().count() != ID_LEN {
        errors.push(FieldError::new("Id", format!("Id is {ID_LEN} characters")));
    } else if form.id.contains(['/', '\\']) || form.id.contains("..") {
        // The id names the avatar file.
        errors.push(FieldError::new("Id", "Id must not contain path characters"));
    }

    check_text(&mut errors, "FullName", &form.full_name, NAME_MAX);

    if check_text(&mut errors, "Email", &form.email, EMAIL_MAX)
        && !email_regex().is_match(form.email.trim())
    {
        errors.push(FieldError::new("Email", "Email is not valid"));
    }

    if form.date.trim().is_empty() {
        errors.push(FieldError::new("Date", REQUIRED));
    } else if NaiveDate::parse_from_str(form.date.trim(), FORM_DATE_FORMAT).is_err() {
        errors.push(FieldError::new("Date", "Date of birth must be YYYY-MM-DD"));
    }

    check_text(&mut errors, "Gender", &form.gender, GENDER_MAX);

    if form.phone.trim().is_empty() {
        errors.push(FieldError::new("Phone", REQUIRED));
    } else if !form.phone.chars().all(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new("Phone", "Is number"));
    } else if form.phone.len() != PHONE_LEN {
        errors.push(FieldError::new(
            "Phone",
            format!("Phone number is {PHONE_LEN} numbers"),
        ));
    }

    check_text(&mut errors, "Address", &form.address, ADDRESS_MAX);

    if let Some(avatar) = &form.avatar {
        if avatar.chars().count() > AVATAR_MAX {
            errors.push(FieldError::new(
                "Avatar",
                format!("Avatar path is at most {AVATAR_MAX} characters"),
            ));
        }
    }

    errors
}

/// Required + max length. Returns true when the field passed.
fn check_text(errors: &mut Vec<FieldError>, field: &'static str, value: &str, max: usize) -> bool {
    let value = value.trim();
    if value.is_empty() {
        errors.push(FieldError::new(field, REQUIRED));
        return false;
    }
    if value.chars().count() > max {
        errors.push(FieldError::new(
            field,
            format!("{field} is at most {max} characters"),
        ));
        return false;
    }
    true
}
