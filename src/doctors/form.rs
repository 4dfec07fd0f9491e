use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Doctor;

/// Date format of the `Date` form field.
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw doctor fields as submitted by the create/edit form.
///
/// Every field is kept as text so validation can report each problem
/// against the field that caused it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DoctorForm {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub date: String,
    pub gender: String,
    pub phone: String,
    pub address: String,
    pub avatar: Option<String>,
    /// Version the editor loaded; `None` means last-writer-wins.
    pub row_version: Option<i64>,
}

impl DoctorForm {
    /// Build the form model for an existing record (edit screen).
    pub fn from_doctor(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id.clone(),
            full_name: doctor.full_name.clone(),
            email: doctor.email.clone(),
            date: doctor.date_of_birth.format(FORM_DATE_FORMAT).to_string(),
            gender: doctor.gender.clone(),
            phone: doctor.phone.clone(),
            address: doctor.address.clone(),
            avatar: doctor.avatar.clone(),
            row_version: Some(doctor.row_version),
        }
    }

    /// Convert an already validated form into a `Doctor`.
    ///
    /// Returns `None` only if the date does not parse, which validation
    /// reports first.
    pub(crate) fn to_doctor(&self, row_version: i64) -> Option<Doctor> {
        let date_of_birth = NaiveDate::parse_from_str(self.date.trim(), FORM_DATE_FORMAT).ok()?;
        Some(Doctor {
            id: self.id.clone(),
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            date_of_birth,
            gender: self.gender.trim().to_string(),
            phone: self.phone.clone(),
            address: self.address.trim().to_string(),
            avatar: self.avatar.clone().filter(|a| !a.is_empty()),
            row_version,
        })
    }
}

/// An uploaded avatar file from the `uploadAvatar` form field.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl AvatarUpload {
    /// A zero-length upload counts as no upload at all.
    pub fn non_empty(upload: Option<AvatarUpload>) -> Option<AvatarUpload> {
        upload.filter(|u| !u.content.is_empty())
    }
}
