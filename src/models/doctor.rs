use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A doctor record, keyed by the 10-character national ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub phone: String,
    pub address: String,
    /// Path relative to the avatar storage root, e.g. `Upload/img/doctor1234567890.png`.
    pub avatar: Option<String>,
    /// Optimistic-concurrency token, bumped on every update.
    pub row_version: i64,
}

impl Doctor {
    /// Avatar path if one is recorded and non-empty.
    pub fn avatar_path(&self) -> Option<&str> {
        self.avatar.as_deref().filter(|p| !p.is_empty())
    }
}

/// One page of the doctor list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorPage {
    pub doctors: Vec<Doctor>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u32,
}
