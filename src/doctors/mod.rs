//! Doctor management workflow.
//!
//! Sequences validation, the `doctors` table and the avatar store for the
//! create / edit / delete / list operations of the doctors screen.
//!
//! Ordering: an avatar file is always written before the database row that
//! references it. A failure between the two can leave an orphaned image on
//! disk; that is tolerated and not cleaned up automatically.

pub mod form;
pub mod validation;

use rusqlite::Connection;
use thiserror::Error;

use crate::avatar::{AvatarError, AvatarStore};
use crate::db::{self, DatabaseError};
use crate::models::{Doctor, DoctorFilter, DoctorPage};

pub use form::{AvatarUpload, DoctorForm};
pub use validation::{validate_doctor, FieldError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Doctor not found: {0}")]
    NotFound(String),

    #[error("Doctor already exists: {0}")]
    Conflict(String),

    #[error("Doctor {0} was modified or deleted by another request")]
    Concurrency(String),

    #[error(transparent)]
    Database(DatabaseError),

    #[error(transparent)]
    FileSystem(#[from] AvatarError),
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { id, .. } => ServiceError::NotFound(id),
            DatabaseError::Conflict { id, .. } => ServiceError::Conflict(id),
            DatabaseError::Concurrency { id, .. } => ServiceError::Concurrency(id),
            other => ServiceError::Database(other),
        }
    }
}

/// Shown when an edit loses to a concurrent writer.
pub const EDIT_FAILED_MESSAGE: &str = "Edit failed";

/// Short user-facing outcome of a successful mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    Added,
    Edited,
    Deleted,
}

impl StatusMessage {
    pub fn message(self) -> &'static str {
        match self {
            StatusMessage::Added => "Add success",
            StatusMessage::Edited => "Edit success",
            StatusMessage::Deleted => "Delete success",
        }
    }

    /// Token carried in the post-redirect query string.
    pub fn code(self) -> &'static str {
        match self {
            StatusMessage::Added => "added",
            StatusMessage::Edited => "edited",
            StatusMessage::Deleted => "deleted",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "added" => Some(StatusMessage::Added),
            "edited" => Some(StatusMessage::Edited),
            "deleted" => Some(StatusMessage::Deleted),
            _ => None,
        }
    }
}

/// Doctor workflow over one database connection and the avatar store.
pub struct DoctorService<'a> {
    conn: &'a Connection,
    avatars: &'a AvatarStore,
}

impl<'a> DoctorService<'a> {
    pub fn new(conn: &'a Connection, avatars: &'a AvatarStore) -> Self {
        Self { conn, avatars }
    }

    pub fn list(&self, search: Option<String>, page: Option<u32>) -> Result<DoctorPage, ServiceError> {
        let filter = DoctorFilter::new(search, page);
        Ok(db::list_doctors(self.conn, &filter)?)
    }

    pub fn details(&self, id: &str) -> Result<Doctor, ServiceError> {
        db::get_doctor(self.conn, id)?.ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    /// Create a doctor, then attach the uploaded avatar if one was sent.
    ///
    /// If recording the avatar path fails after the row was inserted, the
    /// doctor is still reported as created, without an avatar.
    pub fn create(
        &self,
        form: &DoctorForm,
        upload: Option<AvatarUpload>,
    ) -> Result<Doctor, ServiceError> {
        check_form(form)?;
        let mut doctor = form.to_doctor(0).ok_or_else(bad_date)?;
        // Only an upload may set the avatar path.
        doctor.avatar = None;

        let stored = db::insert_doctor(self.conn, &doctor)?;
        tracing::info!(doctor_id = %stored.id, "Doctor created");

        let Some(upload) = AvatarUpload::non_empty(upload) else {
            return Ok(stored);
        };

        let path = self
            .avatars
            .store(&stored.id, &upload.content, &upload.file_name)?;
        let with_avatar = Doctor {
            avatar: Some(path),
            ..stored.clone()
        };

        match db::update_doctor(self.conn, &with_avatar) {
            Ok(updated) => Ok(updated),
            Err(e) => {
                tracing::warn!(
                    doctor_id = %stored.id,
                    error = %e,
                    "Doctor created but avatar path could not be recorded"
                );
                Ok(stored)
            }
        }
    }

    /// Update a doctor's fields, replacing the avatar when a new one is uploaded.
    ///
    /// `route_id` must match the form's id. Without an upload the stored
    /// avatar path is kept as is.
    pub fn edit(
        &self,
        route_id: &str,
        form: &DoctorForm,
        upload: Option<AvatarUpload>,
    ) -> Result<Doctor, ServiceError> {
        if route_id != form.id {
            return Err(ServiceError::NotFound(route_id.to_string()));
        }

        check_form(form)?;

        let current = db::get_doctor(self.conn, route_id)?
            .ok_or_else(|| ServiceError::NotFound(route_id.to_string()))?;

        // Reject a stale editor before any avatar file is touched. The
        // versioned UPDATE below still catches writers that race past this.
        if form.row_version.is_some_and(|v| v != current.row_version) {
            tracing::warn!(doctor_id = %route_id, "Doctor edit based on a stale version");
            return Err(ServiceError::Concurrency(route_id.to_string()));
        }

        let expected_version = form.row_version.unwrap_or(current.row_version);
        let mut doctor = form.to_doctor(expected_version).ok_or_else(bad_date)?;
        doctor.avatar = current.avatar.clone();

        if let Some(upload) = AvatarUpload::non_empty(upload) {
            if let Some(old) = current.avatar_path() {
                self.avatars.remove(old)?;
            }
            let path = self
                .avatars
                .store(&doctor.id, &upload.content, &upload.file_name)?;
            doctor.avatar = Some(path);
        }

        match db::update_doctor(self.conn, &doctor) {
            Ok(updated) => {
                tracing::info!(doctor_id = %updated.id, row_version = updated.row_version, "Doctor edited");
                Ok(updated)
            }
            Err(DatabaseError::Concurrency { .. }) | Err(DatabaseError::NotFound { .. }) => {
                if db::doctor_exists(self.conn, route_id)? {
                    tracing::warn!(doctor_id = %route_id, "Doctor edit lost a concurrent update");
                    Err(ServiceError::Concurrency(route_id.to_string()))
                } else {
                    tracing::warn!(doctor_id = %route_id, "Doctor deleted during edit");
                    Err(ServiceError::NotFound(route_id.to_string()))
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a doctor and its avatar file.
    ///
    /// Returns the removed record, or `None` when there was nothing to delete.
    pub fn delete(&self, id: &str) -> Result<Option<Doctor>, ServiceError> {
        let Some(doctor) = db::get_doctor(self.conn, id)? else {
            return Ok(None);
        };

        if let Some(path) = doctor.avatar_path() {
            self.avatars.remove(path)?;
        }

        match db::delete_doctor(self.conn, id) {
            Ok(()) => {
                tracing::info!(doctor_id = %id, "Doctor deleted");
                Ok(Some(doctor))
            }
            Err(DatabaseError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn check_form(form: &DoctorForm) -> Result<(), ServiceError> {
    let errors = validate_doctor(form);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors))
    }
}

fn bad_date() -> ServiceError {
    ServiceError::Validation(vec![FieldError {
        field: "Date",
        message: "Date of birth must be YYYY-MM-DD".into(),
    }])
}
