//! Shared types for the doctors API layer.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use serde::Serialize;

use crate::avatar::AvatarStore;
use crate::config::AppConfig;
use crate::db::{self, DatabaseError};
use crate::doctors::{DoctorForm, DoctorService, FieldError};
use crate::models::Doctor;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
///
/// Holds configuration only; every request opens its own connection.
#[derive(Clone)]
pub struct ApiContext {
    pub db_path: Arc<PathBuf>,
    pub avatars: AvatarStore,
}

impl ApiContext {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db_path: Arc::new(config.db_path.clone()),
            avatars: AvatarStore::new(config.storage_root.clone()),
        }
    }

    /// Open a database connection for this request.
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        db::open_database(&self.db_path)
    }

    pub fn service<'a>(&'a self, conn: &'a Connection) -> DoctorService<'a> {
        DoctorService::new(conn, &self.avatars)
    }
}

// ═══════════════════════════════════════════════════════════
// Response bodies
// ═══════════════════════════════════════════════════════════

/// `GET /doctors` view model.
#[derive(Debug, Serialize)]
pub struct DoctorListResponse {
    pub doctors: Vec<Doctor>,
    pub current_filter: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
    pub status_message: Option<&'static str>,
}

/// Form view returned by the create/edit screens and on validation failure.
#[derive(Debug, Serialize)]
pub struct DoctorFormResponse {
    pub form: DoctorForm,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}
