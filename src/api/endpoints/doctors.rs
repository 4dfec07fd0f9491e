//! Doctor screens: list, details, create, edit, delete.
//!
//! Mutating routes take a multipart form (PascalCase text fields plus an
//! optional `uploadAvatar` file) and answer with a `303 See Other` back to
//! the list, carrying the outcome in `?status=`.

use axum::extract::{Multipart, Path, Query, State};
use axum::response::Redirect;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorFormResponse, DoctorListResponse};
use crate::config::MAX_AVATAR_BYTES;
use crate::doctors::{AvatarUpload, DoctorForm, StatusMessage};
use crate::models::Doctor;

/// Multipart field carrying the avatar file.
pub const UPLOAD_FIELD: &str = "uploadAvatar";

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    /// Kept as text so a malformed page falls back to the first page.
    pub page: Option<String>,
    pub status: Option<String>,
}

/// `GET /doctors` — one page of doctors, optionally filtered by id substring.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<DoctorListResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let page_number = query.page.as_deref().and_then(|p| p.trim().parse().ok());
    let page = ctx.service(&conn).list(query.search.clone(), page_number)?;

    let current_filter = query.search.filter(|s| !s.is_empty());
    let status_message = query
        .status
        .as_deref()
        .and_then(StatusMessage::from_code)
        .map(StatusMessage::message);

    Ok(Json(DoctorListResponse {
        doctors: page.doctors,
        current_filter,
        current_page: page.current_page,
        total_pages: page.total_pages,
        status_message,
    }))
}

/// `GET /doctors/:id`
pub async fn details(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Doctor>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = ctx.service(&conn).details(&id)?;
    Ok(Json(doctor))
}

/// `GET /doctors/create` — empty form.
pub async fn create_form() -> Json<DoctorFormResponse> {
    Json(DoctorFormResponse {
        form: DoctorForm::default(),
        errors: Vec::new(),
    })
}

/// `POST /doctors/create`
pub async fn create(
    State(ctx): State<ApiContext>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let (form, upload) = read_doctor_form(multipart).await?;
    let conn = ctx.open_db()?;

    ctx.service(&conn)
        .create(&form, upload)
        .map_err(|e| ApiError::from(e).with_form(&form))?;

    Ok(redirect_with(StatusMessage::Added))
}

/// `GET /doctors/edit/:id` — form pre-filled from the stored record.
pub async fn edit_form(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<DoctorFormResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = ctx.service(&conn).details(&id)?;
    Ok(Json(DoctorFormResponse {
        form: DoctorForm::from_doctor(&doctor),
        errors: Vec::new(),
    }))
}

/// `POST /doctors/edit/:id`
pub async fn edit(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let (form, upload) = read_doctor_form(multipart).await?;
    let conn = ctx.open_db()?;

    ctx.service(&conn)
        .edit(&id, &form, upload)
        .map_err(|e| ApiError::from(e).with_form(&form))?;

    Ok(redirect_with(StatusMessage::Edited))
}

/// `GET /doctors/delete/:id` — confirmation view.
pub async fn delete_confirm(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Doctor>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = ctx.service(&conn).details(&id)?;
    Ok(Json(doctor))
}

/// `POST /doctors/delete/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    let conn = ctx.open_db()?;
    match ctx.service(&conn).delete(&id)? {
        Some(_) => Ok(redirect_with(StatusMessage::Deleted)),
        None => {
            tracing::debug!(doctor_id = %id, "Delete requested for missing doctor");
            Ok(Redirect::to("/doctors"))
        }
    }
}

fn redirect_with(status: StatusMessage) -> Redirect {
    Redirect::to(&format!("/doctors?status={}", status.code()))
}

// ═══════════════════════════════════════════════════════════
// Multipart parsing
// ═══════════════════════════════════════════════════════════

/// Read the doctor form fields and the optional avatar file.
///
/// Unknown fields are ignored.
async fn read_doctor_form(
    mut multipart: Multipart,
) -> Result<(DoctorForm, Option<AvatarUpload>), ApiError> {
    let mut form = DoctorForm::default();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == UPLOAD_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Avatar upload failed: {e}")))?;
            if content.len() > MAX_AVATAR_BYTES {
                return Err(ApiError::BadRequest(format!(
                    "Avatar exceeds {} MB size limit ({} bytes)",
                    MAX_AVATAR_BYTES / (1024 * 1024),
                    content.len()
                )));
            }
            upload = Some(AvatarUpload {
                file_name,
                content: content.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid field {name}: {e}")))?;

        match name.as_str() {
            "Id" => form.id = value,
            "FullName" => form.full_name = value,
            "Email" => form.email = value,
            "Date" => form.date = value,
            "Gender" => form.gender = value,
            "Phone" => form.phone = value,
            "Address" => form.address = value,
            "Avatar" => form.avatar = Some(value).filter(|v| !v.is_empty()),
            "RowVersion" => {
                form.row_version = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.trim().parse().map_err(|_| {
                        ApiError::BadRequest(format!("Invalid RowVersion: {value}"))
                    })?)
                };
            }
            _ => {}
        }
    }

    Ok((form, upload))
}
