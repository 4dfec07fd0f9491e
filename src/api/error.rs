//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::doctors::{DoctorForm, FieldError, ServiceError, EDIT_FAILED_MESSAGE};

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
    /// Submitted form, echoed back so the screen can be re-displayed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<DoctorForm>,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation failed")]
    Validation {
        errors: Vec<FieldError>,
        form: Option<Box<DoctorForm>>,
    },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Edit failed: {0}")]
    EditFailed(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Attach the submitted form to a validation error.
    pub fn with_form(self, form: &DoctorForm) -> Self {
        match self {
            ApiError::Validation { errors, .. } => ApiError::Validation {
                errors,
                form: Some(Box::new(form.clone())),
            },
            other => other,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut fields = Vec::new();
        let mut form = None;

        let (status, code, message) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::Validation {
                errors,
                form: submitted,
            } => {
                fields = errors;
                form = submitted.map(|f| *f);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_FAILED",
                    "One or more fields are invalid".to_string(),
                )
            }
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail),
            ApiError::EditFailed(detail) => {
                tracing::error!(%detail, "Doctor edit failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EDIT_FAILED",
                    EDIT_FAILED_MESSAGE.to_string(),
                )
            }
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                fields,
            },
            form,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => ApiError::Validation { errors, form: None },
            ServiceError::NotFound(id) => ApiError::NotFound(format!("Doctor {id} not found")),
            ServiceError::Conflict(id) => {
                ApiError::Conflict(format!("A doctor with id {id} already exists"))
            }
            ServiceError::Concurrency(id) => ApiError::EditFailed(format!(
                "doctor {id} was changed by another request"
            )),
            ServiceError::Database(e) => ApiError::Internal(e.to_string()),
            ServiceError::FileSystem(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<crate::db::DatabaseError> for ApiError {
    fn from(err: crate::db::DatabaseError) -> Self {
        ServiceError::from(err).into()
    }
}
