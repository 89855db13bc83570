//! Handler errors rendered as RFC 9457 problem details.
//!
//! Every failure a handler can return is an [`ApiError`]. Its
//! [`IntoResponse`] impl picks the status and writes an
//! `application/problem+json` body, except not-found which stays empty.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use todo_core::{StoreError, ValidationErrors};
use tracing::error;

/// Media type for problem bodies.
pub const PROBLEM_JSON: &str = "application/problem+json";

/// Title used for validation failures.
pub const VALIDATION_TITLE: &str = "One or more validation errors occurred.";

/// Errors returned by todo handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No task with the requested id. Rendered as an empty 404.
    #[error("todo not found")]
    NotFound,
    /// Creation rules failed.
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(ValidationErrors),
    /// The store refused or could not answer the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The request could not be decoded (bad JSON, bad path segment, oversize body).
    #[error("{detail}")]
    BadRequest {
        /// Status to answer with.
        status: StatusCode,
        /// What was wrong with the request.
        detail: String,
    },
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(StoreError::DuplicateId(_)) => StatusCode::CONFLICT,
            Self::Store(StoreError::Multiplicity { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest { status, .. } => *status,
        }
    }
}

/// Keep 413/415 from the framework; every other decode failure is a plain 400.
fn rejection_status(status: StatusCode) -> StatusCode {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE => status,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            status: rejection_status(rejection.status()),
            detail: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest {
            status: rejection_status(rejection.status()),
            detail: rejection.body_text(),
        }
    }
}

/// Problem details body.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails {
    /// Reference URI for the problem type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Short summary.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Occurrence-specific explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Field name → messages, for validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl ProblemDetails {
    /// Problem for `status` with the reason phrase as title.
    pub fn new(status: StatusCode) -> Self {
        Self {
            kind: type_uri(status).to_string(),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            status: status.as_u16(),
            detail: None,
            errors: None,
        }
    }

    /// Validation problem carrying per-field messages.
    pub fn validation(errors: ValidationErrors) -> Self {
        Self {
            title: VALIDATION_TITLE.to_string(),
            errors: Some(errors),
            ..Self::new(StatusCode::UNPROCESSABLE_ENTITY)
        }
    }

    /// Attach a detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        let _ = response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        response
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::NotFound => status.into_response(),
            Self::Validation(errors) => ProblemDetails::validation(errors).into_response(),
            Self::Store(err) => {
                if status.is_server_error() {
                    error!(error = %err, "task store invariant violated");
                }
                ProblemDetails::new(status).with_detail(err.to_string()).into_response()
            }
            Self::BadRequest { detail, .. } => ProblemDetails::new(status).with_detail(detail).into_response(),
        }
    }
}

/// RFC 9110 section reference for the statuses this service emits.
fn type_uri(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "https://tools.ietf.org/html/rfc9110#section-15.5.1",
        404 => "https://tools.ietf.org/html/rfc9110#section-15.5.5",
        409 => "https://tools.ietf.org/html/rfc9110#section-15.5.10",
        413 => "https://tools.ietf.org/html/rfc9110#section-15.5.14",
        415 => "https://tools.ietf.org/html/rfc9110#section-15.5.16",
        422 => "https://tools.ietf.org/html/rfc9110#section-15.5.21",
        _ => "https://tools.ietf.org/html/rfc9110#section-15.6.1",
    }
}
