//! Common error types and handling for Voyage

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of the contract a rejection belongs to.
///
/// Callers use this to decide whether to fix their input, surface a conflict
/// to their own user, or retry later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself is invalid (400)
    ClientInput,
    /// The request conflicts with the current aggregate state (409)
    StateConflict,
    /// An upstream dependency could not answer (503)
    Upstream,
}

impl ErrorClass {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorClass::ClientInput => StatusCode::BAD_REQUEST,
            ErrorClass::StateConflict => StatusCode::CONFLICT,
            ErrorClass::Upstream => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorClass::ClientInput => "VALIDATION_ERROR",
            ErrorClass::StateConflict => "CONFLICT",
            ErrorClass::Upstream => "SERVICE_UNAVAILABLE",
        }
    }
}

/// Per-item failure reported inside `details`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub reason: String,
    pub message: String,
}

impl FieldError {
    pub fn new(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            message: message.into(),
        }
    }
}

/// Common error type for the Voyage service
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed for {field}: {} item(s) rejected", .errors.len())]
    InvalidFields {
        field: String,
        errors: BTreeMap<String, FieldError>,
    },

    #[error("{message}")]
    Rejected {
        class: ErrorClass,
        reason: &'static str,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidFields { .. } => StatusCode::BAD_REQUEST,
            Error::Rejected { class, .. } => class.status_code(),
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Unexpected(_)
            | Error::Database(_)
            | Error::Serialization(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Unexpected(_) => "UNEXPECTED_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Validation(_) | Error::InvalidFields { .. } => "VALIDATION_ERROR",
            Error::Rejected { class, .. } => class.error_code(),
            Error::NotFound(_) => "NOT_FOUND",
            Error::Conflict(_) => "CONFLICT",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Machine-readable rejection reason, when there is one
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Error::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Log internal errors with full context
        if matches!(status, StatusCode::INTERNAL_SERVER_ERROR) {
            tracing::error!(error = %self, "Internal server error");
        }

        let mut error = json!({
            "code": error_code,
            "message": self.to_string(),
        });

        if let Some(reason) = self.reason() {
            error["reason"] = json!(reason);
        }

        if let Error::InvalidFields { field, errors } = &self {
            let mut details = serde_json::Map::new();
            details.insert(field.clone(), json!(errors));
            error["details"] = serde_json::Value::Object(details);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
