//! Application error type shared by every layer.
//!
//! Errors carry a human-readable message and a JSON `details` payload. The HTTP
//! layer renders them as:
//!
//! ```json
//! { "error": { "code": "invalid_domain", "message": "...", "details": {} } }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error envelope, also embedded in batch insert results.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The input is not a syntactically valid hostname.
    #[error("invalid domain: {message}")]
    InvalidDomain { message: String, details: Value },

    /// Valid syntax, but no registrable domain or public suffix could be extracted.
    #[error("domain cannot be decomposed: {message}")]
    NotDecomposable { message: String, details: Value },

    /// The backing store failed or returned something other than the overflow signal.
    #[error("storage failure: {message}")]
    StorageFailure { message: String, details: Value },

    /// A storage operation ran past its deadline.
    #[error("storage timeout: {message}")]
    Timeout { message: String, details: Value },

    #[error("validation error: {message}")]
    Validation { message: String, details: Value },

    #[error("not found: {message}")]
    NotFound { message: String, details: Value },
}

impl AppError {
    pub fn invalid_domain(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidDomain {
            message: message.into(),
            details,
        }
    }
    pub fn not_decomposable(message: impl Into<String>, details: Value) -> Self {
        Self::NotDecomposable {
            message: message.into(),
            details,
        }
    }
    pub fn storage(message: impl Into<String>, details: Value) -> Self {
        Self::StorageFailure {
            message: message.into(),
            details,
        }
    }
    pub fn timeout(message: impl Into<String>, details: Value) -> Self {
        Self::Timeout {
            message: message.into(),
            details,
        }
    }
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    /// True for errors caused by the caller's input (never worth retrying).
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDomain { .. } | Self::NotDecomposable { .. }
        )
    }

    /// True for errors raised by the storage layer, including deadline expiry.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::StorageFailure { .. } | Self::Timeout { .. })
    }

    /// Returns the status code and envelope for this error.
    pub fn to_info(&self) -> (StatusCode, ErrorInfo) {
        let (status, code, message, details) = match self {
            AppError::InvalidDomain { message, details } => {
                (StatusCode::BAD_REQUEST, "invalid_domain", message, details)
            }
            AppError::NotDecomposable { message, details } => {
                (StatusCode::BAD_REQUEST, "public_suffix", message, details)
            }
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::Timeout { message, details } => {
                (StatusCode::GATEWAY_TIMEOUT, "timeout", message, details)
            }
            AppError::StorageFailure { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                message,
                details,
            ),
        };

        (
            status,
            ErrorInfo {
                code,
                message: message.clone(),
                details: details.clone(),
            },
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.to_info();

        if status.is_server_error() {
            tracing::error!(code = error.code, message = %error.message, "Request failed");
        }

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::bad_request("Validation failed", json!(errors))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            return AppError::storage(
                "Database error",
                json!({ "reason": db.message(), "constraint": db.constraint() }),
            );
        }

        AppError::storage("Database error", json!({ "reason": e.to_string() }))
    }
}
