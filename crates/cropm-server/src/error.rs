//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. Most studio
//! endpoints report failure in-band (HTTP 200 with `success: false`); the
//! package creation and import endpoints use real HTTP status codes. Both
//! shapes share the same JSON body.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use cropm_core::CoreError;
use cropm_toolkit::ToolkitError;

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code (e.g., "BAD_REQUEST").
    pub code: &'static str,
    /// Human-readable error message.
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Invalid request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or wrong credentials (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),

    /// Operation failed; reported with HTTP 200 and `success: false`.
    #[error("{0}")]
    Unsuccessful(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unsuccessful(_) => StatusCode::OK,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Unsuccessful(_) => "UNSUCCESSFUL",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::InternalError(msg)
            | ApiError::Unsuccessful(msg) => msg,
        }
    }

    /// A body that could not be read, reported in-band.
    pub fn in_band(rejection: JsonRejection) -> Self {
        ApiError::Unsuccessful(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            success: false,
            code: self.code(),
            error: self.message().to_string(),
        };
        (self.status(), axum::Json(body)).into_response()
    }
}

/// Unreadable bodies are bad requests unless the endpoint reports in-band.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Unsuccessful(err.to_string())
    }
}

impl From<ToolkitError> for ApiError {
    fn from(err: ToolkitError) -> Self {
        ApiError::Unsuccessful(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsuccessful_is_reported_in_band() {
        let err = ApiError::Unsuccessful("Error fetching the model".into());
        assert_eq!(err.status(), StatusCode::OK);
        assert_eq!(err.to_string(), "Error fetching the model");
    }

    #[test]
    fn core_errors_keep_their_message() {
        let err: ApiError = CoreError::UnknownModelType {
            name: "crop".into(),
        }
        .into();
        assert_eq!(err.message(), "Unknown model type: crop");
        assert_eq!(err.code(), "UNSUCCESSFUL");
    }
}
