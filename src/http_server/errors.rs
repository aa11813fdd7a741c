//! HTTP Error Mapping
//!
//! Converts module errors into `{"error", "code"}` JSON responses.
//! Storage detail never reaches the body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::catalog::CatalogError;
use crate::media::MediaError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 for a body that could not be read
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_code(code: u16, message: String) -> Self {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, message)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        // Display for Retrieval is the opaque "retrieval failed"
        Self::from_code(err.status_code(), err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = if err.is_client_error() {
            err.to_string()
        } else {
            "Internal error".to_string()
        };
        Self::from_code(err.status_code(), message)
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        let message = match &err {
            MediaError::IoError(_) => "image store failed".to_string(),
            other => other.to_string(),
        };
        Self::from_code(err.status_code(), message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}
