//! Uniform `{error}` responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Returned to callers that fail the admin check.
pub const ACCESS_DENIED: &str = "Accès refusé";
/// Returned when listing the catalogue fails.
pub const DATABASE_ERROR: &str = "Erreur base de données";
/// Returned when a PDF could not be forwarded to the media host.
pub const UPLOAD_FAILED: &str = "Erreur upload PDF";
/// Returned when generating or storing a cover image fails.
pub const GENERATION_FAILED: &str = "Erreur génération image";

/// Error body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// Missing or wrong admin credential (401).
    Unauthorized,
    /// Anything else, including unparseable input (500).
    Downstream(String),
}

impl ApiError {
    pub fn downstream(message: impl Into<String>) -> Self {
        ApiError::Downstream(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Downstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized => ACCESS_DENIED,
            ApiError::Downstream(message) => message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
