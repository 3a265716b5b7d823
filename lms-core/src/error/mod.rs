//! Unified error handling for LMS Core

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Public messages. Every variant maps to exactly one of these.
pub const MSG_CONVERT_ID: &str = "converting id error";
pub const MSG_BAD_REQUEST: &str = "error bad request";
pub const MSG_CONFLICT: &str = "error conflict";
pub const MSG_NO_RECORDS: &str = "error no records";
pub const MSG_INTERNAL: &str = "internal server error";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Zero rows matched. Repositories return this instead of an empty `Option`.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Map a write failure, turning unique-constraint violations into `Conflict`.
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("{} already exists", what))
            }
            _ => AppError::Database(err),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidId(_)
            | AppError::BadRequest(_)
            | AppError::Validation(_)
            | AppError::Jwt(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::InvalidId(_) => MSG_CONVERT_ID,
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::Jwt(_) => {
                MSG_BAD_REQUEST
            }
            AppError::Conflict(_) => MSG_CONFLICT,
            AppError::NotFound(_) => MSG_NO_RECORDS,
            AppError::Database(_) | AppError::Internal(_) => MSG_INTERNAL,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Internal(e) => tracing::error!("Internal error: {:?}", e),
            AppError::Jwt(e) => tracing::debug!("Rejected token: {}", e),
            other => tracing::debug!("Request failed: {}", other),
        }

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message: self.public_message().to_string(),
        });

        (status, body).into_response()
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
