//! REST API handlers and shared request helpers

pub mod grade;
pub mod health;
pub mod metrics;
pub mod room;

use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;

/// Parse a path segment made of ASCII digits only
pub(crate) fn parse_id(raw: &str) -> Result<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidId(raw.to_string()));
    }
    raw.parse()
        .map_err(|_| AppError::InvalidId(raw.to_string()))
}

/// Decode a JSON request body. Malformed payloads are internal errors.
///
/// Handlers call this before checking the token.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("decoding request body: {}", e)))
}
