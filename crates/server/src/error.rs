//! HTTP-facing errors for the charcache server.
//!
//! Each variant carries the underlying cause for logging; clients only ever
//! see the fixed message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use charcache_core::Error;
use serde::Serialize;

/// Request outcomes that end in an error response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Path parameter is not a valid character id.
    #[error("invalid character id {0:?}")]
    InvalidId(String),

    /// Reading the cache failed.
    #[error("database error: {0}")]
    Database(Error),

    /// A cached row exists but could not be decoded.
    #[error("cached data unreadable: {0}")]
    CorruptCache(Error),

    /// The upstream fetch failed or had no such character.
    #[error("fetch failed: {0}")]
    FetchFailed(Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

impl ApiError {
    /// Status code and client-facing message.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InvalidId(_) => (StatusCode::BAD_REQUEST, "Invalid character ID"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            ApiError::CorruptCache(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process cached data"),
            ApiError::FetchFailed(_) => (StatusCode::NOT_FOUND, "Character not found or fetch failed"),
        }
    }

    /// Classify a store read failure.
    pub fn from_store(err: Error) -> Self {
        match err {
            Error::CorruptEntry(_) => ApiError::CorruptCache(err),
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        (status, Json(ErrorResponse { error })).into_response()
    }
}
