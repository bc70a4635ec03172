//! Error types for lookups, chain loading, configuration and the HTTP layer.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Lookup of a block by position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("block {index} not found (chain has {len} blocks)")]
    NotFound { index: usize, len: usize },
}

/// Failure reading a persisted chain.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("chain file {0} does not exist")]
    Missing(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Invalid configuration value or combination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("activity window cannot be negative (got {0} minutes)")]
    NegativeActivityWindow(i64),
    #[error("activity scan depth cannot be 0")]
    ZeroScanDepth,
    #[error("eligible voter count cannot be 0")]
    ZeroEligibleVoters,
    #[error("voting end {end} is before start {start}")]
    VotingWindowInverted { start: i64, end: i64 },
    #[error("voting start and end must be configured together")]
    VotingWindowIncomplete,
}

/// Error returned by HTTP handlers, rendered as `{"error": ...}`.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<LookupError> for ApiError {
    fn from(_: LookupError) -> Self {
        ApiError::not_found("Block not found")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
