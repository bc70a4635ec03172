//! Read-only verifier and tally engine for a hash-linked chain of vote blocks.
//!
//! The engine (`verify`, `stats`, `activity`) is a set of pure functions
//! over a block slice. `storage` supplies the slice and `routes` serves the
//! results as JSON.

pub mod activity;
pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod stats;
pub mod storage;
pub mod verify;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use config::AppConfig;
use storage::ChainSource;

pub use activity::{recent_activity, recent_activity_at};
pub use error::{ApiError, ConfigError, LookupError, StoreError};
pub use model::{
    ActivityEntry, ActivityStatus, Block, CandidateResult, ChainOrigin, ChainSnapshot, Finding,
    IssueCode, Statistics, VerificationResult, VoteRecord, VotingPeriod, DIFFICULTY_PREFIX,
};
pub use stats::{aggregate, aggregate_at};
pub use verify::{get_block, verify, verify_at};

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ChainSource>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(source: impl ChainSource + 'static, config: AppConfig) -> Self {
        Self {
            source: Arc::new(source),
            config: Arc::new(config),
        }
    }
}

/// Router with every dashboard endpoint mounted.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/blockchain", get(routes::get_blockchain))
        .route("/api/statistics", get(routes::get_statistics))
        .route("/api/status", get(routes::get_status))
        .route("/api/activity/recent", get(routes::get_recent_activity))
        .route("/api/verify", post(routes::verify_chain))
        .route("/api/block/:index", get(routes::get_block_at))
        .route("/api/export/audit", get(routes::export_audit))
        .route("/health", get(routes::health))
        .route("/version", get(routes::version))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
