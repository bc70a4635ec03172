//! Application entrypoint and state wiring.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use votechain_audit::config::AppConfig;
use votechain_audit::storage::FileChainStore;
use votechain_audit::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 0) logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // 1) config
    let config = AppConfig::from_env().context("invalid configuration")?;
    info!(chain_file = %config.chain_file.display(), "chain source");

    // 2) shared state
    let addr = config.bind_addr;
    let store = FileChainStore::new(config.chain_file.clone());
    let state = AppState::new(store, config);

    // 3) router
    let app = build_router(state);

    // 4) serve
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "dashboard api listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
