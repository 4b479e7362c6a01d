//! ServiceBay API — estimation and booking REST server.
//!
//! Diagnosis sessions, per-dealership estimates, and booking coordination
//! over a validated catalog snapshot. Pointed at a catalog file via
//! `CATALOG_PATH`; falls back to the built-in sample catalog otherwise.

mod config;
mod error;
pub mod events;
mod routes;
mod state;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sb_catalog::{load_catalog_str, sample};

use crate::config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sb-api starting");

    let config = ApiConfig::from_env();

    // Load the catalog from CATALOG_PATH if set, otherwise use sample data.
    let snapshot = if let Ok(path) = std::env::var("CATALOG_PATH") {
        tracing::info!(path = %path, "loading catalog");
        let text = std::fs::read_to_string(&path)?;
        load_catalog_str(&text)?
    } else {
        tracing::warn!("CATALOG_PATH not set — using built-in sample catalog");
        sample::catalog_snapshot()
    };

    let state = AppState::new(snapshot, &config);
    let app = routes::build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
