//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /health — liveness check plus a catalog summary.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.catalog.snapshot();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "problems": snapshot.problems().len(),
        "dealerships": snapshot.dealerships().len(),
    }))
}
