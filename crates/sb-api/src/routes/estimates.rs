//! Estimation endpoints — explicit pair fan-out and session-driven
//! comparison sets.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use sb_domain::AggregateResult;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for an explicit estimate fan-out.
#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    /// Dealerships to quote; all catalog dealerships when omitted.
    #[serde(default)]
    pub dealership_ids: Vec<String>,
    pub problem_ids: Vec<String>,
    pub vehicle_age_months: u32,
}

/// POST /api/v1/estimates — fan out across (dealership, problem) pairs.
pub async fn estimate(
    State(state): State<AppState>,
    Json(req): Json<EstimateRequest>,
) -> ApiResult<Json<AggregateResult>> {
    if req.problem_ids.is_empty() {
        return Err(ApiError::BadRequest("problem_ids must not be empty".into()));
    }

    let snapshot = state.catalog.snapshot();
    let dealership_ids = if req.dealership_ids.is_empty() {
        snapshot
            .dealerships()
            .iter()
            .map(|d| d.dealership_id.clone())
            .collect()
    } else {
        req.dealership_ids
    };

    let result = state
        .aggregator
        .estimate(
            snapshot.clone(),
            &dealership_ids,
            &req.problem_ids,
            req.vehicle_age_months,
        )
        .await;
    Ok(Json(result))
}

/// GET /api/v1/sessions/{id}/estimates — quote a finalized session's
/// shortlist across every dealership.
pub async fn session_estimates(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<AggregateResult>> {
    let problems = state.sessions.finalized_problems(session_id).await?;
    let session = state.sessions.get(session_id).await?;

    let snapshot = state.catalog.snapshot();
    let dealership_ids: Vec<String> = snapshot
        .dealerships()
        .iter()
        .map(|d| d.dealership_id.clone())
        .collect();
    let problem_ids: Vec<String> = problems.iter().map(|p| p.problem_id.clone()).collect();

    let result = state
        .aggregator
        .estimate(
            snapshot.clone(),
            &dealership_ids,
            &problem_ids,
            session.vehicle.age_months,
        )
        .await;
    Ok(Json(result))
}
