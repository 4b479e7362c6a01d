//! Read-only catalog endpoints — problem search and dealership views used
//! by the dealership-side disambiguation flow.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query string for problem search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

/// Query string for the dealer parts view.
#[derive(Debug, Deserialize)]
pub struct PartsQuery {
    /// Restrict to the parts a specific problem needs.
    #[serde(default)]
    pub problem_id: Option<String>,
}

/// GET /api/v1/problems/search — substring search over the problem catalog.
pub async fn search_problems(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Value> {
    let snapshot = state.catalog.snapshot();
    let problems: Vec<Value> = snapshot
        .search_problems(&query.q, query.limit)
        .into_iter()
        .map(|p| json!(p))
        .collect();
    Json(json!({ "problems": problems }))
}

/// GET /api/v1/dealerships — dealership summaries (no resource listings).
pub async fn list_dealerships(State(state): State<AppState>) -> Json<Vec<Value>> {
    let snapshot = state.catalog.snapshot();
    let dealerships = snapshot
        .dealerships()
        .iter()
        .map(|d| {
            json!({
                "dealership_id": d.dealership_id,
                "name": d.name,
                "location": d.location,
                "phone": d.phone,
                "email": d.email,
                "rating": d.rating,
            })
        })
        .collect();
    Json(dealerships)
}

/// GET /api/v1/dealerships/{id}/labour — labour records for one dealer.
pub async fn dealership_labour(
    State(state): State<AppState>,
    Path(dealership_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let snapshot = state.catalog.snapshot();
    let dealer = snapshot
        .dealership(&dealership_id)
        .ok_or_else(|| ApiError::NotFound(format!("dealership '{dealership_id}' not found")))?;
    Ok(Json(json!({ "labour": dealer.labour })))
}

/// GET /api/v1/dealerships/{id}/parts — inventory view, optionally
/// restricted to one problem's required parts.
pub async fn dealership_parts(
    State(state): State<AppState>,
    Path(dealership_id): Path<String>,
    Query(query): Query<PartsQuery>,
) -> ApiResult<Json<Value>> {
    let snapshot = state.catalog.snapshot();
    let dealer = snapshot
        .dealership(&dealership_id)
        .ok_or_else(|| ApiError::NotFound(format!("dealership '{dealership_id}' not found")))?;

    let parts: Vec<_> = match &query.problem_id {
        Some(problem_id) => {
            let problem = snapshot.problem(problem_id).ok_or_else(|| {
                ApiError::NotFound(format!("problem '{problem_id}' not found"))
            })?;
            dealer
                .parts
                .iter()
                .filter(|p| problem.required_parts.contains(&p.part_id))
                .collect()
        }
        None => dealer.parts.iter().collect(),
    };
    Ok(Json(json!({ "parts": parts })))
}
