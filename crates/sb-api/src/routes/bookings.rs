//! Booking endpoints — creation with idempotency, the dealership-side
//! update path, and customer/dealership views.

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use sb_domain::{BookingOutcome, RankedProblem, RequestStatus, ServiceRequest, VehicleMeta};
use sb_engine::{BookingUpdate, NewBooking};

use crate::error::{ApiError, ApiResult};
use crate::events::WsEvent;
use crate::state::AppState;

/// Request body for creating a booking.
///
/// The candidate set comes either from a finalized diagnosis session
/// (`session_id`) or as explicit `problem_ids`.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub customer_id: String,
    pub vehicle: VehicleMeta,
    pub dealership_id: String,
    #[serde(default)]
    pub session_id: Option<Uuid>,
    #[serde(default)]
    pub problem_ids: Vec<String>,
    /// Client-supplied key; retries with the same key return the original
    /// booking.
    pub idempotency_key: String,
}

/// Request body for the dealership-side update.
#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub selected_problem_id: Option<String>,
    #[serde(default)]
    pub final_cost: Option<f64>,
    #[serde(default)]
    pub final_time_minutes: Option<u32>,
}

/// POST /api/v1/bookings — create a service request.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> ApiResult<Json<BookingOutcome>> {
    let snapshot = state.catalog.snapshot();

    let candidates = match req.session_id {
        Some(session_id) => state.sessions.finalized_problems(session_id).await?,
        None => {
            if req.problem_ids.is_empty() {
                return Err(ApiError::BadRequest(
                    "either session_id or problem_ids is required".into(),
                ));
            }
            req.problem_ids
                .iter()
                .map(|problem_id| {
                    let problem = snapshot.problem(problem_id).ok_or_else(|| {
                        ApiError::NotFound(format!("problem '{problem_id}' not found in catalog"))
                    })?;
                    Ok(RankedProblem {
                        problem_id: problem.problem_id.clone(),
                        name: problem.name.clone(),
                        description: problem.description.first().cloned().unwrap_or_default(),
                        score: 0.0,
                    })
                })
                .collect::<ApiResult<Vec<_>>>()?
        }
    };

    let outcome = state
        .bookings
        .create(
            NewBooking {
                customer_id: req.customer_id,
                vehicle: req.vehicle,
                dealership_id: req.dealership_id,
                candidate_problems: candidates,
                idempotency_key: req.idempotency_key,
            },
            &snapshot,
        )
        .await?;

    if let BookingOutcome::Created { request } = &outcome {
        let _ = state.event_tx.send(WsEvent::BookingCreated {
            request_id: request.request_id,
            customer_id: request.customer_id.clone(),
            dealership_id: request.dealership_id.clone(),
            candidate_count: request.candidate_problems.len(),
            created_at: request.created_at,
        });
    }
    Ok(Json(outcome))
}

/// GET /api/v1/bookings/{id} — booking detail.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<ServiceRequest>> {
    let request = state.bookings.get(request_id).await?;
    Ok(Json(request))
}

/// PUT /api/v1/bookings/{id} — dealership-side mutation path.
pub async fn update_booking(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(req): Json<UpdateBookingRequest>,
) -> ApiResult<Json<ServiceRequest>> {
    let snapshot = state.catalog.snapshot();
    let updated = state
        .bookings
        .update(
            request_id,
            BookingUpdate {
                status: req.status,
                selected_problem: req.selected_problem_id,
                final_cost: req.final_cost,
                final_minutes: req.final_time_minutes,
            },
            &snapshot,
        )
        .await?;

    let _ = state.event_tx.send(WsEvent::BookingUpdated {
        request_id: updated.request_id,
        dealership_id: updated.dealership_id.clone(),
        status: updated.status.as_str().to_string(),
        selected_problem: updated.selected_problem.clone(),
        updated_at: Utc::now(),
    });
    Ok(Json(updated))
}

/// GET /api/v1/customers/{id}/bookings — customer view.
pub async fn customer_bookings(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Json<Value> {
    let bookings = state.bookings.for_customer(&customer_id).await;
    Json(json!({ "bookings": bookings }))
}

/// GET /api/v1/dealerships/{id}/bookings — dealership view.
pub async fn dealership_bookings(
    State(state): State<AppState>,
    Path(dealership_id): Path<String>,
) -> Json<Value> {
    let bookings = state.bookings.for_dealership(&dealership_id).await;
    Json(json!({ "bookings": bookings }))
}
