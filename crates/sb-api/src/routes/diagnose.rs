//! Diagnosis endpoints — session intake, clarification answers, and the
//! raw matcher.

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use sb_domain::{DiagnosisSession, VehicleMeta};
use sb_engine::SessionReply;

use crate::error::{ApiError, ApiResult};
use crate::events::WsEvent;
use crate::state::AppState;

/// Request body for starting a diagnosis session.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub customer_id: String,
    pub vehicle: VehicleMeta,
    /// Normalized symptom text (transcription happens upstream).
    pub text: String,
}

/// Request body for answering a clarification question.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub session_id: Uuid,
    pub answer: String,
}

/// Request body for a one-shot match (no session).
#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub vehicle: VehicleMeta,
    pub text: String,
}

/// POST /api/v1/diagnose — start a session from the first message.
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> ApiResult<Json<Value>> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("symptom text is required".into()));
    }

    let snapshot = state.catalog.snapshot();
    let (session_id, reply) = state
        .sessions
        .start(&req.customer_id, req.vehicle, &req.text, &snapshot)
        .await;

    publish_if_finalized(&state, session_id, &reply);
    Ok(Json(reply_json(session_id, &reply)))
}

/// POST /api/v1/diagnose/answer — advance a session with one answer.
pub async fn advance_session(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> ApiResult<Json<Value>> {
    if req.answer.trim().is_empty() {
        return Err(ApiError::BadRequest("answer text is required".into()));
    }

    let snapshot = state.catalog.snapshot();
    let reply = state
        .sessions
        .advance(req.session_id, &req.answer, &snapshot)
        .await?;

    publish_if_finalized(&state, req.session_id, &reply);
    Ok(Json(reply_json(req.session_id, &reply)))
}

/// POST /api/v1/match — rank catalog problems against symptom text.
pub async fn match_problems(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> ApiResult<Json<Value>> {
    let snapshot = state.catalog.snapshot();
    let ranked = state.sessions.match_only(&req.text, &req.vehicle, &snapshot)?;
    Ok(Json(json!({ "candidates": ranked })))
}

/// GET /api/v1/sessions/{id} — read-only session view.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<DiagnosisSession>> {
    let session = state.sessions.get(session_id).await?;
    Ok(Json(session))
}

fn reply_json(session_id: Uuid, reply: &SessionReply) -> Value {
    match reply {
        SessionReply::Question {
            text,
            number,
            total,
        } => json!({
            "session_id": session_id,
            "stage": "clarification",
            "question": text,
            "question_number": number,
            "total_questions": total,
        }),
        SessionReply::Finalized { problems } => json!({
            "session_id": session_id,
            "stage": "estimation",
            "top_problems": problems,
        }),
        SessionReply::Failed { message } => json!({
            "session_id": session_id,
            "stage": "error",
            "message": message,
        }),
    }
}

fn publish_if_finalized(state: &AppState, session_id: Uuid, reply: &SessionReply) {
    if let SessionReply::Finalized { problems } = reply {
        // Nobody listening is fine; send() only fails without receivers.
        let _ = state.event_tx.send(WsEvent::SessionFinalized {
            session_id,
            problem_ids: problems.iter().map(|p| p.problem_id.clone()).collect(),
            finalized_at: Utc::now(),
        });
    }
}
