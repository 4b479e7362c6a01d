//! Diagnosis session types — the multi-turn conversation that narrows an
//! open-ended complaint to a ranked top-N set of candidate problems.
//!
//! A session is owned exclusively by its conversation: messages are
//! processed strictly in arrival order, and no state is shared between
//! concurrent sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::VehicleMeta;

/// Stage of a diagnosis session. Terminal at `Estimation` or `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStage {
    Intake,
    Clarification,
    Estimation,
    Error,
}

impl SessionStage {
    /// Whether no further messages can advance this session.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStage::Estimation | SessionStage::Error)
    }
}

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptRole {
    /// Normalized customer input (symptom text or a clarification answer).
    Customer,
    /// A clarifying question emitted by the session.
    Assistant,
}

/// One exchanged message in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: TranscriptRole,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn customer(text: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::Customer,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::Assistant,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// A candidate problem with its match score, as ranked by the matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedProblem {
    pub problem_id: String,
    pub name: String,
    /// First description fragment, for display in candidate lists.
    pub description: String,
    /// Deterministic match score in (0, 1].
    pub score: f64,
}

/// A stateful diagnosis conversation.
///
/// Created on the first customer message; not persisted beyond booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisSession {
    pub session_id: Uuid,
    pub customer_id: String,
    pub vehicle: VehicleMeta,
    pub stage: SessionStage,
    /// Ordered log of exchanged messages.
    pub transcript: Vec<TranscriptEntry>,
    /// Working candidate set (wider than top-N) from the latest re-score.
    pub candidates: Vec<RankedProblem>,
    /// Clarifying questions asked so far.
    pub questions_asked: u8,
    /// Top-N IDs from the previous turn, for convergence detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_top: Option<Vec<String>>,
    /// Consecutive turns (including the latest) with an unchanged top-N.
    pub stable_turns: u8,
    pub created_at: DateTime<Utc>,
}

impl DiagnosisSession {
    pub fn new(customer_id: impl Into<String>, vehicle: VehicleMeta) -> Self {
        Self {
            session_id: Uuid::now_v7(),
            customer_id: customer_id.into(),
            vehicle,
            stage: SessionStage::Intake,
            transcript: Vec::new(),
            candidates: Vec::new(),
            questions_asked: 0,
            previous_top: None,
            stable_turns: 0,
            created_at: Utc::now(),
        }
    }

    /// The finalized top-N candidate IDs, empty before `Estimation`.
    pub fn top_ids(&self, n: usize) -> Vec<String> {
        self.candidates
            .iter()
            .take(n)
            .map(|c| c.problem_id.clone())
            .collect()
    }
}
