//! Engine error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur inside the estimation and booking engine.
///
/// Per-pair estimator failures are absorbed by the aggregator and surfaced
/// as tagged omissions, not through this type; booking atomicity violations
/// are surfaced to the caller verbatim.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The matcher could not clear the relevance threshold. Recoverable:
    /// the caller re-prompts the customer for more detail.
    #[error("no candidate problems cleared the relevance threshold")]
    NoCandidatesFound,

    /// A status/stage change violates the state machine. The original
    /// state is left unchanged.
    #[error("invalid transition: {detail}")]
    InvalidTransition { detail: String },

    /// A referenced id is absent from the catalog. Fatal for the single
    /// computation that needed it; shared state is untouched.
    #[error("{kind} '{id}' not found in catalog")]
    CatalogLookupMiss { kind: &'static str, id: String },

    #[error("session '{0}' not found")]
    SessionNotFound(Uuid),

    #[error("service request '{0}' not found")]
    BookingNotFound(Uuid),

    /// Malformed caller input (e.g. an empty candidate set).
    #[error("{0}")]
    InvalidInput(String),
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;
