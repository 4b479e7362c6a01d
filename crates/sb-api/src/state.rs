//! Shared application state for the Axum server.
//!
//! The catalog lives behind `CatalogStore` (immutable snapshots, swapped on
//! reload); sessions and bookings are in-memory engine components.
//! Persistence technology stays an external concern, so the ledger is the
//! process-local source of truth here.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use sb_catalog::{CatalogSnapshot, CatalogStore, sample};
use sb_engine::clarify::{HttpQuestionGenerator, TemplateQuestionGenerator};
use sb_engine::{
    AggregatorConfig, BookingLedger, CatalogEstimator, EstimateAggregator, LexicalMatcher,
    QuestionGenerator, SessionConfig, SessionEngine,
};

use crate::config::ApiConfig;
use crate::events::WsEvent;

/// Shared application state, wrapped in `Arc` for Axum handler sharing.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub sessions: Arc<SessionEngine>,
    pub bookings: Arc<BookingLedger>,
    pub aggregator: Arc<EstimateAggregator>,
    /// Broadcast channel for real-time WebSocket events.
    pub event_tx: broadcast::Sender<WsEvent>,
    /// Size of the finalized shortlist (N), shared with the booking path.
    pub top_n: usize,
}

impl AppState {
    /// Build state around a validated catalog snapshot.
    pub fn new(snapshot: CatalogSnapshot, config: &ApiConfig) -> Self {
        let session_config = SessionConfig::default();
        let questions: Arc<dyn QuestionGenerator> = if config.question_service.enabled {
            Arc::new(HttpQuestionGenerator::new(config.question_service.clone()))
        } else {
            Arc::new(TemplateQuestionGenerator)
        };

        let (event_tx, _) = broadcast::channel(256);
        Self {
            catalog: Arc::new(CatalogStore::new(snapshot)),
            sessions: Arc::new(SessionEngine::new(
                Arc::new(LexicalMatcher::default()),
                questions,
                session_config,
            )),
            bookings: Arc::new(BookingLedger::new(session_config.top_n)),
            aggregator: Arc::new(EstimateAggregator::new(
                Arc::new(CatalogEstimator),
                AggregatorConfig {
                    pair_timeout: Duration::from_millis(config.pair_timeout_ms),
                    overall_timeout: Duration::from_millis(config.overall_timeout_ms),
                },
            )),
            event_tx,
            top_n: session_config.top_n,
        }
    }

    /// Create state with the sample catalog (development and tests).
    pub fn with_sample_data() -> Self {
        Self::new(sample::catalog_snapshot(), &ApiConfig::default())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_sample_data()
    }
}
