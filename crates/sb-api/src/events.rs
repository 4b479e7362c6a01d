//! Real-time event types broadcast over WebSocket connections.
//!
//! Customer and dealership views both subscribe here, so a booking created
//! or updated on one side becomes visible on the other without polling.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Server-sent events pushed to WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEvent {
    /// A new service request was booked.
    BookingCreated {
        request_id: Uuid,
        customer_id: String,
        dealership_id: String,
        candidate_count: usize,
        created_at: DateTime<Utc>,
    },

    /// A dealership updated a service request.
    BookingUpdated {
        request_id: Uuid,
        dealership_id: String,
        status: String,
        selected_problem: Option<String>,
        updated_at: DateTime<Utc>,
    },

    /// A diagnosis session finalized its shortlist.
    SessionFinalized {
        session_id: Uuid,
        problem_ids: Vec<String>,
        finalized_at: DateTime<Utc>,
    },
}
