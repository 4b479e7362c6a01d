//! Booking records — the durable `ServiceRequest` committing a customer to
//! a dealership for the top-N candidate problems, and its status machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::VehicleMeta;
use crate::session::RankedProblem;

/// Lifecycle status of a service request.
///
/// Transitions are strictly linear: `Requested → Approved → InProgress →
/// Completed`. One step forward at a time, never backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Requested,
    Approved,
    InProgress,
    Completed,
}

impl RequestStatus {
    fn rank(self) -> u8 {
        match self {
            RequestStatus::Requested => 0,
            RequestStatus::Approved => 1,
            RequestStatus::InProgress => 2,
            RequestStatus::Completed => 3,
        }
    }

    /// The next status in the linear lifecycle, if any.
    pub fn next(self) -> Option<RequestStatus> {
        match self {
            RequestStatus::Requested => Some(RequestStatus::Approved),
            RequestStatus::Approved => Some(RequestStatus::InProgress),
            RequestStatus::InProgress => Some(RequestStatus::Completed),
            RequestStatus::Completed => None,
        }
    }

    /// Whether moving from `self` to `to` is a valid single forward step.
    pub fn can_transition_to(self, to: RequestStatus) -> bool {
        to.rank() == self.rank() + 1
    }

    /// Wire form of the status, matching its serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Requested => "requested",
            RequestStatus::Approved => "approved",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
        }
    }
}

/// A booking, created by the booking coordinator in state `Requested` and
/// mutated thereafter only through the dealership-side update path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub request_id: Uuid,
    pub customer_id: String,
    pub vehicle: VehicleMeta,
    pub dealership_id: String,
    /// The full candidate set at booking time (1..=N problems).
    pub candidate_problems: Vec<RankedProblem>,
    /// Set by the dealership once it disambiguates; must belong to
    /// `candidate_problems`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_problem: Option<String>,
    pub status: RequestStatus,
    /// Confirmed cost, absent until the dealership finalizes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_cost: Option<f64>,
    /// Confirmed service time, absent until the dealership finalizes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_minutes: Option<u32>,
    /// The idempotency key the booking was created under.
    pub idempotency_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRequest {
    pub fn new(
        customer_id: impl Into<String>,
        vehicle: VehicleMeta,
        dealership_id: impl Into<String>,
        candidate_problems: Vec<RankedProblem>,
        idempotency_key: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            request_id: Uuid::now_v7(),
            customer_id: customer_id.into(),
            vehicle,
            dealership_id: dealership_id.into(),
            candidate_problems,
            selected_problem: None,
            status: RequestStatus::Requested,
            final_cost: None,
            final_minutes: None,
            idempotency_key: idempotency_key.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `problem_id` belongs to the candidate set of this request.
    pub fn has_candidate(&self, problem_id: &str) -> bool {
        self.candidate_problems
            .iter()
            .any(|p| p.problem_id == problem_id)
    }
}

/// Outcome of a create-booking call: a reused idempotency key returns the
/// original request rather than an error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BookingOutcome {
    Created { request: ServiceRequest },
    Existing { request: ServiceRequest },
}

impl BookingOutcome {
    pub fn request(&self) -> &ServiceRequest {
        match self {
            BookingOutcome::Created { request } | BookingOutcome::Existing { request } => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> VehicleMeta {
        VehicleMeta {
            vehicle_id: "VEH_0001_1".into(),
            model: "Model A".into(),
            age_months: 12,
        }
    }

    fn candidate(id: &str) -> RankedProblem {
        RankedProblem {
            problem_id: id.into(),
            name: format!("problem {id}"),
            description: String::new(),
            score: 0.5,
        }
    }

    #[test]
    fn status_moves_one_step_forward() {
        assert!(RequestStatus::Requested.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::InProgress));
        assert!(RequestStatus::InProgress.can_transition_to(RequestStatus::Completed));
    }

    #[test]
    fn status_never_moves_backward() {
        assert!(!RequestStatus::Completed.can_transition_to(RequestStatus::Requested));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Requested));
        assert!(!RequestStatus::InProgress.can_transition_to(RequestStatus::Approved));
    }

    #[test]
    fn status_never_skips() {
        assert!(!RequestStatus::Requested.can_transition_to(RequestStatus::InProgress));
        assert!(!RequestStatus::Requested.can_transition_to(RequestStatus::Completed));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Completed));
    }

    #[test]
    fn status_is_not_self_transitive() {
        assert!(!RequestStatus::Requested.can_transition_to(RequestStatus::Requested));
        assert!(!RequestStatus::Completed.can_transition_to(RequestStatus::Completed));
    }

    #[test]
    fn status_serialization() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::InProgress).unwrap(),
            r#""in_progress""#
        );
    }

    #[test]
    fn new_request_starts_requested_with_no_selection() {
        let request = ServiceRequest::new(
            "CUST_0001",
            vehicle(),
            "DEALER_001",
            vec![candidate("SP001"), candidate("SP002")],
            "key-1",
        );
        assert_eq!(request.status, RequestStatus::Requested);
        assert!(request.selected_problem.is_none());
        assert!(request.final_cost.is_none());
        assert!(request.has_candidate("SP001"));
        assert!(!request.has_candidate("SP999"));
    }

    #[test]
    fn completed_request_serializes_optionals() {
        let mut request = ServiceRequest::new(
            "CUST_0001",
            vehicle(),
            "DEALER_001",
            vec![candidate("SP001")],
            "key-2",
        );
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("selected_problem"));

        request.selected_problem = Some("SP001".into());
        request.final_cost = Some(600.0);
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""selected_problem":"SP001""#));
        assert!(json.contains(r#""final_cost":600.0"#));
    }
}
