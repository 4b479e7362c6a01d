//! Booking coordinator — the one durable write path with a correctness
//! requirement across concurrent callers.
//!
//! Creation is an atomic check-then-insert guarded by the client-supplied
//! idempotency key: a retried request returns the original booking instead
//! of creating a duplicate. Availability flags stay advisory; booking
//! never mutates them, so there are no capacity counters to corrupt.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use sb_catalog::CatalogSnapshot;
use sb_domain::{BookingOutcome, RankedProblem, RequestStatus, ServiceRequest, VehicleMeta};

use crate::error::{EngineError, EngineResult};
use crate::estimator::estimate_pair;

/// Input to a create-booking call.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_id: String,
    pub vehicle: VehicleMeta,
    pub dealership_id: String,
    /// The full candidate set at booking time, not just one problem.
    pub candidate_problems: Vec<RankedProblem>,
    pub idempotency_key: String,
}

/// Dealership-side mutation of a service request. All fields optional;
/// everything present is validated before anything is applied.
#[derive(Debug, Clone, Default)]
pub struct BookingUpdate {
    pub status: Option<RequestStatus>,
    pub selected_problem: Option<String>,
    pub final_cost: Option<f64>,
    pub final_minutes: Option<u32>,
}

#[derive(Default)]
struct LedgerInner {
    requests: HashMap<Uuid, ServiceRequest>,
    by_key: HashMap<String, Uuid>,
}

/// In-memory service-request ledger.
pub struct BookingLedger {
    /// Maximum candidate problems per booking (N).
    max_candidates: usize,
    inner: RwLock<LedgerInner>,
}

impl BookingLedger {
    pub fn new(max_candidates: usize) -> Self {
        Self {
            max_candidates,
            inner: RwLock::new(LedgerInner::default()),
        }
    }

    /// Create a booking, or return the existing one for a reused
    /// idempotency key. Check and insert happen under one write lock.
    pub async fn create(
        &self,
        booking: NewBooking,
        snapshot: &CatalogSnapshot,
    ) -> EngineResult<BookingOutcome> {
        if booking.candidate_problems.is_empty() {
            return Err(EngineError::InvalidInput(
                "a booking must reference at least one candidate problem".into(),
            ));
        }
        if booking.candidate_problems.len() > self.max_candidates {
            return Err(EngineError::InvalidInput(format!(
                "a booking may reference at most {} candidate problems",
                self.max_candidates
            )));
        }
        if booking.idempotency_key.trim().is_empty() {
            return Err(EngineError::InvalidInput("idempotency key is required".into()));
        }
        if snapshot.dealership(&booking.dealership_id).is_none() {
            return Err(EngineError::CatalogLookupMiss {
                kind: "dealership",
                id: booking.dealership_id,
            });
        }
        for candidate in &booking.candidate_problems {
            if snapshot.problem(&candidate.problem_id).is_none() {
                return Err(EngineError::CatalogLookupMiss {
                    kind: "problem",
                    id: candidate.problem_id.clone(),
                });
            }
        }

        let mut inner = self.inner.write().await;
        if let Some(existing_id) = inner.by_key.get(&booking.idempotency_key) {
            let request = inner.requests[existing_id].clone();
            tracing::info!(
                request_id = %request.request_id,
                idempotency_key = %booking.idempotency_key,
                "booking retried; returning original request"
            );
            return Ok(BookingOutcome::Existing { request });
        }

        let request = ServiceRequest::new(
            booking.customer_id,
            booking.vehicle,
            booking.dealership_id,
            booking.candidate_problems,
            booking.idempotency_key.clone(),
        );
        inner.by_key.insert(booking.idempotency_key, request.request_id);
        inner.requests.insert(request.request_id, request.clone());
        tracing::info!(
            request_id = %request.request_id,
            dealership_id = %request.dealership_id,
            candidates = request.candidate_problems.len(),
            "booking created"
        );
        Ok(BookingOutcome::Created { request })
    }

    /// Apply a dealership-side update. Rejections leave the stored record
    /// untouched.
    pub async fn update(
        &self,
        request_id: Uuid,
        update: BookingUpdate,
        snapshot: &CatalogSnapshot,
    ) -> EngineResult<ServiceRequest> {
        let mut inner = self.inner.write().await;
        let request = inner
            .requests
            .get(&request_id)
            .ok_or(EngineError::BookingNotFound(request_id))?;

        // Validate everything against the current record before mutating.
        if let Some(next) = update.status
            && !request.status.can_transition_to(next)
        {
            return Err(EngineError::InvalidTransition {
                detail: format!("{:?} -> {:?} is not allowed", request.status, next),
            });
        }
        if let Some(problem_id) = &update.selected_problem
            && !request.has_candidate(problem_id)
        {
            return Err(EngineError::InvalidInput(format!(
                "problem '{problem_id}' is not among this request's candidates"
            )));
        }

        // When the dealer selects a problem without supplying final
        // figures, recompute them from the current catalog snapshot.
        let mut final_cost = update.final_cost;
        let mut final_minutes = update.final_minutes;
        if let Some(problem_id) = &update.selected_problem
            && (final_cost.is_none() || final_minutes.is_none())
        {
            let estimate = estimate_pair(
                snapshot,
                &request.dealership_id,
                problem_id,
                request.vehicle.age_months,
            )?;
            final_cost = final_cost.or(Some(estimate.final_cost));
            final_minutes = final_minutes.or(Some(estimate.estimated_minutes));
        }

        let request = inner
            .requests
            .get_mut(&request_id)
            .expect("checked above under the same lock");
        if let Some(next) = update.status {
            request.status = next;
        }
        if update.selected_problem.is_some() {
            request.selected_problem = update.selected_problem;
        }
        if final_cost.is_some() {
            request.final_cost = final_cost;
        }
        if final_minutes.is_some() {
            request.final_minutes = final_minutes;
        }
        request.updated_at = Utc::now();

        tracing::info!(
            request_id = %request_id,
            status = ?request.status,
            selected = request.selected_problem.as_deref().unwrap_or("-"),
            "booking updated"
        );
        Ok(request.clone())
    }

    pub async fn get(&self, request_id: Uuid) -> EngineResult<ServiceRequest> {
        self.inner
            .read()
            .await
            .requests
            .get(&request_id)
            .cloned()
            .ok_or(EngineError::BookingNotFound(request_id))
    }

    /// All requests for one customer, most recent first.
    pub async fn for_customer(&self, customer_id: &str) -> Vec<ServiceRequest> {
        let inner = self.inner.read().await;
        let mut requests: Vec<ServiceRequest> = inner
            .requests
            .values()
            .filter(|r| r.customer_id == customer_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    /// All requests for one dealership, most recent first.
    pub async fn for_dealership(&self, dealership_id: &str) -> Vec<ServiceRequest> {
        let inner = self.inner.read().await;
        let mut requests: Vec<ServiceRequest> = inner
            .requests
            .values()
            .filter(|r| r.dealership_id == dealership_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sb_catalog::sample;

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
            score: 0.6,
        }
    }

    fn booking(key: &str) -> NewBooking {
        NewBooking {
            customer_id: "CUST_0001".into(),
            vehicle: vehicle(),
            dealership_id: "DEALER_001".into(),
            candidate_problems: vec![candidate("SP001"), candidate("SP002"), candidate("SP003")],
            idempotency_key: key.into(),
        }
    }

    #[tokio::test]
    async fn create_starts_requested_with_no_selection() {
        let ledger = BookingLedger::new(3);
        let snapshot = sample::catalog();
        let outcome = ledger.create(booking("key-1"), &snapshot).await.unwrap();
        let request = outcome.request();
        assert_eq!(request.status, RequestStatus::Requested);
        assert!(request.selected_problem.is_none());
        assert_eq!(request.candidate_problems.len(), 3);
    }

    #[tokio::test]
    async fn reused_idempotency_key_returns_original() {
        let ledger = BookingLedger::new(3);
        let snapshot = sample::catalog();
        let first = ledger.create(booking("key-1"), &snapshot).await.unwrap();
        let second = ledger.create(booking("key-1"), &snapshot).await.unwrap();

        assert!(matches!(first, BookingOutcome::Created { .. }));
        match &second {
            BookingOutcome::Existing { request } => {
                assert_eq!(request.request_id, first.request().request_id);
            }
            other => panic!("expected existing booking, got {other:?}"),
        }
        assert_eq!(ledger.for_customer("CUST_0001").await.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_creates_with_same_key_yield_one_request() {
        let ledger = Arc::new(BookingLedger::new(3));
        let snapshot = sample::catalog();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = ledger.clone();
            let snapshot = snapshot.clone();
            handles.push(tokio::spawn(async move {
                ledger.create(booking("racy-key"), &snapshot).await.unwrap()
            }));
        }
        let mut created = 0;
        let mut ids = Vec::new();
        for handle in handles {
            let outcome = handle.await.unwrap();
            if matches!(outcome, BookingOutcome::Created { .. }) {
                created += 1;
            }
            ids.push(outcome.request().request_id);
        }
        assert_eq!(created, 1);
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn empty_candidates_rejected() {
        let ledger = BookingLedger::new(3);
        let snapshot = sample::catalog();
        let mut bad = booking("key-1");
        bad.candidate_problems.clear();
        let err = ledger.create(bad, &snapshot).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn too_many_candidates_rejected() {
        let ledger = BookingLedger::new(3);
        let snapshot = sample::catalog();
        let mut bad = booking("key-1");
        bad.candidate_problems.push(candidate("SP004"));
        let err = ledger.create(bad, &snapshot).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unknown_dealership_rejected() {
        let ledger = BookingLedger::new(3);
        let snapshot = sample::catalog();
        let mut bad = booking("key-1");
        bad.dealership_id = "DEALER_404".into();
        let err = ledger.create(bad, &snapshot).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::CatalogLookupMiss { kind: "dealership", .. }
        ));
    }

    #[tokio::test]
    async fn status_advances_one_step_at_a_time() {
        let ledger = BookingLedger::new(3);
        let snapshot = sample::catalog();
        let outcome = ledger.create(booking("key-1"), &snapshot).await.unwrap();
        let id = outcome.request().request_id;

        for next in [
            RequestStatus::Approved,
            RequestStatus::InProgress,
            RequestStatus::Completed,
        ] {
            let updated = ledger
                .update(
                    id,
                    BookingUpdate {
                        status: Some(next),
                        ..Default::default()
                    },
                    &snapshot,
                )
                .await
                .unwrap();
            assert_eq!(updated.status, next);
        }
    }

    #[tokio::test]
    async fn skipping_or_reversing_status_is_rejected() {
        let ledger = BookingLedger::new(3);
        let snapshot = sample::catalog();
        let outcome = ledger.create(booking("key-1"), &snapshot).await.unwrap();
        let id = outcome.request().request_id;

        // Skip two steps.
        let err = ledger
            .update(
                id,
                BookingUpdate {
                    status: Some(RequestStatus::Completed),
                    ..Default::default()
                },
                &snapshot,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
        // The record is unchanged.
        assert_eq!(ledger.get(id).await.unwrap().status, RequestStatus::Requested);

        // Walk to Completed, then try to go backward.
        for next in [
            RequestStatus::Approved,
            RequestStatus::InProgress,
            RequestStatus::Completed,
        ] {
            ledger
                .update(
                    id,
                    BookingUpdate {
                        status: Some(next),
                        ..Default::default()
                    },
                    &snapshot,
                )
                .await
                .unwrap();
        }
        let err = ledger
            .update(
                id,
                BookingUpdate {
                    status: Some(RequestStatus::Requested),
                    ..Default::default()
                },
                &snapshot,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
        assert_eq!(ledger.get(id).await.unwrap().status, RequestStatus::Completed);
    }

    #[tokio::test]
    async fn selecting_a_problem_computes_final_figures() {
        let ledger = BookingLedger::new(3);
        let snapshot = sample::catalog();
        let outcome = ledger.create(booking("key-1"), &snapshot).await.unwrap();
        let id = outcome.request().request_id;

        let updated = ledger
            .update(
                id,
                BookingUpdate {
                    selected_problem: Some("SP001".into()),
                    ..Default::default()
                },
                &snapshot,
            )
            .await
            .unwrap();
        // Brake pads at DEALER_001, 12-month vehicle: 450 + 600 - 450.
        assert_eq!(updated.selected_problem.as_deref(), Some("SP001"));
        assert_eq!(updated.final_cost, Some(600.0));
        assert_eq!(updated.final_minutes, Some(60));
    }

    #[tokio::test]
    async fn selecting_outside_candidates_is_rejected() {
        let ledger = BookingLedger::new(3);
        let snapshot = sample::catalog();
        let outcome = ledger.create(booking("key-1"), &snapshot).await.unwrap();
        let id = outcome.request().request_id;

        let err = ledger
            .update(
                id,
                BookingUpdate {
                    selected_problem: Some("SP006".into()),
                    ..Default::default()
                },
                &snapshot,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
        assert!(ledger.get(id).await.unwrap().selected_problem.is_none());
    }

    #[tokio::test]
    async fn explicit_final_figures_are_kept() {
        let ledger = BookingLedger::new(3);
        let snapshot = sample::catalog();
        let outcome = ledger.create(booking("key-1"), &snapshot).await.unwrap();
        let id = outcome.request().request_id;

        let updated = ledger
            .update(
                id,
                BookingUpdate {
                    selected_problem: Some("SP001".into()),
                    final_cost: Some(999.0),
                    final_minutes: Some(75),
                    ..Default::default()
                },
                &snapshot,
            )
            .await
            .unwrap();
        assert_eq!(updated.final_cost, Some(999.0));
        assert_eq!(updated.final_minutes, Some(75));
    }

    #[tokio::test]
    async fn listings_are_most_recent_first() {
        let ledger = BookingLedger::new(3);
        let snapshot = sample::catalog();
        let first = ledger.create(booking("key-1"), &snapshot).await.unwrap();
        let mut second_booking = booking("key-2");
        second_booking.dealership_id = "DEALER_002".into();
        let second = ledger.create(second_booking, &snapshot).await.unwrap();

        let mine = ledger.for_customer("CUST_0001").await;
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].request_id, second.request().request_id);

        let dealer_one = ledger.for_dealership("DEALER_001").await;
        assert_eq!(dealer_one.len(), 1);
        assert_eq!(dealer_one[0].request_id, first.request().request_id);
    }
}
