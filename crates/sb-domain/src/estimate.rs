//! Estimate types — the computed (cost, time, availability) tuple for one
//! (dealership, problem) pair, and the grouped aggregation results.

use serde::{Deserialize, Serialize};

/// A cost/time estimate for one (dealership, problem) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub dealership_id: String,
    pub problem_id: String,
    /// Sum of part costs (dealer price when stocked, catalog price otherwise).
    pub parts_cost: f64,
    /// `labour_hours × hourly_rate` for the matched labour category.
    pub labour_cost: f64,
    /// Total warranty/insurance discount across required parts.
    pub discount: f64,
    /// `max(0, parts_cost + labour_cost − discount)`. Never negative.
    pub final_cost: f64,
    /// Base service minutes plus labour/bay availability penalties.
    pub estimated_minutes: u32,
    /// Whether every required part is in stock at this dealership.
    pub parts_available: bool,
    /// Max restock ETA across missing parts, in days. Reported separately
    /// from `estimated_minutes`: it is a scheduling delay, not service time.
    pub parts_eta_days: u32,
    /// Rule IDs whose discounts were applied, for audit.
    pub applied_rules: Vec<String>,
}

/// Why a single (dealership, problem) pair produced no estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The pair did not resolve within its individual timeout.
    Timeout,
    /// A referenced id was absent from the catalog.
    LookupMiss { detail: String },
    /// The estimator task failed.
    Error { detail: String },
}

/// One omitted (dealership, problem) pair, surfaced instead of failing the
/// whole aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialEstimateFailure {
    pub dealership_id: String,
    pub problem_id: String,
    pub reason: FailureReason,
}

/// All dealership estimates for one problem, sorted ascending by
/// `final_cost`, then `estimated_minutes`, then `dealership_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemEstimates {
    pub problem_id: String,
    pub problem_name: String,
    pub dealerships: Vec<Estimate>,
}

/// The fan-in result of one aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub estimates: Vec<ProblemEstimates>,
    /// Pairs that timed out or errored; never fails the batch.
    pub failures: Vec<PartialEstimateFailure>,
}
