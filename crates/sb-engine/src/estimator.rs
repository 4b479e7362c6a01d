//! Dealership estimator — cost/time composition for one (dealership,
//! problem) pair.
//!
//! Pure read/compute over a catalog snapshot: safe to invoke many times
//! concurrently for different dealerships without interference.

use std::sync::Arc;

use async_trait::async_trait;

use sb_catalog::CatalogSnapshot;
use sb_domain::{BayResource, Dealership, Estimate, LabourRecord};

use crate::error::{EngineError, EngineResult};
use crate::rules::evaluate_discount;

/// Assumed restock ETA when a dealership has no inventory row for a
/// required part at all (so no dealer-supplied ETA exists).
pub const ABSENT_PART_RESTOCK_DAYS: u32 = 7;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the estimate for one (dealership, problem) pair.
///
/// Missing dealership/problem ids, or a dealership with no labour record
/// or bay matching the problem's requirements, fail with
/// [`EngineError::CatalogLookupMiss`] for this pair alone.
pub fn estimate_pair(
    snapshot: &CatalogSnapshot,
    dealership_id: &str,
    problem_id: &str,
    vehicle_age_months: u32,
) -> EngineResult<Estimate> {
    let dealer = snapshot
        .dealership(dealership_id)
        .ok_or_else(|| EngineError::CatalogLookupMiss {
            kind: "dealership",
            id: dealership_id.to_string(),
        })?;
    let problem = snapshot
        .problem(problem_id)
        .ok_or_else(|| EngineError::CatalogLookupMiss {
            kind: "problem",
            id: problem_id.to_string(),
        })?;

    // Parts: dealer price when the dealership stocks the part, projected
    // catalog price otherwise. Restock ETA is the max across missing parts
    // and is reported separately from service minutes.
    let mut parts_cost = 0.0;
    let mut discount = 0.0;
    let mut parts_available = true;
    let mut parts_eta_days = 0u32;
    let mut applied_rules = Vec::new();

    for part_id in &problem.required_parts {
        let part = snapshot
            .part(part_id)
            .ok_or_else(|| EngineError::CatalogLookupMiss {
                kind: "part",
                id: part_id.clone(),
            })?;

        let stocked = dealer.parts.iter().find(|p| &p.part_id == part_id);
        let effective_cost = match stocked {
            Some(row) if row.in_stock => row.cost,
            Some(row) => {
                parts_available = false;
                parts_eta_days = parts_eta_days.max(row.eta_days);
                row.cost
            }
            None => {
                parts_available = false;
                parts_eta_days = parts_eta_days.max(ABSENT_PART_RESTOCK_DAYS);
                part.cost
            }
        };
        parts_cost += effective_cost;

        let outcome = evaluate_discount(
            part,
            effective_cost,
            vehicle_age_months,
            snapshot.rules_for_part(part_id),
        );
        discount += outcome.amount;
        if let Some(rule_id) = outcome.rule_id {
            applied_rules.push(rule_id);
        }
    }

    // Labour: select by category, preferring available technicians; an
    // unavailable category inflates the time estimate instead of failing.
    let labour = select_labour(dealer, &problem.labour_category).ok_or_else(|| {
        EngineError::CatalogLookupMiss {
            kind: "labour category",
            id: format!("{dealership_id}/{}", problem.labour_category),
        }
    })?;
    let labour_cost = problem.labour_hours * labour.hourly_rate;
    let mut penalty_minutes = 0u32;
    if !labour.available {
        penalty_minutes += labour.eta_hours * 60;
    }

    // Bay: same shape as labour, in minutes.
    let bay = select_bay(dealer, &problem.bay_type).ok_or_else(|| {
        EngineError::CatalogLookupMiss {
            kind: "bay type",
            id: format!("{dealership_id}/{}", problem.bay_type),
        }
    })?;
    if !bay.available {
        penalty_minutes += bay.eta_minutes;
    }

    let parts_cost = round2(parts_cost);
    let labour_cost = round2(labour_cost);
    let discount = round2(discount);
    let final_cost = round2((parts_cost + labour_cost - discount).max(0.0));

    Ok(Estimate {
        dealership_id: dealership_id.to_string(),
        problem_id: problem_id.to_string(),
        parts_cost,
        labour_cost,
        discount,
        final_cost,
        estimated_minutes: problem.base_minutes + penalty_minutes,
        parts_available,
        parts_eta_days,
        applied_rules,
    })
}

/// Deterministic labour selection: available technicians first (cheapest
/// rate, then technician id), otherwise the one freeing up soonest.
fn select_labour<'a>(dealer: &'a Dealership, category: &str) -> Option<&'a LabourRecord> {
    let mut in_category: Vec<&LabourRecord> = dealer
        .labour
        .iter()
        .filter(|l| l.category == category)
        .collect();
    if in_category.is_empty() {
        return None;
    }
    in_category.sort_by(|a, b| {
        b.available
            .cmp(&a.available)
            .then(a.hourly_rate.total_cmp(&b.hourly_rate))
            .then(a.technician_id.cmp(&b.technician_id))
    });
    in_category.first().copied()
}

/// Deterministic bay selection: available bays first, otherwise the one
/// freeing up soonest.
fn select_bay<'a>(dealer: &'a Dealership, bay_type: &str) -> Option<&'a BayResource> {
    let mut of_type: Vec<&BayResource> = dealer
        .bays
        .iter()
        .filter(|b| b.bay_type == bay_type)
        .collect();
    if of_type.is_empty() {
        return None;
    }
    of_type.sort_by(|a, b| {
        b.available
            .cmp(&a.available)
            .then(a.eta_minutes.cmp(&b.eta_minutes))
            .then(a.bay_id.cmp(&b.bay_id))
    });
    of_type.first().copied()
}

/// One (dealership, problem) estimator invocation, as the aggregator sees
/// it. Abstracted so tests can inject slow or failing dealerships.
#[async_trait]
pub trait PairEstimator: Send + Sync {
    async fn estimate(
        &self,
        snapshot: Arc<CatalogSnapshot>,
        dealership_id: String,
        problem_id: String,
        vehicle_age_months: u32,
    ) -> EngineResult<Estimate>;
}

/// The production estimator: straight through to [`estimate_pair`].
pub struct CatalogEstimator;

#[async_trait]
impl PairEstimator for CatalogEstimator {
    async fn estimate(
        &self,
        snapshot: Arc<CatalogSnapshot>,
        dealership_id: String,
        problem_id: String,
        vehicle_age_months: u32,
    ) -> EngineResult<Estimate> {
        estimate_pair(&snapshot, &dealership_id, &problem_id, vehicle_age_months)
    }
}
