//! Estimate aggregator — fan-out/fan-in across (dealership, problem) pairs.
//!
//! One estimator task per pair on a `JoinSet`, each bounded by an
//! individual timeout, the whole join bounded by an overall ceiling. A
//! slow or failing pair becomes a tagged omission, never a batch failure.
//! Dropping the returned future aborts the remaining tasks, which is how
//! callers cancel an in-flight aggregation without affecting others.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;

use sb_catalog::CatalogSnapshot;
use sb_domain::{
    AggregateResult, Estimate, FailureReason, PartialEstimateFailure, ProblemEstimates,
};

use crate::error::EngineError;
use crate::estimator::PairEstimator;

/// Timeout bounds for one aggregation run.
#[derive(Debug, Clone, Copy)]
pub struct AggregatorConfig {
    /// Individual bound per (dealership, problem) pair.
    pub pair_timeout: Duration,
    /// Ceiling for the whole fan-in; pairs still pending at the ceiling
    /// are reported as timeouts.
    pub overall_timeout: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            pair_timeout: Duration::from_secs(2),
            overall_timeout: Duration::from_secs(10),
        }
    }
}

/// Fans the estimator out across all requested pairs concurrently.
pub struct EstimateAggregator {
    estimator: Arc<dyn PairEstimator>,
    config: AggregatorConfig,
}

impl EstimateAggregator {
    pub fn new(estimator: Arc<dyn PairEstimator>, config: AggregatorConfig) -> Self {
        Self { estimator, config }
    }

    /// Estimate every (dealership, problem) pair and group the results per
    /// problem, dealers sorted ascending by `final_cost`, then
    /// `estimated_minutes`, then `dealership_id`.
    pub async fn estimate(
        &self,
        snapshot: Arc<CatalogSnapshot>,
        dealership_ids: &[String],
        problem_ids: &[String],
        vehicle_age_months: u32,
    ) -> AggregateResult {
        // Dedup while preserving caller order; order determines grouping.
        let problems = dedup(problem_ids);
        let dealers = dedup(dealership_ids);

        let mut tasks: JoinSet<(String, String, Result<Estimate, FailureReason>)> = JoinSet::new();
        let mut pending: HashSet<(String, String)> = HashSet::new();

        for problem_id in &problems {
            for dealership_id in &dealers {
                pending.insert((dealership_id.clone(), problem_id.clone()));

                let estimator = self.estimator.clone();
                let snapshot = snapshot.clone();
                let dealership_id = dealership_id.clone();
                let problem_id = problem_id.clone();
                let pair_timeout = self.config.pair_timeout;

                tasks.spawn(async move {
                    let outcome = tokio::time::timeout(
                        pair_timeout,
                        estimator.estimate(
                            snapshot,
                            dealership_id.clone(),
                            problem_id.clone(),
                            vehicle_age_months,
                        ),
                    )
                    .await;

                    let result = match outcome {
                        Err(_) => Err(FailureReason::Timeout),
                        Ok(Ok(estimate)) => Ok(estimate),
                        Ok(Err(err)) => Err(failure_reason(err)),
                    };
                    (dealership_id, problem_id, result)
                });
            }
        }

        let mut estimates: HashMap<String, Vec<Estimate>> = HashMap::new();
        let mut failures: Vec<PartialEstimateFailure> = Vec::new();

        let deadline = Instant::now() + self.config.overall_timeout;
        loop {
            let joined = match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Err(_) => break, // overall ceiling hit
                Ok(None) => break,
                Ok(Some(joined)) => joined,
            };
            match joined {
                Ok((dealership_id, problem_id, result)) => {
                    pending.remove(&(dealership_id.clone(), problem_id.clone()));
                    match result {
                        Ok(estimate) => {
                            estimates.entry(problem_id).or_default().push(estimate);
                        }
                        Err(reason) => {
                            tracing::warn!(
                                dealership_id = %dealership_id,
                                problem_id = %problem_id,
                                reason = ?reason,
                                "estimate pair omitted"
                            );
                            failures.push(PartialEstimateFailure {
                                dealership_id,
                                problem_id,
                                reason,
                            });
                        }
                    }
                }
                Err(join_err) => {
                    tracing::error!(error = %join_err, "estimator task failed to join");
                }
            }
        }

        // Anything still pending (overall ceiling, or a task that died
        // without reporting) is a timeout for that pair alone.
        for (dealership_id, problem_id) in pending {
            failures.push(PartialEstimateFailure {
                dealership_id,
                problem_id,
                reason: FailureReason::Timeout,
            });
        }
        failures.sort_by(|a, b| {
            a.problem_id
                .cmp(&b.problem_id)
                .then_with(|| a.dealership_id.cmp(&b.dealership_id))
        });

        let grouped = problems
            .iter()
            .filter_map(|problem_id| {
                let problem = snapshot.problem(problem_id)?;
                let mut dealerships = estimates.remove(problem_id).unwrap_or_default();
                dealerships.sort_by(|a, b| {
                    a.final_cost
                        .total_cmp(&b.final_cost)
                        .then(a.estimated_minutes.cmp(&b.estimated_minutes))
                        .then_with(|| a.dealership_id.cmp(&b.dealership_id))
                });
                Some(ProblemEstimates {
                    problem_id: problem_id.clone(),
                    problem_name: problem.name.clone(),
                    dealerships,
                })
            })
            .collect();

        AggregateResult {
            estimates: grouped,
            failures,
        }
    }
}

fn failure_reason(err: EngineError) -> FailureReason {
    match err {
        EngineError::CatalogLookupMiss { .. } => FailureReason::LookupMiss {
            detail: err.to_string(),
        },
        other => FailureReason::Error {
            detail: other.to_string(),
        },
    }
}

fn dedup(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
