//! Immutable catalog snapshots and the store that swaps them.
//!
//! Estimation is read-heavy and inventory updates are write-heavy, so the
//! two are decoupled: readers clone an `Arc<CatalogSnapshot>` and compute
//! against a consistent view; `reload` swaps the whole snapshot atomically.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use sb_domain::{Dealership, DiscountRule, Part, ServiceProblem};

/// A validated, immutable view of the whole catalog.
///
/// Problems and dealerships keep their ingestion order — ranking tie-breaks
/// rely on it for determinism.
#[derive(Debug)]
pub struct CatalogSnapshot {
    problems: Vec<ServiceProblem>,
    problem_index: HashMap<String, usize>,
    parts: HashMap<String, Part>,
    rules_by_part: HashMap<String, Vec<DiscountRule>>,
    dealerships: Vec<Dealership>,
    dealership_index: HashMap<String, usize>,
}

impl CatalogSnapshot {
    /// Assemble a snapshot from validated records. Only `ingest` calls this.
    pub(crate) fn assemble(
        problems: Vec<ServiceProblem>,
        parts: Vec<Part>,
        rules: Vec<DiscountRule>,
        dealerships: Vec<Dealership>,
    ) -> Self {
        let problem_index = problems
            .iter()
            .enumerate()
            .map(|(i, p)| (p.problem_id.clone(), i))
            .collect();
        let dealership_index = dealerships
            .iter()
            .enumerate()
            .map(|(i, d)| (d.dealership_id.clone(), i))
            .collect();
        let parts = parts.into_iter().map(|p| (p.part_id.clone(), p)).collect();

        let mut rules_by_part: HashMap<String, Vec<DiscountRule>> = HashMap::new();
        for rule in rules {
            rules_by_part.entry(rule.part_id.clone()).or_default().push(rule);
        }

        Self {
            problems,
            problem_index,
            parts,
            rules_by_part,
            dealerships,
            dealership_index,
        }
    }

    /// All problems in ingestion order.
    pub fn problems(&self) -> &[ServiceProblem] {
        &self.problems
    }

    pub fn problem(&self, problem_id: &str) -> Option<&ServiceProblem> {
        self.problem_index.get(problem_id).map(|&i| &self.problems[i])
    }

    pub fn part(&self, part_id: &str) -> Option<&Part> {
        self.parts.get(part_id)
    }

    /// All rules targeting a part; empty when none exist.
    pub fn rules_for_part(&self, part_id: &str) -> &[DiscountRule] {
        self.rules_by_part
            .get(part_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All dealerships in ingestion order.
    pub fn dealerships(&self) -> &[Dealership] {
        &self.dealerships
    }

    pub fn dealership(&self, dealership_id: &str) -> Option<&Dealership> {
        self.dealership_index
            .get(dealership_id)
            .map(|&i| &self.dealerships[i])
    }

    /// Case-insensitive substring search over problem id, name and
    /// description fragments. An exact id match ranks first; everything
    /// else keeps ingestion order.
    pub fn search_problems(&self, query: &str, limit: usize) -> Vec<&ServiceProblem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<&ServiceProblem> = Vec::new();
        if let Some(exact) = self.problem_index.get(query.trim()) {
            results.push(&self.problems[*exact]);
        }

        for problem in &self.problems {
            if results.len() >= limit {
                break;
            }
            if results.iter().any(|p| p.problem_id == problem.problem_id) {
                continue;
            }
            let hit = problem.problem_id.to_lowercase().contains(&needle)
                || problem.name.to_lowercase().contains(&needle)
                || problem
                    .description
                    .iter()
                    .any(|d| d.to_lowercase().contains(&needle));
            if hit {
                results.push(problem);
            }
        }

        results.truncate(limit);
        results
    }
}

/// Shared handle over the current snapshot.
#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogStore {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The current snapshot. Cheap: clones an `Arc`, holds no lock while
    /// the caller computes.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.read().expect("catalog lock poisoned").clone()
    }

    /// Replace the whole catalog. In-flight readers keep their old
    /// snapshot; new readers see the new one.
    pub fn reload(&self, snapshot: CatalogSnapshot) {
        let mut current = self.current.write().expect("catalog lock poisoned");
        *current = Arc::new(snapshot);
        tracing::info!("catalog snapshot swapped");
    }
}
