//! Problem matcher — scores free-text symptom input against the catalog.
//!
//! The default implementation is lexical: weighted token overlap against
//! problem names and description fragments. Matching is pluggable behind
//! the [`ProblemMatcher`] trait but must stay deterministic for identical
//! input and catalog snapshot; ranking ties resolve by catalog insertion
//! order.

use regex::Regex;

use sb_catalog::CatalogSnapshot;
use sb_domain::{RankedProblem, VehicleMeta};

use crate::error::{EngineError, EngineResult};

/// Scores symptom text against the catalog, best match first.
pub trait ProblemMatcher: Send + Sync {
    /// Rank catalog problems against `text`. Fails with
    /// [`EngineError::NoCandidatesFound`] when nothing clears the
    /// relevance threshold.
    fn rank(
        &self,
        text: &str,
        vehicle: &VehicleMeta,
        snapshot: &CatalogSnapshot,
    ) -> EngineResult<Vec<RankedProblem>>;
}

/// Name-token hits count this much more than description hits.
const NAME_WEIGHT: f64 = 3.0;
const DESCRIPTION_WEIGHT: f64 = 1.0;

/// Deterministic lexical matcher.
pub struct LexicalMatcher {
    /// Problems scoring below this are dropped.
    min_score: f64,
    token_re: Regex,
}

impl LexicalMatcher {
    pub fn new(min_score: f64) -> Self {
        Self {
            min_score,
            token_re: Regex::new(r"[a-z0-9]+").expect("static regex"),
        }
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut out: Vec<String> = self
            .token_re
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Score one problem against the query tokens, normalized to (0, 1].
    fn score(&self, query: &[String], name: &str, description: &[String]) -> f64 {
        if query.is_empty() {
            return 0.0;
        }
        let name_tokens = self.tokens(name);
        let description_tokens = self.tokens(&description.join(" "));

        let mut raw = 0.0;
        for token in query {
            if name_tokens.binary_search(token).is_ok() {
                raw += NAME_WEIGHT;
            } else if description_tokens.binary_search(token).is_ok() {
                raw += DESCRIPTION_WEIGHT;
            }
        }
        raw / (NAME_WEIGHT * query.len() as f64)
    }

    /// A problem is out of scope when a required part explicitly lists
    /// compatible models and the vehicle's model is not among them.
    fn fits_vehicle(
        &self,
        snapshot: &CatalogSnapshot,
        required_parts: &[String],
        vehicle: &VehicleMeta,
    ) -> bool {
        required_parts.iter().all(|part_id| {
            match snapshot.part(part_id) {
                Some(part) => {
                    part.compatible_models.is_empty()
                        || part.compatible_models.iter().any(|m| m == &vehicle.model)
                }
                None => false,
            }
        })
    }
}

impl Default for LexicalMatcher {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl ProblemMatcher for LexicalMatcher {
    fn rank(
        &self,
        text: &str,
        vehicle: &VehicleMeta,
        snapshot: &CatalogSnapshot,
    ) -> EngineResult<Vec<RankedProblem>> {
        let query = self.tokens(text);

        let mut ranked: Vec<RankedProblem> = Vec::new();
        for problem in snapshot.problems() {
            if !self.fits_vehicle(snapshot, &problem.required_parts, vehicle) {
                continue;
            }
            let score = self.score(&query, &problem.name, &problem.description);
            if score >= self.min_score {
                ranked.push(RankedProblem {
                    problem_id: problem.problem_id.clone(),
                    name: problem.name.clone(),
                    description: problem.description.first().cloned().unwrap_or_default(),
                    score,
                });
            }
        }

        if ranked.is_empty() {
            return Err(EngineError::NoCandidatesFound);
        }

        // Stable sort keeps catalog insertion order on score ties.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(ranked)
    }
}
