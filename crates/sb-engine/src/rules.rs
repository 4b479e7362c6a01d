//! Discount rule engine — pure, deterministic warranty/insurance evaluation.
//!
//! No probabilistic or learned component is permitted here: every output
//! must be traceable to a specific rule id for audit.

use sb_domain::{CoverageType, DiscountRule, Part};

/// Result of evaluating the rule set for one part.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountOutcome {
    /// Discount amount, capped at the part's cost contribution.
    pub amount: f64,
    /// The winning rule, absent when no rule applied.
    pub rule_id: Option<String>,
}

impl DiscountOutcome {
    fn none() -> Self {
        Self {
            amount: 0.0,
            rule_id: None,
        }
    }
}

/// Evaluate all rules targeting `part` for a vehicle of the given age.
///
/// Selection: rules matching the part whose `max_vehicle_age_months` covers
/// the vehicle, gated by the part's applicability flag for the rule's
/// coverage type. The highest `discount_pct` wins; remaining ties go to the
/// lowest `rule_id`.
///
/// `effective_cost` is the part cost the estimate actually uses (dealer
/// price when stocked, catalog price otherwise), so a discount can never
/// exceed the contribution it targets.
pub fn evaluate_discount(
    part: &Part,
    effective_cost: f64,
    vehicle_age_months: u32,
    rules: &[DiscountRule],
) -> DiscountOutcome {
    let applicable = |rule: &&DiscountRule| {
        if rule.part_id != part.part_id || rule.max_vehicle_age_months < vehicle_age_months {
            return false;
        }
        match rule.coverage {
            CoverageType::Warranty => part.warranty_applicable,
            CoverageType::Insurance => part.insurance_applicable,
        }
    };

    let mut winner: Option<&DiscountRule> = None;
    for rule in rules.iter().filter(applicable) {
        winner = match winner {
            None => Some(rule),
            Some(current) => {
                if rule.discount_pct > current.discount_pct
                    || (rule.discount_pct == current.discount_pct
                        && rule.rule_id < current.rule_id)
                {
                    Some(rule)
                } else {
                    Some(current)
                }
            }
        };
    }

    match winner {
        None => DiscountOutcome::none(),
        Some(rule) => {
            let raw = effective_cost * rule.discount_pct / 100.0;
            DiscountOutcome {
                amount: raw.min(effective_cost),
                rule_id: Some(rule.rule_id.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(warranty: bool, insurance: bool) -> Part {
        Part {
            part_id: "PART_028".into(),
            name: "Brake Pad Set".into(),
            compatible_models: vec![],
            cost: 450.0,
            warranty_applicable: warranty,
            insurance_applicable: insurance,
        }
    }

    fn rule(id: &str, coverage: CoverageType, max_age: u32, pct: f64) -> DiscountRule {
        DiscountRule {
            rule_id: id.into(),
            coverage,
            part_id: "PART_028".into(),
            max_vehicle_age_months: max_age,
            discount_pct: pct,
        }
    }

    #[test]
    fn full_warranty_within_age_window() {
        let rules = [rule("RULE_001", CoverageType::Warranty, 24, 100.0)];
        let outcome = evaluate_discount(&part(true, false), 450.0, 12, &rules);
        assert_eq!(outcome.amount, 450.0);
        assert_eq!(outcome.rule_id.as_deref(), Some("RULE_001"));
    }

    #[test]
    fn age_over_ceiling_means_no_discount() {
        let rules = [rule("RULE_001", CoverageType::Warranty, 24, 100.0)];
        let outcome = evaluate_discount(&part(true, false), 450.0, 30, &rules);
        assert_eq!(outcome.amount, 0.0);
        assert!(outcome.rule_id.is_none());
    }

    #[test]
    fn age_exactly_at_ceiling_still_applies() {
        let rules = [rule("RULE_001", CoverageType::Warranty, 24, 50.0)];
        let outcome = evaluate_discount(&part(true, false), 450.0, 24, &rules);
        assert_eq!(outcome.amount, 225.0);
    }

    #[test]
    fn highest_percentage_wins() {
        let rules = [
            rule("RULE_002", CoverageType::Warranty, 24, 50.0),
            rule("RULE_001", CoverageType::Warranty, 24, 100.0),
        ];
        let outcome = evaluate_discount(&part(true, false), 450.0, 12, &rules);
        assert_eq!(outcome.rule_id.as_deref(), Some("RULE_001"));
        assert_eq!(outcome.amount, 450.0);
    }

    #[test]
    fn percentage_tie_breaks_on_lowest_rule_id() {
        let rules = [
            rule("RULE_009", CoverageType::Warranty, 24, 60.0),
            rule("RULE_003", CoverageType::Warranty, 24, 60.0),
        ];
        let outcome = evaluate_discount(&part(true, false), 450.0, 12, &rules);
        assert_eq!(outcome.rule_id.as_deref(), Some("RULE_003"));
    }

    #[test]
    fn inapplicable_coverage_flag_blocks_matching_rule() {
        // Rule matches on part and age, but the part is not warranty
        // applicable, so the rule must not fire.
        let rules = [rule("RULE_001", CoverageType::Warranty, 24, 100.0)];
        let outcome = evaluate_discount(&part(false, true), 450.0, 12, &rules);
        assert_eq!(outcome.amount, 0.0);
        assert!(outcome.rule_id.is_none());
    }

    #[test]
    fn insurance_rule_gated_on_insurance_flag() {
        let rules = [rule("RULE_005", CoverageType::Insurance, 48, 25.0)];
        let outcome = evaluate_discount(&part(false, true), 400.0, 36, &rules);
        assert_eq!(outcome.amount, 100.0);
        assert_eq!(outcome.rule_id.as_deref(), Some("RULE_005"));
    }

    #[test]
    fn discount_never_exceeds_effective_cost() {
        let rules = [rule("RULE_001", CoverageType::Warranty, 24, 100.0)];
        for pct_cost in [0.0, 1.0, 449.99, 450.0] {
            let outcome = evaluate_discount(&part(true, false), pct_cost, 12, &rules);
            assert!(outcome.amount <= pct_cost);
        }
    }

    #[test]
    fn evaluation_is_reproducible() {
        let rules = [
            rule("RULE_002", CoverageType::Warranty, 24, 50.0),
            rule("RULE_001", CoverageType::Warranty, 24, 100.0),
            rule("RULE_005", CoverageType::Insurance, 48, 25.0),
        ];
        let first = evaluate_discount(&part(true, true), 450.0, 12, &rules);
        let second = evaluate_discount(&part(true, true), 450.0, 12, &rules);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_rule_set_means_no_discount() {
        let outcome = evaluate_discount(&part(true, true), 450.0, 12, &[]);
        assert_eq!(outcome.amount, 0.0);
    }
}
