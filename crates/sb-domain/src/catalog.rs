//! Catalog reference records — problems, parts, labour, bays, discount
//! rules, dealerships.
//!
//! These are read-mostly: loaded and validated once by `sb-catalog`, then
//! shared as an immutable snapshot across arbitrarily many concurrent
//! estimator calls.

use serde::{Deserialize, Serialize};

/// A canonical service problem from the `service_problems` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceProblem {
    /// Unique problem ID (e.g. "SP001").
    pub problem_id: String,
    pub name: String,
    /// Ordered description fragments, most specific first.
    pub description: Vec<String>,
    /// Part IDs required to service this problem.
    pub required_parts: Vec<String>,
    /// Labour category a technician must match (e.g. "General Maintenance").
    pub labour_category: String,
    /// Bay type this problem must be serviced in (e.g. "general", "lift").
    pub bay_type: String,
    /// Estimated labour hours (non-negative).
    pub labour_hours: f64,
    /// Base service duration in minutes, before availability penalties.
    pub base_minutes: u32,
}

/// A part from the `parts_model` reference collection (catalog price).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Globally unique part ID (e.g. "PART_028").
    pub part_id: String,
    pub name: String,
    /// Vehicle models this part fits.
    pub compatible_models: Vec<String>,
    /// Catalog unit cost (non-negative). Used when a dealership does not
    /// stock the part and a projected cost is needed.
    pub cost: f64,
    /// Whether a WARRANTY rule may discount this part.
    pub warranty_applicable: bool,
    /// Whether an INSURANCE rule may discount this part.
    pub insurance_applicable: bool,
}

/// One dealership's inventory view of a part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockedPart {
    pub part_id: String,
    /// This dealership's unit price for the part.
    pub cost: f64,
    pub in_stock: bool,
    /// Restock ETA in days when not in stock (0 when stocked).
    #[serde(default)]
    pub eta_days: u32,
}

/// A technician record from the `labour` collection. Multiple records may
/// share a category; the estimator selects by category, not identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabourRecord {
    pub category: String,
    pub technician_id: String,
    pub skill_level: String,
    pub hourly_rate: f64,
    pub available: bool,
    /// Hours until this technician frees up, when unavailable.
    #[serde(default)]
    pub eta_hours: u32,
}

/// A service bay from the `bay_area` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayResource {
    pub bay_id: String,
    pub bay_type: String,
    pub available: bool,
    /// Minutes until this bay frees up, when unavailable.
    #[serde(default)]
    pub eta_minutes: u32,
}

/// Coverage type of a discount rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageType {
    Warranty,
    Insurance,
}

/// A deterministic discount rule from `insurance_warranty_rules`.
///
/// Rules are evaluated by the rule engine only; no probabilistic logic is
/// permitted in the discount path, and every applied discount must trace
/// back to one `rule_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRule {
    /// Unique rule ID (e.g. "RULE_014"). Lowest ID wins percentage ties.
    pub rule_id: String,
    pub coverage: CoverageType,
    /// The part this rule targets.
    pub part_id: String,
    /// The rule applies only while the vehicle is at most this old.
    pub max_vehicle_age_months: u32,
    /// Discount percentage in [0, 100].
    pub discount_pct: f64,
}

/// Geographic location of a dealership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

/// A dealership and the resources it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dealership {
    /// Unique dealership ID (e.g. "DEALER_001").
    pub dealership_id: String,
    pub name: String,
    pub location: Location,
    pub phone: String,
    pub email: String,
    pub rating: f64,
    /// Inventory view — part availability and dealer pricing.
    pub parts: Vec<StockedPart>,
    /// Technicians employed at this dealership.
    pub labour: Vec<LabourRecord>,
    /// Service bays at this dealership.
    pub bays: Vec<BayResource>,
}

/// The slice of vehicle data the core consumes. Transcription, ownership
/// and registration details stay with external collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleMeta {
    pub vehicle_id: String,
    pub model: String,
    /// Age in months, the input to warranty/insurance rule matching.
    pub age_months: u32,
}
