//! Catalog ingestion — loosely typed documents in, validated records out.
//!
//! The wire layout mirrors the persisted collections: `labour`, `bay_area`
//! and `parts_inventory` rows carry a `dealership_id` and are grouped under
//! their dealership here. Required-field and range validation happens in
//! this module; the rest of the system only ever sees typed records.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use sb_domain::{
    BayResource, CoverageType, Dealership, DiscountRule, LabourRecord, Location, Part,
    ServiceProblem, StockedPart,
};

use crate::error::{CatalogError, CatalogResult};
use crate::store::CatalogSnapshot;

/// Top-level catalog document.
#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    service_problems: Vec<RawProblem>,
    #[serde(default)]
    parts_model: Vec<RawPart>,
    #[serde(default)]
    dealerships: Vec<RawDealership>,
    #[serde(default)]
    parts_inventory: Vec<RawStockedPart>,
    #[serde(default)]
    labour: Vec<RawLabour>,
    #[serde(default)]
    bay_area: Vec<RawBay>,
    #[serde(default)]
    insurance_warranty_rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawProblem {
    problem_id: Option<String>,
    problem_name: Option<String>,
    #[serde(default)]
    detailed_description: Vec<String>,
    #[serde(default)]
    parts_needed: Vec<String>,
    labour_category: Option<String>,
    bay_type: Option<String>,
    estimated_labour_hours: Option<f64>,
    estimated_service_time_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawPart {
    part_id: Option<String>,
    part_name: Option<String>,
    #[serde(default)]
    compatible_models: Vec<String>,
    cost: Option<f64>,
    #[serde(default)]
    warranty_applicable: bool,
    #[serde(default)]
    insurance_applicable: bool,
}

#[derive(Debug, Deserialize)]
struct RawDealership {
    dealership_id: Option<String>,
    name: Option<String>,
    location: Option<RawLocation>,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    rating: f64,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    lat: f64,
    lng: f64,
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
struct RawStockedPart {
    dealership_id: Option<String>,
    part_id: Option<String>,
    cost: Option<f64>,
    in_stock: Option<bool>,
    #[serde(default)]
    eta_if_not_available_days: u32,
}

#[derive(Debug, Deserialize)]
struct RawLabour {
    dealership_id: Option<String>,
    labour_category: Option<String>,
    technician_id: Option<String>,
    #[serde(default = "default_skill")]
    skill_level: String,
    hourly_rate: Option<f64>,
    availability: Option<bool>,
    #[serde(default)]
    eta_if_unavailable_hours: u32,
}

fn default_skill() -> String {
    "standard".into()
}

#[derive(Debug, Deserialize)]
struct RawBay {
    dealership_id: Option<String>,
    bay_id: Option<String>,
    bay_type: Option<String>,
    availability: Option<bool>,
    #[serde(default)]
    eta_if_unavailable_minutes: u32,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    rule_id: Option<String>,
    coverage_type: Option<CoverageType>,
    part_id: Option<String>,
    max_vehicle_age_months: Option<u32>,
    discount_percentage: Option<f64>,
}

/// Parse and validate a full catalog document.
pub fn load_catalog(doc: &serde_json::Value) -> CatalogResult<CatalogSnapshot> {
    let raw: RawCatalog = serde_json::from_value(doc.clone())?;
    build(raw)
}

/// Parse and validate a catalog document from its JSON text.
pub fn load_catalog_str(text: &str) -> CatalogResult<CatalogSnapshot> {
    let raw: RawCatalog = serde_json::from_str(text)?;
    build(raw)
}

fn build(raw: RawCatalog) -> CatalogResult<CatalogSnapshot> {
    let parts = validate_parts(raw.parts_model)?;
    let part_ids: HashSet<&str> = parts.iter().map(|p| p.part_id.as_str()).collect();

    let problems = validate_problems(raw.service_problems, &part_ids)?;
    let rules = validate_rules(raw.insurance_warranty_rules, &part_ids)?;

    let mut dealerships = validate_dealerships(raw.dealerships)?;
    let index: HashMap<String, usize> = dealerships
        .iter()
        .enumerate()
        .map(|(i, d)| (d.dealership_id.clone(), i))
        .collect();

    attach_inventory(&mut dealerships, &index, raw.parts_inventory, &part_ids)?;
    attach_labour(&mut dealerships, &index, raw.labour)?;
    attach_bays(&mut dealerships, &index, raw.bay_area)?;

    tracing::info!(
        problems = problems.len(),
        parts = parts.len(),
        rules = rules.len(),
        dealerships = dealerships.len(),
        "catalog loaded"
    );

    Ok(CatalogSnapshot::assemble(problems, parts, rules, dealerships))
}

fn require<T>(
    value: Option<T>,
    collection: &'static str,
    id: &str,
    field: &'static str,
) -> CatalogResult<T> {
    value.ok_or_else(|| CatalogError::MissingField {
        collection,
        id: id.to_string(),
        field,
    })
}

fn check_unique(seen: &mut HashSet<String>, collection: &'static str, id: &str) -> CatalogResult<()> {
    if !seen.insert(id.to_string()) {
        return Err(CatalogError::DuplicateId {
            collection,
            id: id.to_string(),
        });
    }
    Ok(())
}

fn check_non_negative(
    value: f64,
    collection: &'static str,
    id: &str,
    what: &str,
) -> CatalogResult<()> {
    if value < 0.0 || !value.is_finite() {
        return Err(CatalogError::Malformed {
            collection,
            id: id.to_string(),
            reason: format!("{what} must be a non-negative number, got {value}"),
        });
    }
    Ok(())
}

fn validate_parts(raw: Vec<RawPart>) -> CatalogResult<Vec<Part>> {
    const C: &str = "parts_model";
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (i, p) in raw.into_iter().enumerate() {
        let fallback = format!("#{i}");
        let part_id = require(p.part_id, C, &fallback, "part_id")?;
        check_unique(&mut seen, C, &part_id)?;
        let cost = require(p.cost, C, &part_id, "cost")?;
        check_non_negative(cost, C, &part_id, "cost")?;
        out.push(Part {
            name: require(p.part_name, C, &part_id, "part_name")?,
            part_id,
            compatible_models: p.compatible_models,
            cost,
            warranty_applicable: p.warranty_applicable,
            insurance_applicable: p.insurance_applicable,
        });
    }
    Ok(out)
}

fn validate_problems(
    raw: Vec<RawProblem>,
    part_ids: &HashSet<&str>,
) -> CatalogResult<Vec<ServiceProblem>> {
    const C: &str = "service_problems";
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (i, p) in raw.into_iter().enumerate() {
        let fallback = format!("#{i}");
        let problem_id = require(p.problem_id, C, &fallback, "problem_id")?;
        check_unique(&mut seen, C, &problem_id)?;
        for part in &p.parts_needed {
            if !part_ids.contains(part.as_str()) {
                return Err(CatalogError::UnknownReference {
                    collection: C,
                    id: problem_id,
                    target: "part",
                    referenced: part.clone(),
                });
            }
        }
        let labour_hours = require(p.estimated_labour_hours, C, &problem_id, "estimated_labour_hours")?;
        check_non_negative(labour_hours, C, &problem_id, "estimated_labour_hours")?;
        out.push(ServiceProblem {
            name: require(p.problem_name, C, &problem_id, "problem_name")?,
            description: p.detailed_description,
            required_parts: p.parts_needed,
            labour_category: require(p.labour_category, C, &problem_id, "labour_category")?,
            bay_type: require(p.bay_type, C, &problem_id, "bay_type")?,
            labour_hours,
            base_minutes: require(
                p.estimated_service_time_minutes,
                C,
                &problem_id,
                "estimated_service_time_minutes",
            )?,
            problem_id,
        });
    }
    Ok(out)
}

fn validate_rules(
    raw: Vec<RawRule>,
    part_ids: &HashSet<&str>,
) -> CatalogResult<Vec<DiscountRule>> {
    const C: &str = "insurance_warranty_rules";
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (i, r) in raw.into_iter().enumerate() {
        let fallback = format!("#{i}");
        let rule_id = require(r.rule_id, C, &fallback, "rule_id")?;
        check_unique(&mut seen, C, &rule_id)?;
        let part_id = require(r.part_id, C, &rule_id, "part_id")?;
        if !part_ids.contains(part_id.as_str()) {
            return Err(CatalogError::UnknownReference {
                collection: C,
                id: rule_id,
                target: "part",
                referenced: part_id,
            });
        }
        let pct = require(r.discount_percentage, C, &rule_id, "discount_percentage")?;
        if !(0.0..=100.0).contains(&pct) {
            return Err(CatalogError::Malformed {
                collection: C,
                id: rule_id,
                reason: format!("discount_percentage must be within [0, 100], got {pct}"),
            });
        }
        out.push(DiscountRule {
            coverage: require(r.coverage_type, C, &rule_id, "coverage_type")?,
            part_id,
            max_vehicle_age_months: require(
                r.max_vehicle_age_months,
                C,
                &rule_id,
                "max_vehicle_age_months",
            )?,
            discount_pct: pct,
            rule_id,
        });
    }
    Ok(out)
}

fn validate_dealerships(raw: Vec<RawDealership>) -> CatalogResult<Vec<Dealership>> {
    const C: &str = "dealerships";
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (i, d) in raw.into_iter().enumerate() {
        let fallback = format!("#{i}");
        let dealership_id = require(d.dealership_id, C, &fallback, "dealership_id")?;
        check_unique(&mut seen, C, &dealership_id)?;
        let location = require(d.location, C, &dealership_id, "location")?;
        out.push(Dealership {
            name: require(d.name, C, &dealership_id, "name")?,
            location: Location {
                lat: location.lat,
                lng: location.lng,
                address: location.address,
            },
            phone: d.phone,
            email: d.email,
            rating: d.rating,
            parts: Vec::new(),
            labour: Vec::new(),
            bays: Vec::new(),
            dealership_id,
        });
    }
    Ok(out)
}

fn dealer_slot<'a>(
    dealerships: &'a mut [Dealership],
    index: &HashMap<String, usize>,
    collection: &'static str,
    row_id: &str,
    dealership_id: &str,
) -> CatalogResult<&'a mut Dealership> {
    let Some(&i) = index.get(dealership_id) else {
        return Err(CatalogError::UnknownReference {
            collection,
            id: row_id.to_string(),
            target: "dealership",
            referenced: dealership_id.to_string(),
        });
    };
    Ok(&mut dealerships[i])
}

fn attach_inventory(
    dealerships: &mut [Dealership],
    index: &HashMap<String, usize>,
    raw: Vec<RawStockedPart>,
    part_ids: &HashSet<&str>,
) -> CatalogResult<()> {
    const C: &str = "parts_inventory";
    for (i, row) in raw.into_iter().enumerate() {
        let fallback = format!("#{i}");
        let part_id = require(row.part_id, C, &fallback, "part_id")?;
        let dealership_id = require(row.dealership_id, C, &part_id, "dealership_id")?;
        if !part_ids.contains(part_id.as_str()) {
            return Err(CatalogError::UnknownReference {
                collection: C,
                id: part_id.clone(),
                target: "part",
                referenced: part_id,
            });
        }
        let cost = require(row.cost, C, &part_id, "cost")?;
        check_non_negative(cost, C, &part_id, "cost")?;
        let dealer = dealer_slot(dealerships, index, C, &part_id, &dealership_id)?;
        if dealer.parts.iter().any(|p| p.part_id == part_id) {
            return Err(CatalogError::Malformed {
                collection: C,
                id: part_id,
                reason: format!("duplicate inventory row for dealership '{dealership_id}'"),
            });
        }
        dealer.parts.push(StockedPart {
            in_stock: require(row.in_stock, C, &part_id, "in_stock")?,
            eta_days: row.eta_if_not_available_days,
            cost,
            part_id,
        });
    }
    Ok(())
}

fn attach_labour(
    dealerships: &mut [Dealership],
    index: &HashMap<String, usize>,
    raw: Vec<RawLabour>,
) -> CatalogResult<()> {
    const C: &str = "labour";
    for (i, row) in raw.into_iter().enumerate() {
        let fallback = format!("#{i}");
        let technician_id = require(row.technician_id, C, &fallback, "technician_id")?;
        let dealership_id = require(row.dealership_id, C, &technician_id, "dealership_id")?;
        let rate = require(row.hourly_rate, C, &technician_id, "hourly_rate")?;
        check_non_negative(rate, C, &technician_id, "hourly_rate")?;
        let dealer = dealer_slot(dealerships, index, C, &technician_id, &dealership_id)?;
        dealer.labour.push(LabourRecord {
            category: require(row.labour_category, C, &technician_id, "labour_category")?,
            skill_level: row.skill_level,
            hourly_rate: rate,
            available: require(row.availability, C, &technician_id, "availability")?,
            eta_hours: row.eta_if_unavailable_hours,
            technician_id,
        });
    }
    Ok(())
}

fn attach_bays(
    dealerships: &mut [Dealership],
    index: &HashMap<String, usize>,
    raw: Vec<RawBay>,
) -> CatalogResult<()> {
    const C: &str = "bay_area";
    let mut seen = HashSet::new();
    for (i, row) in raw.into_iter().enumerate() {
        let fallback = format!("#{i}");
        let bay_id = require(row.bay_id, C, &fallback, "bay_id")?;
        check_unique(&mut seen, C, &bay_id)?;
        let dealership_id = require(row.dealership_id, C, &bay_id, "dealership_id")?;
        let dealer = dealer_slot(dealerships, index, C, &bay_id, &dealership_id)?;
        dealer.bays.push(BayResource {
            bay_type: require(row.bay_type, C, &bay_id, "bay_type")?,
            available: require(row.availability, C, &bay_id, "availability")?,
            eta_minutes: row.eta_if_unavailable_minutes,
            bay_id,
        });
    }
    Ok(())
}
