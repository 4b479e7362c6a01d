//! Deterministic sample catalog for development mode and tests.
//!
//! Routed through `ingest::load_catalog` so every load exercises the same
//! validation path as production data. Three dealerships with deliberately
//! uneven inventory/labour/bay availability, so estimation paths (missing
//! parts, unavailable technicians, category gaps) are all reachable.

use std::sync::Arc;

use serde_json::json;

use crate::ingest::load_catalog;
use crate::store::CatalogSnapshot;

/// Sample catalog snapshot wrapped in `Arc`, ready for sharing.
pub fn catalog() -> Arc<CatalogSnapshot> {
    Arc::new(catalog_snapshot())
}

/// Sample catalog snapshot.
pub fn catalog_snapshot() -> CatalogSnapshot {
    load_catalog(&document()).expect("sample catalog must validate")
}

/// The raw sample document, as it would arrive from the reference store.
pub fn document() -> serde_json::Value {
    json!({
        "service_problems": [
            {
                "problem_id": "SP001",
                "problem_name": "Brake Pad Wear",
                "detailed_description": [
                    "Grinding noise when braking",
                    "Reduced braking response and squealing at low speed"
                ],
                "parts_needed": ["PART_028"],
                "labour_category": "General Maintenance",
                "bay_type": "general",
                "estimated_labour_hours": 0.8,
                "estimated_service_time_minutes": 60
            },
            {
                "problem_id": "SP002",
                "problem_name": "Brake Disc Warping",
                "detailed_description": [
                    "Steering wheel vibration when braking",
                    "Pulsing brake pedal at highway speed"
                ],
                "parts_needed": ["PART_029"],
                "labour_category": "Brake Systems",
                "bay_type": "general",
                "estimated_labour_hours": 1.5,
                "estimated_service_time_minutes": 120
            },
            {
                "problem_id": "SP003",
                "problem_name": "Battery Degradation",
                "detailed_description": [
                    "Slow engine cranking on cold mornings",
                    "Dim headlights at idle"
                ],
                "parts_needed": ["PART_010"],
                "labour_category": "Electrical",
                "bay_type": "general",
                "estimated_labour_hours": 0.5,
                "estimated_service_time_minutes": 30
            },
            {
                "problem_id": "SP004",
                "problem_name": "Clutch Slipping",
                "detailed_description": [
                    "Engine revs climb without speed increase",
                    "Burning smell under hard acceleration"
                ],
                "parts_needed": ["PART_044"],
                "labour_category": "Transmission",
                "bay_type": "lift",
                "estimated_labour_hours": 3.5,
                "estimated_service_time_minutes": 240
            },
            {
                "problem_id": "SP005",
                "problem_name": "Engine Misfire",
                "detailed_description": [
                    "Rough idle and hesitation under load",
                    "Check engine light flashing intermittently"
                ],
                "parts_needed": ["PART_051"],
                "labour_category": "Engine",
                "bay_type": "general",
                "estimated_labour_hours": 1.2,
                "estimated_service_time_minutes": 90
            },
            {
                "problem_id": "SP006",
                "problem_name": "Suspension Knock",
                "detailed_description": [
                    "Knocking noise over speed bumps",
                    "Uneven tyre wear on the front axle"
                ],
                "parts_needed": ["PART_063"],
                "labour_category": "Suspension",
                "bay_type": "lift",
                "estimated_labour_hours": 2.0,
                "estimated_service_time_minutes": 150
            }
        ],
        "parts_model": [
            {
                "part_id": "PART_028", "part_name": "Brake Pad Set",
                "compatible_models": ["Model A", "Model B", "Model C"],
                "cost": 450.0, "warranty_applicable": true, "insurance_applicable": false
            },
            {
                "part_id": "PART_029", "part_name": "Brake Disc Pair",
                "compatible_models": ["Model A", "Model B"],
                "cost": 1200.0, "warranty_applicable": true, "insurance_applicable": true
            },
            {
                "part_id": "PART_010", "part_name": "12V AGM Battery",
                "compatible_models": ["Model A", "Model B", "Model C", "Model D"],
                "cost": 5500.0, "warranty_applicable": true, "insurance_applicable": false
            },
            {
                "part_id": "PART_044", "part_name": "Clutch Kit",
                "compatible_models": ["Model A", "Model B", "Model C"],
                "cost": 9000.0, "warranty_applicable": false, "insurance_applicable": true
            },
            {
                "part_id": "PART_051", "part_name": "Spark Plug Set",
                "compatible_models": ["Model A", "Model C"],
                "cost": 800.0, "warranty_applicable": true, "insurance_applicable": false
            },
            {
                "part_id": "PART_063", "part_name": "Front Strut Assembly",
                "compatible_models": ["Model A", "Model D"],
                "cost": 3200.0, "warranty_applicable": false, "insurance_applicable": true
            }
        ],
        "dealerships": [
            {
                "dealership_id": "DEALER_001", "name": "AutoCare Central",
                "location": {"lat": 19.0760, "lng": 72.8777, "address": "123 Marine Drive"},
                "phone": "+91-22-2345-6789", "email": "central@autocare.example",
                "rating": 4.5
            },
            {
                "dealership_id": "DEALER_002", "name": "ServiceMax North",
                "location": {"lat": 28.6139, "lng": 77.2090, "address": "456 Ring Road"},
                "phone": "+91-11-2345-6789", "email": "north@servicemax.example",
                "rating": 4.7
            },
            {
                "dealership_id": "DEALER_003", "name": "Elite Motors East",
                "location": {"lat": 12.9716, "lng": 77.5946, "address": "789 Lake View"},
                "phone": "+91-80-2345-6789", "email": "east@elitemotors.example",
                "rating": 4.2
            }
        ],
        "parts_inventory": [
            // DEALER_001 stocks everything at catalog price.
            {"dealership_id": "DEALER_001", "part_id": "PART_028", "cost": 450.0, "in_stock": true},
            {"dealership_id": "DEALER_001", "part_id": "PART_029", "cost": 1200.0, "in_stock": true},
            {"dealership_id": "DEALER_001", "part_id": "PART_010", "cost": 5500.0, "in_stock": true},
            {"dealership_id": "DEALER_001", "part_id": "PART_044", "cost": 9000.0, "in_stock": true},
            {"dealership_id": "DEALER_001", "part_id": "PART_051", "cost": 800.0, "in_stock": true},
            {"dealership_id": "DEALER_001", "part_id": "PART_063", "cost": 3200.0, "in_stock": true},
            // DEALER_002 undercuts on price but has stock gaps.
            {"dealership_id": "DEALER_002", "part_id": "PART_028", "cost": 430.0,
             "in_stock": false, "eta_if_not_available_days": 4},
            {"dealership_id": "DEALER_002", "part_id": "PART_029", "cost": 1150.0, "in_stock": true},
            {"dealership_id": "DEALER_002", "part_id": "PART_010", "cost": 5300.0, "in_stock": true},
            {"dealership_id": "DEALER_002", "part_id": "PART_051", "cost": 760.0, "in_stock": true},
            // DEALER_003 stocks a premium subset; no clutch or strut rows.
            {"dealership_id": "DEALER_003", "part_id": "PART_028", "cost": 470.0, "in_stock": true},
            {"dealership_id": "DEALER_003", "part_id": "PART_029", "cost": 1260.0, "in_stock": true},
            {"dealership_id": "DEALER_003", "part_id": "PART_010", "cost": 5600.0, "in_stock": true},
            {"dealership_id": "DEALER_003", "part_id": "PART_051", "cost": 820.0, "in_stock": true}
        ],
        "labour": [
            {"dealership_id": "DEALER_001", "labour_category": "General Maintenance",
             "technician_id": "TECH_001", "skill_level": "senior", "hourly_rate": 750.0,
             "availability": true},
            {"dealership_id": "DEALER_001", "labour_category": "Brake Systems",
             "technician_id": "TECH_002", "skill_level": "senior", "hourly_rate": 900.0,
             "availability": true},
            {"dealership_id": "DEALER_001", "labour_category": "Electrical",
             "technician_id": "TECH_003", "skill_level": "standard", "hourly_rate": 800.0,
             "availability": true},
            {"dealership_id": "DEALER_001", "labour_category": "Transmission",
             "technician_id": "TECH_004", "skill_level": "senior", "hourly_rate": 950.0,
             "availability": true},
            {"dealership_id": "DEALER_001", "labour_category": "Engine",
             "technician_id": "TECH_005", "skill_level": "standard", "hourly_rate": 850.0,
             "availability": true},
            {"dealership_id": "DEALER_001", "labour_category": "Suspension",
             "technician_id": "TECH_006", "skill_level": "standard", "hourly_rate": 820.0,
             "availability": true},

            {"dealership_id": "DEALER_002", "labour_category": "General Maintenance",
             "technician_id": "TECH_011", "skill_level": "standard", "hourly_rate": 700.0,
             "availability": false, "eta_if_unavailable_hours": 4},
            {"dealership_id": "DEALER_002", "labour_category": "Brake Systems",
             "technician_id": "TECH_012", "skill_level": "standard", "hourly_rate": 880.0,
             "availability": true},
            {"dealership_id": "DEALER_002", "labour_category": "Electrical",
             "technician_id": "TECH_013", "skill_level": "senior", "hourly_rate": 780.0,
             "availability": true},
            {"dealership_id": "DEALER_002", "labour_category": "Transmission",
             "technician_id": "TECH_014", "skill_level": "standard", "hourly_rate": 920.0,
             "availability": true},
            {"dealership_id": "DEALER_002", "labour_category": "Engine",
             "technician_id": "TECH_015", "skill_level": "senior", "hourly_rate": 830.0,
             "availability": true},
            {"dealership_id": "DEALER_002", "labour_category": "Suspension",
             "technician_id": "TECH_016", "skill_level": "standard", "hourly_rate": 790.0,
             "availability": false, "eta_if_unavailable_hours": 6},

            // DEALER_003 has no Transmission technician at all.
            {"dealership_id": "DEALER_003", "labour_category": "General Maintenance",
             "technician_id": "TECH_021", "skill_level": "senior", "hourly_rate": 820.0,
             "availability": true},
            {"dealership_id": "DEALER_003", "labour_category": "Brake Systems",
             "technician_id": "TECH_022", "skill_level": "senior", "hourly_rate": 940.0,
             "availability": true},
            {"dealership_id": "DEALER_003", "labour_category": "Electrical",
             "technician_id": "TECH_023", "skill_level": "standard", "hourly_rate": 810.0,
             "availability": true},
            {"dealership_id": "DEALER_003", "labour_category": "Engine",
             "technician_id": "TECH_025", "skill_level": "senior", "hourly_rate": 880.0,
             "availability": true},
            {"dealership_id": "DEALER_003", "labour_category": "Suspension",
             "technician_id": "TECH_026", "skill_level": "standard", "hourly_rate": 840.0,
             "availability": true}
        ],
        "bay_area": [
            {"dealership_id": "DEALER_001", "bay_id": "BAY_001", "bay_type": "general",
             "availability": true},
            {"dealership_id": "DEALER_001", "bay_id": "BAY_002", "bay_type": "lift",
             "availability": true},
            {"dealership_id": "DEALER_002", "bay_id": "BAY_011", "bay_type": "general",
             "availability": true},
            {"dealership_id": "DEALER_002", "bay_id": "BAY_012", "bay_type": "lift",
             "availability": false, "eta_if_unavailable_minutes": 45},
            {"dealership_id": "DEALER_003", "bay_id": "BAY_021", "bay_type": "general",
             "availability": true},
            {"dealership_id": "DEALER_003", "bay_id": "BAY_022", "bay_type": "lift",
             "availability": true}
        ],
        "insurance_warranty_rules": [
            {"rule_id": "RULE_001", "coverage_type": "WARRANTY", "part_id": "PART_028",
             "max_vehicle_age_months": 24, "discount_percentage": 100.0},
            {"rule_id": "RULE_002", "coverage_type": "WARRANTY", "part_id": "PART_028",
             "max_vehicle_age_months": 24, "discount_percentage": 50.0},
            {"rule_id": "RULE_003", "coverage_type": "WARRANTY", "part_id": "PART_010",
             "max_vehicle_age_months": 36, "discount_percentage": 50.0},
            {"rule_id": "RULE_004", "coverage_type": "INSURANCE", "part_id": "PART_044",
             "max_vehicle_age_months": 60, "discount_percentage": 40.0},
            {"rule_id": "RULE_005", "coverage_type": "INSURANCE", "part_id": "PART_063",
             "max_vehicle_age_months": 48, "discount_percentage": 25.0},
            {"rule_id": "RULE_006", "coverage_type": "WARRANTY", "part_id": "PART_051",
             "max_vehicle_age_months": 12, "discount_percentage": 100.0}
        ]
    })
}
