//! E2E tests for concurrency: many independent sessions, parallel
//! estimate fan-outs, and racing bookings.

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use helpers::TestHarness;

/// Several customers diagnose concurrently; sessions never interfere.
#[tokio::test]
async fn e2e_concurrent_sessions_are_independent() {
    let h = Arc::new(TestHarness::with_sample_data());

    let symptoms = [
        ("CUST_0001", "grinding noise when braking"),
        ("CUST_0002", "slow cranking and dim headlights"),
        ("CUST_0003", "burning smell and revs climbing without speed"),
        ("CUST_0004", "knocking noise over speed bumps"),
    ];

    let mut handles = Vec::new();
    for (customer_id, symptom) in symptoms {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            let (status, reply) = h.start_session(customer_id, symptom, 12).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(reply["stage"], "clarification");
            reply["session_id"].as_str().unwrap().to_string()
        }));
    }

    let mut session_ids = Vec::new();
    for handle in handles {
        session_ids.push(handle.await.unwrap());
    }
    session_ids.sort();
    session_ids.dedup();
    assert_eq!(session_ids.len(), 4);
}

/// Multiple problems fan out as one concurrent batch and come back grouped
/// per problem, each group independently ranked.
#[tokio::test]
async fn e2e_multi_problem_fan_out() {
    let h = TestHarness::with_sample_data();

    let body = serde_json::json!({
        "problem_ids": ["SP001", "SP003", "SP005"],
        "vehicle_age_months": 12,
    });
    let (status, reply) = h.post("/api/v1/estimates", &body).await;
    assert_eq!(status, StatusCode::OK);

    let groups = reply["estimates"].as_array().unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0]["problem_id"], "SP001");
    assert_eq!(groups[1]["problem_id"], "SP003");
    assert_eq!(groups[2]["problem_id"], "SP005");
    for group in groups {
        assert_eq!(group["dealerships"].as_array().unwrap().len(), 3);
    }
    assert!(reply["failures"].as_array().unwrap().is_empty());
}

/// Concurrent bookings with the same idempotency key produce exactly one
/// service request.
#[tokio::test]
async fn e2e_racing_bookings_single_request() {
    let h = Arc::new(TestHarness::with_sample_data());

    let mut handles = Vec::new();
    for _ in 0..6 {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            let body = serde_json::json!({
                "customer_id": "CUST_0001",
                "vehicle": {"vehicle_id": "VEH_0001_1", "model": "Model A", "age_months": 12},
                "dealership_id": "DEALER_001",
                "problem_ids": ["SP001", "SP002"],
                "idempotency_key": "race-key",
            });
            let (status, booking) = h.post("/api/v1/bookings", &body).await;
            assert_eq!(status, StatusCode::OK);
            (
                booking["outcome"].as_str().unwrap().to_string(),
                TestHarness::request_id(&booking),
            )
        }));
    }

    let mut created = 0;
    let mut ids = Vec::new();
    for handle in handles {
        let (outcome, id) = handle.await.unwrap();
        if outcome == "created" {
            created += 1;
        }
        ids.push(id);
    }
    assert_eq!(created, 1);
    ids.dedup();
    assert_eq!(ids.len(), 1);

    let (_, mine) = h.get("/api/v1/customers/CUST_0001/bookings").await;
    assert_eq!(mine["bookings"].as_array().unwrap().len(), 1);
}

/// Bookings with distinct keys at distinct dealerships coexist.
#[tokio::test]
async fn e2e_parallel_bookings_distinct_keys() {
    let h = Arc::new(TestHarness::with_sample_data());

    let mut handles = Vec::new();
    for (i, dealership) in ["DEALER_001", "DEALER_002", "DEALER_003"]
        .into_iter()
        .enumerate()
    {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            let body = serde_json::json!({
                "customer_id": "CUST_0009",
                "vehicle": {"vehicle_id": "VEH_0009_1", "model": "Model A", "age_months": 12},
                "dealership_id": dealership,
                "problem_ids": ["SP001"],
                "idempotency_key": format!("multi-{i}"),
            });
            let (status, booking) = h.post("/api/v1/bookings", &body).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(booking["outcome"], "created");
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let (_, mine) = h.get("/api/v1/customers/CUST_0009/bookings").await;
    assert_eq!(mine["bookings"].as_array().unwrap().len(), 3);
}
