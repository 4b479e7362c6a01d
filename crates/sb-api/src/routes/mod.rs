//! API route definitions and router builder.

pub mod bookings;
pub mod catalog;
pub mod diagnose;
pub mod estimates;
pub mod health;
pub mod ws;

use axum::Router;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Diagnosis session endpoints
        .route("/diagnose", post(diagnose::start_session))
        .route("/diagnose/answer", post(diagnose::advance_session))
        .route("/match", post(diagnose::match_problems))
        .route("/sessions/{id}", get(diagnose::get_session))
        // Estimation endpoints
        .route("/estimates", post(estimates::estimate))
        .route("/sessions/{id}/estimates", get(estimates::session_estimates))
        // Booking endpoints
        .route("/bookings", post(bookings::create_booking))
        .route(
            "/bookings/{id}",
            get(bookings::get_booking).put(bookings::update_booking),
        )
        .route("/customers/{id}/bookings", get(bookings::customer_bookings))
        .route(
            "/dealerships/{id}/bookings",
            get(bookings::dealership_bookings),
        )
        // Catalog endpoints
        .route("/problems/search", get(catalog::search_problems))
        .route("/dealerships", get(catalog::list_dealerships))
        .route("/dealerships/{id}/labour", get(catalog::dealership_labour))
        .route("/dealerships/{id}/parts", get(catalog::dealership_parts))
        // WebSocket endpoint
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
