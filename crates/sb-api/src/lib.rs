//! ServiceBay API — library crate for the estimation/booking REST server.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `sb-e2e-tests`) can access internal types like `AppState`,
//! `build_router`, and the route handlers.

pub mod config;
pub mod error;
pub mod events;
pub mod routes;
pub mod state;
