//! Catalog store for ServiceBay.
//!
//! The five reference collections (`service_problems`, `parts_model`,
//! `labour`, `bay_area`, `insurance_warranty_rules`) plus `dealerships`
//! arrive as loosely typed JSON documents. `ingest` validates them into
//! explicit typed records at load time — malformed entries are rejected
//! here, never at estimation time — and `store` shares the result as an
//! immutable snapshot that estimation reads lock-free.

pub mod error;
pub mod ingest;
pub mod sample;
pub mod store;

pub use error::{CatalogError, CatalogResult};
pub use ingest::{load_catalog, load_catalog_str};
pub use store::{CatalogSnapshot, CatalogStore};
