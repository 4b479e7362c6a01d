//! Catalog ingestion error types.

use thiserror::Error;

/// Errors raised while validating catalog documents at load time.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{collection}[{id}]: missing required field `{field}`")]
    MissingField {
        collection: &'static str,
        id: String,
        field: &'static str,
    },

    #[error("{collection}[{id}]: {reason}")]
    Malformed {
        collection: &'static str,
        id: String,
        reason: String,
    },

    #[error("{collection}[{id}]: duplicate id")]
    DuplicateId {
        collection: &'static str,
        id: String,
    },

    #[error("{collection}[{id}]: references unknown {target} '{referenced}'")]
    UnknownReference {
        collection: &'static str,
        id: String,
        target: &'static str,
        referenced: String,
    },

    #[error("catalog document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience alias for catalog results.
pub type CatalogResult<T> = Result<T, CatalogError>;
