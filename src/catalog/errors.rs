//! Catalog Errors

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Missing or invalid item fields.
    #[error("{0}")]
    Validation(String),

    /// No item has the given identifier.
    #[error("menu item `{0}` not found")]
    NotFound(String),

    /// The store could not be reached or the query failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}
