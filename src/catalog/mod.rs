//! Menu Catalog Domain Module
//!
//! This module contains everything about the persisted menu, including:
//! - Domain models (MenuItem, Category, request payloads)
//! - The catalog service (CRUD over the store)
//! - REST API handlers

pub mod errors;
pub mod handlers;
pub mod models;
pub mod service;

// Re-export commonly used types for convenience
pub use errors::CatalogError;
pub use handlers::routes;
pub use models::{Category, MenuItem, MenuItemFields};
pub use service::CatalogService;
