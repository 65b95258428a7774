//! Document Store Module
//!
//! A minimal document-database abstraction the catalog persists through:
//! - `DocumentStore` trait over JSON-object documents grouped in collections
//! - In-memory (`memory://`) and Redis (`redis://`) backends
//! - `StoreClient`, the lazily connected, process-wide handle

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

pub mod client;
pub mod errors;
pub mod memory;
pub mod redis_store;

pub use client::{Connector, StoreClient};
pub use errors::StoreError;

/// A stored document: a JSON object whose `_id` field holds its identifier.
pub type Document = Map<String, Value>;

/// Name of the identifier field inside every document.
pub const ID_FIELD: &str = "_id";

/// Generates a new document identifier.
///
/// UUID v7 values sort by creation time, so ordering documents by id yields
/// insertion order.
pub fn new_document_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Basic CRUD access to a document collection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns every document in the collection, oldest first.
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Returns the document with the given id, if any.
    async fn find_by_id(&self, collection: &str, id: &str)
        -> Result<Option<Document>, StoreError>;

    /// Stores a new document, assigning it a fresh `_id`, and returns it.
    async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError>;

    /// Replaces an existing document. Returns `None` when nothing has that id.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Removes a document, reporting whether one was there.
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, StoreError>;
}
