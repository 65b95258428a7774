//! In-memory document store
//!
//! Backs the `memory://` connection string. Contents live for as long as the
//! store value does, which makes it the backend of choice for tests and local
//! development.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::{new_document_id, Document, DocumentStore, StoreError, ID_FIELD};

/// Collections keyed by name; each collection is ordered by document id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, BTreeMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned()))
    }

    async fn insert(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<Document, StoreError> {
        let id = new_document_id();
        document.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, document.clone());

        Ok(document)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        mut document: Document,
    ) -> Result<Option<Document>, StoreError> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(existing) = docs.get_mut(id) else {
            return Ok(None);
        };

        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        *existing = document.clone();

        Ok(Some(document))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .collections
            .get_mut(collection)
            .is_some_and(|mut docs| docs.remove(id).is_some()))
    }
}
