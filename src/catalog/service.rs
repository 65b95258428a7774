//! Menu catalog service.

use std::sync::Arc;

use dashmap::DashMap;
use serde::ser::Error as _;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::store::{Document, StoreClient, StoreError};

use super::{
    errors::CatalogError,
    models::{Category, MenuItem, MenuItemFields, NewMenuItem},
};

/// Collection holding the menu items.
pub const COLLECTION: &str = "Coffee";

/// CRUD over the persisted menu. Every call goes to the store; nothing is
/// cached.
#[derive(Clone)]
pub struct CatalogService {
    client: Arc<StoreClient>,

    /// One lock per item with an update in flight, so read-merge-write
    /// cycles on the same id run one after another.
    updates: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl CatalogService {
    pub fn new(client: Arc<StoreClient>) -> Self {
        Self {
            client,
            updates: Arc::new(DashMap::new()),
        }
    }

    /// Retrieves all items in store order.
    pub async fn list_items(&self) -> Result<Vec<MenuItem>, CatalogError> {
        self.list_items_in(None).await
    }

    /// Retrieves all items, optionally restricted to one category.
    pub async fn list_items_in(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<MenuItem>, CatalogError> {
        let store = self.client.store().await?;
        let documents = self.client.bounded(store.find_all(COLLECTION)).await?;

        let mut items = documents
            .into_iter()
            .map(from_document)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(category) = category {
            items.retain(|item| item.category == category);
        }

        Ok(items)
    }

    /// Validates and stores a new item.
    pub async fn create_item(&self, fields: MenuItemFields) -> Result<MenuItem, CatalogError> {
        let item = fields.into_new_item()?;

        let store = self.client.store().await?;
        let created = self
            .client
            .bounded(store.insert(COLLECTION, to_document(&item)?))
            .await?;

        let created = from_document(created)?;
        debug!(id = %created.id, name = %created.name, "menu item created");

        Ok(created)
    }

    pub async fn get_item(&self, id: &str) -> Result<MenuItem, CatalogError> {
        let store = self.client.store().await?;

        self.client
            .bounded(store.find_by_id(COLLECTION, id))
            .await?
            .map(from_document)
            .transpose()?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Replaces the supplied fields of an existing item and returns the result.
    pub async fn update_item(
        &self,
        id: &str,
        fields: MenuItemFields,
    ) -> Result<MenuItem, CatalogError> {
        let lock = Arc::clone(self.updates.entry(id.to_string()).or_default().value());
        let result = {
            let _held = lock.lock().await;
            self.merge_and_store(id, fields).await
        };

        drop(lock);
        self.updates.remove_if(id, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    async fn merge_and_store(
        &self,
        id: &str,
        fields: MenuItemFields,
    ) -> Result<MenuItem, CatalogError> {
        let existing = self.get_item(id).await?;
        let updated = fields.apply_to(NewMenuItem::from(existing))?;

        let store = self.client.store().await?;
        let stored = self
            .client
            .bounded(store.update_by_id(COLLECTION, id, to_document(&updated)?))
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        Ok(from_document(stored)?)
    }

    /// Removes an item. Deleting an unknown id succeeds.
    pub async fn delete_item(&self, id: &str) -> Result<(), CatalogError> {
        let store = self.client.store().await?;
        let removed = self
            .client
            .bounded(store.delete_by_id(COLLECTION, id))
            .await?;

        if !removed {
            debug!(id, "delete of unknown menu item ignored");
        }

        Ok(())
    }
}

fn to_document(item: &NewMenuItem) -> Result<Document, StoreError> {
    match serde_json::to_value(item)? {
        Value::Object(document) => Ok(document),
        _ => Err(serde_json::Error::custom("menu item did not encode as an object").into()),
    }
}

fn from_document(document: Document) -> Result<MenuItem, StoreError> {
    Ok(serde_json::from_value(Value::Object(document))?)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;
    use serde_json::json;
    use testresult::TestResult;

    use crate::store::{memory::MemoryStore, DocumentStore, MockDocumentStore};

    use super::*;

    fn memory_service() -> CatalogService {
        let client = StoreClient::with_store(Arc::new(MemoryStore::new()), Duration::from_secs(1));
        CatalogService::new(Arc::new(client))
    }

    fn mock_service(store: MockDocumentStore) -> CatalogService {
        let client = StoreClient::with_store(Arc::new(store), Duration::from_secs(1));
        CatalogService::new(Arc::new(client))
    }

    /// Memory store whose reads take a while, so concurrent updates overlap.
    struct SlowReads(MemoryStore);

    #[async_trait::async_trait]
    impl DocumentStore for SlowReads {
        async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
            self.0.find_all(collection).await
        }

        async fn find_by_id(
            &self,
            collection: &str,
            id: &str,
        ) -> Result<Option<Document>, StoreError> {
            let found = self.0.find_by_id(collection, id).await;
            tokio::time::sleep(Duration::from_millis(100)).await;
            found
        }

        async fn insert(
            &self,
            collection: &str,
            document: Document,
        ) -> Result<Document, StoreError> {
            self.0.insert(collection, document).await
        }

        async fn update_by_id(
            &self,
            collection: &str,
            id: &str,
            document: Document,
        ) -> Result<Option<Document>, StoreError> {
            self.0.update_by_id(collection, id, document).await
        }

        async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
            self.0.delete_by_id(collection, id).await
        }
    }

    fn fields(name: &str, price: Decimal, category: &str) -> MenuItemFields {
        MenuItemFields {
            name: Some(name.into()),
            price: Some(price),
            description: Some("...".into()),
            image: Some("...".into()),
            category: Some(category.into()),
            popular: Some(false),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() -> TestResult {
        let service = memory_service();

        let created = service
            .create_item(fields("Latte", Decimal::new(400, 2), "hot"))
            .await?;
        let fetched = service.get_item(&created.id).await?;

        assert!(!created.id.is_empty());
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Latte");
        assert_eq!(fetched.price, Decimal::new(400, 2));
        assert_eq!(fetched.description, "...");
        assert_eq!(fetched.image, "...");
        assert_eq!(fetched.category, Category::Hot);
        assert!(!fetched.popular);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() -> TestResult {
        let service = memory_service();
        let created = service
            .create_item(fields("Mocha", Decimal::new(450, 2), "hot"))
            .await?;

        service.delete_item(&created.id).await?;

        assert!(matches!(
            service.get_item(&created.id).await,
            Err(CatalogError::NotFound(id)) if id == created.id
        ));

        service.delete_item(&created.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_list_preserves_store_order_and_filters() -> TestResult {
        let service = memory_service();
        service.create_item(fields("Latte", Decimal::new(400, 2), "hot")).await?;
        service.create_item(fields("Cold Brew", Decimal::new(350, 2), "cold")).await?;
        service.create_item(fields("Mocha", Decimal::new(450, 2), "hot")).await?;

        let all: Vec<String> = service.list_items().await?.into_iter().map(|i| i.name).collect();
        let cold: Vec<String> = service
            .list_items_in(Some(Category::Cold))
            .await?
            .into_iter()
            .map(|i| i.name)
            .collect();

        assert_eq!(all, vec!["Latte", "Cold Brew", "Mocha"]);
        assert_eq!(cold, vec!["Cold Brew"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_fields() -> TestResult {
        let service = memory_service();
        let created = service
            .create_item(fields("Latte", Decimal::new(400, 2), "hot"))
            .await?;

        let patch = MenuItemFields {
            name: Some("Iced Latte".into()),
            category: Some("cold".into()),
            ..MenuItemFields::default()
        };
        let updated = service.update_item(&created.id, patch).await?;

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Iced Latte");
        assert_eq!(updated.category, Category::Cold);
        assert_eq!(updated.price, created.price);
        assert_eq!(service.get_item(&created.id).await?, updated);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_partial_updates_keep_both_fields() -> TestResult {
        let client =
            StoreClient::with_store(Arc::new(SlowReads(MemoryStore::new())), Duration::from_secs(1));
        let service = CatalogService::new(Arc::new(client));
        let created = service
            .create_item(fields("Latte", Decimal::new(400, 2), "hot"))
            .await?;

        let rename = MenuItemFields {
            name: Some("Flat White".into()),
            ..MenuItemFields::default()
        };
        let reprice = MenuItemFields {
            price: Some(Decimal::new(550, 2)),
            ..MenuItemFields::default()
        };
        let (renamed, repriced) = tokio::join!(
            service.update_item(&created.id, rename),
            service.update_item(&created.id, reprice),
        );
        renamed?;
        repriced?;

        let stored = service.get_item(&created.id).await?;
        assert_eq!(stored.name, "Flat White");
        assert_eq!(stored.price, Decimal::new(550, 2));
        assert!(service.updates.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_unknown_item_is_not_found() {
        let service = memory_service();

        let result = service
            .update_item("missing", fields("Latte", Decimal::ONE, "hot"))
            .await;

        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_create_never_reaches_store() {
        let mut store = MockDocumentStore::new();
        store.expect_insert().never();

        let result = mock_service(store)
            .create_item(fields("Latte", Decimal::ONE, "lukewarm"))
            .await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_store_failure_is_unavailable() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find_all()
            .once()
            .returning(|_| Err(StoreError::Connection("connection reset".into())));

        let result = mock_service(store).list_items().await;

        assert!(matches!(result, Err(CatalogError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_malformed_document_is_unavailable() {
        let mut store = MockDocumentStore::new();
        store.expect_find_by_id().once().returning(|_, _| {
            let mut document = Document::new();
            document.insert("_id".into(), json!("x"));
            document.insert("category".into(), json!("tepid"));
            Ok(Some(document))
        });

        let result = mock_service(store).get_item("x").await;

        assert!(matches!(
            result,
            Err(CatalogError::StoreUnavailable(StoreError::Serialization(_)))
        ));
    }

    #[tokio::test]
    async fn test_update_of_concurrently_deleted_item_is_not_found() {
        let mut store = MockDocumentStore::new();
        store.expect_find_by_id().once().returning(|_, id| {
            let document = json!({
                "_id": id,
                "name": "Latte",
                "price": 4.0,
                "description": "...",
                "image": "...",
                "category": "hot",
                "popular": false
            });
            Ok(document.as_object().cloned())
        });
        store.expect_update_by_id().once().returning(|_, _, _| Ok(None));

        let result = mock_service(store)
            .update_item("gone", MenuItemFields::default())
            .await;

        assert!(matches!(result, Err(CatalogError::NotFound(id)) if id == "gone"));
    }
}
