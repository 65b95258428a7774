//! Application State
//!
//! The state shared by every handler: the catalog service and the registry of
//! live carts.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::{
    cart::state::{CartEngine, CheckoutProcessor, SimulatedProcessor},
    catalog::{CatalogService, MenuItem},
    config::ServerConfig,
    store::{StoreClient, StoreError},
};

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub catalog: CatalogService,

    /// In-memory carts, keyed by cart id.
    /// DashMap allows concurrent access without external Mutexes.
    /// Carts with a transaction history are kept for the life of the process.
    pub carts: DashMap<String, Arc<CartEngine>>,

    processor: Arc<dyn CheckoutProcessor>,
}

impl AppState {
    pub fn new(catalog: CatalogService, processor: Arc<dyn CheckoutProcessor>) -> Self {
        Self {
            catalog,
            carts: DashMap::new(),
            processor,
        }
    }

    /// Builds the state described by `config`. The store is not contacted
    /// until the first catalog call.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StoreError> {
        let client = StoreClient::from_url(&config.store_url, config.store_timeout())?;

        Ok(Self::new(
            CatalogService::new(Arc::new(client)),
            Arc::new(SimulatedProcessor::new(config.checkout_delay())),
        ))
    }

    /// Adds `item` to the cart with this id, creating the cart if needed.
    ///
    /// The item is added while the registry entry is held, so the cart cannot
    /// be evicted between lookup and insert.
    pub fn add_to_cart(&self, cart_id: &str, item: &MenuItem) -> Arc<CartEngine> {
        let entry = self
            .carts
            .entry(cart_id.to_string())
            .or_insert_with(|| Arc::new(CartEngine::new(Arc::clone(&self.processor))));
        entry.add_item(item);

        Arc::clone(entry.value())
    }

    /// Drops the cart if it no longer holds lines or history.
    pub fn release_if_idle(&self, cart_id: &str) {
        if self
            .carts
            .remove_if(cart_id, |_, engine| engine.is_idle())
            .is_some()
        {
            debug!(cart_id, "idle cart released");
        }
    }

    /// Returns the cart with this id if it has been used before.
    pub fn existing_cart(&self, cart_id: &str) -> Option<Arc<CartEngine>> {
        self.carts.get(cart_id).map(|entry| Arc::clone(entry.value()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{catalog::Category, store::memory::MemoryStore, store::StoreClient};

    use super::*;

    fn state() -> AppState {
        let client = StoreClient::with_store(Arc::new(MemoryStore::new()), Duration::from_secs(1));

        AppState::new(
            CatalogService::new(Arc::new(client)),
            Arc::new(SimulatedProcessor::new(Duration::ZERO)),
        )
    }

    fn latte() -> MenuItem {
        MenuItem {
            id: "latte".into(),
            name: "Latte".into(),
            price: Decimal::new(400, 2),
            description: String::new(),
            image: String::new(),
            category: Category::Hot,
            popular: false,
        }
    }

    #[test]
    fn test_emptied_cart_is_released() {
        let state = state();
        let engine = state.add_to_cart("c1", &latte());

        state.release_if_idle("c1");
        assert!(state.existing_cart("c1").is_some());

        engine.remove_item("latte");
        state.release_if_idle("c1");
        assert!(state.existing_cart("c1").is_none());
        assert!(state.carts.is_empty());
    }

    #[tokio::test]
    async fn test_cart_with_history_is_kept() -> TestResult {
        let state = state();
        let engine = state.add_to_cart("c1", &latte());

        engine.checkout().await?.ok_or("expected a transaction")?;
        state.release_if_idle("c1");

        let kept = state.existing_cart("c1").ok_or("cart was released")?;
        assert_eq!(kept.transactions().len(), 1);
        Ok(())
    }
}
