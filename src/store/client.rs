//! Store Client
//!
//! The single, process-wide handle to the document store. The connection is
//! opened on first use and shared afterwards; callers that arrive while the
//! first attempt is in flight wait on that same attempt instead of opening
//! their own. A failed attempt leaves the client unconnected so the next
//! caller tries again.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{error, info};

use super::{memory::MemoryStore, redis_store::RedisStore, DocumentStore, StoreError};

/// Opens a connection to a document store.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>, StoreError>;
}

/// Connector chosen from a connection string's scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlConnector {
    /// `memory://`
    Memory,
    /// `redis://` or `rediss://`, carrying the full url.
    Redis(String),
}

impl UrlConnector {
    pub fn parse(url: &str) -> Result<Self, StoreError> {
        match url.split_once("://").map(|(scheme, _)| scheme) {
            Some("memory") => Ok(Self::Memory),
            Some("redis" | "rediss") => Ok(Self::Redis(url.to_string())),
            _ => Err(StoreError::InvalidUrl(url.to_string())),
        }
    }
}

#[async_trait]
impl Connector for UrlConnector {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>, StoreError> {
        match self {
            Self::Memory => Ok(Arc::new(MemoryStore::new())),
            Self::Redis(url) => Ok(Arc::new(RedisStore::connect(url).await?)),
        }
    }
}

/// Hands out a store that already exists.
struct Preconnected(Arc<dyn DocumentStore>);

#[async_trait]
impl Connector for Preconnected {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>, StoreError> {
        Ok(Arc::clone(&self.0))
    }
}

pub struct StoreClient {
    connector: Box<dyn Connector>,
    store: OnceCell<Arc<dyn DocumentStore>>,
    timeout: Duration,
}

impl StoreClient {
    /// Creates an unconnected client; nothing is dialled until [`Self::store`].
    pub fn new(connector: impl Connector + 'static, timeout: Duration) -> Self {
        Self {
            connector: Box::new(connector),
            store: OnceCell::new(),
            timeout,
        }
    }

    /// Creates a client for a connection string, rejecting unknown schemes
    /// up front.
    pub fn from_url(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        Ok(Self::new(UrlConnector::parse(url)?, timeout))
    }

    /// Wraps an existing store.
    pub fn with_store(store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self::new(Preconnected(store), timeout)
    }

    /// Returns the shared store, connecting on first use.
    pub async fn store(&self) -> Result<Arc<dyn DocumentStore>, StoreError> {
        self.store
            .get_or_try_init(|| async {
                info!("establishing store connection");

                self.bounded(self.connector.connect()).await.map_err(|e| {
                    error!("store connection failed: {e}");
                    e
                })
            })
            .await
            .map(Arc::clone)
    }

    /// Whether a connection has been established.
    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }

    /// Runs a store call, failing with [`StoreError::Timeout`] if it overruns
    /// the configured limit.
    pub async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_elapsed| StoreError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::future::join_all;
    use testresult::TestResult;

    use super::*;

    /// Counts attempts; fails the first `failures` of them.
    struct CountingConnector {
        attempts: Arc<AtomicUsize>,
        failures: usize,
        latency: Duration,
    }

    #[async_trait]
    impl Connector for CountingConnector {
        async fn connect(&self) -> Result<Arc<dyn DocumentStore>, StoreError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;

            if attempt < self.failures {
                return Err(StoreError::Connection("refused".into()));
            }

            Ok(Arc::new(MemoryStore::new()))
        }
    }

    fn counting_client(failures: usize) -> (StoreClient, Arc<AtomicUsize>) {
        let attempts = Arc::new(AtomicUsize::new(0));
        let connector = CountingConnector {
            attempts: Arc::clone(&attempts),
            failures,
            latency: Duration::from_millis(50),
        };

        (
            StoreClient::new(connector, Duration::from_secs(5)),
            attempts,
        )
    }

    #[test]
    fn test_parse_connection_strings() {
        assert_eq!(UrlConnector::parse("memory://").ok(), Some(UrlConnector::Memory));
        assert_eq!(
            UrlConnector::parse("redis://127.0.0.1:6379/0").ok(),
            Some(UrlConnector::Redis("redis://127.0.0.1:6379/0".into()))
        );
        assert!(UrlConnector::parse("rediss://cache.internal").is_ok());
        assert!(matches!(
            UrlConnector::parse("mongodb://localhost"),
            Err(StoreError::InvalidUrl(_))
        ));
        assert!(UrlConnector::parse("localhost:6379").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_attempt() -> TestResult {
        let (client, attempts) = counting_client(0);

        let results = join_all((0..8).map(|_| client.store())).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(client.is_connected());

        client.store().await?;
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_attempt_is_retried() -> TestResult {
        let (client, attempts) = counting_client(1);

        assert!(matches!(
            client.store().await,
            Err(StoreError::Connection(_))
        ));
        assert!(!client.is_connected());

        client.store().await?;
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_connect_times_out() {
        struct Hanging;

        #[async_trait]
        impl Connector for Hanging {
            async fn connect(&self) -> Result<Arc<dyn DocumentStore>, StoreError> {
                std::future::pending().await
            }
        }

        let client = StoreClient::new(Hanging, Duration::from_millis(100));

        assert!(matches!(client.store().await, Err(StoreError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_with_store_hands_out_same_instance() -> TestResult {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let client = StoreClient::with_store(Arc::clone(&store), Duration::from_secs(1));

        assert!(Arc::ptr_eq(&client.store().await?, &store));
        Ok(())
    }
}
