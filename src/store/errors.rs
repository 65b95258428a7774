//! Store Errors

use std::time::Duration;

use thiserror::Error;

/// Failures raised while reaching or querying the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The connection string could not be understood.
    #[error("invalid store url `{0}`: expected memory://, redis:// or rediss://")]
    InvalidUrl(String),

    /// The connection could not be established.
    #[error("failed to connect to store: {0}")]
    Connection(String),

    /// A store call did not complete in time.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// The Redis backend reported an error.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored document could not be encoded or decoded.
    #[error("malformed document: {0}")]
    Serialization(#[from] serde_json::Error),
}
