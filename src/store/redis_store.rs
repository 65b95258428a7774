//! Redis document store
//!
//! Each collection is a single Redis hash: the field is the document id and the
//! value is the JSON-encoded document. Ids are time ordered, so sorting the hash
//! fields gives creation order back.

use std::collections::BTreeMap;

use ::redis::{aio::ConnectionManager, AsyncCommands, Client, Script};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::{new_document_id, Document, DocumentStore, StoreError, ID_FIELD};

/// Overwrites a hash field only when it already exists, in one server-side
/// step. Returns 1 when the field was written.
const REPLACE_EXISTING: &str = r"
if redis.call('HEXISTS', KEYS[1], ARGV[1]) == 1 then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    return 1
end
return 0
";

pub struct RedisStore {
    manager: ConnectionManager,
    replace_existing: Script,
}

impl RedisStore {
    /// Opens a managed connection to the Redis server at `url`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let manager = client.get_connection_manager().await?;

        info!("redis store connected");

        Ok(Self {
            manager,
            replace_existing: Script::new(REPLACE_EXISTING),
        })
    }

    fn decode(raw: &str) -> Result<Document, StoreError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut conn = self.manager.clone();
        let entries: BTreeMap<String, String> = conn.hgetall(collection).await?;

        debug!(collection, count = entries.len(), "loaded documents");

        entries.values().map(String::as_str).map(Self::decode).collect()
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn.hget(collection, id).await?;

        raw.as_deref().map(Self::decode).transpose()
    }

    async fn insert(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<Document, StoreError> {
        let id = new_document_id();
        document.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        let mut conn = self.manager.clone();
        let () = conn
            .hset(collection, &id, serde_json::to_string(&document)?)
            .await?;

        Ok(document)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        mut document: Document,
    ) -> Result<Option<Document>, StoreError> {
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        let encoded = serde_json::to_string(&document)?;

        let mut conn = self.manager.clone();
        let written: i64 = self
            .replace_existing
            .key(collection)
            .arg(id)
            .arg(encoded)
            .invoke_async(&mut conn)
            .await?;

        Ok((written == 1).then_some(document))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut conn = self.manager.clone();
        let removed: i64 = conn.hdel(collection, id).await?;

        Ok(removed > 0)
    }
}
