use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tracing::{debug, info};

use crate::cache::ProfileCache;
use crate::errors::CacheError;
use crate::models::bundle::ProfileBundle;

const KEY_PREFIX: &str = "hiresight:profile:";
const SCAN_BATCH: usize = 100;

pub fn profile_key(key: &str) -> String {
    format!("{KEY_PREFIX}{key}")
}

/// Shared store for multi-process deployments. Bundles are stored as JSON
/// and expire through Redis `EX`.
#[derive(Clone)]
pub struct RedisProfileCache {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisProfileCache {
    pub async fn connect(redis_url: &str, ttl: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis profile cache connected");
        Ok(Self {
            conn,
            // Redis rejects EX 0.
            ttl_secs: ttl.as_secs().max(1),
        })
    }

    fn encode(key: &str, bundle: &ProfileBundle) -> Result<String, CacheError> {
        serde_json::to_string(bundle).map_err(|source| CacheError::Serialization {
            key: key.to_string(),
            source,
        })
    }

    fn decode(key: &str, raw: &str) -> Result<Arc<ProfileBundle>, CacheError> {
        serde_json::from_str(raw)
            .map(Arc::new)
            .map_err(|source| CacheError::Serialization {
                key: key.to_string(),
                source,
            })
    }
}

#[async_trait]
impl ProfileCache for RedisProfileCache {
    async fn get(&self, key: &str) -> Result<Option<Arc<ProfileBundle>>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("GET")
            .arg(profile_key(key))
            .query_async(&mut conn)
            .await?;
        raw.map(|raw| Self::decode(key, &raw)).transpose()
    }

    async fn set(&self, key: &str, bundle: Arc<ProfileBundle>) -> Result<(), CacheError> {
        let payload = Self::encode(key, &bundle)?;
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(profile_key(key))
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!(key, ttl_secs = self.ttl_secs, "cached profile bundle in redis");
        Ok(())
    }

    async fn populate(
        &self,
        key: &str,
        bundle: Arc<ProfileBundle>,
    ) -> Result<Arc<ProfileBundle>, CacheError> {
        let payload = Self::encode(key, &bundle)?;
        let mut conn = self.conn.clone();
        let written: Option<String> = redis::cmd("SET")
            .arg(profile_key(key))
            .arg(payload)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await?;
        if written.is_some() {
            return Ok(bundle);
        }

        // Lost the race; hand back the winner. If it expired in between, ours stands.
        match self.get(key).await? {
            Some(existing) => Ok(existing),
            None => {
                self.set(key, bundle.clone()).await?;
                Ok(bundle)
            }
        }
    }

    async fn purge(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let removed: usize = redis::cmd("DEL")
            .arg(profile_key(key))
            .query_async(&mut conn)
            .await?;
        Ok(removed > 0)
    }

    async fn purge_all(&self) -> Result<usize, CacheError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{KEY_PREFIX}*");
        let mut cursor: u64 = 0;
        let mut removed = 0usize;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            if !keys.is_empty() {
                removed += redis::cmd("DEL")
                    .arg(&keys)
                    .query_async::<_, usize>(&mut conn)
                    .await?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(removed, "purged all profile bundles from redis");
        Ok(removed)
    }

    async fn is_expired(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        // -2: no such key, -1: no expiry set
        let ttl: i64 = redis::cmd("TTL")
            .arg(profile_key(key))
            .query_async(&mut conn)
            .await?;
        Ok(ttl == -2)
    }
}
