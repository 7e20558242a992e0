//! Cache Store: key → raw profile bundle with TTL expiry.
//!
//! The store never fetches. A miss tells the ingestion side to fetch and then
//! `populate`, which is first-writer-wins so concurrent populators converge
//! on one entry.

pub mod memory;
pub mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::CacheError;
use crate::models::bundle::ProfileBundle;

pub use memory::MemoryProfileCache;
pub use redis_store::RedisProfileCache;

/// Carried in `AppState` as `Arc<dyn ProfileCache>`; the backend is chosen at startup.
#[async_trait]
pub trait ProfileCache: Send + Sync {
    /// `Ok(None)` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<Arc<ProfileBundle>>, CacheError>;

    /// Unconditional write; replaces any existing entry and restarts its TTL.
    async fn set(&self, key: &str, bundle: Arc<ProfileBundle>) -> Result<(), CacheError>;

    /// Stores `bundle` only when no live entry exists and returns whichever
    /// entry is stored afterwards.
    async fn populate(
        &self,
        key: &str,
        bundle: Arc<ProfileBundle>,
    ) -> Result<Arc<ProfileBundle>, CacheError>;

    /// Returns whether an entry was removed.
    async fn purge(&self, key: &str) -> Result<bool, CacheError>;

    /// Returns how many entries were removed.
    async fn purge_all(&self) -> Result<usize, CacheError>;

    /// True when `key` has no live entry.
    async fn is_expired(&self, key: &str) -> Result<bool, CacheError>;
}
