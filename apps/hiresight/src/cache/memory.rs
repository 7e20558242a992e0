use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::cache::ProfileCache;
use crate::errors::CacheError;
use crate::models::bundle::ProfileBundle;

struct CacheEntry {
    bundle: Arc<ProfileBundle>,
    stored_at: Instant,
}

impl CacheEntry {
    fn new(bundle: Arc<ProfileBundle>) -> Self {
        Self {
            bundle,
            stored_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() >= ttl
    }
}

/// In-process store. Reads take a shard read lock only. Expired entries are
/// evicted when read, and every write sweeps the rest.
pub struct MemoryProfileCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MemoryProfileCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut evicted = 0;
        self.entries.retain(|_, entry| {
            if entry.is_expired(self.ttl) {
                evicted += 1;
                false
            } else {
                true
            }
        });
        if evicted > 0 {
            debug!(evicted, "swept expired profile bundles");
        }
        evicted
    }
}

#[async_trait]
impl ProfileCache for MemoryProfileCache {
    async fn get(&self, key: &str) -> Result<Option<Arc<ProfileBundle>>, CacheError> {
        let hit = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(self.ttl) => return Ok(Some(entry.bundle.clone())),
            Some(_) => true,
            None => false,
        };
        if hit {
            // Re-check under the write lock so a fresh concurrent write survives.
            self.entries.remove_if(key, |_, entry| entry.is_expired(self.ttl));
            debug!(key, "evicted expired profile bundle");
        }
        Ok(None)
    }

    async fn set(&self, key: &str, bundle: Arc<ProfileBundle>) -> Result<(), CacheError> {
        self.purge_expired();
        self.entries.insert(key.to_string(), CacheEntry::new(bundle));
        debug!(key, "cached profile bundle");
        Ok(())
    }

    async fn populate(
        &self,
        key: &str,
        bundle: Arc<ProfileBundle>,
    ) -> Result<Arc<ProfileBundle>, CacheError> {
        self.purge_expired();
        let stored = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(self.ttl) {
                    occupied.insert(CacheEntry::new(bundle.clone()));
                    bundle
                } else {
                    occupied.get().bundle.clone()
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(bundle.clone()));
                bundle
            }
        };
        Ok(stored)
    }

    async fn purge(&self, key: &str) -> Result<bool, CacheError> {
        let removed = self.entries.remove(key).is_some();
        if removed {
            debug!(key, "purged profile bundle");
        }
        Ok(removed)
    }

    async fn purge_all(&self) -> Result<usize, CacheError> {
        let count = self.entries.len();
        self.entries.clear();
        debug!(count, "purged all profile bundles");
        Ok(count)
    }

    async fn is_expired(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self
            .entries
            .get(key)
            .map(|entry| entry.is_expired(self.ttl))
            .unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bundle::ProfileMetadata;

    fn make_bundle(username: &str) -> Arc<ProfileBundle> {
        Arc::new(ProfileBundle {
            profile: ProfileMetadata {
                username: username.to_string(),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryProfileCache::new(Duration::from_secs(60));
        cache.set("octo", make_bundle("octo")).await.unwrap();
        let hit = cache.get("octo").await.unwrap().unwrap();
        assert_eq!(hit.candidate_key(), "octo");
        assert!(!cache.is_expired("octo").await.unwrap());
    }

    #[tokio::test]
    async fn test_miss_is_none_not_error() {
        let cache = MemoryProfileCache::new(Duration::from_secs(60));
        assert!(cache.get("nobody").await.unwrap().is_none());
        assert!(cache.is_expired("nobody").await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = MemoryProfileCache::new(Duration::ZERO);
        cache.set("octo", make_bundle("octo")).await.unwrap();
        assert!(cache.is_expired("octo").await.unwrap());
        assert!(cache.get("octo").await.unwrap().is_none());
        assert!(cache.is_empty(), "expired entry should be evicted on read");
    }

    #[tokio::test]
    async fn test_populate_is_first_writer_wins() {
        let cache = MemoryProfileCache::new(Duration::from_secs(60));
        let first = cache.populate("k", make_bundle("first")).await.unwrap();
        let second = cache.populate("k", make_bundle("second")).await.unwrap();
        assert_eq!(first.candidate_key(), "first");
        assert_eq!(second.candidate_key(), "first");
    }

    #[tokio::test]
    async fn test_populate_replaces_expired_entry() {
        let cache = MemoryProfileCache::new(Duration::ZERO);
        cache.populate("k", make_bundle("stale")).await.unwrap();
        let fresh = cache.populate("k", make_bundle("fresh")).await.unwrap();
        assert_eq!(fresh.candidate_key(), "fresh");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_populate_converges() {
        let cache = Arc::new(MemoryProfileCache::new(Duration::from_secs(60)));
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .populate("shared", make_bundle(&format!("writer-{i}")))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut winners = Vec::new();
        for handle in handles {
            winners.push(handle.await.unwrap().candidate_key().to_string());
        }
        let stored = cache.get("shared").await.unwrap().unwrap();
        assert!(winners.iter().all(|w| w == stored.candidate_key()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_writes_sweep_unread_expired_keys() {
        let cache = MemoryProfileCache::new(Duration::ZERO);
        cache.set("a", make_bundle("a")).await.unwrap();
        cache.set("b", make_bundle("b")).await.unwrap();
        cache.populate("c", make_bundle("c")).await.unwrap();
        // Only the latest write can survive; "a" and "b" were never read again.
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_live_entries() {
        let cache = MemoryProfileCache::new(Duration::from_secs(60));
        cache.set("a", make_bundle("a")).await.unwrap();
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_purge_single_and_all() {
        let cache = MemoryProfileCache::new(Duration::from_secs(60));
        cache.set("a", make_bundle("a")).await.unwrap();
        cache.set("b", make_bundle("b")).await.unwrap();
        cache.set("c", make_bundle("c")).await.unwrap();

        assert!(cache.purge("a").await.unwrap());
        assert!(!cache.purge("a").await.unwrap());
        assert!(cache.get("a").await.unwrap().is_none());

        assert_eq!(cache.purge_all().await.unwrap(), 2);
        assert!(cache.is_empty());
    }
}
