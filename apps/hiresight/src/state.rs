use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::analysis::catalog::TechnologyCatalog;
use crate::cache::{MemoryProfileCache, ProfileCache, RedisProfileCache};
use crate::config::{Config, EngineConfig};
use crate::engine::Engine;

/// Shared runtime state for the binary: one engine, one cache backend.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    /// Redis when `REDIS_URL` is set, in-memory otherwise.
    pub cache: Arc<dyn ProfileCache>,
    pub config: Config,
}

impl AppState {
    pub async fn build(config: Config) -> Result<Self> {
        let engine_config = match &config.engine_config_path {
            Some(path) => EngineConfig::from_path(path)
                .with_context(|| format!("loading engine config from {}", path.display()))?,
            None => EngineConfig::default(),
        };

        let catalog = match &config.tech_catalog_path {
            Some(path) => TechnologyCatalog::from_path(path)
                .with_context(|| format!("loading technology catalog from {}", path.display()))?,
            None => TechnologyCatalog::embedded().context("loading embedded technology catalog")?,
        };
        info!(technologies = catalog.len(), "technology catalog ready");

        let engine = Engine::new(engine_config, Arc::new(catalog))
            .context("engine configuration is invalid")?;

        let cache: Arc<dyn ProfileCache> = match &config.redis_url {
            Some(url) => Arc::new(
                RedisProfileCache::connect(url, config.cache_ttl)
                    .await
                    .context("connecting to Redis")?,
            ),
            None => {
                info!("REDIS_URL not set, using in-memory profile cache");
                Arc::new(MemoryProfileCache::new(config.cache_ttl))
            }
        };

        Ok(Self {
            engine: Arc::new(engine),
            cache,
            config,
        })
    }
}
