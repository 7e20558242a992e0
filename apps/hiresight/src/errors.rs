use thiserror::Error;

/// Misconfiguration detected while building a component.
/// Always fatal: components refuse to construct rather than renormalize.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{group} weights must sum to 1.0, got {sum}")]
    WeightSum { group: &'static str, sum: f64 },

    #[error("{group} weight '{name}' must be a finite, non-negative number, got {value}")]
    InvalidWeight {
        group: &'static str,
        name: &'static str,
        value: f64,
    },

    #[error("Invalid thresholds for {group}: {reason}")]
    Thresholds { group: &'static str, reason: String },

    #[error("Technology catalog error: {0}")]
    Catalog(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures inside a cache backend. A miss is `Ok(None)`, never an error.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cached bundle for '{key}' could not be (de)serialized: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Umbrella error for callers driving the full pipeline.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("No cached profile bundle for '{0}'")]
    MissingBundle(String),
}
