//! HireSight profile analysis and matching engine.
//!
//! `analyze(bundle)` → `AnalysisResult`, `match_job(analysis, job)` →
//! `MatchResult` and `detect_bias(job)` → `BiasReport`, all exposed through
//! [`Engine`]. Every operation is a deterministic function of its inputs.

pub mod analysis;
pub mod bias;
pub mod cache;
pub mod config;
pub mod engine;
pub mod errors;
pub mod matching;
pub mod models;
pub mod state;

pub use analysis::catalog::TechnologyCatalog;
pub use bias::{BiasCategory, BiasDetector, BiasReport};
pub use cache::{MemoryProfileCache, ProfileCache, RedisProfileCache};
pub use config::{Config, EngineConfig};
pub use engine::Engine;
pub use errors::{CacheError, ConfigError, EngineError};
pub use models::analysis::AnalysisResult;
pub use models::bundle::ProfileBundle;
pub use models::job::JobRequirement;
pub use models::matching::{MatchResult, MatchTier};
pub use state::AppState;
