use std::sync::Arc;

use tracing::info;

use crate::analysis::catalog::TechnologyCatalog;
use crate::analysis::ProfileAnalyzer;
use crate::bias::{BiasDetector, BiasReport};
use crate::cache::ProfileCache;
use crate::config::EngineConfig;
use crate::errors::{ConfigError, EngineError};
use crate::matching::MatchingEngine;
use crate::models::analysis::AnalysisResult;
use crate::models::bundle::ProfileBundle;
use crate::models::job::JobRequirement;
use crate::models::matching::MatchResult;

/// The three operations callers use: `analyze`, `match_job`, `detect_bias`.
///
/// Holds no mutable state, so one instance can serve any number of
/// concurrent analyses.
pub struct Engine {
    analyzer: ProfileAnalyzer,
    matcher: MatchingEngine,
    bias: BiasDetector,
}

impl Engine {
    /// Fails fast on any invalid weight or threshold.
    pub fn new(config: EngineConfig, catalog: Arc<TechnologyCatalog>) -> Result<Self, ConfigError> {
        config.validate()?;
        let analyzer = ProfileAnalyzer::new(&config, catalog.clone())?;
        let matcher = MatchingEngine::new(config.matching, config.quality.tier_scores, catalog)?;
        info!("analysis engine ready");
        Ok(Self {
            analyzer,
            matcher,
            bias: BiasDetector::new(),
        })
    }

    /// Default configuration and the embedded technology catalog.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(EngineConfig::default(), Arc::new(TechnologyCatalog::embedded()?))
    }

    pub fn analyze(&self, bundle: &ProfileBundle) -> AnalysisResult {
        self.analyzer.analyze(bundle)
    }

    pub fn match_job(&self, analysis: &AnalysisResult, job: &JobRequirement) -> MatchResult {
        self.matcher.match_job(analysis, job)
    }

    pub fn detect_bias(&self, job: &JobRequirement) -> BiasReport {
        self.bias.detect(job)
    }

    /// Analyzes the bundle cached under `key`. A miss is reported as
    /// `MissingBundle` so the caller can fetch and populate.
    pub async fn analyze_cached(
        &self,
        cache: &dyn ProfileCache,
        key: &str,
    ) -> Result<AnalysisResult, EngineError> {
        let bundle = cache
            .get(key)
            .await?
            .ok_or_else(|| EngineError::MissingBundle(key.to_string()))?;
        Ok(self.analyze(&bundle))
    }
}
