//! Profile analysis pipeline.
//!
//! `ProfileAnalyzer` wires the per-dimension analyzers together. Each one is
//! built from its own slice of `EngineConfig` and validated at construction;
//! `analyze` itself never fails. Missing data produces zeroed metrics.

pub mod catalog;
pub mod contribution;
pub mod quality;
pub mod recency;
pub mod sentiment;
pub mod skills;
pub mod trajectory;
pub mod work_style;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::errors::ConfigError;
use crate::models::analysis::{AnalysisResult, DataCoverage};
use crate::models::bundle::ProfileBundle;

use catalog::TechnologyCatalog;
use contribution::ContributionAnalyzer;
use quality::QualityAssessor;
use skills::SkillInferenceEngine;
use trajectory::TrajectoryAnalyzer;
use work_style::WorkStyleClassifier;

pub struct ProfileAnalyzer {
    skills: SkillInferenceEngine,
    contribution: ContributionAnalyzer,
    work_style: WorkStyleClassifier,
    quality: QualityAssessor,
    trajectory: TrajectoryAnalyzer,
}

impl ProfileAnalyzer {
    pub fn new(config: &EngineConfig, catalog: Arc<TechnologyCatalog>) -> Result<Self, ConfigError> {
        Ok(Self {
            skills: SkillInferenceEngine::new(config.skills.clone(), catalog.clone())?,
            contribution: ContributionAnalyzer::new(config.contribution.clone())?,
            work_style: WorkStyleClassifier::new(config.work_style.clone())?,
            quality: QualityAssessor::new(config.quality.clone(), catalog)?,
            trajectory: TrajectoryAnalyzer::new(config.trajectory.clone())?,
        })
    }

    /// Pure function of the bundle: the same bundle always yields the same result.
    pub fn analyze(&self, bundle: &ProfileBundle) -> AnalysisResult {
        let reference = bundle.reference_time();
        let coverage = coverage_of(bundle);
        let reduced_confidence = coverage.is_partial();

        if coverage.is_empty() {
            warn!(candidate = %bundle.candidate_key(), "bundle has no activity data");
        } else if reduced_confidence {
            warn!(
                candidate = %bundle.candidate_key(),
                commits = coverage.commits,
                pull_requests = coverage.pull_requests,
                reviews = coverage.reviews,
                "partial bundle, results carry reduced confidence"
            );
        }

        let skills = self.skills.infer(&bundle.repositories, reference);
        let contribution = self.contribution.analyze(bundle, reference);
        let work_style = self.work_style.classify(&contribution);
        let code_quality = self.quality.assess(bundle, reference);
        let learning = self.trajectory.analyze(&skills, bundle, reference);

        info!(
            candidate = %bundle.candidate_key(),
            skills = skills.len(),
            work_style = %work_style.style,
            quality = code_quality.tier.label(),
            "profile analyzed"
        );

        AnalysisResult {
            candidate: bundle.candidate_key().to_string(),
            analyzed_at: reference,
            skills,
            contribution,
            work_style,
            code_quality,
            learning,
            coverage,
            reduced_confidence,
        }
    }
}

fn coverage_of(bundle: &ProfileBundle) -> DataCoverage {
    DataCoverage {
        repositories: !bundle.repositories.is_empty(),
        commits: !bundle.commits.is_empty(),
        pull_requests: !bundle.pull_requests.is_empty(),
        reviews: !bundle.reviews.is_empty(),
    }
}
