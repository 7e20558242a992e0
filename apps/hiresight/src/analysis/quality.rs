//! Code Quality Assessor: composite of documentation, testing, maintenance
//! and originality, mapped onto four fixed tiers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::analysis::catalog::TechnologyCatalog;
use crate::analysis::recency::{linear_recency, months_between, round2};
use crate::config::QualitySettings;
use crate::errors::ConfigError;
use crate::models::analysis::{QualityAssessment, QualityTier};
use crate::models::bundle::{ProfileBundle, RepositorySnapshot};

/// Lower bound of each tier, best first. Contiguous over [0, 100].
const TIER_BREAKPOINTS: &[(f64, QualityTier)] = &[
    (75.0, QualityTier::Excellent),
    (60.0, QualityTier::Good),
    (40.0, QualityTier::Fair),
    (0.0, QualityTier::NeedsImprovement),
];

const MAINTENANCE_WINDOW_MONTHS: f64 = 12.0;
const MATURE_ACCOUNT_MONTHS: f64 = 24.0;

pub fn tier_for(composite: f64) -> QualityTier {
    TIER_BREAKPOINTS
        .iter()
        .find(|(floor, _)| composite >= *floor)
        .map(|&(_, tier)| tier)
        .unwrap_or(QualityTier::NeedsImprovement)
}

pub struct QualityAssessor {
    settings: QualitySettings,
    catalog: Arc<TechnologyCatalog>,
}

impl QualityAssessor {
    pub fn new(settings: QualitySettings, catalog: Arc<TechnologyCatalog>) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { settings, catalog })
    }

    pub fn assess(&self, bundle: &ProfileBundle, reference: DateTime<Utc>) -> QualityAssessment {
        let repos = &bundle.repositories;
        if repos.is_empty() {
            return QualityAssessment {
                documentation: 0.0,
                testing: 0.0,
                maintenance: 0.0,
                originality: 0.0,
                composite: 0.0,
                tier: QualityTier::NeedsImprovement,
            };
        }

        // Hygiene is judged on original work whenever there is any.
        let originals: Vec<&RepositorySnapshot> = repos.iter().filter(|r| !r.is_fork).collect();
        let judged: Vec<&RepositorySnapshot> = if originals.is_empty() {
            repos.iter().collect()
        } else {
            originals.clone()
        };

        let documentation = 100.0 * average(judged.iter().map(|r| documentation_evidence(r)));
        let testing = 100.0 * average(judged.iter().map(|r| self.testing_evidence(r)));
        let maintenance = maintenance_score(bundle, reference);
        let originality = 100.0 * originals.len() as f64 / repos.len() as f64;

        let w = &self.settings.weights;
        let composite = (w.documentation * documentation
            + w.testing * testing
            + w.maintenance * maintenance
            + w.originality * originality)
            .clamp(0.0, 100.0);
        let tier = tier_for(composite);

        debug!(
            composite = round2(composite),
            tier = tier.label(),
            repositories = repos.len(),
            "code quality assessed"
        );

        QualityAssessment {
            documentation: round2(documentation),
            testing: round2(testing),
            maintenance: round2(maintenance),
            originality: round2(originality),
            composite: round2(composite),
            tier,
        }
    }

    /// Half credit for test evidence, half for CI.
    fn testing_evidence(&self, repo: &RepositorySnapshot) -> f64 {
        let has_test_framework = repo.has_tests
            || repo
                .dependency_manifest
                .iter()
                .any(|dep| self.catalog.is_testing_framework(dep));
        let mut score = 0.0;
        if has_test_framework {
            score += 0.5;
        }
        if repo.has_ci {
            score += 0.5;
        }
        score
    }
}

fn documentation_evidence(repo: &RepositorySnapshot) -> f64 {
    let has_description = repo
        .description
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    let has_license = repo.license.as_deref().is_some_and(|l| !l.trim().is_empty());
    [repo.has_readme, has_description, has_license]
        .iter()
        .filter(|&&present| present)
        .count() as f64
        / 3.0
}

/// 60% recency of last commit across repositories, 40% account maturity.
fn maintenance_score(bundle: &ProfileBundle, reference: DateTime<Utc>) -> f64 {
    let recency = average(bundle.repositories.iter().map(|r| {
        r.last_commit_at
            .map(|at| linear_recency(at, reference, MAINTENANCE_WINDOW_MONTHS))
            .unwrap_or(0.0)
    }));
    let maturity = bundle
        .profile
        .created_at
        .map(|created| (months_between(created, reference) / MATURE_ACCOUNT_MONTHS).min(1.0))
        .unwrap_or(0.0);
    100.0 * (0.6 * recency + 0.4 * maturity)
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
