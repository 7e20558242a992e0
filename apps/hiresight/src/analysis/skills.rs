//! Skill Inference Engine: confidence-scored technology detection.
//!
//! Evidence is collected per technology across repositories, then each of the
//! four evidence kinds is normalized against the candidate's own maximum:
//!
//! confidence = w_loc·loc/max_loc + w_repo·repos/max_repos
//!            + w_recency·recency + w_complexity·complexity/max_complexity
//!
//! Recency is already a 0–1 fraction (linear decay over the lookback window).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::analysis::catalog::{normalize, TechnologyCatalog};
use crate::analysis::recency::{linear_recency, round2};
use crate::config::SkillWeights;
use crate::errors::ConfigError;
use crate::models::analysis::{SkillCategory, SkillEvidence, SkillRecord};
use crate::models::bundle::RepositorySnapshot;

const MAX_EVIDENCE_REPOS: usize = 3;
const CI_TECHNOLOGY_KEY: &str = "ci";

/// Per-technology evidence accumulated across repositories.
#[derive(Debug, Default)]
struct Accumulator {
    /// Display name, first form seen.
    name: String,
    category: Option<SkillCategory>,
    lines_of_code: u64,
    repos: BTreeSet<usize>,
    complexity: f64,
    last_used: Option<DateTime<Utc>>,
    first_seen: Option<DateTime<Utc>>,
    repo_names: Vec<String>,
}

/// What one repository contributes to one technology.
struct RepoTouch {
    name: String,
    category: SkillCategory,
    lines_of_code: u64,
    complexity: f64,
}

pub struct SkillInferenceEngine {
    weights: SkillWeights,
    catalog: Arc<TechnologyCatalog>,
}

impl SkillInferenceEngine {
    pub fn new(weights: SkillWeights, catalog: Arc<TechnologyCatalog>) -> Result<Self, ConfigError> {
        weights.validate()?;
        Ok(Self { weights, catalog })
    }

    /// Builds the skill inventory, ordered by confidence (desc) then name (asc).
    /// Zero repositories yields an empty inventory.
    pub fn infer(
        &self,
        repositories: &[RepositorySnapshot],
        reference: DateTime<Utc>,
    ) -> Vec<SkillRecord> {
        // Keyed by normalized name so `zig` and `Zig` share one record.
        let mut evidence: BTreeMap<String, Accumulator> = BTreeMap::new();

        for (idx, repo) in repositories.iter().enumerate() {
            for (key, touch) in self.touches(repo) {
                let acc = evidence.entry(key).or_default();
                if acc.name.is_empty() {
                    acc.name = touch.name;
                }
                acc.category.get_or_insert(touch.category);
                acc.lines_of_code += touch.lines_of_code;
                acc.complexity += touch.complexity;

                if acc.repos.insert(idx) && acc.repo_names.len() < MAX_EVIDENCE_REPOS {
                    acc.repo_names.push(repo.name.clone());
                }
                if let Some(at) = repo.last_commit_at {
                    acc.last_used = acc.last_used.max(Some(at));
                }
                if let Some(at) = repo.created_at.or(repo.last_commit_at) {
                    acc.first_seen = Some(acc.first_seen.map_or(at, |seen| seen.min(at)));
                }
            }
        }

        let max_loc = evidence.values().map(|a| a.lines_of_code).max().unwrap_or(0);
        let max_repos = evidence.values().map(|a| a.repos.len()).max().unwrap_or(0);
        let max_complexity = evidence
            .values()
            .map(|a| a.complexity)
            .fold(0.0_f64, f64::max);

        let mut skills: Vec<SkillRecord> = evidence
            .into_iter()
            .filter_map(|(_, acc)| {
                let recency = acc
                    .last_used
                    .map(|at| linear_recency(at, reference, self.weights.recency_lookback_months))
                    .unwrap_or(0.0);

                let no_evidence = acc.lines_of_code == 0
                    && acc.repos.is_empty()
                    && recency == 0.0
                    && acc.complexity == 0.0;
                if no_evidence {
                    return None;
                }

                let confidence = self.weights.lines_of_code
                    * fraction(acc.lines_of_code as f64, max_loc as f64)
                    + self.weights.repo_count * fraction(acc.repos.len() as f64, max_repos as f64)
                    + self.weights.recency * recency
                    + self.weights.complexity * fraction(acc.complexity, max_complexity);

                Some(SkillRecord {
                    name: acc.name,
                    category: acc.category.unwrap_or(SkillCategory::Tool),
                    confidence: round2(confidence.clamp(0.0, 100.0)),
                    last_used: acc.last_used,
                    evidence: SkillEvidence {
                        lines_of_code: acc.lines_of_code,
                        repo_count: acc.repos.len() as u32,
                        recency: round2(recency),
                        complexity: round2(acc.complexity),
                        first_seen: acc.first_seen,
                        repositories: acc.repo_names,
                    },
                })
            })
            .collect();

        skills.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.name.cmp(&b.name))
        });

        debug!(
            repositories = repositories.len(),
            skills = skills.len(),
            "skill inference complete"
        );
        skills
    }

    /// Every technology a single repository gives evidence for, keyed by
    /// normalized canonical name. A technology seen several ways in one repo
    /// keeps the largest complexity contribution.
    fn touches(&self, repo: &RepositorySnapshot) -> BTreeMap<String, RepoTouch> {
        let mut touched: BTreeMap<String, RepoTouch> = BTreeMap::new();
        let base_complexity = repo.size_kb as f64 / 1000.0 + 2.0 * repo.stars as f64 + repo.forks as f64;

        // normalized name → (first display form, LOC)
        let mut languages: BTreeMap<String, (&str, u64)> = BTreeMap::new();
        for (name, loc) in repo.languages.iter().filter(|(name, _)| !name.trim().is_empty()) {
            languages.entry(normalize(name)).or_insert((name.trim(), 0)).1 += *loc;
        }
        if let Some(primary) = repo.language.as_deref().filter(|l| !l.trim().is_empty()) {
            languages.entry(normalize(primary)).or_insert((primary.trim(), 0));
        }
        let total_loc: u64 = languages.values().map(|(_, loc)| loc).sum();

        for (language, loc) in languages.into_values() {
            let share = if total_loc > 0 {
                loc as f64 / total_loc as f64
            } else {
                1.0
            };
            let (name, category) = match self.catalog.lookup(language) {
                Some(entry) => (entry.name.clone(), entry.category),
                None => (language.to_string(), SkillCategory::Language),
            };
            merge_touch(
                &mut touched,
                RepoTouch {
                    name,
                    category,
                    lines_of_code: loc,
                    complexity: base_complexity + share * 10.0,
                },
            );
        }

        let dependency_hits = repo
            .dependency_manifest
            .iter()
            .filter_map(|dep| self.catalog.resolve_dependency(dep));
        let ci_hit = repo
            .has_ci
            .then(|| self.catalog.lookup(CI_TECHNOLOGY_KEY))
            .flatten();

        for entry in dependency_hits.chain(ci_hit) {
            merge_touch(
                &mut touched,
                RepoTouch {
                    name: entry.name.clone(),
                    category: entry.category,
                    lines_of_code: 0,
                    complexity: base_complexity,
                },
            );
        }

        touched
    }
}

fn merge_touch(touched: &mut BTreeMap<String, RepoTouch>, touch: RepoTouch) {
    let key = normalize(&touch.name);
    match touched.get_mut(&key) {
        Some(existing) => {
            existing.lines_of_code += touch.lines_of_code;
            existing.complexity = existing.complexity.max(touch.complexity);
        }
        None => {
            touched.insert(key, touch);
        }
    }
}

fn fraction(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
