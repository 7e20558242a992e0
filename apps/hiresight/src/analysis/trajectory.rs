//! Learning Trajectory Analyzer.
//!
//! Velocity is distinct skills per active month, placed on a reference
//! percentile curve; the growth label is a bucket of that percentile.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::analysis::recency::{linear_recency, month_index, months_between, round2};
use crate::config::{TrajectorySettings, VelocityPoint};
use crate::errors::ConfigError;
use crate::models::analysis::{GrowthLabel, LearningTrajectory, SkillAcquisition, SkillRecord};
use crate::models::bundle::ProfileBundle;

pub struct TrajectoryAnalyzer {
    settings: TrajectorySettings,
}

impl TrajectoryAnalyzer {
    pub fn new(settings: TrajectorySettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn analyze(
        &self,
        skills: &[SkillRecord],
        bundle: &ProfileBundle,
        reference: DateTime<Utc>,
    ) -> LearningTrajectory {
        let mut timeline: Vec<SkillAcquisition> = skills
            .iter()
            .filter_map(|skill| {
                skill.evidence.first_seen.map(|first_seen| SkillAcquisition {
                    skill: skill.name.clone(),
                    category: skill.category,
                    first_seen,
                })
            })
            .collect();
        timeline.sort_by(|a, b| {
            a.first_seen
                .cmp(&b.first_seen)
                .then_with(|| a.skill.cmp(&b.skill))
        });

        let distinct_skills = skills.len();
        let distinct_categories = skills
            .iter()
            .map(|s| s.category)
            .collect::<BTreeSet<_>>()
            .len();

        let activity: Vec<DateTime<Utc>> = activity_dates(bundle)
            .filter(|at| *at <= reference)
            .collect();
        let active_months = activity
            .iter()
            .map(|&at| month_index(at))
            .collect::<BTreeSet<_>>()
            .len() as u32;

        let learning_velocity = if distinct_skills == 0 {
            0.0
        } else {
            distinct_skills as f64 / active_months.max(1) as f64
        };
        let velocity_percentile = percentile_of(learning_velocity, &self.settings.velocity_reference);
        let diversification = if distinct_skills == 0 {
            0.0
        } else {
            distinct_categories as f64 / distinct_skills as f64
        };

        let recent_skills = timeline
            .iter()
            .filter(|a| {
                a.first_seen <= reference
                    && months_between(a.first_seen, reference) <= self.settings.recent_skill_months
            })
            .map(|a| a.skill.clone())
            .collect();

        let last_activity = activity.iter().max().copied();
        let months_since_last_activity = last_activity.map(|at| round2(months_between(at, reference)));
        let activity_recency = last_activity
            .map(|at| linear_recency(at, reference, self.settings.activity_window_months))
            .unwrap_or(0.0);

        let growth_label = self.growth_label(velocity_percentile);

        debug!(
            distinct_skills,
            active_months,
            velocity = round2(learning_velocity),
            percentile = round2(velocity_percentile),
            "learning trajectory analyzed"
        );

        LearningTrajectory {
            timeline,
            distinct_skills,
            distinct_categories,
            active_months,
            learning_velocity: round2(learning_velocity),
            velocity_percentile: round2(velocity_percentile),
            diversification: round2(diversification),
            recent_skills,
            months_since_last_activity,
            activity_recency: round2(activity_recency),
            growth_label,
        }
    }

    fn growth_label(&self, percentile: f64) -> GrowthLabel {
        if percentile >= self.settings.high_percentile {
            GrowthLabel::High
        } else if percentile >= self.settings.moderate_percentile {
            GrowthLabel::Moderate
        } else {
            GrowthLabel::Low
        }
    }
}

/// Every dated event in the bundle: commits plus repository creation and
/// last-commit stamps.
fn activity_dates(bundle: &ProfileBundle) -> impl Iterator<Item = DateTime<Utc>> + '_ {
    let repo_dates = bundle
        .repositories
        .iter()
        .flat_map(|r| [r.created_at, r.last_commit_at]);
    bundle
        .commits
        .iter()
        .map(|c| c.date)
        .chain(repo_dates)
        .flatten()
}

/// Piecewise-linear lookup on a curve sorted by velocity. Values outside the
/// curve clamp to its end points.
pub fn percentile_of(velocity: f64, curve: &[VelocityPoint]) -> f64 {
    let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
        return 0.0;
    };
    if velocity <= first.velocity {
        return first.percentile;
    }
    if velocity >= last.velocity {
        return last.percentile;
    }
    curve
        .windows(2)
        .find(|w| velocity <= w[1].velocity)
        .map(|w| {
            let span = w[1].velocity - w[0].velocity;
            let t = (velocity - w[0].velocity) / span;
            w[0].percentile + t * (w[1].percentile - w[0].percentile)
        })
        .unwrap_or(last.percentile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{SkillCategory, SkillEvidence};
    use crate::models::bundle::{Commit, RepositorySnapshot};
    use chrono::{Duration, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
    }

    fn analyzer() -> TrajectoryAnalyzer {
        TrajectoryAnalyzer::new(TrajectorySettings::default()).unwrap()
    }

    fn make_skill(name: &str, category: SkillCategory, months_ago: i64) -> SkillRecord {
        SkillRecord {
            name: name.to_string(),
            category,
            confidence: 50.0,
            last_used: Some(reference()),
            evidence: SkillEvidence {
                lines_of_code: 100,
                repo_count: 1,
                recency: 1.0,
                complexity: 1.0,
                first_seen: Some(reference() - Duration::days(months_ago * 30)),
                repositories: vec!["repo".to_string()],
            },
        }
    }

    fn make_bundle(commit_days_ago: &[i64]) -> ProfileBundle {
        ProfileBundle {
            commits: commit_days_ago
                .iter()
                .map(|&d| Commit {
                    date: Some(reference() - Duration::days(d)),
                    message: "fix: x".to_string(),
                })
                .collect(),
            fetched_at: Some(reference()),
            ..Default::default()
        }
    }

    #[test]
    fn test_percentile_interpolates_and_clamps() {
        let curve = TrajectorySettings::default().velocity_reference;
        assert_eq!(percentile_of(0.0, &curve), 0.0);
        assert!((percentile_of(0.15, &curve) - 37.5).abs() < 1e-9);
        assert_eq!(percentile_of(0.5, &curve), 75.0);
        assert_eq!(percentile_of(50.0, &curve), 100.0);
        assert_eq!(percentile_of(1.0, &[]), 0.0);
    }

    #[test]
    fn test_velocity_and_diversification() {
        let skills = vec![
            make_skill("Python", SkillCategory::Language, 20),
            make_skill("Django", SkillCategory::Framework, 10),
            make_skill("Flask", SkillCategory::Framework, 3),
            make_skill("Rust", SkillCategory::Language, 1),
        ];
        // Four distinct calendar months of commits.
        let bundle = make_bundle(&[1, 40, 70, 100]);
        let t = analyzer().analyze(&skills, &bundle, reference());
        assert_eq!(t.active_months, 4);
        assert_eq!(t.learning_velocity, 1.0);
        assert_eq!(t.diversification, 0.5);
        assert_eq!(t.velocity_percentile, 90.0);
        assert_eq!(t.growth_label, GrowthLabel::High);
    }

    #[test]
    fn test_timeline_sorted_and_recent_skills() {
        let skills = vec![
            make_skill("Rust", SkillCategory::Language, 1),
            make_skill("Python", SkillCategory::Language, 20),
            make_skill("Docker", SkillCategory::Devops, 1),
        ];
        let t = analyzer().analyze(&skills, &make_bundle(&[1]), reference());
        let order: Vec<&str> = t.timeline.iter().map(|a| a.skill.as_str()).collect();
        assert_eq!(order, vec!["Python", "Docker", "Rust"]);
        assert_eq!(t.recent_skills, vec!["Docker".to_string(), "Rust".to_string()]);
    }

    #[test]
    fn test_growth_label_buckets() {
        let a = analyzer();
        assert_eq!(a.growth_label(10.0), GrowthLabel::Low);
        assert_eq!(a.growth_label(40.0), GrowthLabel::Moderate);
        assert_eq!(a.growth_label(74.9), GrowthLabel::Moderate);
        assert_eq!(a.growth_label(75.0), GrowthLabel::High);
    }

    #[test]
    fn test_activity_recency_decays() {
        let fresh = analyzer().analyze(&[], &make_bundle(&[0]), reference());
        assert_eq!(fresh.activity_recency, 1.0);
        assert_eq!(fresh.months_since_last_activity, Some(0.0));

        let stale = analyzer().analyze(&[], &make_bundle(&[600]), reference());
        assert_eq!(stale.activity_recency, 0.0);
    }

    #[test]
    fn test_empty_input_is_zero() {
        let t = analyzer().analyze(&[], &ProfileBundle::default(), reference());
        assert_eq!(t.distinct_skills, 0);
        assert_eq!(t.learning_velocity, 0.0);
        assert_eq!(t.velocity_percentile, 0.0);
        assert_eq!(t.activity_recency, 0.0);
        assert_eq!(t.months_since_last_activity, None);
        assert_eq!(t.growth_label, GrowthLabel::Low);
    }

    #[test]
    fn test_repository_dates_count_as_activity() {
        let bundle = ProfileBundle {
            repositories: vec![RepositorySnapshot {
                name: "r".to_string(),
                created_at: Some(reference() - Duration::days(200)),
                last_commit_at: Some(reference() - Duration::days(5)),
                ..Default::default()
            }],
            ..Default::default()
        };
        let t = analyzer().analyze(&[], &bundle, reference());
        assert_eq!(t.active_months, 2);
    }
}
