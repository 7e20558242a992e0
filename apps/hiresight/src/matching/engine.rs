//! Matching Engine: scores one analysis against one job requirement.
//!
//! overall = w₁·current_fit + w₂·growth_potential + w₃·collaboration_fit + w₄·code_quality
//!
//! Weights are validated once in `MatchingEngine::new`. `match_job` is a pure
//! function of its two inputs.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::analysis::catalog::TechnologyCatalog;
use crate::analysis::recency::round2;
use crate::config::{MatchSettings, QualityTierScores};
use crate::errors::ConfigError;
use crate::matching::compatibility::StyleCompatibility;
use crate::models::analysis::{AnalysisResult, QualityTier, WorkStyle};
use crate::models::job::JobRequirement;
use crate::models::matching::{ComponentScores, MatchInsights, MatchResult, MatchTier};

const STRONG_SKILL_COVERAGE: f64 = 0.8;
const STRENGTH_SCORE: f64 = 70.0;
const CONSIDERATION_SCORE: f64 = 50.0;

pub struct MatchingEngine {
    settings: MatchSettings,
    tier_scores: QualityTierScores,
    compatibility: StyleCompatibility,
    catalog: Arc<TechnologyCatalog>,
}

/// Outcome of comparing a job's skill list against the inventory.
struct SkillOverlap {
    matched: Vec<(String, f64)>,
    missing: Vec<String>,
}

impl SkillOverlap {
    fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }

    /// Summed confidence of the matched skills.
    fn depth(&self) -> f64 {
        self.matched.iter().map(|(_, confidence)| confidence).sum()
    }
}

impl MatchingEngine {
    pub fn new(
        settings: MatchSettings,
        tier_scores: QualityTierScores,
        catalog: Arc<TechnologyCatalog>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        tier_scores.validate()?;
        let compatibility =
            StyleCompatibility::new(&settings.style_affinities, settings.default_style_affinity);
        Ok(Self {
            settings,
            tier_scores,
            compatibility,
            catalog,
        })
    }

    pub fn match_job(&self, analysis: &AnalysisResult, job: &JobRequirement) -> MatchResult {
        let required = self.overlap(analysis, &job.required_skills);
        let preferred = self.overlap(analysis, &job.preferred_skills);
        let mut notes = Vec::new();

        if !analysis.coverage.repositories {
            notes.push("No repositories available; every component scores zero".to_string());
            return self.finish(
                analysis,
                job,
                ComponentScores::default(),
                required,
                preferred,
                notes,
            );
        }

        if analysis.reduced_confidence {
            notes.push(
                "Activity history is incomplete; scores carry reduced confidence".to_string(),
            );
        }

        let current_fit = if job.required_skills.is_empty() {
            notes.push("Job lists no required skills; current fit is 0".to_string());
            0.0
        } else {
            self.current_fit(&required, &preferred)
        };

        let g = &self.settings.growth;
        let learning = &analysis.learning;
        let growth_potential = (g.velocity_percentile * learning.velocity_percentile
            + g.diversification * 100.0 * learning.diversification
            + g.activity_recency * 100.0 * learning.activity_recency)
            .clamp(0.0, 100.0);

        let collaboration_fit = self
            .compatibility
            .collaboration_fit(analysis.work_style.style, job.desired_work_style);

        let code_quality = self.tier_scores.score_for(analysis.code_quality.tier);

        let components = ComponentScores {
            current_fit: round2(current_fit),
            growth_potential: round2(growth_potential),
            collaboration_fit: round2(collaboration_fit),
            code_quality: round2(code_quality),
        };
        self.finish(analysis, job, components, required, preferred, notes)
    }

    /// Confidence-weighted share of required skills, plus a capped bonus for
    /// preferred skills. Never exceeds 100.
    fn current_fit(&self, required: &SkillOverlap, preferred: &SkillOverlap) -> f64 {
        if required.total() == 0 {
            return 0.0;
        }
        let base = required.depth() / required.total() as f64;

        let bonus = if preferred.total() == 0 {
            0.0
        } else {
            self.settings.preferred_bonus_cap * preferred.depth() / (100.0 * preferred.total() as f64)
        };

        (base + bonus).clamp(0.0, 100.0)
    }

    fn finish(
        &self,
        analysis: &AnalysisResult,
        job: &JobRequirement,
        components: ComponentScores,
        required: SkillOverlap,
        preferred: SkillOverlap,
        notes: Vec<String>,
    ) -> MatchResult {
        let w = &self.settings.weights;
        let overall_score = round2(
            (w.current_fit * components.current_fit
                + w.growth_potential * components.growth_potential
                + w.collaboration_fit * components.collaboration_fit
                + w.code_quality * components.code_quality)
                .clamp(0.0, 100.0),
        );
        let tier = self.tier_for(overall_score);

        let ramp_up = &self.settings.ramp_up;
        let velocity = analysis.learning.learning_velocity.max(ramp_up.epsilon);
        let ramp_up_months: BTreeMap<String, f64> = required
            .missing
            .iter()
            .map(|skill| (skill.clone(), round2(ramp_up.base_months / velocity)))
            .collect();

        let insights = self.insights(analysis, job, &components, &required);

        debug!(
            candidate = %analysis.candidate,
            job = %job.title,
            overall = overall_score,
            tier = tier.label(),
            "match scored"
        );

        MatchResult {
            candidate: analysis.candidate.clone(),
            job_title: job.title.clone(),
            overall_score,
            components,
            matched_skills: required.matched.into_iter().map(|(name, _)| name).collect(),
            missing_skills: required.missing,
            matched_preferred_skills: preferred.matched.into_iter().map(|(name, _)| name).collect(),
            ramp_up_months,
            tier,
            notes,
            insights,
        }
    }

    pub fn tier_for(&self, score: f64) -> MatchTier {
        let t = &self.settings.tiers;
        if score >= t.top {
            MatchTier::Top
        } else if score >= t.high {
            MatchTier::High
        } else if score >= t.moderate {
            MatchTier::Moderate
        } else {
            MatchTier::Low
        }
    }

    /// Splits `skills` into matched (with confidence) and missing, comparing
    /// canonical catalog names case-insensitively. Duplicates collapse.
    fn overlap(&self, analysis: &AnalysisResult, skills: &[String]) -> SkillOverlap {
        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        let mut missing = Vec::new();

        for raw in skills {
            let canonical = self.catalog.canonical_name(raw);
            if canonical.is_empty() || !seen.insert(canonical.to_lowercase()) {
                continue;
            }
            match analysis.skill(&canonical).or_else(|| analysis.skill(raw.trim())) {
                Some(record) => matched.push((record.name.clone(), record.confidence)),
                None => missing.push(canonical),
            }
        }
        SkillOverlap { matched, missing }
    }

    fn insights(
        &self,
        analysis: &AnalysisResult,
        job: &JobRequirement,
        components: &ComponentScores,
        required: &SkillOverlap,
    ) -> MatchInsights {
        let mut strengths = Vec::new();
        let mut considerations = Vec::new();

        let required_total = required.total();
        if required_total > 0
            && required.matched.len() as f64 / required_total as f64 >= STRONG_SKILL_COVERAGE
        {
            strengths.push(format!(
                "Strong skill match: {} of {} required skills",
                required.matched.len(),
                required_total
            ));
        }
        if !required.missing.is_empty() {
            considerations.push(format!(
                "Missing required skills: {}",
                required.missing.join(", ")
            ));
        }

        if components.growth_potential >= STRENGTH_SCORE {
            strengths.push("High growth potential".to_string());
        } else if components.growth_potential < CONSIDERATION_SCORE {
            considerations.push("Limited recent learning activity".to_string());
        }

        if components.collaboration_fit >= STRENGTH_SCORE {
            strengths.push(format!(
                "Work style fits the role ({})",
                analysis.work_style.style
            ));
        } else if components.collaboration_fit < CONSIDERATION_SCORE {
            considerations.push(format!(
                "Work style may not suit the role ({})",
                analysis.work_style.style
            ));
        }

        let quality_tier = analysis.code_quality.tier;
        if quality_tier >= QualityTier::Good {
            strengths.push(format!("Code quality rated {}", quality_tier.label()));
        } else if analysis.code_quality.composite < 60.0 {
            considerations.push(format!(
                "Code quality rated {}",
                quality_tier.label()
            ));
        }

        MatchInsights {
            strengths,
            considerations,
            interview_questions: interview_questions(analysis, job, required),
        }
    }
}

fn interview_questions(
    analysis: &AnalysisResult,
    job: &JobRequirement,
    required: &SkillOverlap,
) -> Vec<String> {
    let mut questions = Vec::new();
    let candidate_style = analysis.work_style.style;

    if let Some(gap) = required.missing.first() {
        questions.push(format!(
            "Can you discuss your experience with, or interest in learning, {gap}?"
        ));
    }
    if let Some(desired) = job.desired_work_style.filter(|&d| d != candidate_style) {
        questions.push(format!(
            "How do you adapt your way of working when joining a {} team?",
            desired.label().to_lowercase()
        ));
    }
    questions.push("Walk us through your approach to learning new technologies".to_string());
    questions.push("Describe a recent technical challenge and how you solved it".to_string());
    if candidate_style == WorkStyle::Mentorship {
        questions.push(
            "Tell us about your experience mentoring or helping other developers".to_string(),
        );
    }
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchWeights;
    use crate::models::analysis::{
        ContributionMetrics, DataCoverage, GrowthLabel, LearningTrajectory, QualityAssessment,
        SkillCategory, SkillEvidence, SkillRecord, WorkStyle, WorkStyleAssessment,
    };
    use chrono::{DateTime, Utc};

    fn engine() -> MatchingEngine {
        MatchingEngine::new(
            MatchSettings::default(),
            QualityTierScores::default(),
            Arc::new(TechnologyCatalog::embedded().unwrap()),
        )
        .unwrap()
    }

    fn make_skill(name: &str, confidence: f64) -> SkillRecord {
        SkillRecord {
            name: name.to_string(),
            category: SkillCategory::Language,
            confidence,
            last_used: None,
            evidence: SkillEvidence {
                lines_of_code: 0,
                repo_count: 1,
                recency: 1.0,
                complexity: 0.0,
                first_seen: None,
                repositories: vec![],
            },
        }
    }

    fn make_analysis(skills: &[(&str, f64)]) -> AnalysisResult {
        AnalysisResult {
            candidate: "octo".to_string(),
            analyzed_at: DateTime::<Utc>::default(),
            skills: skills.iter().map(|&(n, c)| make_skill(n, c)).collect(),
            contribution: ContributionMetrics::default(),
            work_style: WorkStyleAssessment {
                style: WorkStyle::Collaborative,
                rule_index: Some(1),
                indicator: String::new(),
            },
            code_quality: QualityAssessment {
                documentation: 80.0,
                testing: 80.0,
                maintenance: 80.0,
                originality: 80.0,
                composite: 80.0,
                tier: QualityTier::Excellent,
            },
            learning: LearningTrajectory {
                timeline: vec![],
                distinct_skills: skills.len(),
                distinct_categories: 1,
                active_months: 4,
                learning_velocity: 0.5,
                velocity_percentile: 80.0,
                diversification: 0.6,
                recent_skills: vec![],
                months_since_last_activity: Some(0.5),
                activity_recency: 0.9,
                growth_label: GrowthLabel::High,
            },
            coverage: DataCoverage {
                repositories: true,
                commits: true,
                pull_requests: true,
                reviews: true,
            },
            reduced_confidence: false,
        }
    }

    fn make_job(required: &[&str], preferred: &[&str]) -> JobRequirement {
        JobRequirement {
            title: "Backend Engineer".to_string(),
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            preferred_skills: preferred.iter().map(|s| s.to_string()).collect(),
            desired_work_style: Some(WorkStyle::Collaborative),
            ..Default::default()
        }
    }

    #[test]
    fn test_matched_and_missing_sets() {
        let analysis = make_analysis(&[("Python", 90.0), ("Django", 70.0), ("React", 60.0)]);
        let result = engine().match_job(&analysis, &make_job(&["Python", "Django"], &[]));
        assert_eq!(result.matched_skills, vec!["Python", "Django"]);
        assert!(result.missing_skills.is_empty());
        assert!(result.ramp_up_months.is_empty());
        assert_eq!(result.components.current_fit, 80.0);
    }

    #[test]
    fn test_confidence_weights_current_fit() {
        let strong = make_analysis(&[("Python", 90.0)]);
        let weak = make_analysis(&[("Python", 30.0)]);
        let job = make_job(&["Python"], &[]);
        assert!(
            engine().match_job(&strong, &job).components.current_fit
                > engine().match_job(&weak, &job).components.current_fit
        );
    }

    #[test]
    fn test_aliases_resolve_before_matching() {
        let analysis = make_analysis(&[("PostgreSQL", 80.0), ("JavaScript", 60.0)]);
        let result = engine().match_job(&analysis, &make_job(&["postgres", "JS", "js"], &[]));
        assert_eq!(result.matched_skills, vec!["PostgreSQL", "JavaScript"]);
        assert!(result.missing_skills.is_empty());
    }

    #[test]
    fn test_missing_skills_get_ramp_up_estimates() {
        let analysis = make_analysis(&[("Python", 90.0)]);
        let result = engine().match_job(&analysis, &make_job(&["Python", "Kubernetes"], &[]));
        assert_eq!(result.missing_skills, vec!["Kubernetes"]);
        // base 1.0 / velocity 0.5
        assert_eq!(result.ramp_up_months.get("Kubernetes"), Some(&2.0));
    }

    #[test]
    fn test_ramp_up_uses_epsilon_for_zero_velocity() {
        let mut analysis = make_analysis(&[]);
        analysis.learning.learning_velocity = 0.0;
        let result = engine().match_job(&analysis, &make_job(&["Go"], &[]));
        assert_eq!(result.ramp_up_months.get("Go"), Some(&20.0));
    }

    #[test]
    fn test_preferred_bonus_is_capped() {
        let analysis = make_analysis(&[("Python", 100.0), ("Docker", 100.0)]);
        let result = engine().match_job(&analysis, &make_job(&["Python"], &["Docker"]));
        assert_eq!(result.components.current_fit, 100.0);
        assert_eq!(result.matched_preferred_skills, vec!["Docker"]);

        let analysis = make_analysis(&[("Python", 50.0), ("Docker", 100.0)]);
        let result = engine().match_job(&analysis, &make_job(&["Python"], &["Docker"]));
        assert_eq!(result.components.current_fit, 60.0);
    }

    #[test]
    fn test_empty_required_skills_scores_zero_with_note() {
        let analysis = make_analysis(&[("Python", 90.0)]);
        let result = engine().match_job(&analysis, &make_job(&[], &["Python"]));
        assert_eq!(result.components.current_fit, 0.0);
        assert!(result.notes.iter().any(|n| n.contains("no required skills")));
    }

    #[test]
    fn test_zero_repository_analysis_is_low_match() {
        let mut analysis = make_analysis(&[]);
        analysis.coverage = DataCoverage::default();
        let result = engine().match_job(&analysis, &make_job(&["Python"], &[]));
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(result.components, ComponentScores::default());
        assert_eq!(result.tier, MatchTier::Low);
        assert_eq!(result.tier.label(), "Low Match");
        assert_eq!(result.missing_skills, vec!["Python"]);
    }

    #[test]
    fn test_overall_score_combines_components() {
        let analysis = make_analysis(&[("Python", 90.0), ("Django", 70.0)]);
        let result = engine().match_job(&analysis, &make_job(&["Python", "Django"], &[]));
        // growth = 0.5·80 + 0.25·60 + 0.25·90 = 77.5
        assert_eq!(result.components.growth_potential, 77.5);
        assert_eq!(result.components.collaboration_fit, 100.0);
        assert_eq!(result.components.code_quality, 100.0);
        // 0.4·80 + 0.3·77.5 + 0.2·100 + 0.1·100 = 85.25
        assert!((result.overall_score - 85.25).abs() < 1e-9);
        assert_eq!(result.tier, MatchTier::Top);
    }

    #[test]
    fn test_match_is_deterministic() {
        let analysis = make_analysis(&[("Python", 90.0), ("Rust", 40.0)]);
        let job = make_job(&["Python", "Go"], &["Rust"]);
        let e = engine();
        assert_eq!(e.match_job(&analysis, &job), e.match_job(&analysis, &job));
    }

    #[test]
    fn test_tier_thresholds_are_contiguous() {
        let e = engine();
        assert_eq!(e.tier_for(0.0), MatchTier::Low);
        assert_eq!(e.tier_for(49.99), MatchTier::Low);
        assert_eq!(e.tier_for(50.0), MatchTier::Moderate);
        assert_eq!(e.tier_for(69.99), MatchTier::Moderate);
        assert_eq!(e.tier_for(70.0), MatchTier::High);
        assert_eq!(e.tier_for(84.99), MatchTier::High);
        assert_eq!(e.tier_for(85.0), MatchTier::Top);
        assert_eq!(e.tier_for(100.0), MatchTier::Top);
    }

    #[test]
    fn test_insights_reflect_components() {
        let mut analysis = make_analysis(&[("Python", 90.0)]);
        analysis.work_style.style = WorkStyle::SoloDeveloper;
        let result = engine().match_job(&analysis, &make_job(&["Python", "Go"], &[]));
        assert!(result
            .insights
            .considerations
            .iter()
            .any(|c| c.contains("Missing required skills: Go")));
        assert!(result
            .insights
            .considerations
            .iter()
            .any(|c| c.contains("Work style")));
        assert!(result
            .insights
            .strengths
            .iter()
            .any(|s| s.contains("Code quality rated Excellent")));
    }

    #[test]
    fn test_interview_questions_cover_gap_and_style() {
        let mut analysis = make_analysis(&[("Python", 90.0)]);
        analysis.work_style.style = WorkStyle::SoloDeveloper;
        let result = engine().match_job(&analysis, &make_job(&["Python", "Go", "Rust"], &[]));
        let questions = &result.insights.interview_questions;

        assert_eq!(questions.len(), 4, "{questions:?}");
        assert!(questions[0].contains("learning, Go?"));
        assert!(questions[1].contains("collaborative team"));
        assert!(questions[2].starts_with("Walk us through"));
        assert!(questions[3].starts_with("Describe a recent technical challenge"));
    }

    #[test]
    fn test_interview_questions_for_matching_mentor() {
        let mut analysis = make_analysis(&[("Python", 90.0)]);
        analysis.work_style.style = WorkStyle::Mentorship;
        let mut job = make_job(&["Python"], &[]);
        job.desired_work_style = Some(WorkStyle::Mentorship);

        let questions = engine().match_job(&analysis, &job).insights.interview_questions;
        assert_eq!(questions.len(), 3, "{questions:?}");
        assert!(questions[2].contains("mentoring"));
    }

    #[test]
    fn test_bad_weights_fail_at_construction() {
        let settings = MatchSettings {
            weights: MatchWeights {
                current_fit: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = MatchingEngine::new(
            settings,
            QualityTierScores::default(),
            Arc::new(TechnologyCatalog::embedded().unwrap()),
        );
        assert!(matches!(result, Err(ConfigError::WeightSum { .. })));
    }
}
