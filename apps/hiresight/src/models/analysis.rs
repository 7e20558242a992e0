//! Analysis Result and its per-dimension parts.
//!
//! Built fresh per `analyze` call and never mutated afterwards.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Language,
    Framework,
    Tool,
    Database,
    Devops,
}

/// Raw evidence behind a confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEvidence {
    pub lines_of_code: u64,
    pub repo_count: u32,
    /// 0.0 – 1.0, linear decay over the lookback window.
    pub recency: f64,
    pub complexity: f64,
    pub first_seen: Option<DateTime<Utc>>,
    /// Up to three supporting repository names.
    pub repositories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub name: String,
    pub category: SkillCategory,
    /// 0 – 100
    pub confidence: f64,
    pub last_used: Option<DateTime<Utc>>,
    pub evidence: SkillEvidence,
}

// ────────────────────────────────────────────────────────────────────────────
// Contribution patterns
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentClass {
    Positive,
    #[default]
    Neutral,
    Critical,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionMetrics {
    pub total_commits: usize,
    pub active_months: u32,
    /// Commits per active month inside the lookback window.
    pub commit_frequency: f64,
    /// 0 – 100, higher means steadier month-to-month output.
    pub consistency: f64,
    /// 0.0 – 1.0
    pub conventional_commit_rate: f64,
    pub avg_commit_message_length: f64,
    pub total_pull_requests: usize,
    pub merged_pull_requests: usize,
    /// 0.0 – 1.0
    pub pr_merge_rate: f64,
    pub avg_pr_discussion_length: f64,
    pub total_reviews: usize,
    pub review_to_pr_ratio: f64,
    pub avg_review_length: f64,
    /// -1.0 – 1.0
    pub review_sentiment: f64,
    pub sentiment_class: SentimentClass,
    /// Share of activity that is self-directed commits, 0.0 – 1.0.
    pub ownership_fraction: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Work style
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStyle {
    SoloDeveloper,
    Collaborative,
    Mentorship,
    AsyncFriendly,
    Balanced,
}

impl WorkStyle {
    pub fn label(&self) -> &'static str {
        match self {
            WorkStyle::SoloDeveloper => "Solo Developer",
            WorkStyle::Collaborative => "Collaborative",
            WorkStyle::Mentorship => "Mentorship",
            WorkStyle::AsyncFriendly => "Async-Friendly",
            WorkStyle::Balanced => "Balanced",
        }
    }
}

impl fmt::Display for WorkStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkStyleAssessment {
    pub style: WorkStyle,
    /// Position of the winning rule; `None` when the default applied.
    pub rule_index: Option<usize>,
    pub indicator: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Code quality
// ────────────────────────────────────────────────────────────────────────────

/// Ordered worst to best so `Ord` follows quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    NeedsImprovement,
    Fair,
    Good,
    Excellent,
}

impl QualityTier {
    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::NeedsImprovement => "Needs Improvement",
            QualityTier::Fair => "Fair",
            QualityTier::Good => "Good",
            QualityTier::Excellent => "Excellent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Each sub-score is 0 – 100.
    pub documentation: f64,
    pub testing: f64,
    pub maintenance: f64,
    pub originality: f64,
    pub composite: f64,
    pub tier: QualityTier,
}

// ────────────────────────────────────────────────────────────────────────────
// Learning trajectory
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthLabel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAcquisition {
    pub skill: String,
    pub category: SkillCategory,
    pub first_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningTrajectory {
    pub timeline: Vec<SkillAcquisition>,
    pub distinct_skills: usize,
    pub distinct_categories: usize,
    pub active_months: u32,
    /// Distinct skills acquired per active month.
    pub learning_velocity: f64,
    /// 0 – 100
    pub velocity_percentile: f64,
    /// Distinct categories ÷ distinct skills, 0.0 – 1.0.
    pub diversification: f64,
    pub recent_skills: Vec<String>,
    pub months_since_last_activity: Option<f64>,
    /// 1.0 for activity at the reference instant, 0.0 beyond the window.
    pub activity_recency: f64,
    pub growth_label: GrowthLabel,
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregate
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCoverage {
    pub repositories: bool,
    pub commits: bool,
    pub pull_requests: bool,
    pub reviews: bool,
}

impl DataCoverage {
    pub fn is_empty(&self) -> bool {
        !(self.repositories || self.commits || self.pull_requests || self.reviews)
    }

    /// Repositories exist but at least one activity section is missing.
    pub fn is_partial(&self) -> bool {
        self.repositories && !(self.commits && self.pull_requests && self.reviews)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub candidate: String,
    pub analyzed_at: DateTime<Utc>,
    /// Ordered by confidence descending, then name ascending.
    pub skills: Vec<SkillRecord>,
    pub contribution: ContributionMetrics,
    pub work_style: WorkStyleAssessment,
    pub code_quality: QualityAssessment,
    pub learning: LearningTrajectory,
    pub coverage: DataCoverage,
    pub reduced_confidence: bool,
}

impl AnalysisResult {
    pub fn skill(&self, name: &str) -> Option<&SkillRecord> {
        self.skills
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}
