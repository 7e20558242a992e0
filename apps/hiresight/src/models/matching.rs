use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Low,
    Moderate,
    High,
    Top,
}

impl MatchTier {
    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::Top => "Top Match",
            MatchTier::High => "High Match",
            MatchTier::Moderate => "Moderate Match",
            MatchTier::Low => "Low Match",
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The four weighted factors, each 0 – 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub current_fit: f64,
    pub growth_potential: f64,
    pub collaboration_fit: f64,
    pub code_quality: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchInsights {
    pub strengths: Vec<String>,
    pub considerations: Vec<String>,
    /// Suggested prompts for the interviewer, in a fixed order.
    pub interview_questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate: String,
    pub job_title: String,
    /// 0 – 100
    pub overall_score: f64,
    pub components: ComponentScores,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub matched_preferred_skills: Vec<String>,
    /// Estimated months to acquire each missing required skill.
    pub ramp_up_months: BTreeMap<String, f64>,
    pub tier: MatchTier,
    pub notes: Vec<String>,
    pub insights: MatchInsights,
}
