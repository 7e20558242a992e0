use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bias::phrases::{BiasCategory, Severity, PHRASE_RULES};
use crate::models::job::JobRequirement;

const MAX_REQUIRED_SKILLS: usize = 8;
const PENALTY_PER_FLAG: f64 = 10.0;
const MAX_PENALIZED_FLAGS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasFlag {
    pub category: BiasCategory,
    pub severity: Severity,
    /// The offending text as found, lowercased.
    pub phrase: String,
    /// Which job field it came from.
    pub field: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasReport {
    pub flags: Vec<BiasFlag>,
    /// Distinct categories flagged, in category order.
    pub categories: Vec<BiasCategory>,
    /// max(0, 100 − 10·min(flag_count, 10))
    pub fairness_score: f64,
}

impl BiasReport {
    pub fn biases_found(&self) -> bool {
        !self.flags.is_empty()
    }
}

/// Scans a job requirement's free text. Needs no candidate data.
#[derive(Debug, Clone)]
pub struct BiasDetector {
    max_required_skills: usize,
}

impl Default for BiasDetector {
    fn default() -> Self {
        Self {
            max_required_skills: MAX_REQUIRED_SKILLS,
        }
    }
}

impl BiasDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detect(&self, job: &JobRequirement) -> BiasReport {
        let mut flags = Vec::new();
        let mut seen: HashSet<(BiasCategory, String)> = HashSet::new();

        for (field, text) in job.free_text_fields() {
            // Spans already claimed in this field, per category, so that
            // "bachelor's degree" is not flagged again as "degree".
            let mut claimed: Vec<(BiasCategory, usize, usize)> = Vec::new();

            for rule in PHRASE_RULES.iter() {
                for found in rule.pattern.find_iter(text) {
                    let overlaps = claimed.iter().any(|&(category, start, end)| {
                        category == rule.category && found.start() < end && start < found.end()
                    });
                    if overlaps {
                        continue;
                    }
                    claimed.push((rule.category, found.start(), found.end()));

                    let phrase = found.as_str().trim().to_lowercase();
                    if seen.insert((rule.category, phrase.clone())) {
                        flags.push(BiasFlag {
                            category: rule.category,
                            severity: rule.severity,
                            phrase,
                            field: field.to_string(),
                            suggestion: rule.suggestion.to_string(),
                        });
                    }
                }
            }
        }

        let required = job
            .required_skills
            .iter()
            .filter(|s| !s.trim().is_empty())
            .count();
        if required > self.max_required_skills {
            flags.push(BiasFlag {
                category: BiasCategory::ExcessiveRequirements,
                severity: Severity::Medium,
                phrase: format!("{required} required skills"),
                field: "required_skills".to_string(),
                suggestion: format!(
                    "Keep required skills to the essential {} or fewer and move the rest to preferred",
                    self.max_required_skills
                ),
            });
        }

        let categories: Vec<BiasCategory> = flags
            .iter()
            .map(|f| f.category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let fairness_score = fairness_score(flags.len());

        debug!(
            job = %job.title,
            flags = flags.len(),
            fairness = fairness_score,
            "bias scan complete"
        );

        BiasReport {
            flags,
            categories,
            fairness_score,
        }
    }
}

pub fn fairness_score(flag_count: usize) -> f64 {
    (100.0 - PENALTY_PER_FLAG * flag_count.min(MAX_PENALIZED_FLAGS) as f64).max(0.0)
}
