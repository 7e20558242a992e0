//! Work Style Classifier: an ordered rule table evaluated top to bottom.
//!
//! The first rule whose predicate holds wins. Nothing matching falls back to
//! `Balanced`, so every candidate gets exactly one label.

use tracing::debug;

use crate::config::WorkStyleThresholds;
use crate::errors::ConfigError;
use crate::models::analysis::{ContributionMetrics, WorkStyle, WorkStyleAssessment};

pub type Predicate = fn(&ContributionMetrics, &WorkStyleThresholds) -> bool;
pub type Indicator = fn(&ContributionMetrics) -> String;

pub struct StyleRule {
    pub style: WorkStyle,
    pub predicate: Predicate,
    pub indicator: Indicator,
}

/// Highest priority first.
pub fn default_rules() -> Vec<StyleRule> {
    vec![
        StyleRule {
            style: WorkStyle::SoloDeveloper,
            predicate: |m, t| m.ownership_fraction > t.solo_ownership,
            indicator: |m| {
                format!(
                    "{:.0}% of activity is self-directed commits",
                    m.ownership_fraction * 100.0
                )
            },
        },
        StyleRule {
            style: WorkStyle::Collaborative,
            predicate: |m, t| m.review_to_pr_ratio > t.collaborative_review_ratio,
            indicator: |m| format!("{:.2} reviews per pull request", m.review_to_pr_ratio),
        },
        StyleRule {
            style: WorkStyle::Mentorship,
            predicate: |m, t| m.avg_review_length > t.mentorship_review_length,
            indicator: |m| {
                format!(
                    "reviews average {:.0} characters of feedback",
                    m.avg_review_length
                )
            },
        },
        StyleRule {
            style: WorkStyle::AsyncFriendly,
            predicate: |m, t| m.conventional_commit_rate > t.async_conventional_rate,
            indicator: |m| {
                format!(
                    "{:.0}% of commits follow conventional commit format",
                    m.conventional_commit_rate * 100.0
                )
            },
        },
    ]
}

pub struct WorkStyleClassifier {
    thresholds: WorkStyleThresholds,
    rules: Vec<StyleRule>,
}

impl WorkStyleClassifier {
    pub fn new(thresholds: WorkStyleThresholds) -> Result<Self, ConfigError> {
        Self::with_rules(thresholds, default_rules())
    }

    pub fn with_rules(
        thresholds: WorkStyleThresholds,
        rules: Vec<StyleRule>,
    ) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        Ok(Self { thresholds, rules })
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    pub fn classify(&self, metrics: &ContributionMetrics) -> WorkStyleAssessment {
        let winner = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| (rule.predicate)(metrics, &self.thresholds));

        let assessment = match winner {
            Some((index, rule)) => WorkStyleAssessment {
                style: rule.style,
                rule_index: Some(index),
                indicator: (rule.indicator)(metrics),
            },
            None => WorkStyleAssessment {
                style: WorkStyle::Balanced,
                rule_index: None,
                indicator: "no single collaboration pattern dominates".to_string(),
            },
        };

        debug!(style = %assessment.style, rule = ?assessment.rule_index, "work style classified");
        assessment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> WorkStyleClassifier {
        WorkStyleClassifier::new(WorkStyleThresholds::default()).unwrap()
    }

    fn make_metrics(ownership: f64, review_ratio: f64, review_len: f64, conventional: f64) -> ContributionMetrics {
        ContributionMetrics {
            ownership_fraction: ownership,
            review_to_pr_ratio: review_ratio,
            avg_review_length: review_len,
            conventional_commit_rate: conventional,
            ..Default::default()
        }
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let styles: Vec<WorkStyle> = classifier().rules().iter().map(|r| r.style).collect();
        assert_eq!(
            styles,
            vec![
                WorkStyle::SoloDeveloper,
                WorkStyle::Collaborative,
                WorkStyle::Mentorship,
                WorkStyle::AsyncFriendly,
            ]
        );
    }

    #[test]
    fn test_each_rule_in_isolation() {
        let c = classifier();
        assert_eq!(c.classify(&make_metrics(0.9, 0.0, 0.0, 0.0)).style, WorkStyle::SoloDeveloper);
        assert_eq!(c.classify(&make_metrics(0.5, 0.7, 0.0, 0.0)).style, WorkStyle::Collaborative);
        assert_eq!(c.classify(&make_metrics(0.5, 0.1, 150.0, 0.0)).style, WorkStyle::Mentorship);
        assert_eq!(c.classify(&make_metrics(0.5, 0.1, 20.0, 0.9)).style, WorkStyle::AsyncFriendly);
    }

    #[test]
    fn test_first_match_wins() {
        // Every predicate holds; the solo rule sits first.
        let assessment = classifier().classify(&make_metrics(0.95, 2.0, 300.0, 1.0));
        assert_eq!(assessment.style, WorkStyle::SoloDeveloper);
        assert_eq!(assessment.rule_index, Some(0));

        let assessment = classifier().classify(&make_metrics(0.5, 2.0, 300.0, 1.0));
        assert_eq!(assessment.style, WorkStyle::Collaborative);
        assert_eq!(assessment.rule_index, Some(1));
    }

    #[test]
    fn test_thresholds_are_strict() {
        let assessment = classifier().classify(&make_metrics(0.8, 0.6, 100.0, 0.5));
        assert_eq!(assessment.style, WorkStyle::Balanced);
    }

    #[test]
    fn test_default_is_balanced() {
        let assessment = classifier().classify(&ContributionMetrics::default());
        assert_eq!(assessment.style, WorkStyle::Balanced);
        assert_eq!(assessment.rule_index, None);
        assert!(!assessment.indicator.is_empty());
    }

    #[test]
    fn test_custom_thresholds_change_outcome() {
        let thresholds = WorkStyleThresholds {
            solo_ownership: 0.4,
            ..Default::default()
        };
        let c = WorkStyleClassifier::new(thresholds).unwrap();
        assert_eq!(c.classify(&make_metrics(0.5, 0.0, 0.0, 0.0)).style, WorkStyle::SoloDeveloper);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let thresholds = WorkStyleThresholds {
            solo_ownership: 1.5,
            ..Default::default()
        };
        assert!(WorkStyleClassifier::new(thresholds).is_err());
    }

    #[test]
    fn test_indicator_mentions_metric() {
        let assessment = classifier().classify(&make_metrics(0.5, 0.1, 20.0, 0.75));
        assert!(assessment.indicator.contains("75%"), "{}", assessment.indicator);
    }
}
