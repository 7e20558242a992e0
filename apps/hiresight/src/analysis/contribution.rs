//! Contribution Pattern Analyzer: commit, pull request and review metrics.
//!
//! Every metric falls back to 0 when its underlying data is absent.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use crate::analysis::recency::month_index;
use crate::analysis::sentiment;
use crate::config::ContributionSettings;
use crate::errors::ConfigError;
use crate::models::analysis::ContributionMetrics;
use crate::models::bundle::{Commit, ProfileBundle, PullRequestState};

/// `type(scope)!: description` on the first line of the message.
static CONVENTIONAL_COMMIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(feat|fix|docs|style|refactor|perf|test|tests|chore|ci|build|revert)(\([\w\-./ ]+\))?!?: \S",
    )
    .unwrap()
});

pub fn is_conventional_commit(message: &str) -> bool {
    let first_line = message.lines().next().unwrap_or("").trim();
    CONVENTIONAL_COMMIT_RE.is_match(first_line)
}

pub struct ContributionAnalyzer {
    settings: ContributionSettings,
}

impl ContributionAnalyzer {
    pub fn new(settings: ContributionSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn analyze(&self, bundle: &ProfileBundle, reference: DateTime<Utc>) -> ContributionMetrics {
        let window = self.settings.lookback_months as usize;
        let reference_month = month_index(reference);

        // Calendar-month buckets, index 0 = the reference month.
        let mut monthly = vec![0usize; window];
        let windowed: Vec<&Commit> = bundle
            .commits
            .iter()
            .filter(|commit| {
                let Some(date) = commit.date.filter(|d| *d <= reference) else {
                    return false;
                };
                let offset = reference_month - month_index(date);
                if (0..window as i32).contains(&offset) {
                    monthly[offset as usize] += 1;
                    true
                } else {
                    false
                }
            })
            .collect();

        let total_commits = windowed.len();
        let active_months = monthly.iter().filter(|&&n| n > 0).count() as u32;
        let commit_frequency = ratio(total_commits as f64, active_months as f64);
        let consistency = consistency_score(&monthly);

        let conventional = windowed
            .iter()
            .filter(|c| is_conventional_commit(&c.message))
            .count();
        let conventional_commit_rate = ratio(conventional as f64, total_commits as f64);
        let avg_commit_message_length = mean(windowed.iter().map(|c| c.message.trim().chars().count() as f64));

        let total_pull_requests = bundle.pull_requests.len();
        let merged_pull_requests = bundle
            .pull_requests
            .iter()
            .filter(|pr| pr.state == PullRequestState::Merged)
            .count();
        let pr_merge_rate = ratio(merged_pull_requests as f64, total_pull_requests as f64);
        let avg_pr_discussion_length =
            mean(bundle.pull_requests.iter().map(|pr| pr.discussion_length as f64));

        let total_reviews = bundle.reviews.len();
        let avg_review_length = mean(
            bundle
                .reviews
                .iter()
                .map(|r| r.effective_length())
                .filter(|&len| len > 0)
                .map(|len| len as f64),
        );
        let review_sentiment = mean(
            bundle
                .reviews
                .iter()
                .filter(|r| !r.text.trim().is_empty())
                .map(|r| sentiment::polarity(&r.text)),
        );
        let review_to_pr_ratio = ratio(total_reviews as f64, total_pull_requests as f64);

        let activity = total_commits + total_pull_requests + total_reviews;
        let ownership_fraction = ratio(total_commits as f64, activity as f64);

        debug!(
            commits = total_commits,
            pull_requests = total_pull_requests,
            reviews = total_reviews,
            active_months,
            "contribution patterns analyzed"
        );

        ContributionMetrics {
            total_commits,
            active_months,
            commit_frequency,
            consistency,
            conventional_commit_rate,
            avg_commit_message_length,
            total_pull_requests,
            merged_pull_requests,
            pr_merge_rate,
            avg_pr_discussion_length,
            total_reviews,
            review_to_pr_ratio,
            avg_review_length,
            review_sentiment,
            sentiment_class: sentiment::classify(review_sentiment),
            ownership_fraction,
        }
    }
}

/// 100 for perfectly even monthly output, falling with the coefficient of
/// variation (CV of 2 or more scores 0). Fewer than two commits scores 0.
fn consistency_score(monthly: &[usize]) -> f64 {
    let total: usize = monthly.iter().sum();
    if total < 2 || monthly.is_empty() {
        return 0.0;
    }
    let n = monthly.len() as f64;
    let mean = total as f64 / n;
    let variance = monthly
        .iter()
        .map(|&c| (c as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let cv = variance.sqrt() / mean;
    (100.0 - cv * 50.0).clamp(0.0, 100.0)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    ratio(sum, count as f64)
}
