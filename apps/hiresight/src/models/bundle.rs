use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account metadata as delivered by the ingestion adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Point-in-time view of one repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub name: String,
    /// Primary language as reported by the hosting API.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub forks: u32,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Raw dependency specifiers, e.g. `django==4.2`, `@nestjs/core`, `serde`.
    #[serde(default)]
    pub dependency_manifest: Vec<String>,
    #[serde(default)]
    pub has_ci: bool,
    #[serde(default)]
    pub has_tests: bool,
    #[serde(default)]
    pub has_readme: bool,
    #[serde(default)]
    pub is_fork: bool,
    #[serde(default)]
    pub last_commit_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    /// Lines of code per language.
    #[serde(default)]
    pub languages: BTreeMap<String, u64>,
    #[serde(default)]
    pub size_kb: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestState {
    #[default]
    Open,
    Closed,
    Merged,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub state: PullRequestState,
    #[serde(default)]
    pub review_count: u32,
    /// Number of discussion comments on the pull request.
    #[serde(default)]
    pub discussion_length: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub text: String,
    /// Character length as reported upstream; 0 means "derive from text".
    #[serde(default)]
    pub length: u32,
}

impl Review {
    pub fn effective_length(&self) -> usize {
        if self.length > 0 {
            self.length as usize
        } else {
            self.text.chars().count()
        }
    }
}

/// Everything the engine knows about one candidate. Immutable for the
/// duration of an analysis; partial bundles (empty sections) are valid input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileBundle {
    pub profile: ProfileMetadata,
    #[serde(default)]
    pub repositories: Vec<RepositorySnapshot>,
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub pull_requests: Vec<PullRequest>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    /// When the ingestion adapter captured this bundle.
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl ProfileBundle {
    /// Reference instant for every recency computation.
    ///
    /// Uses `fetched_at` when present, otherwise the latest timestamp found
    /// anywhere in the bundle, so the result never depends on the wall clock.
    pub fn reference_time(&self) -> DateTime<Utc> {
        if let Some(at) = self.fetched_at {
            return at;
        }

        let repo_times = self
            .repositories
            .iter()
            .flat_map(|r| [r.last_commit_at, r.created_at]);
        let commit_times = self.commits.iter().map(|c| c.date);

        repo_times
            .chain(commit_times)
            .chain(std::iter::once(self.profile.created_at))
            .flatten()
            .max()
            .unwrap_or_default()
    }

    pub fn candidate_key(&self) -> &str {
        &self.profile.username
    }
}
