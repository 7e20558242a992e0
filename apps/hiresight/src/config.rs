use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::models::analysis::{QualityTier, WorkStyle};

const WEIGHT_TOLERANCE: f64 = 1e-6;

// ────────────────────────────────────────────────────────────────────────────
// Process configuration (environment)
// ────────────────────────────────────────────────────────────────────────────

/// Process-level configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub rust_log: String,
    /// Selects the Redis cache backend when set; in-memory otherwise.
    pub redis_url: Option<String>,
    pub cache_ttl: Duration,
    pub engine_config_path: Option<PathBuf>,
    pub tech_catalog_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let ttl_hours = optional_env("CACHE_TTL_HOURS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("CACHE_TTL_HOURS must be a whole number of hours")?
            .unwrap_or(24);

        Ok(Config {
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            redis_url: optional_env("REDIS_URL"),
            cache_ttl: Duration::from_secs(ttl_hours * 3600),
            engine_config_path: optional_env("ENGINE_CONFIG_PATH").map(PathBuf::from),
            tech_catalog_path: optional_env("TECH_CATALOG_PATH").map(PathBuf::from),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Engine configuration (immutable, injected into each component)
// ────────────────────────────────────────────────────────────────────────────

/// Point budget for skill confidence. The four parts sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillWeights {
    pub lines_of_code: f64,
    pub repo_count: f64,
    pub recency: f64,
    pub complexity: f64,
    /// Recency decays linearly to zero over this many months.
    pub recency_lookback_months: f64,
}

impl Default for SkillWeights {
    fn default() -> Self {
        Self {
            lines_of_code: 20.0,
            repo_count: 30.0,
            recency: 30.0,
            complexity: 20.0,
            recency_lookback_months: 12.0,
        }
    }
}

impl SkillWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_weights(
            "skill confidence",
            &[
                ("lines_of_code", self.lines_of_code),
                ("repo_count", self.repo_count),
                ("recency", self.recency),
                ("complexity", self.complexity),
            ],
            100.0,
        )?;
        if !(self.recency_lookback_months > 0.0) {
            return Err(ConfigError::Thresholds {
                group: "skill confidence",
                reason: "recency_lookback_months must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContributionSettings {
    pub lookback_months: u32,
}

impl Default for ContributionSettings {
    fn default() -> Self {
        Self { lookback_months: 12 }
    }
}

impl ContributionSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_months == 0 {
            return Err(ConfigError::Thresholds {
                group: "contribution",
                reason: "lookback_months must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkStyleThresholds {
    /// Solo Developer when ownership fraction exceeds this.
    pub solo_ownership: f64,
    /// Collaborative when review-to-PR ratio exceeds this.
    pub collaborative_review_ratio: f64,
    /// Mentorship when average review length (chars) exceeds this.
    pub mentorship_review_length: f64,
    /// Async-Friendly when conventional-commit rate exceeds this.
    pub async_conventional_rate: f64,
}

impl Default for WorkStyleThresholds {
    fn default() -> Self {
        Self {
            solo_ownership: 0.80,
            collaborative_review_ratio: 0.60,
            mentorship_review_length: 100.0,
            async_conventional_rate: 0.50,
        }
    }
}

impl WorkStyleThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("solo_ownership", self.solo_ownership),
            ("async_conventional_rate", self.async_conventional_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Thresholds {
                    group: "work style",
                    reason: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }
        for (name, value) in [
            ("collaborative_review_ratio", self.collaborative_review_ratio),
            ("mentorship_review_length", self.mentorship_review_length),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Thresholds {
                    group: "work style",
                    reason: format!("{name} must be non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub documentation: f64,
    pub testing: f64,
    pub maintenance: f64,
    pub originality: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            documentation: 0.30,
            testing: 0.25,
            maintenance: 0.15,
            originality: 0.30,
        }
    }
}

impl QualityWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_weights(
            "code quality",
            &[
                ("documentation", self.documentation),
                ("testing", self.testing),
                ("maintenance", self.maintenance),
                ("originality", self.originality),
            ],
            1.0,
        )
    }
}

/// Numeric form of each quality tier, used as the matcher's code-quality factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityTierScores {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
    pub needs_improvement: f64,
}

impl Default for QualityTierScores {
    fn default() -> Self {
        Self {
            excellent: 100.0,
            good: 75.0,
            fair: 50.0,
            needs_improvement: 25.0,
        }
    }
}

impl QualityTierScores {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = [
            self.needs_improvement,
            self.fair,
            self.good,
            self.excellent,
        ];
        if ordered.iter().any(|s| !(0.0..=100.0).contains(s)) {
            return Err(ConfigError::Thresholds {
                group: "quality tier scores",
                reason: "every tier score must be within [0, 100]".to_string(),
            });
        }
        if ordered.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfigError::Thresholds {
                group: "quality tier scores",
                reason: "tier scores must not decrease as tiers improve".to_string(),
            });
        }
        Ok(())
    }

    pub fn score_for(&self, tier: QualityTier) -> f64 {
        match tier {
            QualityTier::Excellent => self.excellent,
            QualityTier::Good => self.good,
            QualityTier::Fair => self.fair,
            QualityTier::NeedsImprovement => self.needs_improvement,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitySettings {
    pub weights: QualityWeights,
    pub tier_scores: QualityTierScores,
}

impl QualitySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.tier_scores.validate()
    }
}

/// One point on the velocity → percentile reference curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityPoint {
    pub velocity: f64,
    pub percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectorySettings {
    /// Piecewise-linear reference distribution of learning velocity.
    pub velocity_reference: Vec<VelocityPoint>,
    /// Growth label cut points, expressed as velocity percentiles.
    pub moderate_percentile: f64,
    pub high_percentile: f64,
    /// Skills first seen within this many months count as recent.
    pub recent_skill_months: f64,
    /// Activity recency decays to zero over this many months.
    pub activity_window_months: f64,
}

impl Default for TrajectorySettings {
    fn default() -> Self {
        let curve = [
            (0.0, 0.0),
            (0.1, 25.0),
            (0.2, 50.0),
            (0.5, 75.0),
            (1.0, 90.0),
            (2.0, 100.0),
        ];
        Self {
            velocity_reference: curve
                .iter()
                .map(|&(velocity, percentile)| VelocityPoint {
                    velocity,
                    percentile,
                })
                .collect(),
            moderate_percentile: 40.0,
            high_percentile: 75.0,
            recent_skill_months: 6.0,
            activity_window_months: 12.0,
        }
    }
}

impl TrajectorySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::Thresholds {
            group: "learning trajectory",
            reason: reason.to_string(),
        };

        if self.velocity_reference.is_empty() {
            return Err(invalid("velocity_reference must not be empty"));
        }
        if self
            .velocity_reference
            .windows(2)
            .any(|w| w[0].velocity >= w[1].velocity || w[0].percentile > w[1].percentile)
        {
            return Err(invalid(
                "velocity_reference must be strictly increasing in velocity and non-decreasing in percentile",
            ));
        }
        if self
            .velocity_reference
            .iter()
            .any(|p| p.velocity < 0.0 || !(0.0..=100.0).contains(&p.percentile))
        {
            return Err(invalid(
                "velocity_reference points need velocity ≥ 0 and percentile within [0, 100]",
            ));
        }
        if !(0.0 <= self.moderate_percentile
            && self.moderate_percentile < self.high_percentile
            && self.high_percentile <= 100.0)
        {
            return Err(invalid(
                "cut points must satisfy 0 ≤ moderate_percentile < high_percentile ≤ 100",
            ));
        }
        if !(self.recent_skill_months > 0.0 && self.activity_window_months > 0.0) {
            return Err(invalid("month windows must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    pub current_fit: f64,
    pub growth_potential: f64,
    pub collaboration_fit: f64,
    pub code_quality: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            current_fit: 0.40,
            growth_potential: 0.30,
            collaboration_fit: 0.20,
            code_quality: 0.10,
        }
    }
}

impl MatchWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_weights(
            "match",
            &[
                ("current_fit", self.current_fit),
                ("growth_potential", self.growth_potential),
                ("collaboration_fit", self.collaboration_fit),
                ("code_quality", self.code_quality),
            ],
            1.0,
        )
    }
}

/// How the growth-potential factor blends its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthWeights {
    pub velocity_percentile: f64,
    pub diversification: f64,
    pub activity_recency: f64,
}

impl Default for GrowthWeights {
    fn default() -> Self {
        Self {
            velocity_percentile: 0.50,
            diversification: 0.25,
            activity_recency: 0.25,
        }
    }
}

impl GrowthWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_weights(
            "growth potential",
            &[
                ("velocity_percentile", self.velocity_percentile),
                ("diversification", self.diversification),
                ("activity_recency", self.activity_recency),
            ],
            1.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTierThresholds {
    pub top: f64,
    pub high: f64,
    pub moderate: f64,
}

impl Default for MatchTierThresholds {
    fn default() -> Self {
        Self {
            top: 85.0,
            high: 70.0,
            moderate: 50.0,
        }
    }
}

impl MatchTierThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0 < self.moderate
            && self.moderate < self.high
            && self.high < self.top
            && self.top <= 100.0)
        {
            return Err(ConfigError::Thresholds {
                group: "match tiers",
                reason: format!(
                    "expected 0 < moderate < high < top ≤ 100, got {}/{}/{}",
                    self.moderate, self.high, self.top
                ),
            });
        }
        Ok(())
    }
}

/// `ramp_up_months = base_months / max(learning_velocity, epsilon)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampUpSettings {
    pub base_months: f64,
    pub epsilon: f64,
}

impl Default for RampUpSettings {
    fn default() -> Self {
        Self {
            base_months: 1.0,
            epsilon: 0.05,
        }
    }
}

impl RampUpSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_months > 0.0 && self.epsilon > 0.0) {
            return Err(ConfigError::Thresholds {
                group: "ramp-up",
                reason: "base_months and epsilon must both be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Partial collaboration credit between two different work styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleAffinity {
    pub a: WorkStyle,
    pub b: WorkStyle,
    /// 0.0 – 1.0
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    pub weights: MatchWeights,
    pub growth: GrowthWeights,
    pub tiers: MatchTierThresholds,
    pub ramp_up: RampUpSettings,
    /// Maximum points preferred skills can add to current fit.
    pub preferred_bonus_cap: f64,
    pub style_affinities: Vec<StyleAffinity>,
    /// Credit for a style pair missing from `style_affinities`.
    pub default_style_affinity: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        use WorkStyle::*;
        let pairs = [
            (Collaborative, Mentorship, 0.8),
            (Collaborative, Balanced, 0.7),
            (Collaborative, AsyncFriendly, 0.6),
            (Collaborative, SoloDeveloper, 0.3),
            (Mentorship, Balanced, 0.7),
            (Mentorship, AsyncFriendly, 0.6),
            (Mentorship, SoloDeveloper, 0.3),
            (AsyncFriendly, Balanced, 0.7),
            (AsyncFriendly, SoloDeveloper, 0.6),
            (Balanced, SoloDeveloper, 0.5),
        ];
        Self {
            weights: MatchWeights::default(),
            growth: GrowthWeights::default(),
            tiers: MatchTierThresholds::default(),
            ramp_up: RampUpSettings::default(),
            preferred_bonus_cap: 10.0,
            style_affinities: pairs
                .iter()
                .map(|&(a, b, score)| StyleAffinity { a, b, score })
                .collect(),
            default_style_affinity: 0.5,
        }
    }
}

impl MatchSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.growth.validate()?;
        self.tiers.validate()?;
        self.ramp_up.validate()?;

        if !(0.0..=100.0).contains(&self.preferred_bonus_cap) {
            return Err(ConfigError::Thresholds {
                group: "match",
                reason: format!(
                    "preferred_bonus_cap must be within [0, 100], got {}",
                    self.preferred_bonus_cap
                ),
            });
        }
        let affinity_scores = self
            .style_affinities
            .iter()
            .map(|s| s.score)
            .chain(std::iter::once(self.default_style_affinity));
        for score in affinity_scores {
            if !(0.0..=1.0).contains(&score) {
                return Err(ConfigError::Thresholds {
                    group: "style compatibility",
                    reason: format!("affinity scores must be within [0, 1], got {score}"),
                });
            }
        }
        Ok(())
    }
}

/// All weights and thresholds the engine uses. Immutable once built; every
/// component takes its own slice at construction and validates it there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub skills: SkillWeights,
    pub contribution: ContributionSettings,
    pub work_style: WorkStyleThresholds,
    pub quality: QualitySettings,
    pub trajectory: TrajectorySettings,
    pub matching: MatchSettings,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.skills.validate()?;
        self.contribution.validate()?;
        self.work_style.validate()?;
        self.quality.validate()?;
        self.trajectory.validate()?;
        self.matching.validate()
    }

    /// Parses a JSON override; omitted fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|source| ConfigError::Parse {
                what: "engine config".to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

/// Every weight must be finite and non-negative, and the group must sum to
/// `expected` within `WEIGHT_TOLERANCE`.
fn check_weights(
    group: &'static str,
    weights: &[(&'static str, f64)],
    expected: f64,
) -> Result<(), ConfigError> {
    for &(name, value) in weights {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidWeight { group, name, value });
        }
    }
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if (sum - expected).abs() > WEIGHT_TOLERANCE * expected.max(1.0) {
        return Err(ConfigError::WeightSum { group, sum });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_engine_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_match_weights_must_sum_to_one() {
        let weights = MatchWeights {
            current_fit: 0.5,
            ..Default::default()
        };
        let err = weights.validate().unwrap_err();
        assert!(matches!(err, ConfigError::WeightSum { group: "match", .. }));
    }

    #[test]
    fn test_negative_weight_rejected_even_when_sum_is_one() {
        let weights = QualityWeights {
            documentation: 0.5,
            testing: 0.5,
            maintenance: -0.1,
            originality: 0.1,
        };
        let err = weights.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidWeight {
                name: "maintenance",
                ..
            }
        ));
    }

    #[test]
    fn test_skill_points_must_total_one_hundred() {
        let weights = SkillWeights {
            complexity: 30.0,
            ..Default::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_tier_thresholds_must_be_ordered() {
        let tiers = MatchTierThresholds {
            top: 60.0,
            high: 70.0,
            moderate: 50.0,
        };
        assert!(tiers.validate().is_err());
    }

    #[test]
    fn test_trajectory_rejects_unordered_cut_points() {
        let settings = TrajectorySettings {
            moderate_percentile: 80.0,
            high_percentile: 75.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_json_override_keeps_defaults() {
        let json = r#"{ "matching": { "preferred_bonus_cap": 5.0 } }"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.matching.preferred_bonus_cap, 5.0);
        assert_eq!(config.matching.weights, MatchWeights::default());
        assert_eq!(config.skills, SkillWeights::default());
    }

    #[test]
    fn test_json_override_with_bad_weights_is_fatal() {
        let json = r#"{ "quality": { "weights": { "documentation": 0.9 } } }"#;
        let err = EngineConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::WeightSum { group: "code quality", .. }));
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "contribution": {{ "lookback_months": 6 }} }}"#).unwrap();
        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.contribution.lookback_months, 6);
    }

    #[test]
    fn test_from_path_missing_file_is_io_error() {
        let err = EngineConfig::from_path(Path::new("/nonexistent/engine.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
