//! Curated phrase table for the bias detector.
//!
//! Each row is compiled once into a case-insensitive, word-bounded regex.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasCategory {
    Education,
    Geographic,
    ExperienceYears,
    Exclusionary,
    ExcessiveRequirements,
}

impl BiasCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BiasCategory::Education => "Education Requirement",
            BiasCategory::Geographic => "Geographic Restriction",
            BiasCategory::ExperienceYears => "Experience-Year Threshold",
            BiasCategory::Exclusionary => "Exclusionary Language",
            BiasCategory::ExcessiveRequirements => "Excessive Requirements",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

pub struct PhraseRule {
    pub category: BiasCategory,
    pub severity: Severity,
    pub pattern: Regex,
    pub suggestion: &'static str,
}

/// (category, severity, pattern, suggested rewrite)
const PHRASE_TABLE: &[(BiasCategory, Severity, &str, &str)] = &[
    // ── Education ───────────────────────────────────────────────────────────
    (
        BiasCategory::Education,
        Severity::Medium,
        r"\bbachelor(?:'?s)?(?:\s+degree)?\b|\b(?:master|associate)(?:'?s)?\s+(?:degree|of\s+(?:science|arts|engineering))\b|\bmaster's\b",
        "Describe the skills the role needs instead of a degree, e.g. \"degree or equivalent practical experience\"",
    ),
    (
        BiasCategory::Education,
        Severity::Medium,
        r"\b(?:ph\.?\s?d\.?|doctorate)\b",
        "Reserve doctoral requirements for research roles; otherwise list the research skills needed",
    ),
    (
        BiasCategory::Education,
        Severity::Medium,
        r"\b(?:university|college|cs|computer science)\s+degree\b|\bdegree\s+(?:required|in)\b",
        "Accept equivalent experience alongside formal education",
    ),
    (
        BiasCategory::Education,
        Severity::High,
        r"\b(?:ivy\s+league|top[-\s]tier\s+(?:university|school))\b",
        "Remove institution prestige requirements",
    ),
    // ── Geographic ──────────────────────────────────────────────────────────
    (
        BiasCategory::Geographic,
        Severity::High,
        r"\b(?:us|usa|u\.s\.?|eu|uk)\s+(?:citizens?\s+|residents?\s+|based\s+)?only\b",
        "State legal work-authorization needs precisely, or open the role to remote candidates",
    ),
    (
        BiasCategory::Geographic,
        Severity::High,
        r"\bmust\s+(?:live|reside|be\s+located|be\s+based)\s+in\b",
        "Consider remote candidates to widen the talent pool",
    ),
    (
        BiasCategory::Geographic,
        Severity::Medium,
        r"\b(?:local\s+candidates\s+only|no\s+remote|on-?site\s+only)\b",
        "Explain why on-site presence is needed, or offer hybrid options",
    ),
    (
        BiasCategory::Geographic,
        Severity::Medium,
        r"\b(?:bay\s+area|silicon\s+valley|san\s+francisco|new\s+york)\s+(?:only|based|required)\b",
        "Consider remote candidates to widen the talent pool",
    ),
    // ── Experience-year thresholds ──────────────────────────────────────────
    (
        BiasCategory::ExperienceYears,
        Severity::Medium,
        r"\b\d+\s*\+?\s*(?:-\s*\d+\s*)?years?(?:\s+of)?(?:\s+(?:professional|relevant|industry|hands-on))?\s+experience\b",
        "Describe the outcomes and skills expected instead of a year count",
    ),
    (
        BiasCategory::ExperienceYears,
        Severity::Medium,
        r"\b(?:minimum|at\s+least)\s+(?:of\s+)?\d+\s*\+?\s*years?\b",
        "Describe the outcomes and skills expected instead of a year count",
    ),
    (
        BiasCategory::ExperienceYears,
        Severity::Medium,
        r"\b\d+\s*\+\s*years?\b",
        "Describe the outcomes and skills expected instead of a year count",
    ),
    // ── Exclusionary language ───────────────────────────────────────────────
    (
        BiasCategory::Exclusionary,
        Severity::Low,
        r"\b(?:rock\s?stars?|ninjas?|gurus?|wizards?|unicorns?|superstars?|jedi|10x)\b",
        "Use plain role titles such as \"experienced engineer\"",
    ),
    (
        BiasCategory::Exclusionary,
        Severity::Medium,
        r"\b(?:culture\s+fit|cultural\s+fit|work\s+hard,?\s+play\s+hard|digital\s+natives?)\b",
        "Name the concrete values or practices the team works by",
    ),
    (
        BiasCategory::Exclusionary,
        Severity::High,
        r"\b(?:young(?:\s+and)?\s+(?:energetic|dynamic)|recent\s+grad(?:uate)?s?\s+only|native\s+english\s+speakers?)\b",
        "Remove age and origin proxies; describe the communication skills required",
    ),
];

pub static PHRASE_RULES: LazyLock<Vec<PhraseRule>> = LazyLock::new(|| {
    PHRASE_TABLE
        .iter()
        .filter_map(|&(category, severity, pattern, suggestion)| {
            Regex::new(&format!("(?i){pattern}"))
                .ok()
                .map(|pattern| PhraseRule {
                    category,
                    severity,
                    pattern,
                    suggestion,
                })
        })
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    fn first_category(text: &str) -> Option<BiasCategory> {
        PHRASE_RULES
            .iter()
            .find(|rule| rule.pattern.is_match(text))
            .map(|rule| rule.category)
    }

    #[test]
    fn test_every_pattern_compiles() {
        assert_eq!(PHRASE_RULES.len(), PHRASE_TABLE.len());
    }

    #[test]
    fn test_education_phrases() {
        assert_eq!(first_category("Bachelor's degree required"), Some(BiasCategory::Education));
        assert_eq!(first_category("PhD preferred"), Some(BiasCategory::Education));
        assert_eq!(first_category("CS degree"), Some(BiasCategory::Education));
        assert_eq!(first_category("Master's in Computer Science"), Some(BiasCategory::Education));
        assert_eq!(first_category("associate degree or higher"), Some(BiasCategory::Education));
        assert_eq!(first_category("Masters of Science"), Some(BiasCategory::Education));
    }

    #[test]
    fn test_associate_and_master_need_a_degree_noun() {
        assert_eq!(first_category("Associate Software Engineer"), None);
        assert_eq!(first_category("you will master our tooling"), None);
        assert_eq!(first_category("Scrum Master for two squads"), None);
    }

    #[test]
    fn test_experience_phrases() {
        assert_eq!(first_category("5 years experience"), Some(BiasCategory::ExperienceYears));
        assert_eq!(first_category("10+ years of professional experience"), Some(BiasCategory::ExperienceYears));
        assert_eq!(first_category("minimum 3 years"), Some(BiasCategory::ExperienceYears));
    }

    #[test]
    fn test_geographic_and_exclusionary_phrases() {
        assert_eq!(first_category("US citizens only"), Some(BiasCategory::Geographic));
        assert_eq!(first_category("must reside in Ohio"), Some(BiasCategory::Geographic));
        assert_eq!(first_category("Rockstar developer"), Some(BiasCategory::Exclusionary));
        assert_eq!(first_category("strong culture fit"), Some(BiasCategory::Exclusionary));
    }

    #[test]
    fn test_neutral_text_is_clean() {
        assert_eq!(first_category("Build reliable APIs in Rust with a small team"), None);
        // Word boundaries keep substrings quiet.
        assert_eq!(first_category("masterclass in guruji-style ninjutsu"), None);
    }
}
