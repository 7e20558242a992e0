//! Technology Catalog: data-driven dependency → technology lookup.
//!
//! The default table ships as `data/technologies.json` and is embedded at
//! build time. Deployments extend it by pointing `TECH_CATALOG_PATH` at a
//! replacement file; no code changes are needed to add a technology.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;
use crate::models::analysis::SkillCategory;

const EMBEDDED_CATALOG: &str = include_str!("../../data/technologies.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyEntry {
    pub key: String,
    pub name: String,
    pub category: SkillCategory,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Marks test frameworks; feeds testing evidence in quality assessment.
    #[serde(default)]
    pub testing: bool,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    technologies: Vec<TechnologyEntry>,
}

#[derive(Debug, Clone)]
pub struct TechnologyCatalog {
    entries: Vec<TechnologyEntry>,
    /// normalized key / alias / name → index into `entries`
    index: HashMap<String, usize>,
}

impl TechnologyCatalog {
    /// The catalog compiled into the binary.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json_str(EMBEDDED_CATALOG)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            what: "technology catalog".to_string(),
            source,
        })?;
        Self::from_entries(file.technologies)
    }

    /// Builds the lookup index. Two entries claiming the same normalized
    /// key or alias is a configuration error.
    pub fn from_entries(entries: Vec<TechnologyEntry>) -> Result<Self, ConfigError> {
        let mut index: HashMap<String, usize> = HashMap::new();

        for (i, entry) in entries.iter().enumerate() {
            let own_names = std::iter::once(&entry.key)
                .chain(entry.aliases.iter())
                .chain(std::iter::once(&entry.name));

            for raw in own_names {
                let norm = normalize(raw);
                if norm.is_empty() {
                    return Err(ConfigError::Catalog(format!(
                        "entry '{}' has an empty key or alias",
                        entry.key
                    )));
                }
                match index.get(&norm) {
                    Some(&existing) if existing != i => {
                        return Err(ConfigError::Catalog(format!(
                            "'{raw}' is claimed by both '{}' and '{}'",
                            entries[existing].key, entry.key
                        )));
                    }
                    _ => {
                        index.insert(norm, i);
                    }
                }
            }
        }

        debug!(technologies = entries.len(), "technology catalog loaded");
        Ok(Self { entries, index })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a technology by key, alias, or display name.
    pub fn lookup(&self, name: &str) -> Option<&TechnologyEntry> {
        self.index.get(&normalize(name)).map(|&i| &self.entries[i])
    }

    /// Resolves a raw dependency specifier such as `django==4.2`,
    /// `@nestjs/core`, `react@18.2.0` or `github.com/gin-gonic/gin`.
    pub fn resolve_dependency(&self, specifier: &str) -> Option<&TechnologyEntry> {
        let package = package_name(specifier);
        if package.is_empty() {
            return None;
        }
        self.lookup(package).or_else(|| {
            // npm scopes: `@nestjs/core` → `nestjs`
            package
                .strip_prefix('@')
                .and_then(|scoped| scoped.split('/').next())
                .and_then(|scope| self.lookup(scope))
        })
    }

    /// Maps a skill name to its canonical display form, e.g. `postgres` →
    /// `PostgreSQL`. Unknown names come back trimmed but otherwise untouched.
    pub fn canonical_name(&self, name: &str) -> String {
        self.lookup(name)
            .map(|entry| entry.name.clone())
            .unwrap_or_else(|| name.trim().to_string())
    }

    pub fn is_testing_framework(&self, specifier: &str) -> bool {
        self.resolve_dependency(specifier)
            .map(|entry| entry.testing)
            .unwrap_or(false)
    }
}

/// Lowercases and strips separators so `Vue.js`, `vue-js` and `vuejs` agree.
pub fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | '.' | ' '))
        .collect()
}

/// Strips version constraints, extras and path prefixes from a dependency
/// specifier, leaving the package name.
fn package_name(specifier: &str) -> &str {
    let spec = specifier.trim();

    // Maven coordinates: `group:artifact[:version]` → `artifact`
    if let Some(artifact) = maven_artifact(spec) {
        return artifact;
    }

    // Version and extras: `django>=4`, `celery[redis]`, `react@18` (but keep
    // the leading `@` of npm scopes).
    let cut = spec
        .char_indices()
        .find(|&(i, c)| {
            matches!(c, '=' | '>' | '<' | '~' | '^' | '!' | ';' | '[' | ' ' | ':')
                || (c == '@' && i > 0)
        })
        .map(|(i, _)| i)
        .unwrap_or(spec.len());
    let spec = &spec[..cut];

    if spec.starts_with('@') {
        return spec;
    }

    // Module paths: `github.com/labstack/echo/v4` → `echo`
    spec.rsplit('/')
        .find(|segment| !is_major_version_segment(segment))
        .unwrap_or(spec)
}

fn maven_artifact(spec: &str) -> Option<&str> {
    let has_operator = spec
        .chars()
        .any(|c| matches!(c, '=' | '>' | '<' | '~' | '^' | '!' | ';' | '[' | ' ' | '@' | '/'));
    if has_operator {
        return None;
    }
    let mut parts = spec.split(':');
    let group = parts.next()?;
    let artifact = parts.next()?;
    (!group.is_empty() && !artifact.is_empty()).then_some(artifact)
}

fn is_major_version_segment(segment: &str) -> bool {
    segment.is_empty()
        || segment
            .strip_prefix('v')
            .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false)
}
