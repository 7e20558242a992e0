//! Job Requirement: the caller-supplied description of a role.

use serde::{Deserialize, Serialize};

use crate::models::analysis::WorkStyle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Junior,
    #[default]
    Mid,
    Senior,
    Lead,
}

/// A role to match candidates against.
///
/// An empty `required_skills` list is valid but degenerate: it yields
/// `current_fit = 0` with an explanatory note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequirement {
    pub title: String,
    /// Free-text body of the posting; only the bias detector reads it.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    /// `None` means the role has no stated collaboration preference.
    #[serde(default)]
    pub desired_work_style: Option<WorkStyle>,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
}

impl JobRequirement {
    /// All free-text fields with the field they came from, in scan order:
    /// title, description, required skills, preferred skills.
    pub fn free_text_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![("title", self.title.as_str())];
        if let Some(desc) = self.description.as_deref() {
            fields.push(("description", desc));
        }
        fields.extend(self.required_skills.iter().map(|s| ("required_skills", s.as_str())));
        fields.extend(self.preferred_skills.iter().map(|s| ("preferred_skills", s.as_str())));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_requirement_deserializes_work_style() {
        let json = r#"{
            "title": "Backend Engineer",
            "required_skills": ["Python", "Django"],
            "desired_work_style": "collaborative",
            "experience_level": "senior"
        }"#;
        let job: JobRequirement = serde_json::from_str(json).unwrap();
        assert_eq!(job.desired_work_style, Some(WorkStyle::Collaborative));
        assert_eq!(job.experience_level, ExperienceLevel::Senior);
        assert!(job.preferred_skills.is_empty());
    }

    #[test]
    fn test_free_text_fields_include_description_and_skills() {
        let job = JobRequirement {
            title: "Engineer".to_string(),
            description: Some("Remote friendly".to_string()),
            required_skills: vec!["Rust".to_string()],
            preferred_skills: vec!["Go".to_string()],
            ..Default::default()
        };
        let texts: Vec<&str> = job.free_text_fields().into_iter().map(|(_, t)| t).collect();
        assert_eq!(texts, vec!["Engineer", "Remote friendly", "Rust", "Go"]);
        assert_eq!(job.free_text_fields()[1].0, "description");
    }
}
