//! Candidate profile — loaded once from TOML and rendered into the
//! adjudication and tailoring prompts.

use std::path::Path;

use serde::Deserialize;

use crate::errors::FunnelError;

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl CandidateProfile {
    pub fn load(path: &Path) -> Result<Self, FunnelError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FunnelError::Config(format!("cannot read profile {}: {e}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|e| FunnelError::Config(format!("invalid profile: {e}")))
    }

    /// Serializes the profile into plain text for the oracle prompt.
    pub fn to_context_string(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Name: {}\n", self.name));
        if !self.headline.is_empty() {
            out.push_str(&format!("Headline: {}\n", self.headline));
        }
        if !self.location.is_empty() {
            out.push_str(&format!("Location: {}\n", self.location));
        }
        if !self.summary.is_empty() {
            out.push_str(&format!("\nSummary:\n{}\n", self.summary));
        }
        if !self.skills.is_empty() {
            out.push_str(&format!("\nSkills: {}\n", self.skills.join(", ")));
        }
        if !self.certifications.is_empty() {
            out.push_str(&format!(
                "Certifications: {}\n",
                self.certifications.join(", ")
            ));
        }
        if !self.languages.is_empty() {
            out.push_str(&format!("Languages: {}\n", self.languages.join(", ")));
        }
        if !self.experience.is_empty() {
            out.push_str("\nExperience:\n");
            for entry in &self.experience {
                out.push_str(&format!(
                    "- {} at {} ({})\n",
                    entry.title, entry.company, entry.period
                ));
                for highlight in &entry.highlights {
                    out.push_str(&format!("  * {highlight}\n"));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parses_and_renders() {
        let profile: CandidateProfile = toml::from_str(
            r#"
            name = "Jane Doe"
            headline = "Security Engineer"
            skills = ["siem", "vulnerability management"]

            [[experience]]
            title = "Security Engineer"
            company = "Acme"
            period = "2020-2024"
            highlights = ["Ran the SIEM"]
            "#,
        )
        .unwrap();

        let ctx = profile.to_context_string();
        assert!(ctx.contains("Jane Doe"));
        assert!(ctx.contains("siem, vulnerability management"));
        assert!(ctx.contains("Security Engineer at Acme (2020-2024)"));
        assert!(ctx.contains("* Ran the SIEM"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let profile: CandidateProfile = toml::from_str(r#"name = "Jane Doe""#).unwrap();
        let ctx = profile.to_context_string();
        assert!(!ctx.contains("Skills:"));
        assert!(!ctx.contains("Experience:"));
    }
}
