//! Document generation collaborator — renders tailored content to files.
//!
//! The contract is a file path plus success; layout and styling are out of
//! scope, so the concrete renderer emits markdown into the output directory.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::errors::FunnelError;
use crate::generation::selector::DocumentVariant;
use crate::generation::tailor::TailoredContent;
use crate::matcher::CandidateProfile;

/// Paths of the artifacts produced for one application.
#[derive(Debug, Clone)]
pub struct RenderedDocuments {
    pub resume_path: PathBuf,
    pub cover_letter_path: PathBuf,
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(
        &self,
        job_id: Uuid,
        title: &str,
        company: &str,
        variant: &DocumentVariant,
        content: &TailoredContent,
    ) -> Result<RenderedDocuments, FunnelError>;
}

pub struct MarkdownRenderer {
    output_dir: PathBuf,
    profile: CandidateProfile,
}

impl MarkdownRenderer {
    pub fn new(output_dir: PathBuf, profile: CandidateProfile) -> Self {
        Self {
            output_dir,
            profile,
        }
    }

    fn resume_markdown(&self, variant: &DocumentVariant, content: &TailoredContent) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n", self.profile.name));
        if !self.profile.headline.is_empty() {
            out.push_str(&format!("_{}_\n", self.profile.headline));
        }
        out.push_str(&format!("\n## Summary\n{}\n", content.summary));
        if !self.profile.skills.is_empty() {
            out.push_str(&format!("\n## Skills\n{}\n", self.profile.skills.join(", ")));
        }
        if !self.profile.experience.is_empty() {
            out.push_str("\n## Experience\n");
            for entry in &self.profile.experience {
                out.push_str(&format!(
                    "\n### {} — {} ({})\n",
                    entry.title, entry.company, entry.period
                ));
                for highlight in &entry.highlights {
                    out.push_str(&format!("- {highlight}\n"));
                }
            }
        }
        if !self.profile.certifications.is_empty() {
            out.push_str(&format!(
                "\n## Certifications\n{}\n",
                self.profile.certifications.join(", ")
            ));
        }
        if !content.ats_keywords.is_empty() {
            out.push_str(&format!(
                "\n<!-- variant: {} | keywords: {} -->\n",
                variant.name(),
                content.ats_keywords.join(", ")
            ));
        }
        out
    }
}

/// Keeps company names filesystem-safe for artifact file names.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .to_lowercase()
}

#[async_trait]
impl DocumentRenderer for MarkdownRenderer {
    async fn render(
        &self,
        job_id: Uuid,
        title: &str,
        company: &str,
        variant: &DocumentVariant,
        content: &TailoredContent,
    ) -> Result<RenderedDocuments, FunnelError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let stem = format!("{}_{}", sanitize(company), job_id.simple());
        let resume_path = self.output_dir.join(format!("{stem}_resume.md"));
        let cover_letter_path = self.output_dir.join(format!("{stem}_cover_letter.md"));

        tokio::fs::write(&resume_path, self.resume_markdown(variant, content)).await?;

        let cover_letter = format!(
            "# Cover Letter — {title} at {company}\n\n{}\n",
            content.cover_letter
        );
        tokio::fs::write(&cover_letter_path, cover_letter).await?;

        info!("Rendered application documents to {}", resume_path.display());
        Ok(RenderedDocuments {
            resume_path,
            cover_letter_path,
        })
    }
}
