//! Document tailoring — asks the oracle for a posting-specific summary,
//! cover letter, and ATS keywords, grounded in the candidate profile.

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::FunnelError;
use crate::llm_client::prompts::TAILORING_SYSTEM;
use crate::llm_client::LlmClient;
use crate::matcher::CandidateProfile;

/// Tailored content produced for one posting.
#[derive(Debug, Clone, Deserialize)]
pub struct TailoredContent {
    pub summary: String,
    pub cover_letter: String,
    #[serde(default)]
    pub ats_keywords: Vec<String>,
}

#[async_trait]
pub trait Tailor: Send + Sync {
    async fn tailor(
        &self,
        title: &str,
        company: &str,
        location: &str,
        description: &str,
    ) -> Result<TailoredContent, FunnelError>;
}

pub struct DocumentTailor {
    llm: LlmClient,
    profile_context: String,
}

impl DocumentTailor {
    pub fn new(llm: LlmClient, profile: &CandidateProfile) -> Self {
        Self {
            llm,
            profile_context: profile.to_context_string(),
        }
    }
}

#[async_trait]
impl Tailor for DocumentTailor {
    async fn tailor(
        &self,
        title: &str,
        company: &str,
        location: &str,
        description: &str,
    ) -> Result<TailoredContent, FunnelError> {
        let prompt = format!(
            "## Candidate Profile:\n{}\n\n\
             ## Job Posting:\n\
             **Title:** {title}\n\
             **Company:** {company}\n\
             **Location:** {location}\n\n\
             **Description:**\n{description}\n\n\
             ## Task:\n\
             Write a tailored professional summary (3-4 sentences) and a short \
             cover letter (under 250 words) for this posting, and list the ATS \
             keywords to emphasize. Respond in the following JSON format only:\n\n\
             {{\"summary\": \"...\", \"cover_letter\": \"...\", \"ats_keywords\": [\"...\"]}}",
            self.profile_context
        );

        self.llm
            .call_json::<TailoredContent>(&prompt, TAILORING_SYSTEM)
            .await
            .map_err(|e| FunnelError::Llm(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tailored_content_parses_oracle_shape() {
        let content: TailoredContent = serde_json::from_str(
            r#"{"summary": "s", "cover_letter": "c", "ats_keywords": ["siem"]}"#,
        )
        .unwrap();
        assert_eq!(content.ats_keywords, vec!["siem".to_string()]);
    }

    #[test]
    fn test_ats_keywords_default_to_empty() {
        let content: TailoredContent =
            serde_json::from_str(r#"{"summary": "s", "cover_letter": "c"}"#).unwrap();
        assert!(content.ats_keywords.is_empty());
    }
}
