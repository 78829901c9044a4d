//! Delivery collaborator — emails the application package.
//!
//! Single attempt, no retry. A delivery failure is reported to the caller
//! but never blocks marking the posting generated; the documents already
//! exist on disk.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::errors::FunnelError;
use crate::generation::documents::RenderedDocuments;
use crate::models::job::JobRow;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[async_trait]
pub trait Delivery: Send + Sync {
    async fn send_application(
        &self,
        job: &JobRow,
        docs: &RenderedDocuments,
        cover_letter: &str,
    ) -> Result<(), FunnelError>;
}

pub struct ResendMailer {
    client: Client,
    api_key: String,
    to: String,
}

impl ResendMailer {
    pub fn new(api_key: String, to: String) -> Result<Self, FunnelError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            api_key,
            to,
        })
    }

    fn build_body(job: &JobRow, docs: &RenderedDocuments, cover_letter: &str) -> String {
        format!(
            "Match: {}/5\n{}\n\nApply: {}\n\nResume: {}\nCover letter: {}\n\n---\n{}\n",
            job.llm_score.unwrap_or(0),
            job.llm_reasoning.as_deref().unwrap_or(""),
            job.apply_url.as_deref().unwrap_or(&job.url),
            docs.resume_path.display(),
            docs.cover_letter_path.display(),
            cover_letter,
        )
    }
}

#[async_trait]
impl Delivery for ResendMailer {
    async fn send_application(
        &self,
        job: &JobRow,
        docs: &RenderedDocuments,
        cover_letter: &str,
    ) -> Result<(), FunnelError> {
        let subject = format!("Application ready: {} at {}", job.title, job.company);
        let payload = json!({
            "from": "funnel <onboarding@resend.dev>",
            "to": [self.to],
            "subject": subject,
            "text": Self::build_body(job, docs, cover_letter),
        });

        self.client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        info!("Application email sent for {} at {}", job.title, job.company);
        Ok(())
    }
}
