//! Scraping collaborator — fetches raw postings for a search term.
//!
//! The concrete client drives an Apify actor: start a run, poll its status,
//! fetch the dataset. The pipeline only depends on the `Scraper` trait.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::FunnelError;
use crate::models::job::RawPosting;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Fetches up to `max_results` raw postings for one search term.
    async fn fetch(
        &self,
        term: &str,
        location: &str,
        max_results: usize,
    ) -> Result<Vec<RawPosting>, FunnelError>;
}

pub struct ApifyScraper {
    client: Client,
    base_url: String,
    actor_id: String,
    api_token: String,
}

#[derive(Debug, Deserialize)]
struct RunEnvelope {
    data: RunData,
}

#[derive(Debug, Deserialize)]
struct RunData {
    id: String,
    status: String,
    #[serde(rename = "defaultDatasetId")]
    default_dataset_id: Option<String>,
}

const POLL_INTERVAL_SECS: u64 = 10;
const RUN_TIMEOUT_SECS: u64 = 300;

impl ApifyScraper {
    pub fn new(config: &Config) -> Result<Self, FunnelError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()?,
            base_url: config.apify_base_url.clone(),
            actor_id: config.apify_actor_id.clone(),
            api_token: config.apify_api_token.clone(),
        })
    }

    fn search_url(term: &str, location: &str) -> String {
        format!(
            "https://www.linkedin.com/jobs/search/?keywords={}&location={}",
            urlencoding::encode(term),
            urlencoding::encode(location)
        )
    }

    async fn start_run(
        &self,
        term: &str,
        location: &str,
        max_results: usize,
    ) -> Result<RunData, FunnelError> {
        let input = json!({
            "searchUrl": Self::search_url(term, location),
            "maxItems": max_results,
            "proxy": { "useApifyProxy": true },
        });

        let url = format!("{}/acts/{}/runs", self.base_url, self.actor_id);
        info!("Starting scraper actor {} for '{term}'", self.actor_id);
        debug!("Actor input: {input}");

        let envelope: RunEnvelope = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&input)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(envelope.data)
    }

    async fn wait_for_run(&self, run_id: &str) -> Result<String, FunnelError> {
        let status_url = format!("{}/actor-runs/{run_id}", self.base_url);
        let mut elapsed = 0u64;

        loop {
            let envelope: RunEnvelope = self
                .client
                .get(&status_url)
                .bearer_auth(&self.api_token)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            debug!("Actor run {run_id}: {} ({elapsed}s)", envelope.data.status);

            match envelope.data.status.as_str() {
                "SUCCEEDED" => {
                    return envelope.data.default_dataset_id.ok_or_else(|| {
                        FunnelError::Scraper("actor run succeeded without a dataset".to_string())
                    });
                }
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(FunnelError::Scraper(format!(
                        "actor run {run_id} ended with status {}",
                        envelope.data.status
                    )));
                }
                _ => {}
            }

            if elapsed >= RUN_TIMEOUT_SECS {
                return Err(FunnelError::Scraper(format!(
                    "actor run {run_id} timed out after {RUN_TIMEOUT_SECS}s"
                )));
            }
            tokio::time::sleep(std::time::Duration::from_secs(POLL_INTERVAL_SECS)).await;
            elapsed += POLL_INTERVAL_SECS;
        }
    }

    async fn fetch_dataset(&self, dataset_id: &str) -> Result<Vec<RawPosting>, FunnelError> {
        let url = format!("{}/datasets/{dataset_id}/items", self.base_url);
        let postings: Vec<RawPosting> = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[("format", "json")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(postings)
    }
}

#[async_trait]
impl Scraper for ApifyScraper {
    async fn fetch(
        &self,
        term: &str,
        location: &str,
        max_results: usize,
    ) -> Result<Vec<RawPosting>, FunnelError> {
        let run = self.start_run(term, location, max_results).await?;
        let dataset_id = self.wait_for_run(&run.id).await?;
        let postings = self.fetch_dataset(&dataset_id).await?;
        info!("Scraped {} postings for '{term}'", postings.len());
        Ok(postings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_percent_encodes_both_params() {
        let url = ApifyScraper::search_url("Security Engineer", "Zürich, Switzerland");
        assert!(url.contains("keywords=Security%20Engineer"));
        assert!(url.contains("location=Z%C3%BCrich%2C%20Switzerland"));
    }

    #[test]
    fn test_run_envelope_parses_actor_response() {
        let raw = r#"{"data": {"id": "r1", "status": "SUCCEEDED", "defaultDatasetId": "d1"}}"#;
        let envelope: RunEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.data.id, "r1");
        assert_eq!(envelope.data.default_dataset_id.as_deref(), Some("d1"));
    }
}
