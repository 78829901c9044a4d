//! Match adjudicator — wraps the LLM oracle behind a trait so the pipeline
//! can be driven with a fake in tests.
//!
//! A failed adjudication never mutates the posting; the stage can be retried
//! later without side effects.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::llm_client::prompts::ADJUDICATION_SYSTEM;
use crate::llm_client::LlmClient;

pub mod profile;

pub use profile::CandidateProfile;

/// Result of adjudicating one posting against the candidate profile.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Fit score, clamped into 1..=5. Zero only on failure.
    pub score: i32,
    pub reasoning: String,
    pub success: bool,
    pub error: Option<String>,
}

impl MatchResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            score: 0,
            reasoning: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait Adjudicator: Send + Sync {
    async fn match_job(
        &self,
        title: &str,
        company: &str,
        location: &str,
        description: &str,
    ) -> MatchResult;
}

/// The shape the oracle is instructed to answer with.
#[derive(Debug, Deserialize)]
struct OracleVerdict {
    score: i32,
    #[serde(default)]
    reasoning: String,
}

pub struct LlmAdjudicator {
    llm: LlmClient,
    profile_context: String,
}

impl LlmAdjudicator {
    pub fn new(llm: LlmClient, profile: &CandidateProfile) -> Self {
        Self {
            llm,
            profile_context: profile.to_context_string(),
        }
    }

    fn build_prompt(&self, title: &str, company: &str, location: &str, description: &str) -> String {
        format!(
            "## Candidate Profile:\n{}\n\n\
             ## Job Posting:\n\
             **Title:** {title}\n\
             **Company:** {company}\n\
             **Location:** {location}\n\n\
             **Description:**\n{description}\n\n\
             ## Task:\n\
             Evaluate how well this candidate matches the job requirements.\n\
             Respond in the following JSON format only:\n\n\
             {{\"score\": <1-5>, \"reasoning\": \"<2-3 sentence explanation>\"}}",
            self.profile_context
        )
    }
}

#[async_trait]
impl Adjudicator for LlmAdjudicator {
    async fn match_job(
        &self,
        title: &str,
        company: &str,
        location: &str,
        description: &str,
    ) -> MatchResult {
        let prompt = self.build_prompt(title, company, location, description);

        match self
            .llm
            .call_json::<OracleVerdict>(&prompt, ADJUDICATION_SYSTEM)
            .await
        {
            Ok(verdict) => {
                let score = clamp_score(verdict.score);
                if score != verdict.score {
                    warn!(
                        "Oracle returned out-of-range score {}, clamped to {score}",
                        verdict.score
                    );
                }
                info!("Matched {title} at {company}: score={score}");
                MatchResult {
                    score,
                    reasoning: verdict.reasoning,
                    success: true,
                    error: None,
                }
            }
            Err(e) => MatchResult::failure(e.to_string()),
        }
    }
}

/// Out-of-range oracle scores are clamped into [1, 5], never rejected.
fn clamp_score(score: i32) -> i32 {
    score.clamp(1, 5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_out_of_range_scores() {
        assert_eq!(clamp_score(0), 1);
        assert_eq!(clamp_score(-3), 1);
        assert_eq!(clamp_score(7), 5);
        assert_eq!(clamp_score(100), 5);
    }

    #[test]
    fn test_in_range_scores_unchanged() {
        for s in 1..=5 {
            assert_eq!(clamp_score(s), s);
        }
    }

    #[test]
    fn test_failure_result_carries_error() {
        let result = MatchResult::failure("bad json");
        assert!(!result.success);
        assert_eq!(result.score, 0);
        assert_eq!(result.error.as_deref(), Some("bad json"));
    }

    #[test]
    fn test_verdict_parses_without_reasoning() {
        let verdict: OracleVerdict = serde_json::from_str("{\"score\": 4}").unwrap();
        assert_eq!(verdict.score, 4);
        assert!(verdict.reasoning.is_empty());
    }
}
