//! Adjudication stage — runs qualified, not-yet-matched postings past the
//! LLM oracle and records the 1-5 fit score.

use tracing::{debug, error, info};

use crate::errors::FunnelError;
use crate::matcher::Adjudicator;
use crate::store::JobStore;

/// Aggregate counts for one adjudication pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdjudicateCounts {
    pub processed: usize,
    pub good_matches: usize,
    pub poor_matches: usize,
    pub errors: usize,
}

/// Adjudicates qualified postings with `matched_at IS NULL`. A failed oracle
/// call leaves the posting untouched so the stage can be retried later.
pub async fn adjudicate_jobs(
    store: &dyn JobStore,
    adjudicator: &dyn Adjudicator,
    min_score: i32,
    limit: i64,
) -> Result<AdjudicateCounts, FunnelError> {
    let jobs = store.get_unmatched_qualified(limit).await?;
    info!("Adjudicating {} qualified postings", jobs.len());

    let mut counts = AdjudicateCounts::default();

    for job in jobs {
        debug!("Matching: {} at {}", job.title, job.company);

        let result = adjudicator
            .match_job(&job.title, &job.company, &job.location, &job.description)
            .await;

        if !result.success {
            error!(
                "Failed to match {} at {}: {}",
                job.title,
                job.company,
                result.error.as_deref().unwrap_or("unknown error")
            );
            counts.errors += 1;
            continue;
        }

        store
            .record_match(job.id, result.score, &result.reasoning)
            .await?;
        counts.processed += 1;

        if result.score >= min_score {
            counts.good_matches += 1;
            info!(
                "GOOD MATCH: {} at {} (score: {}/5)",
                job.title, job.company, result.score
            );
        } else {
            counts.poor_matches += 1;
            debug!(
                "Poor match: {} at {} (score: {}/5)",
                job.title, job.company, result.score
            );
        }
    }

    info!(
        "Adjudication complete: {} processed, {} good, {} poor, {} errors",
        counts.processed, counts.good_matches, counts.poor_matches, counts.errors
    );
    Ok(counts)
}
