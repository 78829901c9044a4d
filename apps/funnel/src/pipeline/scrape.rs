//! Scrape stage — fetches postings for each search term and persists the
//! new ones as `scraped`, without scoring them.

use std::collections::HashSet;

use tracing::{debug, error, info};

use crate::errors::FunnelError;
use crate::pipeline::unified::SearchPlan;
use crate::scraper::Scraper;
use crate::store::JobStore;

/// Aggregate counts for one scrape pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScrapeCounts {
    pub scraped: usize,
    pub new: usize,
    pub duplicates: usize,
    pub errors: usize,
}

/// Fetches and persists postings. Duplicates, within the batch or against
/// the store, are counted and skipped; a failed search term is counted and
/// the remaining terms still run.
pub async fn scrape_jobs(
    scraper: &dyn Scraper,
    store: &dyn JobStore,
    plan: &SearchPlan,
) -> Result<ScrapeCounts, FunnelError> {
    let mut counts = ScrapeCounts::default();
    let mut seen: HashSet<String> = HashSet::new();

    'terms: for term in &plan.terms {
        let postings = match scraper.fetch(term, &plan.location, plan.max_per_term).await {
            Ok(p) => p,
            Err(e) => {
                error!("Scraping failed for '{term}': {e}");
                counts.errors += 1;
                continue;
            }
        };

        counts.scraped += postings.len();
        info!("Found {} postings for '{term}'", postings.len());

        for raw in postings {
            if counts.new >= plan.max_total {
                info!("Reached total cap of {} new postings", plan.max_total);
                break 'terms;
            }

            let Some(job) = raw.into_new_job(term) else {
                debug!("Discarding posting without external id or title");
                continue;
            };

            if !seen.insert(job.external_id.clone()) {
                counts.duplicates += 1;
                continue;
            }

            let (_, was_inserted) = store.upsert_job(&job).await?;
            if was_inserted {
                counts.new += 1;
                debug!("Stored: {} at {}", job.title, job.company);
            } else {
                counts.duplicates += 1;
            }
        }
    }

    info!(
        "Scrape complete: {} scraped, {} new, {} duplicates, {} errors",
        counts.scraped, counts.new, counts.duplicates, counts.errors
    );
    Ok(counts)
}
