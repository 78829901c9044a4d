//! Unified orchestrator — scrape, score, adjudicate, generate, and notify in
//! one continuous flow.
//!
//! Postings are processed sequentially in discovery order; every stage
//! persists before the next begins, so a crash resumes at the next
//! unprocessed record. No failure escapes a single posting's processing:
//! collaborator errors become counters and the posting stays retryable.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::errors::FunnelError;
use crate::lifecycle::JobStatus;
use crate::matcher::Adjudicator;
use crate::models::job::NewJob;
use crate::pipeline::generate::{generate_for_job, GenerateOutcome, GenerationContext};
use crate::scoring::{score_job, TemplateSet};
use crate::scraper::Scraper;
use crate::store::JobStore;

/// Aggregate counters for one orchestrator pass.
#[derive(Debug, Default)]
pub struct PipelineStats {
    pub jobs_scraped: usize,
    pub jobs_new: usize,
    pub jobs_matched: usize,
    pub score_5_jobs: usize,
    pub score_4_jobs: usize,
    pub jobs_generated: usize,
    pub emails_sent: usize,
    pub errors: usize,
    started: Option<Instant>,
}

impl PipelineStats {
    fn start() -> Self {
        Self {
            started: Some(Instant::now()),
            ..Self::default()
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        self.started
            .map(|s| s.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scraped: {}, New: {}, Matched: {} (5:{}, 4:{}), Generated: {}, \
             Emails: {}, Errors: {}, Duration: {:.1}s",
            self.jobs_scraped,
            self.jobs_new,
            self.jobs_matched,
            self.score_5_jobs,
            self.score_4_jobs,
            self.jobs_generated,
            self.emails_sent,
            self.errors,
            self.duration_seconds(),
        )
    }
}

/// Search parameters for one pass.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub terms: Vec<String>,
    pub location: String,
    pub max_per_term: usize,
    pub max_total: usize,
}

pub struct UnifiedPipeline {
    scraper: Arc<dyn Scraper>,
    store: Arc<dyn JobStore>,
    adjudicator: Arc<dyn Adjudicator>,
    generation: GenerationContext,
    templates: TemplateSet,
    /// Minimum LLM score to qualify and generate in this mode.
    min_llm_score: i32,
}

impl UnifiedPipeline {
    pub fn new(
        scraper: Arc<dyn Scraper>,
        store: Arc<dyn JobStore>,
        adjudicator: Arc<dyn Adjudicator>,
        generation: GenerationContext,
        templates: TemplateSet,
        min_llm_score: i32,
    ) -> Self {
        Self {
            scraper,
            store,
            adjudicator,
            generation,
            templates,
            min_llm_score,
        }
    }

    /// Runs the full funnel once and returns aggregate counters.
    pub async fn run_once(&self, plan: &SearchPlan) -> PipelineStats {
        let mut stats = PipelineStats::start();
        info!(
            "Starting pipeline run: {} terms, location={}",
            plan.terms.len(),
            plan.location
        );

        // Dedup within the fetch batch; the store handles cross-run dedup.
        let mut seen: HashSet<String> = HashSet::new();

        'terms: for term in &plan.terms {
            let postings = match self
                .scraper
                .fetch(term, &plan.location, plan.max_per_term)
                .await
            {
                Ok(p) => p,
                Err(e) => {
                    error!("Scraping failed for '{term}': {e}");
                    stats.errors += 1;
                    continue;
                }
            };

            stats.jobs_scraped += postings.len();
            info!("Found {} postings for '{term}'", postings.len());

            for raw in postings {
                if stats.jobs_new >= plan.max_total {
                    info!("Reached total cap of {} new postings", plan.max_total);
                    break 'terms;
                }

                let Some(job) = raw.into_new_job(term) else {
                    debug!("Discarding posting without external id or title");
                    continue;
                };

                if !seen.insert(job.external_id.clone()) {
                    continue;
                }

                if let Err(e) = self.process_posting(job, &mut stats).await {
                    stats.errors += 1;
                    error!("Posting failed: {e}");
                }
            }
        }

        info!("Pipeline run complete: {stats}");
        stats
    }

    /// Drives one new posting through the full stage chain. Returns `Err`
    /// only for store failures; collaborator failures are folded into the
    /// stats and the posting is left in a retryable status.
    async fn process_posting(
        &self,
        job: NewJob,
        stats: &mut PipelineStats,
    ) -> Result<(), FunnelError> {
        // Skip postings already tracked from an earlier run.
        if self.store.exists_by_external_id(&job.external_id).await? {
            debug!("Skipping existing posting: {} at {}", job.title, job.company);
            return Ok(());
        }

        let (id, _was_inserted) = self.store.upsert_job(&job).await?;
        stats.jobs_new += 1;

        // Stage: template scoring. A failed template score disqualifies the
        // posting before any oracle spend.
        let scoring = score_job(&job.title, &job.description, &self.templates);
        if !scoring.passed {
            self.store
                .record_scoring(id, &scoring, JobStatus::Disqualified)
                .await?;
            debug!(
                "Disqualified: {} at {} (score: {})",
                job.title, job.company, scoring.score
            );
            return Ok(());
        }
        self.store
            .record_scoring(id, &scoring, JobStatus::Scraped)
            .await?;

        // Stage: adjudication. Failure leaves the posting scraped with its
        // scoring recorded; a later adjudication pass can retry it.
        info!("Matching: {} at {}", job.title, job.company);
        let verdict = self
            .adjudicator
            .match_job(&job.title, &job.company, &job.location, &job.description)
            .await;

        if !verdict.success {
            error!(
                "Matching failed for {} at {}: {}",
                job.title,
                job.company,
                verdict.error.as_deref().unwrap_or("unknown error")
            );
            stats.errors += 1;
            return Ok(());
        }

        self.store
            .record_match(id, verdict.score, &verdict.reasoning)
            .await?;
        stats.jobs_matched += 1;
        match verdict.score {
            5 => stats.score_5_jobs += 1,
            4 => stats.score_4_jobs += 1,
            _ => {}
        }
        info!(
            "Match score: {}/5 - {} at {}",
            verdict.score, job.title, job.company
        );

        if verdict.score < self.min_llm_score {
            return Ok(());
        }

        // Template pass plus LLM gate: the posting qualifies.
        self.store
            .set_status(id, JobStatus::Scraped, JobStatus::Qualified)
            .await?;

        // Stage: generation and delivery. Failure keeps the posting
        // qualified; the recorded qualification and adjudication stand.
        let Some(row) = self.store.get_by_id(id).await? else {
            return Err(FunnelError::Validation(format!(
                "posting {id} vanished mid-run"
            )));
        };

        match generate_for_job(&self.generation, self.store.as_ref(), &row).await {
            Ok(GenerateOutcome::Generated { delivered }) => {
                stats.jobs_generated += 1;
                if delivered {
                    stats.emails_sent += 1;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "Generation failed for {} at {}: {e}",
                    job.title, job.company
                );
                stats.errors += 1;
            }
        }

        Ok(())
    }
}
