//! Rank stage — scores pending postings against the templates and moves
//! them to `qualified` or `disqualified`.

use tracing::{debug, info, warn};

use crate::errors::FunnelError;
use crate::lifecycle::JobStatus;
use crate::scoring::engine::score_with_template;
use crate::scoring::{score_job, TemplateSet};
use crate::store::JobStore;

/// Aggregate counts for one rank pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct RankCounts {
    pub processed: usize,
    pub qualified: usize,
    pub disqualified: usize,
    pub errors: usize,
}

/// Scores every posting currently in `scraped` status, up to `limit`.
/// With `template_name` set, only that template is evaluated; otherwise the
/// best-scoring template wins. Per-posting failures are counted and the
/// posting moved to `error`; only store unavailability fails the whole pass.
pub async fn rank_jobs(
    store: &dyn JobStore,
    templates: &TemplateSet,
    template_name: Option<&str>,
    limit: i64,
) -> Result<RankCounts, FunnelError> {
    let jobs = store.get_by_status(JobStatus::Scraped, limit).await?;
    info!("Ranking {} pending postings", jobs.len());

    let mut counts = RankCounts::default();

    for job in jobs {
        debug!("Ranking: {} at {}", job.title, job.company);

        let result = match template_name {
            Some(name) => score_with_template(&job.title, &job.description, templates, name),
            None => score_job(&job.title, &job.description, templates),
        };
        let status = if result.passed {
            JobStatus::Qualified
        } else {
            JobStatus::Disqualified
        };

        match store.record_scoring(job.id, &result, status).await {
            Ok(()) => {
                counts.processed += 1;
                if result.passed {
                    counts.qualified += 1;
                    info!(
                        "QUALIFIED: {} at {} (score: {}, triggers: {:?})",
                        job.title, job.company, result.score, result.matched_triggers
                    );
                } else {
                    counts.disqualified += 1;
                    debug!(
                        "Disqualified: {} at {} (score: {})",
                        job.title, job.company, result.score
                    );
                }
            }
            Err(e) => {
                warn!("Failed to record scoring for {}: {e}", job.external_id);
                counts.errors += 1;
                if let Err(e2) = store.mark_error(job.id, &e.to_string()).await {
                    warn!("Failed to mark {} as errored: {e2}", job.external_id);
                }
            }
        }
    }

    info!(
        "Ranking complete: {} qualified, {} disqualified, {} errors",
        counts.qualified, counts.disqualified, counts.errors
    );
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    use crate::models::application::{ApplicationRow, NewApplication};
    use crate::models::job::{JobRow, NewJob};
    use crate::scoring::templates::{ScoringConfig, ScoringTemplate};
    use crate::scoring::ScoringResult;

    /// Store whose `record_scoring` and `mark_error` both fail for one job.
    struct FlakyStore {
        jobs: Vec<JobRow>,
        fail_for: Uuid,
        recorded: Mutex<Vec<Uuid>>,
        error_marks_attempted: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl JobStore for FlakyStore {
        async fn upsert_job(&self, _job: &NewJob) -> Result<(Uuid, bool), FunnelError> {
            unimplemented!()
        }

        async fn exists_by_external_id(&self, _external_id: &str) -> Result<bool, FunnelError> {
            unimplemented!()
        }

        async fn get_by_id(&self, _id: Uuid) -> Result<Option<JobRow>, FunnelError> {
            unimplemented!()
        }

        async fn get_by_status(
            &self,
            _status: JobStatus,
            limit: i64,
        ) -> Result<Vec<JobRow>, FunnelError> {
            Ok(self.jobs.iter().take(limit as usize).cloned().collect())
        }

        async fn get_unmatched_qualified(&self, _limit: i64) -> Result<Vec<JobRow>, FunnelError> {
            unimplemented!()
        }

        async fn get_high_match_ungenerated(
            &self,
            _min_llm_score: i32,
            _limit: i64,
        ) -> Result<Vec<JobRow>, FunnelError> {
            unimplemented!()
        }

        async fn record_scoring(
            &self,
            id: Uuid,
            _result: &ScoringResult,
            _status: JobStatus,
        ) -> Result<(), FunnelError> {
            if id == self.fail_for {
                return Err(FunnelError::Validation("connection reset".to_string()));
            }
            self.recorded.lock().unwrap().push(id);
            Ok(())
        }

        async fn record_match(
            &self,
            _id: Uuid,
            _score: i32,
            _reasoning: &str,
        ) -> Result<(), FunnelError> {
            unimplemented!()
        }

        async fn set_status(
            &self,
            _id: Uuid,
            _from: JobStatus,
            _to: JobStatus,
        ) -> Result<bool, FunnelError> {
            unimplemented!()
        }

        async fn mark_generated(&self, _id: Uuid) -> Result<bool, FunnelError> {
            unimplemented!()
        }

        async fn mark_error(&self, id: Uuid, _cause: &str) -> Result<(), FunnelError> {
            self.error_marks_attempted.lock().unwrap().push(id);
            Err(FunnelError::Validation("connection reset".to_string()))
        }

        async fn insert_application(&self, _app: &NewApplication) -> Result<Uuid, FunnelError> {
            unimplemented!()
        }

        async fn has_active_application(&self, _job_id: Uuid) -> Result<bool, FunnelError> {
            unimplemented!()
        }

        async fn get_applications_by_job(
            &self,
            _job_id: Uuid,
        ) -> Result<Vec<ApplicationRow>, FunnelError> {
            unimplemented!()
        }
    }

    fn scraped_job(external_id: &str) -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            external_id: external_id.to_string(),
            url: String::new(),
            title: "Security Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Zurich".to_string(),
            description: "vulnerability work".to_string(),
            posted_at: None,
            apply_url: None,
            search_term: None,
            score: None,
            matched_triggers: vec![],
            matched_support: vec![],
            template_name: None,
            llm_score: None,
            llm_reasoning: None,
            matched_at: None,
            generated_at: None,
            status: "scraped".to_string(),
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn templates() -> TemplateSet {
        TemplateSet::compile(
            vec![ScoringTemplate {
                name: "security".to_string(),
                trigger_keywords: vec!["security engineer".to_string(), "vulnerability".to_string()],
                support_keywords: vec![],
                negative_keywords: vec![],
                trigger_weight: 10,
                support_weight: 4,
                negative_weight: -15,
            }],
            ScoringConfig {
                min_score: 20,
                min_triggers: 2,
                title_bonus_multiplier: 1.5,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_store_failure_on_one_job_does_not_stop_the_pass() {
        let broken = scraped_job("1");
        let healthy = scraped_job("2");
        let healthy_id = healthy.id;
        let store = FlakyStore {
            fail_for: broken.id,
            jobs: vec![broken.clone(), healthy],
            recorded: Mutex::new(vec![]),
            error_marks_attempted: Mutex::new(vec![]),
        };

        let counts = rank_jobs(&store, &templates(), None, 100).await.unwrap();

        assert_eq!(counts.errors, 1);
        assert_eq!(counts.processed, 1);
        assert_eq!(counts.qualified, 1);
        assert_eq!(*store.recorded.lock().unwrap(), vec![healthy_id]);
        // The error transition was attempted; its own failure is only logged.
        assert_eq!(*store.error_marks_attempted.lock().unwrap(), vec![broken.id]);
    }
}
