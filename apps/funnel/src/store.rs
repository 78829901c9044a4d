//! Job record store — the single source of truth for lifecycle state.
//!
//! `JobStore` is the seam between the pipeline and the physical backend.
//! `PgJobStore` is the one concrete implementation; every lifecycle guard is
//! a conditional UPDATE so behavior does not depend on the backend and
//! concurrent workers cannot double-transition a posting.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::FunnelError;
use crate::lifecycle::{ApplicationStatus, JobStatus};
use crate::models::application::{ApplicationRow, NewApplication};
use crate::models::job::{JobRow, NewJob};
use crate::scoring::ScoringResult;

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Upserts a posting by external id. Returns `(internal_id, was_inserted)`.
    async fn upsert_job(&self, job: &NewJob) -> Result<(Uuid, bool), FunnelError>;

    async fn exists_by_external_id(&self, external_id: &str) -> Result<bool, FunnelError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<JobRow>, FunnelError>;

    async fn get_by_status(
        &self,
        status: JobStatus,
        limit: i64,
    ) -> Result<Vec<JobRow>, FunnelError>;

    /// Qualified postings not yet adjudicated, highest LLM score first.
    async fn get_unmatched_qualified(&self, limit: i64) -> Result<Vec<JobRow>, FunnelError>;

    /// Qualified postings at or above the LLM threshold with no documents yet.
    async fn get_high_match_ungenerated(
        &self,
        min_llm_score: i32,
        limit: i64,
    ) -> Result<Vec<JobRow>, FunnelError>;

    /// Records scoring outputs and the resulting qualified/disqualified status.
    async fn record_scoring(
        &self,
        id: Uuid,
        result: &ScoringResult,
        status: JobStatus,
    ) -> Result<(), FunnelError>;

    /// Records adjudication outputs and stamps `matched_at`.
    async fn record_match(&self, id: Uuid, score: i32, reasoning: &str) -> Result<(), FunnelError>;

    /// Transitions status, guarded on the current status. Returns false when
    /// another worker already moved the posting.
    async fn set_status(
        &self,
        id: Uuid,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<bool, FunnelError>;

    /// Marks a posting `generated`, guarded on `generated_at IS NULL`.
    /// Returns false when the posting was already generated (no-op).
    async fn mark_generated(&self, id: Uuid) -> Result<bool, FunnelError>;

    /// Moves a posting to the absorbing `error` state and records the cause.
    async fn mark_error(&self, id: Uuid, cause: &str) -> Result<(), FunnelError>;

    async fn insert_application(&self, app: &NewApplication) -> Result<Uuid, FunnelError>;

    /// True when the posting already has a non-withdrawn application.
    async fn has_active_application(&self, job_id: Uuid) -> Result<bool, FunnelError>;

    async fn get_applications_by_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<ApplicationRow>, FunnelError>;
}

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn upsert_job(&self, job: &NewJob) -> Result<(Uuid, bool), FunnelError> {
        // (xmax = 0) distinguishes a fresh insert from a conflict update.
        let row: (Uuid, bool) = sqlx::query_as(
            r#"
            INSERT INTO jobs (external_id, url, title, company, location, description,
                              posted_at, apply_url, search_term, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'scraped')
            ON CONFLICT (external_id) DO UPDATE SET
                url = EXCLUDED.url,
                title = EXCLUDED.title,
                company = EXCLUDED.company,
                location = EXCLUDED.location,
                description = EXCLUDED.description,
                posted_at = EXCLUDED.posted_at,
                apply_url = EXCLUDED.apply_url,
                updated_at = now()
            RETURNING id, (xmax = 0) AS was_inserted
            "#,
        )
        .bind(&job.external_id)
        .bind(&job.url)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.description)
        .bind(job.posted_at)
        .bind(&job.apply_url)
        .bind(&job.search_term)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn exists_by_external_id(&self, external_id: &str) -> Result<bool, FunnelError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM jobs WHERE external_id = $1)")
                .bind(external_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<JobRow>, FunnelError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_by_status(
        &self,
        status: JobStatus,
        limit: i64,
    ) -> Result<Vec<JobRow>, FunnelError> {
        let rows = sqlx::query_as::<_, JobRow>(
            "SELECT * FROM jobs WHERE status = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(status.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_unmatched_qualified(&self, limit: i64) -> Result<Vec<JobRow>, FunnelError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM jobs
            WHERE status = 'qualified' AND matched_at IS NULL
            ORDER BY llm_score DESC NULLS LAST, created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_high_match_ungenerated(
        &self,
        min_llm_score: i32,
        limit: i64,
    ) -> Result<Vec<JobRow>, FunnelError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM jobs
            WHERE status = 'qualified'
              AND generated_at IS NULL
              AND llm_score IS NOT NULL
              AND llm_score >= $1
            ORDER BY llm_score DESC, created_at DESC
            LIMIT $2
            "#,
        )
        .bind(min_llm_score)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn record_scoring(
        &self,
        id: Uuid,
        result: &ScoringResult,
        status: JobStatus,
    ) -> Result<(), FunnelError> {
        sqlx::query(
            r#"
            UPDATE jobs SET
                score = $2,
                matched_triggers = $3,
                matched_support = $4,
                template_name = $5,
                status = $6,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(result.score)
        .bind(&result.matched_triggers)
        .bind(&result.matched_support)
        .bind(&result.template_name)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_match(&self, id: Uuid, score: i32, reasoning: &str) -> Result<(), FunnelError> {
        sqlx::query(
            r#"
            UPDATE jobs SET
                llm_score = $2,
                llm_reasoning = $3,
                matched_at = $4,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(score)
        .bind(reasoning)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_status(
        &self,
        id: Uuid,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<bool, FunnelError> {
        if !from.can_transition(to) {
            return Err(FunnelError::Validation(format!(
                "illegal transition {from} -> {to} for job {id}"
            )));
        }
        let result = sqlx::query(
            "UPDATE jobs SET status = $3, updated_at = now() WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_generated(&self, id: Uuid) -> Result<bool, FunnelError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs SET
                status = 'generated',
                generated_at = now(),
                updated_at = now()
            WHERE id = $1 AND generated_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_error(&self, id: Uuid, cause: &str) -> Result<(), FunnelError> {
        sqlx::query(
            r#"
            UPDATE jobs SET
                status = 'error',
                error_message = $2,
                updated_at = now()
            WHERE id = $1 AND status <> 'error'
            "#,
        )
        .bind(id)
        .bind(cause)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_application(&self, app: &NewApplication) -> Result<Uuid, FunnelError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO applications
                (job_id, job_title, company, resume_path, cover_letter_path,
                 cover_letter_content, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(app.job_id)
        .bind(&app.job_title)
        .bind(&app.company)
        .bind(&app.resume_path)
        .bind(&app.cover_letter_path)
        .bind(&app.cover_letter_content)
        .bind(ApplicationStatus::Pending.as_str())
        .bind(&app.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn has_active_application(&self, job_id: Uuid) -> Result<bool, FunnelError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM applications WHERE job_id = $1 AND status <> 'withdrawn')",
        )
        .bind(job_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn get_applications_by_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<ApplicationRow>, FunnelError> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE job_id = $1 ORDER BY created_at DESC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
