use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A generated application package for a qualifying posting.
///
/// Multiple applications per job are structurally allowed; the orchestrator
/// enforces at most one non-withdrawn application by checking existence
/// before generating.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub resume_path: Option<String>,
    pub cover_letter_path: Option<String>,
    pub cover_letter_content: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a new application record.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub resume_path: Option<String>,
    pub cover_letter_path: Option<String>,
    pub cover_letter_content: Option<String>,
    pub notes: Option<String>,
}
