use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A scraped job posting tracked through the funnel lifecycle.
///
/// `external_id` is the source-assigned identifier and is unique; postings
/// are upserted by it and never duplicated. Rows are mutated in place by the
/// scoring, adjudication, and generation stages and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub external_id: String,
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub apply_url: Option<String>,
    /// Which search term discovered this posting.
    pub search_term: Option<String>,
    pub score: Option<i32>,
    pub matched_triggers: Vec<String>,
    pub matched_support: Vec<String>,
    pub template_name: Option<String>,
    pub llm_score: Option<i32>,
    pub llm_reasoning: Option<String>,
    pub matched_at: Option<DateTime<Utc>>,
    pub generated_at: Option<DateTime<Utc>>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A posting as delivered by the scraping collaborator, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPosting {
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "companyName")]
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "jobUrl")]
    pub url: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

/// A validated posting ready to persist as `scraped`.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub external_id: String,
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub apply_url: Option<String>,
    pub search_term: Option<String>,
}

impl RawPosting {
    /// Validates the raw posting. Postings missing an external id or title
    /// are discarded before they ever reach the store.
    pub fn into_new_job(self, search_term: &str) -> Option<NewJob> {
        let external_id = self.id.filter(|s| !s.trim().is_empty())?;
        let title = self.title.filter(|s| !s.trim().is_empty())?;

        let posted_at = self
            .published_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let url = self.url.unwrap_or_default();
        Some(NewJob {
            external_id,
            apply_url: Some(url.clone()).filter(|s| !s.is_empty()),
            url,
            title,
            company: self.company.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            posted_at,
            search_term: Some(search_term.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_external_id_is_discarded() {
        let raw = RawPosting {
            title: Some("Security Engineer".to_string()),
            ..Default::default()
        };
        assert!(raw.into_new_job("Security Engineer").is_none());
    }

    #[test]
    fn test_missing_title_is_discarded() {
        let raw = RawPosting {
            id: Some("123".to_string()),
            ..Default::default()
        };
        assert!(raw.into_new_job("Security Engineer").is_none());
    }

    #[test]
    fn test_blank_external_id_is_discarded() {
        let raw = RawPosting {
            id: Some("   ".to_string()),
            title: Some("Security Engineer".to_string()),
            ..Default::default()
        };
        assert!(raw.into_new_job("Security Engineer").is_none());
    }

    #[test]
    fn test_valid_posting_converts_with_defaults() {
        let raw = RawPosting {
            id: Some("123".to_string()),
            title: Some("Security Engineer".to_string()),
            company: Some("Acme".to_string()),
            url: Some("https://example.com/jobs/123".to_string()),
            published_at: Some("2026-08-01T09:00:00Z".to_string()),
            ..Default::default()
        };
        let job = raw.into_new_job("Security Engineer").unwrap();
        assert_eq!(job.external_id, "123");
        assert_eq!(job.company, "Acme");
        assert_eq!(job.location, "");
        assert!(job.posted_at.is_some());
        assert_eq!(job.apply_url.as_deref(), Some("https://example.com/jobs/123"));
        assert_eq!(job.search_term.as_deref(), Some("Security Engineer"));
    }

    #[test]
    fn test_unparseable_timestamp_becomes_none() {
        let raw = RawPosting {
            id: Some("123".to_string()),
            title: Some("Security Engineer".to_string()),
            published_at: Some("three days ago".to_string()),
            ..Default::default()
        };
        let job = raw.into_new_job("Security Engineer").unwrap();
        assert!(job.posted_at.is_none());
    }
}
