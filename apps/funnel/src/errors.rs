use thiserror::Error;

/// Application-level error type shared across pipeline stages.
///
/// Per-posting failures are caught inside the processing loops and folded
/// into run counters; only store unavailability escapes a whole run.
#[derive(Debug, Error)]
pub enum FunnelError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Scraper error: {0}")]
    Scraper(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
