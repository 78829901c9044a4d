use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Constructed once in `main` and passed by reference into each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub apify_api_token: String,
    pub apify_actor_id: String,
    pub apify_base_url: String,
    pub resend_api_key: String,
    pub notify_email: String,

    /// Search terms scraped each pass, comma-separated in `SEARCH_TERMS`.
    pub search_terms: Vec<String>,
    pub search_location: String,
    pub max_jobs_per_term: usize,
    pub max_jobs_total: usize,

    /// Minimum LLM score (1-5) required to qualify and generate in unified mode.
    pub min_llm_score: i32,

    pub templates_path: PathBuf,
    pub profile_path: PathBuf,
    pub output_dir: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            apify_api_token: require_env("APIFY_API_TOKEN")?,
            apify_actor_id: env_or("APIFY_ACTOR_ID", "KfYqwOhOXqkqO4DF8"),
            apify_base_url: env_or("APIFY_BASE_URL", "https://api.apify.com/v2"),
            resend_api_key: require_env("RESEND_API_KEY")?,
            notify_email: require_env("NOTIFY_EMAIL")?,
            search_terms: env_or("SEARCH_TERMS", "Security Engineer")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            search_location: env_or("SEARCH_LOCATION", "Switzerland"),
            max_jobs_per_term: parse_env("MAX_JOBS_PER_TERM", 10)?,
            max_jobs_total: parse_env("MAX_JOBS_TOTAL", 100)?,
            min_llm_score: parse_env("MIN_LLM_SCORE", 4)?,
            templates_path: PathBuf::from(env_or("TEMPLATES_PATH", "config/templates.toml")),
            profile_path: PathBuf::from(env_or("PROFILE_PATH", "config/profile.toml")),
            output_dir: PathBuf::from(env_or("OUTPUT_DIR", "./output")),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .with_context(|| format!("'{key}' must be a valid number")),
        Err(_) => Ok(default),
    }
}
