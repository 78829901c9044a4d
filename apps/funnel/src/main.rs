mod config;
mod db;
mod errors;
mod generation;
mod lifecycle;
mod llm_client;
mod matcher;
mod models;
mod pipeline;
mod scoring;
mod scraper;
mod store;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::generation::{DocumentTailor, MarkdownRenderer, ResendMailer, VariantSet};
use crate::matcher::{CandidateProfile, LlmAdjudicator};
use crate::pipeline::generate::GenerationContext;
use crate::pipeline::{run_on_interval, SearchPlan, UnifiedPipeline};
use crate::scoring::TemplateSet;
use crate::scraper::ApifyScraper;
use crate::store::PgJobStore;

#[derive(Parser, Debug)]
#[command(name = "funnel", about = "Personal job-search funnel", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full funnel: scrape, score, adjudicate, generate, notify.
    Run {
        /// Keep running, one pass per interval.
        #[arg(long)]
        daemon: bool,
        /// Seconds between passes in daemon mode.
        #[arg(long, default_value_t = 3600)]
        interval: u64,
    },
    /// Fetch postings and persist new ones without scoring.
    Scrape {
        #[arg(long)]
        daemon: bool,
        #[arg(long, default_value_t = 3600)]
        interval: u64,
    },
    /// Score pending postings against the templates.
    Rank {
        #[arg(long, default_value_t = 100)]
        limit: i64,
        /// Score against this single template instead of the best match.
        #[arg(long)]
        template: Option<String>,
    },
    /// Run qualified postings past the LLM oracle.
    Adjudicate {
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
    /// Generate and deliver applications for high-match postings.
    Generate {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse first so --help and --version work without any environment.
    let cli = Cli::parse();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting funnel v{}", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(&config.database_url).await?;
    ensure_schema(&pool).await?;
    let store = Arc::new(PgJobStore::new(pool.clone()));

    let templates = TemplateSet::load(&config.templates_path)?;
    info!("Loaded {} scoring templates", templates.templates.len());

    match cli.command {
        Command::Run { daemon, interval } => {
            let pipeline = Arc::new(build_pipeline(&config, store, templates)?);
            let plan = search_plan(&config);
            if daemon {
                run_on_interval(Duration::from_secs(interval), move || {
                    let pipeline = pipeline.clone();
                    let plan = plan.clone();
                    async move {
                        let stats = pipeline.run_once(&plan).await;
                        info!("Pass finished: {stats}");
                        Ok(())
                    }
                })
                .await;
            } else {
                let stats = pipeline.run_once(&plan).await;
                println!("{stats}");
            }
        }
        Command::Scrape { daemon, interval } => {
            let scraper = Arc::new(ApifyScraper::new(&config)?);
            let plan = search_plan(&config);
            if daemon {
                run_on_interval(Duration::from_secs(interval), move || {
                    let scraper = scraper.clone();
                    let store = store.clone();
                    let plan = plan.clone();
                    async move {
                        let counts =
                            pipeline::scrape::scrape_jobs(scraper.as_ref(), store.as_ref(), &plan)
                                .await?;
                        info!("Pass finished: {} new postings", counts.new);
                        Ok(())
                    }
                })
                .await;
            } else {
                let counts =
                    pipeline::scrape::scrape_jobs(scraper.as_ref(), store.as_ref(), &plan).await?;
                println!(
                    "Scraped: {}, New: {}, Duplicates: {}, Errors: {}",
                    counts.scraped, counts.new, counts.duplicates, counts.errors
                );
            }
        }
        Command::Rank { limit, template } => {
            let counts =
                pipeline::ranker::rank_jobs(store.as_ref(), &templates, template.as_deref(), limit)
                    .await?;
            println!(
                "Processed: {}, Qualified: {}, Disqualified: {}, Errors: {}",
                counts.processed, counts.qualified, counts.disqualified, counts.errors
            );
        }
        Command::Adjudicate { limit } => {
            let profile = CandidateProfile::load(&config.profile_path)?;
            let llm = llm_client::LlmClient::new(config.anthropic_api_key.clone())?;
            let adjudicator = LlmAdjudicator::new(llm, &profile);
            let counts = pipeline::adjudicate::adjudicate_jobs(
                store.as_ref(),
                &adjudicator,
                config.min_llm_score,
                limit,
            )
            .await?;
            println!(
                "Processed: {}, Good: {}, Poor: {}, Errors: {}",
                counts.processed, counts.good_matches, counts.poor_matches, counts.errors
            );
        }
        Command::Generate { limit } => {
            let ctx = build_generation(&config)?;
            let counts = pipeline::generate::generate_applications(
                &ctx,
                store.as_ref(),
                config.min_llm_score,
                limit,
            )
            .await?;
            println!(
                "Processed: {}, Generated: {}, Delivered: {}, Errors: {}",
                counts.processed, counts.generated, counts.delivered, counts.errors
            );
        }
    }

    pool.close().await;
    Ok(())
}

fn search_plan(config: &Config) -> SearchPlan {
    SearchPlan {
        terms: config.search_terms.clone(),
        location: config.search_location.clone(),
        max_per_term: config.max_jobs_per_term,
        max_total: config.max_jobs_total,
    }
}

fn build_generation(config: &Config) -> Result<GenerationContext> {
    let profile = CandidateProfile::load(&config.profile_path)?;
    let llm = llm_client::LlmClient::new(config.anthropic_api_key.clone())?;
    Ok(GenerationContext {
        tailor: Arc::new(DocumentTailor::new(llm, &profile)),
        variants: VariantSet::load(&config.templates_path)?,
        renderer: Arc::new(MarkdownRenderer::new(
            config.output_dir.clone(),
            profile.clone(),
        )),
        delivery: Arc::new(ResendMailer::new(
            config.resend_api_key.clone(),
            config.notify_email.clone(),
        )?),
    })
}

fn build_pipeline(
    config: &Config,
    store: Arc<PgJobStore>,
    templates: TemplateSet,
) -> Result<UnifiedPipeline> {
    let profile = CandidateProfile::load(&config.profile_path)?;
    let llm = llm_client::LlmClient::new(config.anthropic_api_key.clone())?;
    Ok(UnifiedPipeline::new(
        Arc::new(ApifyScraper::new(config)?),
        store,
        Arc::new(LlmAdjudicator::new(llm, &profile)),
        build_generation(config)?,
        templates,
        config.min_llm_score,
    ))
}
