//! Generation stage — produces and delivers the application package for
//! high-match postings, exactly once per posting.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::FunnelError;
use crate::generation::{select_variant, Delivery, DocumentRenderer, Tailor, VariantSet};
use crate::models::application::NewApplication;
use crate::models::job::JobRow;
use crate::store::JobStore;

/// Collaborators the generation stage drives. Held once and shared between
/// the standalone stage and the unified orchestrator.
pub struct GenerationContext {
    pub tailor: Arc<dyn Tailor>,
    pub variants: VariantSet,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub delivery: Arc<dyn Delivery>,
}

/// Aggregate counts for one generation pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenerateCounts {
    pub processed: usize,
    pub generated: usize,
    pub delivered: usize,
    pub errors: usize,
}

/// What happened to a single posting in the generation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    Generated { delivered: bool },
    /// `generated_at` was already set; idempotent no-op success.
    AlreadyGenerated,
    /// A non-withdrawn application already exists for this posting.
    SkippedExistingApplication,
}

/// Generates applications for qualified postings at or above the LLM score
/// threshold. Failures leave the posting in `qualified` for a later retry.
pub async fn generate_applications(
    ctx: &GenerationContext,
    store: &dyn JobStore,
    min_llm_score: i32,
    limit: i64,
) -> Result<GenerateCounts, FunnelError> {
    let jobs = store.get_high_match_ungenerated(min_llm_score, limit).await?;
    info!("Generating applications for {} postings", jobs.len());

    let mut counts = GenerateCounts::default();

    for job in jobs {
        counts.processed += 1;
        match generate_for_job(ctx, store, &job).await {
            Ok(GenerateOutcome::Generated { delivered }) => {
                counts.generated += 1;
                if delivered {
                    counts.delivered += 1;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "Generation failed for {} at {}: {e}",
                    job.title, job.company
                );
                counts.errors += 1;
            }
        }
    }

    info!(
        "Generation complete: {} generated, {} delivered, {} errors",
        counts.generated, counts.delivered, counts.errors
    );
    Ok(counts)
}

/// Drives one posting through variant selection, tailoring, rendering,
/// delivery, and the `generated` transition.
///
/// Idempotent: a posting with `generated_at` set, or with an existing
/// non-withdrawn application, is a no-op success. A delivery failure is
/// logged but the posting is still marked generated, since the documents
/// exist on disk.
pub async fn generate_for_job(
    ctx: &GenerationContext,
    store: &dyn JobStore,
    job: &JobRow,
) -> Result<GenerateOutcome, FunnelError> {
    if job.generated_at.is_some() {
        return Ok(GenerateOutcome::AlreadyGenerated);
    }
    if store.has_active_application(job.id).await? {
        // A previous run crashed between inserting the application and
        // marking the posting; finish the transition and move on.
        store.mark_generated(job.id).await?;
        return Ok(GenerateOutcome::SkippedExistingApplication);
    }

    let variant = select_variant(&job.title, &job.description, &ctx.variants);
    info!(
        "Generating application for {} at {} (variant: {})",
        job.title,
        job.company,
        variant.name()
    );

    let content = ctx
        .tailor
        .tailor(&job.title, &job.company, &job.location, &job.description)
        .await?;

    let docs = ctx
        .renderer
        .render(job.id, &job.title, &job.company, variant, &content)
        .await?;

    let delivered = match ctx
        .delivery
        .send_application(job, &docs, &content.cover_letter)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            // Documents exist even if delivery failed; do not block the
            // generated transition.
            warn!("Delivery failed for {} at {}: {e}", job.title, job.company);
            false
        }
    };

    store
        .insert_application(&NewApplication {
            job_id: job.id,
            job_title: job.title.clone(),
            company: job.company.clone(),
            resume_path: Some(docs.resume_path.display().to_string()),
            cover_letter_path: Some(docs.cover_letter_path.display().to_string()),
            cover_letter_content: Some(content.cover_letter.clone()),
            notes: Some(format!(
                "variant: {}, ats: {}",
                variant.name(),
                content.ats_keywords.join(", ")
            )),
        })
        .await?;

    store.mark_generated(job.id).await?;

    Ok(GenerateOutcome::Generated { delivered })
}
