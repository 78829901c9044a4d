pub mod engine;
pub mod templates;

pub use engine::{score_job, ScoringResult};
pub use templates::{ScoringConfig, ScoringTemplate, TemplateSet};
