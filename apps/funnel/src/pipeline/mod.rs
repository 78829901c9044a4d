pub mod adjudicate;
pub mod generate;
pub mod ranker;
pub mod scheduler;
pub mod scrape;
pub mod unified;

pub use scheduler::run_on_interval;
pub use unified::{PipelineStats, SearchPlan, UnifiedPipeline};
