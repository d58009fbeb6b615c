pub mod runner;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_utils;

pub use runner::PipelineRunner;
pub use scheduler::{DailyTrigger, Scheduler};

pub mod prelude {
    pub use super::{DailyTrigger, PipelineRunner, Scheduler};
    pub use fin_core::{CycleOutcome, CycleRun, EnrichedArticle, Result};
}
