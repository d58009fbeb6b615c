use fin_core::EnrichmentModel;
use fin_pipeline::Scheduler;
use std::sync::Arc;

pub struct AppState {
    pub enricher: Arc<dyn EnrichmentModel>,
    pub scheduler: Option<Arc<Scheduler>>,
}

impl AppState {
    pub fn new(enricher: Arc<dyn EnrichmentModel>) -> Self {
        Self {
            enricher,
            scheduler: None,
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }
}
