use fin_core::config::EnrichmentConfig;

pub mod models;

pub use models::{create_model, LocalModel, ModelKind, RemoteModel};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub kind: ModelKind,
    pub enrichment: Option<EnrichmentConfig>,
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::{Config, ModelKind};
    pub use fin_core::{EnrichmentModel, Error, Operation, Result, SentimentScore};
}
