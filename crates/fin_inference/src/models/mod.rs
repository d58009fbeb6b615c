use std::str::FromStr;
use std::sync::Arc;

use fin_core::{EnrichmentModel, Error, Result};

use crate::Config;

pub mod local;
pub mod remote;

pub use local::LocalModel;
pub use remote::RemoteModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    Remote,
    Local,
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            other => Err(Error::Config(format!(
                "unknown model '{}'. Available models: remote, local",
                other
            ))),
        }
    }
}

pub fn create_model(config: Config) -> Result<Arc<dyn EnrichmentModel>> {
    match config.kind {
        ModelKind::Remote => {
            let enrichment = config.enrichment.ok_or_else(|| {
                Error::Config("the remote model needs an enrichment service URL".to_string())
            })?;
            Ok(Arc::new(RemoteModel::new(enrichment)?))
        }
        ModelKind::Local => Ok(Arc::new(LocalModel::new())),
    }
}
