pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod source;
pub mod types;

pub use error::{Error, Result};
pub use models::EnrichmentModel;
pub use source::ArticleSource;
pub use types::{
    Article, CycleOutcome, CycleRun, EnrichedArticle, FeedQuery, Operation, SentimentResult,
    SentimentScore, Summary, SENTIMENT_ERROR, SUMMARY_ERROR,
};
