use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::types::{Operation, SentimentScore};
use crate::Result;

#[async_trait]
pub trait EnrichmentModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Summarize a piece of text, usually an article body
    async fn summarize(&self, content: &str) -> Result<String>;

    /// Classify the sentiment of a piece of text, usually a headline
    async fn analyze_sentiment(&self, content: &str) -> Result<Vec<SentimentScore>>;

    /// Send a caller-supplied payload to one operation and hand back the raw response
    async fn forward(&self, operation: Operation, payload: &Value) -> Result<Value>;
}
