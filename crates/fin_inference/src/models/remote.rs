use async_trait::async_trait;
use fin_core::config::EnrichmentConfig;
use fin_core::{EnrichmentModel, Error, Operation, Result, SentimentScore};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

#[derive(Serialize)]
struct ContentRequest<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Deserialize)]
struct SentimentResponse {
    sentiment: OneOrMany,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<SentimentScore>),
    One(SentimentScore),
}

/// Client for the HTTP analysis service exposing `/summarize` and `/sentiment`.
pub struct RemoteModel {
    client: Client,
    config: EnrichmentConfig,
}

impl fmt::Debug for RemoteModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteModel")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.config.base_url.as_str())
            .finish()
    }
}

impl RemoteModel {
    pub fn new(config: EnrichmentConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn post<T: Serialize + ?Sized>(&self, operation: Operation, body: &T) -> Result<reqwest::Response> {
        let url = self.config.endpoint(operation.path())?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response)
    }
}

#[async_trait]
impl EnrichmentModel for RemoteModel {
    fn name(&self) -> &str {
        "remote"
    }

    async fn summarize(&self, content: &str) -> Result<String> {
        let response: SummaryResponse = self
            .post(Operation::Summarize, &ContentRequest { content })
            .await?
            .json()
            .await?;
        debug!(chars = response.summary.len(), "Summarize response");
        Ok(response.summary)
    }

    async fn analyze_sentiment(&self, content: &str) -> Result<Vec<SentimentScore>> {
        let response: SentimentResponse = self
            .post(Operation::Sentiment, &ContentRequest { content })
            .await?
            .json()
            .await?;
        let scores = match response.sentiment {
            OneOrMany::Many(scores) => scores,
            OneOrMany::One(score) => vec![score],
        };
        if scores.is_empty() {
            return Err(Error::Enrichment("sentiment service returned no labels".to_string()));
        }
        debug!(?scores, "Sentiment response");
        Ok(scores)
    }

    async fn forward(&self, operation: Operation, payload: &Value) -> Result<Value> {
        Ok(self.post(operation, payload).await?.json().await?)
    }
}
