use async_trait::async_trait;
use fin_core::{EnrichmentModel, Error, Operation, Result, SentimentScore};
use serde_json::{json, Value};
use std::fmt;

const MAX_SENTENCES: usize = 3;
const MAX_WORDS: usize = 60;

const POSITIVE: &[&str] = &[
    "gain", "gains", "rise", "rises", "rose", "rally", "rallies", "surge", "surges", "soar",
    "soars", "growth", "profit", "profits", "beat", "beats", "record", "strong", "bullish",
    "higher", "boost", "rebound", "upgrade", "optimism", "recovery",
];

const NEGATIVE: &[&str] = &[
    "fall", "falls", "fell", "drop", "drops", "loss", "losses", "decline", "declines", "slump",
    "plunge", "plunges", "weak", "bearish", "lower", "miss", "misses", "fear", "fears",
    "recession", "crash", "downgrade", "layoffs", "default", "selloff",
];

/// Offline model: extractive summaries and a finance word-list sentiment.
pub struct LocalModel;

impl fmt::Debug for LocalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalModel").finish()
    }
}

impl LocalModel {
    pub fn new() -> Self {
        Self
    }

    fn extract_summary(content: &str) -> String {
        let sentences: Vec<&str> = content
            .split_inclusive(|c: char| matches!(c, '.' | '!' | '?'))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(MAX_SENTENCES)
            .collect();

        let words: Vec<&str> = sentences
            .iter()
            .flat_map(|s| s.split_whitespace())
            .take(MAX_WORDS)
            .collect();
        words.join(" ")
    }

    fn classify(content: &str) -> SentimentScore {
        let (mut positive, mut negative) = (0u32, 0u32);
        for word in content.split(|c: char| !c.is_alphanumeric()) {
            let word = word.to_lowercase();
            if POSITIVE.contains(&word.as_str()) {
                positive += 1;
            } else if NEGATIVE.contains(&word.as_str()) {
                negative += 1;
            }
        }

        let total = positive + negative;
        if positive == negative {
            return SentimentScore { label: "NEUTRAL".to_string(), score: 0.5 };
        }
        let margin = f64::from(positive.abs_diff(negative)) / f64::from(total);
        let label = if positive > negative { "POSITIVE" } else { "NEGATIVE" };
        SentimentScore {
            label: label.to_string(),
            score: 0.5 + margin / 2.0,
        }
    }
}

impl Default for LocalModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnrichmentModel for LocalModel {
    fn name(&self) -> &str {
        "local"
    }

    async fn summarize(&self, content: &str) -> Result<String> {
        let summary = Self::extract_summary(content);
        tracing::debug!("Generated summary from content: {}", summary);
        Ok(summary)
    }

    async fn analyze_sentiment(&self, content: &str) -> Result<Vec<SentimentScore>> {
        Ok(vec![Self::classify(content)])
    }

    async fn forward(&self, operation: Operation, payload: &Value) -> Result<Value> {
        let content = payload
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Enrichment("payload needs a string 'content' field".to_string()))?;

        match operation {
            Operation::Summarize => Ok(json!({ "summary": self.summarize(content).await? })),
            Operation::Sentiment => Ok(json!({ "sentiment": self.analyze_sentiment(content).await? })),
        }
    }
}
