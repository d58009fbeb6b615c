use async_trait::async_trait;
use chrono::Utc;
use fin_core::{
    Article, ArticleSource, EnrichmentModel, Error, FeedQuery, Operation, Result, SentimentScore,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub fn article(title: &str) -> Article {
    Article {
        title: title.to_string(),
        body: format!("{} body", title),
        published_at: Utc::now(),
        source_id: format!("uri-{}", title.to_lowercase()),
        url: None,
    }
}

/// Feed double that counts fetches and can be held open by a gate.
pub struct MockSource {
    articles: Option<Vec<Article>>,
    calls: AtomicUsize,
    last_query: Mutex<Option<FeedQuery>>,
    gate: Option<Arc<Semaphore>>,
    panic_next: AtomicBool,
}

impl MockSource {
    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            articles: Some(articles),
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
            gate: None,
            panic_next: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        Self {
            articles: None,
            ..Self::with_articles(vec![])
        }
    }

    /// Every fetch waits for one permit on `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// The first fetch panics; later ones behave normally.
    pub fn panic_first_fetch(self) -> Self {
        self.panic_next.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<FeedQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_articles(&self, query: &FeedQuery) -> Result<Vec<Article>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        if self.panic_next.swap(false, Ordering::SeqCst) {
            panic!("feed blew up");
        }
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.articles
            .clone()
            .ok_or_else(|| Error::Feed("feed unreachable".to_string()))
    }
}

/// Enrichment double that records every call in order.
#[derive(Debug, Default)]
pub struct MockEnricher {
    summarize_down: bool,
    sentiment_down: bool,
    panic_on: Option<String>,
    calls: Mutex<Vec<(Operation, String)>>,
}

impl MockEnricher {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn summarize_down(mut self) -> Self {
        self.summarize_down = true;
        self
    }

    pub fn sentiment_down(mut self) -> Self {
        self.sentiment_down = true;
        self
    }

    pub fn panic_on(mut self, content: &str) -> Self {
        self.panic_on = Some(content.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(Operation, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: Operation, content: &str) {
        self.calls.lock().unwrap().push((operation, content.to_string()));
        if self.panic_on.as_deref() == Some(content) {
            panic!("enricher blew up on {}", content);
        }
    }
}

#[async_trait]
impl EnrichmentModel for MockEnricher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn summarize(&self, content: &str) -> Result<String> {
        self.record(Operation::Summarize, content);
        if self.summarize_down {
            return Err(Error::Enrichment("connection refused".to_string()));
        }
        Ok(format!("summary of {}", content))
    }

    async fn analyze_sentiment(&self, content: &str) -> Result<Vec<SentimentScore>> {
        self.record(Operation::Sentiment, content);
        if self.sentiment_down {
            return Err(Error::Enrichment("connection refused".to_string()));
        }
        Ok(vec![SentimentScore {
            label: "POSITIVE".to_string(),
            score: 0.9,
        }])
    }

    async fn forward(&self, operation: Operation, payload: &Value) -> Result<Value> {
        Ok(json!({ "operation": operation.path(), "echo": payload }))
    }
}
