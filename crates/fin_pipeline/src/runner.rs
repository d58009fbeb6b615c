use chrono::Utc;
use fin_core::{
    Article, ArticleSource, CycleOutcome, EnrichedArticle, EnrichmentModel, FeedQuery,
    SentimentResult, Summary,
};
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Runs ingestion cycles: fetch a batch, then enrich every article in order.
pub struct PipelineRunner {
    source: Arc<dyn ArticleSource>,
    enricher: Arc<dyn EnrichmentModel>,
    query: FeedQuery,
}

impl fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineRunner")
            .field("source", &self.source.name())
            .field("enricher", &self.enricher.name())
            .field("query", &self.query)
            .finish()
    }
}

impl PipelineRunner {
    pub fn new(source: Arc<dyn ArticleSource>, enricher: Arc<dyn EnrichmentModel>) -> Self {
        Self {
            source,
            enricher,
            query: FeedQuery::default(),
        }
    }

    pub fn with_query(mut self, query: FeedQuery) -> Self {
        self.query = query;
        self
    }

    pub fn query(&self) -> &FeedQuery {
        &self.query
    }

    /// Runs one cycle. Never fails: feed and enrichment failures end up in logs and sentinels.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let started_at = Utc::now();
        info!("🔄 Starting ingestion cycle");

        let articles = self.source.fetch_latest(&self.query).await;
        if articles.is_empty() {
            info!("No articles to process this cycle");
            return CycleOutcome::empty(started_at);
        }

        let total = articles.len();
        let mut enriched = Vec::with_capacity(total);
        for (i, article) in articles.into_iter().enumerate() {
            info!("📰 Processing article {}/{}: {}", i + 1, total, article.title);
            let item = self.enrich_isolated(article).await;
            emit(&item);
            enriched.push(item);
        }

        let outcome = CycleOutcome {
            started_at,
            finished_at: Utc::now(),
            articles: enriched,
        };
        info!(
            articles = outcome.len(),
            failed_summaries = outcome.failed_summaries(),
            failed_sentiments = outcome.failed_sentiments(),
            "✅ Ingestion cycle completed"
        );
        outcome
    }

    /// Summarizes the body, then classifies the headline.
    pub async fn enrich_article(&self, article: Article) -> EnrichedArticle {
        let (summary, sentiment) = self.enrich(&article).await;
        EnrichedArticle {
            article,
            summary,
            sentiment,
        }
    }

    async fn enrich(&self, article: &Article) -> (Summary, SentimentResult) {
        let summary = match self.enricher.summarize(&article.body).await {
            Ok(text) => Summary::Generated(text),
            Err(e) => {
                warn!(title = %article.title, error = %e, "Error summarizing news");
                Summary::failed()
            }
        };

        let sentiment = match self.enricher.analyze_sentiment(&article.title).await {
            Ok(scores) => SentimentResult::Classified(scores),
            Err(e) => {
                warn!(title = %article.title, error = %e, "Error analyzing sentiment");
                SentimentResult::failed()
            }
        };

        (summary, sentiment)
    }

    // A panic inside an enrichment implementation only costs this article.
    async fn enrich_isolated(&self, article: Article) -> EnrichedArticle {
        let result = AssertUnwindSafe(self.enrich(&article)).catch_unwind().await;
        let (summary, sentiment) = match result {
            Ok(pair) => pair,
            Err(panic) => {
                error!(
                    title = %article.title,
                    reason = panic_message(panic.as_ref()),
                    "Error during article processing"
                );
                (Summary::failed(), SentimentResult::failed())
            }
        };
        EnrichedArticle {
            article,
            summary,
            sentiment,
        }
    }
}

fn emit(item: &EnrichedArticle) {
    match serde_json::to_string(item) {
        Ok(json) => info!(target: "fin_pipeline::sink", "Processed news: {}", json),
        Err(e) => warn!(error = %e, title = %item.article.title, "Could not serialize enriched article"),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{article, MockEnricher, MockSource};
    use fin_core::{Operation, SENTIMENT_ERROR, SUMMARY_ERROR};

    fn runner(source: MockSource, enricher: MockEnricher) -> (PipelineRunner, Arc<MockSource>, Arc<MockEnricher>) {
        let source = Arc::new(source);
        let enricher = Arc::new(enricher);
        let runner = PipelineRunner::new(source.clone(), enricher.clone());
        (runner, source, enricher)
    }

    #[tokio::test]
    async fn test_empty_feed_makes_no_enrichment_calls() {
        let (runner, source, enricher) = runner(MockSource::with_articles(vec![]), MockEnricher::healthy());

        let outcome = runner.run_cycle().await;

        assert!(outcome.is_empty());
        assert_eq!(source.calls(), 1);
        assert!(enricher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_feed_failure_is_a_no_op_cycle() {
        let (runner, source, enricher) = runner(MockSource::failing(), MockEnricher::healthy());

        let outcome = runner.run_cycle().await;

        assert!(outcome.is_empty());
        assert_eq!(source.calls(), 1);
        assert!(enricher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_healthy_backends_enrich_every_article_in_order() {
        let articles = vec![article("First"), article("Second"), article("Third")];
        let (runner, _source, _enricher) = runner(MockSource::with_articles(articles), MockEnricher::healthy());

        let outcome = runner.run_cycle().await;

        assert_eq!(outcome.len(), 3);
        let titles: Vec<_> = outcome.articles.iter().map(|a| a.article.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
        for item in &outcome.articles {
            assert_eq!(item.summary, Summary::Generated(format!("summary of {} body", item.article.title)));
            assert!(!item.sentiment.is_failed());
        }
        assert!(outcome.finished_at >= outcome.started_at);
    }

    #[tokio::test]
    async fn test_summarize_precedes_sentiment_for_each_article() {
        let articles = vec![article("A"), article("B")];
        let (runner, _source, enricher) = runner(MockSource::with_articles(articles), MockEnricher::healthy());

        runner.run_cycle().await;

        assert_eq!(
            enricher.calls(),
            vec![
                (Operation::Summarize, "A body".to_string()),
                (Operation::Sentiment, "A".to_string()),
                (Operation::Summarize, "B body".to_string()),
                (Operation::Sentiment, "B".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_summarization_outage_only_affects_summaries() {
        let articles = vec![article("A"), article("B"), article("C"), article("D")];
        let enricher = MockEnricher::healthy().summarize_down();
        let (runner, _source, _enricher) = runner(MockSource::with_articles(articles), enricher);

        let outcome = runner.run_cycle().await;

        assert_eq!(outcome.len(), 4);
        assert_eq!(outcome.failed_summaries(), 4);
        assert_eq!(outcome.failed_sentiments(), 0);
        for item in &outcome.articles {
            assert_eq!(item.summary, Summary::Failed(SUMMARY_ERROR.to_string()));
            assert!(matches!(item.sentiment, SentimentResult::Classified(_)));
        }
    }

    #[tokio::test]
    async fn test_sentiment_outage_only_affects_sentiment() {
        let articles = vec![article("A"), article("B")];
        let enricher = MockEnricher::healthy().sentiment_down();
        let (runner, _source, _enricher) = runner(MockSource::with_articles(articles), enricher);

        let outcome = runner.run_cycle().await;

        assert_eq!(outcome.len(), 2);
        assert_eq!(outcome.failed_summaries(), 0);
        for item in &outcome.articles {
            assert_eq!(item.sentiment, SentimentResult::Failed(SENTIMENT_ERROR.to_string()));
        }
    }

    #[tokio::test]
    async fn test_panicking_article_does_not_abort_the_cycle() {
        let articles = vec![article("A"), article("Boom"), article("C")];
        let enricher = MockEnricher::healthy().panic_on("Boom body");
        let (runner, _source, enricher) = runner(MockSource::with_articles(articles), enricher);

        let outcome = runner.run_cycle().await;

        assert_eq!(outcome.len(), 3);
        assert_eq!(outcome.articles[1].article.title, "Boom");
        assert!(outcome.articles[1].summary.is_failed());
        assert!(outcome.articles[1].sentiment.is_failed());
        assert!(!outcome.articles[2].summary.is_failed());
        assert!(enricher.calls().contains(&(Operation::Sentiment, "C".to_string())));
    }

    #[tokio::test]
    async fn test_enrich_article_uses_body_and_title() {
        let (runner, _source, enricher) = runner(MockSource::with_articles(vec![]), MockEnricher::healthy());

        let enriched = runner.enrich_article(article("Headline")).await;

        assert_eq!(enriched.summary.text(), "summary of Headline body");
        assert_eq!(
            enricher.calls(),
            vec![
                (Operation::Summarize, "Headline body".to_string()),
                (Operation::Sentiment, "Headline".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_runner_passes_its_query_to_the_source() {
        let source = MockSource::with_articles(vec![]);
        let (runner, source, _enricher) = runner(source, MockEnricher::healthy());
        let runner = runner.with_query(FeedQuery::default().with_page_size(5));

        runner.run_cycle().await;

        assert_eq!(source.last_query().map(|q| q.page_size), Some(5));
    }
}
