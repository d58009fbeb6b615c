use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Message carried by a [`Summary`] when the summarization call failed.
pub const SUMMARY_ERROR: &str = "Error summarizing content.";

/// Message carried by a [`SentimentResult`] when the sentiment call failed.
pub const SENTIMENT_ERROR: &str = "Error analyzing sentiment.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
    pub source_id: String,
    pub url: Option<String>,
}

/// Outcome of the summarize step. Always present once the step ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Summary {
    Generated(String),
    Failed(String),
}

impl Summary {
    pub fn failed() -> Self {
        Self::Failed(SUMMARY_ERROR.to_string())
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) | Self::Failed(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: String,
    pub score: f64,
}

/// Outcome of the sentiment step, computed from the headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SentimentResult {
    Classified(Vec<SentimentScore>),
    Failed(String),
}

impl SentimentResult {
    pub fn failed() -> Self {
        Self::Failed(SENTIMENT_ERROR.to_string())
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Highest scoring label, if any.
    pub fn top_label(&self) -> Option<&SentimentScore> {
        match self {
            Self::Classified(scores) => scores
                .iter()
                .max_by(|a, b| a.score.total_cmp(&b.score)),
            Self::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedArticle {
    pub article: Article,
    pub summary: Summary,
    pub sentiment: SentimentResult,
}

/// Every enriched article of one cycle, in fetch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleOutcome {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub articles: Vec<EnrichedArticle>,
}

impl CycleOutcome {
    pub fn empty(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: Utc::now(),
            articles: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn failed_summaries(&self) -> usize {
        self.articles.iter().filter(|a| a.summary.is_failed()).count()
    }

    pub fn failed_sentiments(&self) -> usize {
        self.articles.iter().filter(|a| a.sentiment.is_failed()).count()
    }
}

/// Result of asking for a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleRun {
    Completed(CycleOutcome),
    /// Another cycle was still in flight; nothing ran.
    Skipped,
}

impl CycleRun {
    pub fn outcome(&self) -> Option<&CycleOutcome> {
        match self {
            Self::Completed(outcome) => Some(outcome),
            Self::Skipped => None,
        }
    }
}

/// The two enrichment capabilities exposed by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Summarize,
    Sentiment,
}

impl Operation {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Sentiment => "sentiment",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Query sent to the article feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub keywords: Vec<String>,
    pub language: String,
    pub keyword_locations: String,
    pub data_types: Vec<String>,
    pub sort_by: String,
    pub ascending: bool,
    pub exclude_paywalled: bool,
    pub page: u32,
    pub page_size: u32,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            keywords: ["stocks", "finance", "market", "economy"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            language: "eng".to_string(),
            keyword_locations: "body,title".to_string(),
            data_types: vec!["news".to_string(), "pr".to_string()],
            sort_by: "date".to_string(),
            ascending: false,
            exclude_paywalled: true,
            page: 1,
            page_size: 10,
        }
    }
}

impl FeedQuery {
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(Error::Feed("query needs at least one keyword".to_string()));
        }
        if self.page_size == 0 {
            return Err(Error::Feed("page size must be greater than zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            body: "Body".to_string(),
            published_at: Utc::now(),
            source_id: "id-1".to_string(),
            url: None,
        }
    }

    #[test]
    fn test_sentinels_carry_fixed_messages() {
        assert_eq!(Summary::failed().text(), "Error summarizing content.");
        assert!(Summary::failed().is_failed());
        assert!(!Summary::Generated("ok".to_string()).is_failed());
        assert_eq!(
            SentimentResult::failed(),
            SentimentResult::Failed("Error analyzing sentiment.".to_string())
        );
    }

    #[test]
    fn test_summary_serializes_with_status() {
        let json = serde_json::to_value(Summary::failed()).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["value"], SUMMARY_ERROR);
    }

    #[test]
    fn test_top_label_picks_highest_score() {
        let sentiment = SentimentResult::Classified(vec![
            SentimentScore { label: "NEGATIVE".to_string(), score: 0.2 },
            SentimentScore { label: "POSITIVE".to_string(), score: 0.8 },
        ]);
        assert_eq!(sentiment.top_label().map(|s| s.label.as_str()), Some("POSITIVE"));
        assert!(SentimentResult::failed().top_label().is_none());
    }

    #[test]
    fn test_cycle_outcome_counts_failures() {
        let outcome = CycleOutcome {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            articles: vec![
                EnrichedArticle {
                    article: article("a"),
                    summary: Summary::failed(),
                    sentiment: SentimentResult::Classified(vec![]),
                },
                EnrichedArticle {
                    article: article("b"),
                    summary: Summary::Generated("s".to_string()),
                    sentiment: SentimentResult::failed(),
                },
            ],
        };
        assert_eq!(outcome.len(), 2);
        assert_eq!(outcome.failed_summaries(), 1);
        assert_eq!(outcome.failed_sentiments(), 1);
        assert!(CycleOutcome::empty(Utc::now()).is_empty());
    }

    #[test]
    fn test_default_query_matches_feed_contract() {
        let query = FeedQuery::default();
        assert_eq!(query.keywords, vec!["stocks", "finance", "market", "economy"]);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.page, 1);
        assert!(!query.ascending);
        assert!(query.exclude_paywalled);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_query_validation() {
        assert!(FeedQuery::default().with_page_size(0).validate().is_err());
        let query = FeedQuery {
            keywords: vec![" ".to_string()],
            ..FeedQuery::default()
        };
        assert!(query.validate().is_err());
    }
}
