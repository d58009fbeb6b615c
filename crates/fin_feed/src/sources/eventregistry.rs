use async_trait::async_trait;
use chrono::Utc;
use fin_core::config::FeedConfig;
use fin_core::{Article, ArticleSource, Error, FeedQuery, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::utils::parse_timestamp;

const PAYWALLED_SOURCES: &str = "paywall/paywalled_sources";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetArticlesRequest<'a> {
    action: &'static str,
    keyword: &'a [String],
    lang: [&'a str; 1],
    keyword_loc: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_source_group_uri: Option<&'static str>,
    articles_page: u32,
    articles_count: u32,
    articles_sort_by: &'a str,
    articles_sort_by_asc: bool,
    data_type: &'a [String],
    result_type: &'static str,
    api_key: &'a str,
}

#[derive(Deserialize)]
struct GetArticlesResponse {
    articles: ArticleResults,
}

#[derive(Deserialize)]
struct ArticleResults {
    results: Vec<ArticleRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleRecord {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    date_time_pub: Option<String>,
    #[serde(default)]
    date_time: Option<String>,
}

impl ArticleRecord {
    fn into_article(self) -> Article {
        let published_at = self
            .date_time_pub
            .as_deref()
            .or(self.date_time.as_deref())
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);

        Article {
            source_id: self
                .uri
                .or_else(|| self.url.clone())
                .unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            published_at,
            url: self.url,
        }
    }
}

/// Article feed backed by the EventRegistry `getArticles` endpoint.
pub struct EventRegistrySource {
    client: Client,
    config: FeedConfig,
}

impl fmt::Debug for EventRegistrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistrySource")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.config.endpoint.as_str())
            .finish()
    }
}

impl EventRegistrySource {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ArticleSource for EventRegistrySource {
    fn name(&self) -> &str {
        "EventRegistry"
    }

    async fn fetch_articles(&self, query: &FeedQuery) -> Result<Vec<Article>> {
        query.validate()?;

        let request = GetArticlesRequest {
            action: "getArticles",
            keyword: &query.keywords,
            lang: [query.language.as_str()],
            keyword_loc: &query.keyword_locations,
            ignore_source_group_uri: query.exclude_paywalled.then_some(PAYWALLED_SOURCES),
            articles_page: query.page,
            articles_count: query.page_size,
            articles_sort_by: &query.sort_by,
            articles_sort_by_asc: query.ascending,
            data_type: &query.data_types,
            result_type: "articles",
            api_key: &self.config.api_key,
        };

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: GetArticlesResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Feed(format!("unexpected response shape: {}", e)))?;

        debug!(count = parsed.articles.results.len(), "Raw feed results");
        Ok(parsed
            .articles
            .results
            .into_iter()
            .map(ArticleRecord::into_article)
            .collect())
    }
}
