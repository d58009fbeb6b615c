use async_trait::async_trait;
use tracing::{error, info};

use crate::types::{Article, FeedQuery};
use crate::Result;

#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Returns the name of the feed
    fn name(&self) -> &str;

    /// Fetches the newest articles matching the query, in provider order
    async fn fetch_articles(&self, query: &FeedQuery) -> Result<Vec<Article>>;

    /// Like `fetch_articles`, but a failed fetch is reported and yields nothing.
    async fn fetch_latest(&self, query: &FeedQuery) -> Vec<Article> {
        match self.fetch_articles(query).await {
            Ok(articles) => {
                info!(source = self.name(), count = articles.len(), "📥 Fetched articles");
                articles
            }
            Err(e) => {
                error!(source = self.name(), error = %e, "Error fetching news");
                Vec::new()
            }
        }
    }
}
