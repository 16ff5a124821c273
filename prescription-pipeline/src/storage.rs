//! Storage seam for crawled articles.
//!
//! Persistence is an external collaborator of the pipeline; the core only
//! depends on this trait. The in-memory implementation backs tests and the
//! default service wiring.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredArticle {
    pub url: String,
    pub title: String,
    pub content: String,
    pub source: String,
    pub fetched_at: String,
    pub credibility_score: f64,
}

/// Trait for storing and retrieving crawled articles.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert an article. An existing entry for the same URL is kept
    /// unchanged (insert-or-ignore).
    async fn insert_article(&self, article: StoredArticle) -> anyhow::Result<()>;
    async fn get_by_url(&self, url: &str) -> anyhow::Result<Option<StoredArticle>>;
    async fn find_by_keyword(&self, keyword: &str, limit: usize)
    -> anyhow::Result<Vec<StoredArticle>>;
}

/// In-memory implementation of [`ArticleStore`].
pub struct InMemoryArticleStore {
    articles: DashMap<String, StoredArticle>,
}

impl InMemoryArticleStore {
    pub fn new() -> Self {
        Self {
            articles: DashMap::new(),
        }
    }
}

impl Default for InMemoryArticleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn insert_article(&self, article: StoredArticle) -> anyhow::Result<()> {
        self.articles
            .entry(article.url.clone())
            .or_insert(article);
        Ok(())
    }

    async fn get_by_url(&self, url: &str) -> anyhow::Result<Option<StoredArticle>> {
        Ok(self.articles.get(url).map(|entry| entry.clone()))
    }

    async fn find_by_keyword(
        &self,
        keyword: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<StoredArticle>> {
        Ok(self
            .articles
            .iter()
            .filter(|entry| entry.content.contains(keyword))
            .take(limit)
            .map(|entry| entry.clone())
            .collect())
    }
}
