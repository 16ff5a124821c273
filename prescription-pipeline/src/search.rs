//! Credibility-ranked medical search: query an external search API, filter
//! out untrusted sources, rank globally, then crawl the top distinct URLs.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::crawler::{PageFetcher, WebCrawler, parse_content};
use crate::models::{Diagnostic, SearchResult, Stage};
use crate::sources::SourceEvaluator;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// One raw item from the search API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

/// Seam over the external search API.
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn query(&self, query: &str, num_results: u32) -> anyhow::Result<Vec<SearchItem>>;
}

/// Google Custom Search style API: GET with `key`, `cx`, `q`, `num` params,
/// answering `{"items": [{"title", "link", "snippet"}, ...]}`.
pub struct CustomSearchApi {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
}

impl CustomSearchApi {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        }
    }
}

#[async_trait]
impl SearchApi for CustomSearchApi {
    async fn query(&self, query: &str, num_results: u32) -> anyhow::Result<Vec<SearchItem>> {
        let num = num_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        let data: SearchResponse = response.json().await?;
        Ok(data.items)
    }
}

/// Result of one `search` call: the content-bearing results plus structured
/// diagnostics for every degraded sub-step.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct SearchEngine {
    api: Arc<dyn SearchApi>,
    evaluator: SourceEvaluator,
    fetcher: Arc<dyn PageFetcher>,
    crawl_delay: Duration,
    max_results: usize,
}

impl SearchEngine {
    pub fn new(
        api: Arc<dyn SearchApi>,
        evaluator: SourceEvaluator,
        fetcher: Arc<dyn PageFetcher>,
        crawl_delay: Duration,
        max_results: usize,
    ) -> Self {
        Self {
            api,
            evaluator,
            fetcher,
            crawl_delay,
            max_results,
        }
    }

    /// Search all queries, keep credible hits, rank by credibility, and crawl
    /// the top distinct URLs for content.
    ///
    /// A failed query or a failed crawl degrades to a diagnostic; it never
    /// aborts the call. Returned results are sorted by credibility descending
    /// (ties keep discovery order), carry content, and are capped at the
    /// configured maximum with no duplicate URLs.
    pub async fn search(&self, queries: &[String], num_results_per_query: u32) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        let mut candidates: Vec<SearchResult> = Vec::new();

        for query in queries {
            info!("Searching for query: '{}'", query);
            match self.api.query(query, num_results_per_query).await {
                Ok(items) => {
                    if items.is_empty() {
                        warn!("No items found for query: '{}'", query);
                    }
                    for item in items {
                        let credibility = self.evaluator.evaluate_url(&item.link);
                        // Untrusted sources are dropped outright.
                        if credibility > 0.0 {
                            candidates.push(SearchResult {
                                title: item.title,
                                url: item.link,
                                snippet: item.snippet,
                                credibility_score: credibility,
                                query_matched: query.clone(),
                                content: None,
                            });
                        }
                    }
                }
                Err(e) => {
                    error!("Search API request failed for '{}': {}", query, e);
                    outcome.diagnostics.push(Diagnostic::new(
                        Stage::Search,
                        format!("query '{}' failed: {}", query, e),
                    ));
                }
            }
        }

        // Stable sort: ties keep the order the items were discovered in.
        candidates.sort_by(|a, b| {
            b.credibility_score
                .partial_cmp(&a.credibility_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let crawler = WebCrawler::new(self.fetcher.clone(), self.crawl_delay);
        let mut crawled_urls: HashSet<String> = HashSet::new();
        for mut result in candidates {
            if outcome.results.len() >= self.max_results {
                break;
            }
            if !crawled_urls.insert(result.url.clone()) {
                continue;
            }
            match crawler.fetch(&result.url).await {
                Some(html) => {
                    result.content = Some(parse_content(&html));
                    outcome.results.push(result);
                }
                None => {
                    warn!("Could not crawl content for {}, skipping.", result.url);
                    outcome.diagnostics.push(Diagnostic::new(
                        Stage::Crawl,
                        format!("could not crawl {}", result.url),
                    ));
                }
            }
        }

        outcome
    }
}
