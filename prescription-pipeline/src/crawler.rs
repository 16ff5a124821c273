//! Polite page fetching with per-instance URL deduplication, plus a
//! best-effort visible-text extractor for the fetched HTML.

use async_trait::async_trait;
use dashmap::DashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; PrescriptionPipeline/1.0)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const BLOCK_TAGS: [&str; 4] = ["article", "main", "div", "p"];

/// Transport seam for page retrieval, so tests can count or fake fetches.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> anyhow::Result<String>;
}

/// Real fetcher: GET with an identifying User-Agent and a bounded timeout.
/// Non-2xx statuses are errors.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Rate-limited crawler that fetches each URL at most once.
///
/// The seen-set is owned by the crawler instance; the search engine builds a
/// fresh crawler per request so concurrent cases never share dedup state.
pub struct WebCrawler {
    fetcher: Arc<dyn PageFetcher>,
    crawl_delay: Duration,
    seen: DashSet<String>,
}

impl WebCrawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, crawl_delay: Duration) -> Self {
        Self {
            fetcher,
            crawl_delay,
            seen: DashSet::new(),
        }
    }

    /// Fetch a page, or `None` on any failure. A URL already fetched by this
    /// instance returns `None` without touching the network.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        if !self.seen.insert(url.to_string()) {
            debug!("Skipping already crawled: {}", url);
            return None;
        }

        // Politeness delay before every fetch, including the first.
        tokio::time::sleep(self.crawl_delay).await;

        info!("Fetching: {}", url);
        match self.fetcher.fetch_page(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                None
            }
        }
    }
}

/// Extract visible text from the main content blocks of an HTML page.
///
/// Concatenates text from `article`/`main`/`div`/`p` tags, skipping tags whose
/// class mentions `navbar` or `footer`; falls back to whole-document text when
/// no block yields anything. This is a heuristic, not a precise extraction.
pub fn parse_content(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let mut lower = html.to_string();
    lower.make_ascii_lowercase();

    let mut parts: Vec<String> = Vec::new();
    for tag in BLOCK_TAGS {
        collect_tag_text(html, &lower, tag, &mut parts);
    }
    if parts.is_empty() {
        visible_text(html)
    } else {
        parts.join(" ")
    }
}

fn collect_tag_text(html: &str, lower: &str, tag: &str, parts: &mut Vec<String>) {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut pos = 0;
    while let Some(found) = lower[pos..].find(&open) {
        let start = pos + found;
        let after_name = start + open.len();
        // Require a real tag boundary so `<p` does not match `<pre>`.
        if !matches!(
            lower.as_bytes().get(after_name).copied(),
            Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'>') | Some(b'/')
        ) {
            pos = after_name;
            continue;
        }
        let Some(gt) = lower[start..].find('>') else {
            break;
        };
        let content_start = start + gt + 1;
        let attrs = &lower[start..start + gt];
        let content_end = lower[content_start..]
            .find(&close)
            .map(|rel| content_start + rel)
            .unwrap_or(lower.len());

        if !is_navigation_chrome(attrs) {
            let text = visible_text(&html[content_start..content_end]);
            if !text.is_empty() {
                parts.push(text);
            }
        }
        pos = content_start;
    }
}

fn is_navigation_chrome(tag_attrs: &str) -> bool {
    class_attr(tag_attrs)
        .map(|class| class.contains("navbar") || class.contains("footer"))
        .unwrap_or(false)
}

fn class_attr(tag_attrs: &str) -> Option<&str> {
    let idx = tag_attrs.find("class=")?;
    let rest = &tag_attrs[idx + "class=".len()..];
    match *rest.as_bytes().first()? {
        b'"' => rest[1..].split('"').next(),
        b'\'' => rest[1..].split('\'').next(),
        _ => rest.split_whitespace().next(),
    }
}

/// Whole-fragment visible text: script/style bodies removed, tags stripped,
/// whitespace collapsed.
fn visible_text(fragment: &str) -> String {
    let cleaned = strip_elements(fragment, "script");
    let cleaned = strip_elements(&cleaned, "style");
    let mut out = String::with_capacity(cleaned.len());
    let mut in_tag = false;
    for c in cleaned.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_elements(html: &str, tag: &str) -> String {
    let mut lower = html.to_string();
    lower.make_ascii_lowercase();
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(found) = lower[pos..].find(&open) {
        let start = pos + found;
        out.push_str(&html[pos..start]);
        match lower[start..].find(&close) {
            Some(rel) => pos = start + rel + close.len(),
            None => {
                pos = lower.len();
            }
        }
    }
    out.push_str(&html[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for CountingFetcher {
        async fn fetch_page(&self, _url: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("<p>fetched body</p>".to_string())
        }
    }

    #[tokio::test]
    async fn refetching_a_seen_url_is_a_no_op() {
        let fetcher = Arc::new(CountingFetcher::new());
        let crawler = WebCrawler::new(fetcher.clone(), Duration::ZERO);

        let first = crawler.fetch("https://example.org/page").await;
        assert!(first.is_some());

        let second = crawler.fetch("https://example.org/page").await;
        assert!(second.is_none());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_urls_are_each_fetched() {
        let fetcher = Arc::new(CountingFetcher::new());
        let crawler = WebCrawler::new(fetcher.clone(), Duration::ZERO);

        crawler.fetch("https://example.org/a").await;
        crawler.fetch("https://example.org/b").await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    struct FailingFetcher;

    #[async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
            Err(anyhow::anyhow!("connection refused: {url}"))
        }
    }

    #[tokio::test]
    async fn transport_failures_yield_none() {
        let crawler = WebCrawler::new(Arc::new(FailingFetcher), Duration::ZERO);
        assert!(crawler.fetch("https://example.org/down").await.is_none());
    }

    #[test]
    fn extracts_paragraph_text() {
        let html = "<html><body><p>Hypertension management guidelines.</p></body></html>";
        let text = parse_content(html);
        assert!(text.contains("Hypertension management guidelines."));
    }

    #[test]
    fn skips_navbar_and_footer_blocks() {
        let html = concat!(
            "<div class=\"navbar dark\">Home | About</div>",
            "<p>Actual medical content.</p>",
            "<div class='footer'>Copyright</div>",
        );
        let text = parse_content(html);
        assert!(text.contains("Actual medical content."));
        assert!(!text.contains("Home | About"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn falls_back_to_whole_document_text() {
        let html = "<html><body><span>Only inline content here</span></body></html>";
        let text = parse_content(html);
        assert_eq!(text, "Only inline content here");
    }

    #[test]
    fn drops_script_and_style_bodies() {
        let html = "<p>Visible.</p><script>var x = 1;</script><style>p{}</style>";
        let text = parse_content(html);
        assert!(text.contains("Visible."));
        assert!(!text.contains("var x"));
        assert!(!text.contains("p{}"));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(parse_content(""), "");
    }
}
