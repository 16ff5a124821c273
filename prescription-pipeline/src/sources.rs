//! Heuristic credibility scoring of search-result sources by domain.

use std::collections::HashSet;
use tracing::info;

pub struct SourceEvaluator {
    trusted_domains: HashSet<String>,
}

impl SourceEvaluator {
    pub fn new(trusted_domains: impl IntoIterator<Item = String>) -> Self {
        let trusted_domains: HashSet<String> = trusted_domains
            .into_iter()
            .map(|d| d.to_lowercase())
            .collect();
        info!(
            "Initialized SourceEvaluator with {} trusted domains.",
            trusted_domains.len()
        );
        Self { trusted_domains }
    }

    /// Score a URL's credibility: 1.0 for whitelisted domains, 0.8 for
    /// general reputable suffixes, 0.5 for commercial ones, 0.0 otherwise.
    /// Empty or unparseable URLs score 0.0; this never errors.
    pub fn evaluate_url(&self, url: &str) -> f64 {
        let Some(domain) = host_of(url) else {
            return 0.0;
        };
        if self.trusted_domains.contains(&domain) {
            1.0
        } else if domain.ends_with(".gov") || domain.ends_with(".edu") || domain.ends_with(".org") {
            0.8
        } else if domain.ends_with(".com") || domain.ends_with(".net") {
            0.5
        } else {
            0.0
        }
    }

    /// Content-based credibility is not implemented; every text scores 1.0.
    /// A real implementation would look for citations and evidence-based
    /// language. Known gap, kept visible on purpose.
    pub fn evaluate_content(&self, _content_text: &str) -> f64 {
        1.0
    }
}

/// Extract the host of a URL, lowercased, without `www.`, userinfo, or port.
/// Returns `None` when the input has no scheme or no host.
pub(crate) fn host_of(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host);
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}
