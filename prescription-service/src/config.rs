//! Environment-backed configuration for the service. The core pipeline never
//! reads the environment; everything it needs arrives through these values.

use std::time::Duration;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_ONTOLOGY_PATH: &str = "data/medical_ontology.json";

/// Reputable, evidence-based medical sources trusted at full score.
pub const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    "pubmed.ncbi.nlm.nih.gov",
    "clinicaltrials.gov",
    "who.int",
    "cdc.gov",
    "nih.gov",
    "mayoclinic.org",
    "nhs.uk",
    "icmr.nic.in",
    "cdsco.gov.in",
];

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub gemini_api_key: String,
    pub search_api_key: String,
    pub search_engine_id: String,
    pub search_endpoint: String,
    pub trusted_domains: Vec<String>,
    pub ontology_path: String,
    pub max_search_results: usize,
    pub results_per_query: u32,
    pub crawl_delay: Duration,
    pub port: u16,
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let gemini_api_key = require_env("GEMINI_API_KEY")?;
        let search_api_key = require_env("SEARCH_API_KEY")?;
        let search_engine_id = require_env("SEARCH_ENGINE_ID")?;

        Ok(Self {
            gemini_api_key,
            search_api_key,
            search_engine_id,
            search_endpoint: env_or("SEARCH_API_ENDPOINT", DEFAULT_SEARCH_ENDPOINT),
            trusted_domains: trusted_domains_from(std::env::var("TRUSTED_MEDICAL_DOMAINS").ok()),
            ontology_path: env_or("MEDICAL_ONTOLOGY_PATH", DEFAULT_ONTOLOGY_PATH),
            max_search_results: parse_env("MAX_SEARCH_RESULTS", 10),
            results_per_query: parse_env("RESULTS_PER_QUERY", 5),
            crawl_delay: Duration::from_secs(parse_env("CRAWL_DELAY_SECONDS", 1)),
            port: parse_env("PORT", 3000),
        })
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{name} environment variable is required"))
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

fn trusted_domains_from(raw: Option<String>) -> Vec<String> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => raw
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from)
            .collect(),
        _ => DEFAULT_TRUSTED_DOMAINS.iter().map(|d| d.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_trusted_domain_list_is_split_and_trimmed() {
        let domains = trusted_domains_from(Some("who.int, cdc.gov ,,nih.gov".to_string()));
        assert_eq!(domains, vec!["who.int", "cdc.gov", "nih.gov"]);
    }

    #[test]
    fn empty_override_falls_back_to_defaults() {
        let domains = trusted_domains_from(Some("  ".to_string()));
        assert_eq!(domains.len(), DEFAULT_TRUSTED_DOMAINS.len());
        assert!(domains.iter().any(|d| d == "mayoclinic.org"));
    }
}
