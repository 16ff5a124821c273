//! End-to-end case processing: parse the report, expand queries, retrieve and
//! rank sources, summarize them into a research digest, and turn the digest
//! into a structured prescription draft.

use futures_util::StreamExt;
use futures_util::stream;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::expander::QueryExpander;
use crate::llm::Generate;
use crate::models::{CaseOutcome, Diagnostic, SourceRef, Stage};
use crate::preprocess::extract_keywords;
use crate::prompts;
use crate::report;
use crate::search::SearchEngine;
use crate::sources::host_of;
use crate::storage::{ArticleStore, StoredArticle};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Result-count bound passed to the search API per query.
    pub results_per_query: u32,
    /// Concurrency limit for the summarization fan-out.
    pub summarize_concurrency: usize,
    /// Overall deadline for one case.
    pub case_deadline: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            results_per_query: 5,
            summarize_concurrency: 4,
            case_deadline: Duration::from_secs(120),
        }
    }
}

pub struct Orchestrator {
    expander: QueryExpander,
    search: SearchEngine,
    llm: Arc<dyn Generate>,
    article_store: Option<Arc<dyn ArticleStore>>,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(
        expander: QueryExpander,
        search: SearchEngine,
        llm: Arc<dyn Generate>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            expander,
            search,
            llm,
            article_store: None,
            config,
        }
    }

    /// Persist every successfully crawled result into the given store.
    pub fn with_article_store(mut self, store: Arc<dyn ArticleStore>) -> Self {
        self.article_store = Some(store);
        self
    }

    /// Process one patient case under the configured deadline.
    pub async fn process_case(
        &self,
        medical_report_text: &str,
        current_symptoms: &[String],
    ) -> Result<CaseOutcome> {
        match timeout(
            self.config.case_deadline,
            self.run_case(medical_report_text, current_symptoms),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(PipelineError::DeadlineExceeded),
        }
    }

    async fn run_case(
        &self,
        medical_report_text: &str,
        current_symptoms: &[String],
    ) -> Result<CaseOutcome> {
        let case_id = Uuid::new_v4().to_string();
        info!("Starting patient case processing ({})", case_id);

        // 1. Structured view of the report.
        let parsed_report = report::parse(medical_report_text);

        // 2. Base terms: current symptoms, diagnosed conditions, and keywords
        // drawn from the previously reported symptoms.
        let mut base_terms: Vec<String> = current_symptoms.to_vec();
        base_terms.extend(parsed_report.diagnosed_conditions.iter().cloned());
        for symptom in &parsed_report.previous_symptoms {
            base_terms.extend(extract_keywords(symptom));
        }

        // 3. Deterministic query set.
        let queries = self.expander.expand(&base_terms);
        info!("Expanded search queries: {:?}", queries);

        // 4. Retrieval: ranked, content-bearing results.
        let search_outcome = self
            .search
            .search(&queries, self.config.results_per_query)
            .await;
        let mut diagnostics = search_outcome.diagnostics;
        let results = search_outcome.results;
        info!("Retrieved {} search results.", results.len());

        // 5. Optionally persist what was crawled.
        if let Some(store) = &self.article_store {
            for result in &results {
                let article = StoredArticle {
                    url: result.url.clone(),
                    title: result.title.clone(),
                    content: result.content.clone().unwrap_or_default(),
                    source: host_of(&result.url).unwrap_or_default(),
                    fetched_at: chrono::Utc::now().to_rfc3339(),
                    credibility_score: result.credibility_score,
                };
                if let Err(e) = store.insert_article(article).await {
                    warn!("Failed to store article {}: {}", result.url, e);
                    diagnostics.push(Diagnostic::new(
                        Stage::Store,
                        format!("could not store {}: {}", result.url, e),
                    ));
                }
            }
        }

        // 6. Summarize each result into the research digest. Bounded
        // concurrency; `buffered` yields outputs in input order, so the
        // digest follows the credibility ranking.
        let chunks: Vec<(String, String)> = results
            .iter()
            .map(|r| (r.url.clone(), r.content.clone().unwrap_or_default()))
            .collect();
        let summaries: Vec<(String, std::result::Result<String, crate::llm::LlmError>)> =
            stream::iter(chunks)
                .map(|(url, content)| {
                    let llm = Arc::clone(&self.llm);
                    async move {
                        let prompt = prompts::summarize_prompt(&content);
                        (url, llm.predict(&prompt).await)
                    }
                })
                .buffered(self.config.summarize_concurrency.max(1))
                .collect()
                .await;

        let mut digest_parts: Vec<String> = Vec::new();
        for (url, summary) in summaries {
            match summary {
                Ok(summary) => digest_parts.push(summary),
                Err(e) => {
                    // The failed chunk is skipped entirely; its error text
                    // must never read as research content downstream.
                    warn!("Summarization failed for {}: {}", url, e);
                    diagnostics.push(Diagnostic::new(
                        Stage::Summarize,
                        format!("summary for {} failed: {}", url, e),
                    ));
                }
            }
        }
        let research_digest = digest_parts.join("\n\n");

        // 7. Free-text prescription draft.
        let symptoms_joined = current_symptoms.join(", ");
        let prescription_text = self
            .llm
            .predict(&prompts::prescription_prompt(
                &research_digest,
                medical_report_text,
                &symptoms_joined,
            ))
            .await
            .map_err(PipelineError::Prescription)?;

        // 8. Reformat as JSON.
        let json_text = self
            .llm
            .predict(&prompts::json_reformat_prompt(&prescription_text))
            .await
            .map_err(PipelineError::Reformat)?;

        // 9. Extract the structured record; invalid JSON degrades to an
        // empty record with a diagnostic.
        let prescription = match prompts::parse_prescription(&json_text) {
            Ok(record) => record,
            Err(e) => {
                error!("JSON decode error while extracting prescription: {}", e);
                diagnostics.push(Diagnostic::new(
                    Stage::Extract,
                    format!("invalid prescription JSON: {}", e),
                ));
                Default::default()
            }
        };

        let sources = results
            .iter()
            .map(|r| SourceRef {
                url: r.url.clone(),
                title: r.title.clone(),
                credibility_score: r.credibility_score,
            })
            .collect();

        info!("Patient case processing completed ({})", case_id);
        Ok(CaseOutcome {
            case_id,
            prescription,
            sources,
            diagnostics,
        })
    }
}
