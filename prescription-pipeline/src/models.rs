use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Structured view of a free-text medical report.
///
/// Scalar fields fall back to `"N/A"` when the label is absent; list fields
/// fall back to empty. Built once per case and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub patient_name: String,
    pub date_of_birth: String,
    pub last_visit: String,
    pub diagnosed_conditions: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
    pub previous_symptoms: Vec<String>,
    pub lab_results: HashMap<String, String>,
}

/// One search hit that passed the credibility filter.
///
/// `content` stays `None` until the crawl step populates it; results whose
/// crawl fails are dropped rather than returned empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub credibility_score: f64,
    pub query_matched: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicationEntry {
    pub medication: String,
    pub dosage: String,
    pub instructions: String,
}

/// Terminal artifact of the pipeline: the structured prescription draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    pub assessment: String,
    pub medications: Vec<MedicationEntry>,
    pub lifestyle: Option<String>,
    pub considerations: Vec<String>,
    pub follow_up: String,
}

/// Pipeline stage a degraded-mode diagnostic is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Search,
    Crawl,
    Store,
    Summarize,
    Extract,
}

/// Structured record of a sub-stage that degraded instead of aborting the case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(stage: Stage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: detail.into(),
        }
    }
}

/// A source that contributed content to the research digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub url: String,
    pub title: String,
    pub credibility_score: f64,
}

/// Everything a processed case returns to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub case_id: String,
    pub prescription: PrescriptionRecord,
    pub sources: Vec<SourceRef>,
    pub diagnostics: Vec<Diagnostic>,
}
