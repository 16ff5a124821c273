//! Static medical-term ontology backing query expansion.
//!
//! Loaded once at startup from a JSON file of the shape
//! `{"terms": {"<term>": {"synonyms": [..], "related_terms": [..], "definition": ".."}}}`.
//! A missing or unreadable file is not fatal; the pipeline just runs with an
//! empty index.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OntologyTerm {
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub related_terms: Vec<String>,
    #[serde(default)]
    pub definition: String,
}

#[derive(Debug, Default, Deserialize)]
struct OntologyFile {
    #[serde(default)]
    terms: HashMap<String, OntologyTerm>,
}

#[derive(Debug, Default)]
pub struct MedicalOntology {
    terms: HashMap<String, OntologyTerm>,
}

impl MedicalOntology {
    /// Load the ontology from disk. Absent or invalid files yield an empty
    /// index rather than an error.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Ontology file not found at {}: {}. Using empty ontology.", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str::<OntologyFile>(&raw) {
            Ok(file) => {
                info!("Loaded medical ontology from {} ({} terms)", path.display(), file.terms.len());
                Self { terms: file.terms }
            }
            Err(e) => {
                warn!("Invalid JSON in ontology file {}: {}. Using empty ontology.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Build an ontology directly from a term map.
    pub fn from_terms(terms: HashMap<String, OntologyTerm>) -> Self {
        Self { terms }
    }

    pub fn synonyms(&self, term: &str) -> &[String] {
        self.terms
            .get(&term.to_lowercase())
            .map(|t| t.synonyms.as_slice())
            .unwrap_or(&[])
    }

    pub fn related_terms(&self, term: &str) -> &[String] {
        self.terms
            .get(&term.to_lowercase())
            .map(|t| t.related_terms.as_slice())
            .unwrap_or(&[])
    }

    pub fn definition(&self, term: &str) -> &str {
        self.terms
            .get(&term.to_lowercase())
            .map(|t| t.definition.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MedicalOntology {
        let mut terms = HashMap::new();
        terms.insert(
            "headache".to_string(),
            OntologyTerm {
                synonyms: vec!["cephalalgia".to_string()],
                related_terms: vec!["migraine".to_string()],
                definition: "Pain in the head.".to_string(),
            },
        );
        MedicalOntology::from_terms(terms)
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let ontology = sample();
        assert_eq!(ontology.synonyms("Headache"), ["cephalalgia"]);
        assert_eq!(ontology.related_terms("HEADACHE"), ["migraine"]);
        assert_eq!(ontology.definition("headache"), "Pain in the head.");
    }

    #[test]
    fn unknown_terms_yield_empty_results() {
        let ontology = sample();
        assert!(ontology.synonyms("fever").is_empty());
        assert!(ontology.related_terms("fever").is_empty());
        assert_eq!(ontology.definition("fever"), "");
    }

    #[test]
    fn missing_file_yields_empty_index() {
        let ontology = MedicalOntology::load("does/not/exist.json");
        assert!(ontology.synonyms("headache").is_empty());
    }

    #[test]
    fn parses_ontology_json() {
        let raw = r#"{"terms": {"fever": {"synonyms": ["pyrexia"], "related_terms": ["infection"], "definition": "Elevated body temperature."}}}"#;
        let file: OntologyFile = serde_json::from_str(raw).unwrap();
        let ontology = MedicalOntology::from_terms(file.terms);
        assert_eq!(ontology.synonyms("fever"), ["pyrexia"]);
    }
}
