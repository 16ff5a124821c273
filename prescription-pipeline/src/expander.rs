//! Expansion of raw symptom/keyword terms into a deterministic query set.

use std::collections::BTreeSet;
use tracing::debug;

use crate::ontology::MedicalOntology;
use crate::preprocess::normalize_for_search;

pub struct QueryExpander {
    ontology: MedicalOntology,
}

impl QueryExpander {
    pub fn new(ontology: MedicalOntology) -> Self {
        Self { ontology }
    }

    /// Expand base terms with ontology synonyms and related terms.
    ///
    /// Output is sorted and deduplicated so downstream search and crawling
    /// behave the same run to run.
    pub fn expand(&self, base_terms: &[String]) -> Vec<String> {
        let mut expanded: BTreeSet<String> = BTreeSet::new();
        for term in base_terms {
            let Some(cleaned) = normalize_for_search(term) else {
                continue;
            };
            for synonym in self.ontology.synonyms(&cleaned) {
                if let Some(normalized) = normalize_for_search(synonym) {
                    expanded.insert(normalized);
                }
            }
            for related in self.ontology.related_terms(&cleaned) {
                if let Some(normalized) = normalize_for_search(related) {
                    expanded.insert(normalized);
                }
            }
            expanded.insert(cleaned);
        }

        // Hand-coded domain rule: the classic diabetes symptom pair maps to a
        // fixed targeted query. Checked against the raw, pre-normalization terms.
        if base_terms.iter().any(|t| t == "frequent urination")
            && base_terms.iter().any(|t| t == "increased thirst")
        {
            expanded.insert("polydipsia polyuria causes".to_string());
        }

        debug!("Expanded {} base terms into {} queries", base_terms.len(), expanded.len());
        expanded.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::OntologyTerm;
    use std::collections::HashMap;

    fn expander_with_ontology() -> QueryExpander {
        let mut terms = HashMap::new();
        terms.insert(
            "headache".to_string(),
            OntologyTerm {
                synonyms: vec!["Cephalalgia".to_string()],
                related_terms: vec!["migraine".to_string(), "tension headache".to_string()],
                definition: String::new(),
            },
        );
        QueryExpander::new(MedicalOntology::from_terms(terms))
    }

    fn terms(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn output_is_sorted_and_deduplicated() {
        let expander = expander_with_ontology();
        let queries = expander.expand(&terms(&["fever", "Headache", "headache", "fever"]));
        let mut sorted = queries.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(queries, sorted);
    }

    #[test]
    fn includes_normalized_base_terms_and_ontology_expansions() {
        let expander = expander_with_ontology();
        let queries = expander.expand(&terms(&["Headache"]));
        assert!(queries.contains(&"headache".to_string()));
        assert!(queries.contains(&"cephalalgia".to_string()));
        assert!(queries.contains(&"migraine".to_string()));
        assert!(queries.contains(&"tension headache".to_string()));
    }

    #[test]
    fn skips_terms_that_normalize_to_nothing() {
        let expander = QueryExpander::new(MedicalOntology::default());
        let queries = expander.expand(&terms(&["", "the", "@#$", "nausea"]));
        assert_eq!(queries, vec!["nausea"]);
    }

    #[test]
    fn diabetes_symptom_pair_adds_fixed_expansion() {
        let expander = QueryExpander::new(MedicalOntology::default());
        let queries = expander.expand(&terms(&["frequent urination", "increased thirst"]));
        assert!(queries.contains(&"polydipsia polyuria causes".to_string()));
    }

    #[test]
    fn fixed_expansion_requires_both_symptoms() {
        let expander = QueryExpander::new(MedicalOntology::default());
        let queries = expander.expand(&terms(&["frequent urination"]));
        assert!(!queries.contains(&"polydipsia polyuria causes".to_string()));
    }
}
