//! Rule-based extraction of structured fields from a labeled medical report.
//!
//! This is deliberately simplistic: each field is a `Label: value` line, lab
//! results are `name value` pairs in the block after `Lab Results (Recent):`.
//! Malformed input never errors; missing sections yield empty results.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::models::ParsedReport;

/// Section labels the parser recognizes; used to truncate the lab-results
/// block at the next section.
const SECTION_LABELS: [&str; 8] = [
    "patient name:",
    "date of birth:",
    "last visit:",
    "diagnosis:",
    "medications:",
    "allergies:",
    "previous symptoms:",
    "lab results",
];

static PATIENT_NAME: LazyLock<Regex> = LazyLock::new(|| label_re("Patient Name"));
static DATE_OF_BIRTH: LazyLock<Regex> = LazyLock::new(|| label_re("Date of Birth"));
static LAST_VISIT: LazyLock<Regex> = LazyLock::new(|| label_re("Last Visit"));
static DIAGNOSIS: LazyLock<Regex> = LazyLock::new(|| label_re("Diagnosis"));
static MEDICATIONS: LazyLock<Regex> = LazyLock::new(|| label_re("Medications"));
static ALLERGIES: LazyLock<Regex> = LazyLock::new(|| label_re("Allergies"));
static PREVIOUS_SYMPTOMS: LazyLock<Regex> = LazyLock::new(|| label_re("Previous Symptoms"));

static LAB_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)Lab Results\s*\(Recent\):\s*(.*)").unwrap());

// A lab entry is a name followed by a numeric value with an optional decimal
// part and an optional `%` or `mg/dL` unit.
static LAB_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z][A-Za-z0-9 ()/]*?)\s+(\d+(?:\.\d+)?%?(?:\s*mg/dL)?)").unwrap()
});

fn label_re(label: &str) -> Regex {
    Regex::new(&format!(r"(?i){}:\s*(.*)", label)).unwrap()
}

/// Parse a free-text medical report into its structured fields.
pub fn parse(report_text: &str) -> ParsedReport {
    let report = ParsedReport {
        patient_name: scalar_field(report_text, &PATIENT_NAME),
        date_of_birth: scalar_field(report_text, &DATE_OF_BIRTH),
        last_visit: scalar_field(report_text, &LAST_VISIT),
        diagnosed_conditions: list_field(report_text, &DIAGNOSIS),
        medications: list_field(report_text, &MEDICATIONS),
        allergies: list_field(report_text, &ALLERGIES),
        previous_symptoms: list_field(report_text, &PREVIOUS_SYMPTOMS),
        lab_results: lab_results(report_text),
    };
    debug!("Medical report parsed.");
    report
}

fn scalar_field(text: &str, re: &Regex) -> String {
    re.captures(text)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn list_field(text: &str, re: &Regex) -> Vec<String> {
    let Some(caps) = re.captures(text) else {
        return Vec::new();
    };
    caps[1]
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn lab_results(text: &str) -> HashMap<String, String> {
    let mut results = HashMap::new();
    let Some(caps) = LAB_SECTION.captures(text) else {
        return results;
    };
    let block = truncate_at_next_section(caps.get(1).map_or("", |m| m.as_str()));
    for caps in LAB_VALUE.captures_iter(block) {
        // Last occurrence of a name wins.
        results.insert(caps[1].trim().to_string(), caps[2].trim().to_string());
    }
    results
}

fn truncate_at_next_section(block: &str) -> &str {
    let lowered = block.to_lowercase();
    let cut = SECTION_LABELS
        .iter()
        .filter_map(|label| lowered.find(label))
        .min();
    match cut {
        Some(idx) => &block[..idx],
        None => block,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_REPORT: &str = "
    Patient Name: John Doe
    Date of Birth: 01/01/1980
    Last Visit: 01/01/2023
    Diagnosis: Hypertension, Diabetes Mellitus
    Medications: Lisinopril, Metformin
    Allergies: Penicillin
    Previous Symptoms: Headache, Fatigue
    Lab Results (Recent):
    A1C 7.5%, Fasting Glucose 140 mg/dL.
    ";

    #[test]
    fn extracts_scalar_and_list_fields() {
        let report = parse(SAMPLE_REPORT);
        assert_eq!(report.patient_name, "John Doe");
        assert_eq!(report.date_of_birth, "01/01/1980");
        assert_eq!(
            report.diagnosed_conditions,
            vec!["Hypertension", "Diabetes Mellitus"]
        );
        assert_eq!(report.allergies, vec!["Penicillin"]);
        assert_eq!(report.previous_symptoms, vec!["Headache", "Fatigue"]);
    }

    #[test]
    fn extracts_lab_results() {
        let report = parse(SAMPLE_REPORT);
        assert_eq!(report.lab_results.get("A1C").map(String::as_str), Some("7.5%"));
        assert_eq!(
            report.lab_results.get("Fasting Glucose").map(String::as_str),
            Some("140 mg/dL")
        );
    }

    #[test]
    fn missing_labels_yield_sentinels_and_empty_lists() {
        let report = parse("just some unstructured note");
        assert_eq!(report.patient_name, "N/A");
        assert_eq!(report.last_visit, "N/A");
        assert!(report.diagnosed_conditions.is_empty());
        assert!(report.medications.is_empty());
        assert!(report.lab_results.is_empty());
    }

    #[test]
    fn labels_match_case_insensitively() {
        let report = parse("DIAGNOSIS: Asthma\nallergies: Aspirin, Ibuprofen");
        assert_eq!(report.diagnosed_conditions, vec!["Asthma"]);
        assert_eq!(report.allergies, vec!["Aspirin", "Ibuprofen"]);
    }

    #[test]
    fn lab_block_stops_at_next_section() {
        let text = "
        Lab Results (Recent): Blood Pressure 150/95 mmHg, Cholesterol (LDL) 135 mg/dL.
        Previous Symptoms: dizziness
        ";
        let report = parse(text);
        assert_eq!(
            report.lab_results.get("Blood Pressure").map(String::as_str),
            Some("150")
        );
        assert_eq!(
            report.lab_results.get("Cholesterol (LDL)").map(String::as_str),
            Some("135 mg/dL")
        );
        // Nothing from the following section leaks into the lab map.
        assert!(!report.lab_results.keys().any(|k| k.contains("dizziness")));
    }

    #[test]
    fn list_items_are_trimmed_and_non_empty() {
        let report = parse("Medications: Metformin 500mg BID ,  , Lisinopril 10mg QD");
        assert_eq!(
            report.medications,
            vec!["Metformin 500mg BID", "Lisinopril 10mg QD"]
        );
    }
}
