//! Prompt templates for the three LLM stages, and extraction of the final
//! JSON output into a [`PrescriptionRecord`].

use serde_json::Value;
use tracing::error;

use crate::models::{MedicationEntry, PrescriptionRecord};

/// Frame the model as a researcher summarizing one retrieved text chunk.
pub fn summarize_prompt(chunk: &str) -> String {
    format!(
        r#"**Role:** You are a medical researcher.
**Task:** Summarize the key medical findings, drug interactions, and treatment protocols from the following text chunk. Focus on information relevant to patient care.

**Text Chunk:**
{chunk}

**Chunk Summary:**
"#
    )
}

/// Frame the model as a doctor producing a four-section prescription draft.
pub fn prescription_prompt(
    research_summary: &str,
    patient_history: &str,
    current_symptoms: &str,
) -> String {
    format!(
        r#"**Role:** Medical Doctor.
**Task:** Generate a concise, professional summary prescription based on provided patient details and medical literature. Focus on clear instructions, essential warnings, and follow-up.

---

**Patient Profile:**
{patient_history}
---

**Current symptoms:**
{current_symptoms}
---

**Medical Research Summary:**
{research_summary}
---

**Summary Prescription:**

**1. Assessment:** [Brief likely diagnosis/clinical impression]
**2. Prescribed Treatment:**
    * [Medication Name/Type], [Dosage/Frequency/Duration], [Key Instructions/Warnings]
    * [Lifestyle/Supportive Care Recommendations]
**3. Important Considerations:**
    * [Potential interactions/side effects, specific warnings]
    * [When to seek immediate medical attention]
**4. Follow-up:** [Next steps/monitoring]

---

**Disclaimer:** This is an AI-generated simulation for informational purposes only. It is NOT real medical advice or a valid prescription. Consult a qualified healthcare professional for any medical concern.
"#
    )
}

/// Instruct the model to reformat the free-text prescription as strict JSON.
pub fn json_reformat_prompt(summary_prescription_text: &str) -> String {
    format!(
        r#"You are a medical assistant. Convert the following AI-generated prescription summary into a clean JSON object.

### Prescription Summary:
{summary_prescription_text}

### Desired JSON Format:
{{
  "assessment": "Brief likely diagnosis/clinical impression",
  "treatment": [
    {{
      "medication": "Medication Name/Type",
      "dosage": "Dosage/Frequency/Duration",
      "instructions": "Key instructions and warnings"
    }},
    {{
      "lifestyle": "Lifestyle or supportive care recommendations"
    }}
  ],
  "considerations": [
    "Potential interactions or side effects",
    "When to seek immediate medical attention"
  ],
  "follow_up": "Next steps or monitoring plan"
}}

Only return a **valid JSON object** with no extra commentary or explanation.
"#
    )
}

/// Parse the model's JSON output into a prescription record.
///
/// Tolerates a surrounding ```json code fence. Missing keys default to
/// empty; `treatment` entries split into medication entries and the first
/// lifestyle recommendation.
pub fn parse_prescription(model_output: &str) -> Result<PrescriptionRecord, serde_json::Error> {
    let cleaned = strip_code_fence(model_output);
    let data: Value = serde_json::from_str(cleaned)?;

    let mut medications = Vec::new();
    let mut lifestyle = None;
    if let Some(treatment) = data.get("treatment").and_then(Value::as_array) {
        for entry in treatment {
            if entry.get("medication").is_some() {
                medications.push(MedicationEntry {
                    medication: string_field(entry, "medication"),
                    dosage: string_field(entry, "dosage"),
                    instructions: string_field(entry, "instructions"),
                });
            } else if let Some(recommendation) = entry.get("lifestyle").and_then(Value::as_str) {
                if lifestyle.is_none() {
                    lifestyle = Some(recommendation.to_string());
                }
            }
        }
    }

    let considerations = data
        .get("considerations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(PrescriptionRecord {
        assessment: string_field(&data, "assessment"),
        medications,
        lifestyle,
        considerations,
        follow_up: string_field(&data, "follow_up"),
    })
}

/// Like [`parse_prescription`], but never fails: malformed JSON logs the
/// decode error and yields an empty record.
pub fn extract_prescription(model_output: &str) -> PrescriptionRecord {
    match parse_prescription(model_output) {
        Ok(record) => record,
        Err(e) => {
            error!("JSON decode error while extracting prescription: {}", e);
            PrescriptionRecord::default()
        }
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix("```json").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_embed_their_inputs() {
        let summarize = summarize_prompt("chunk text here");
        assert!(summarize.contains("chunk text here"));
        assert!(summarize.contains("medical researcher"));

        let prescription = prescription_prompt("digest", "history", "fever, cough");
        assert!(prescription.contains("digest"));
        assert!(prescription.contains("history"));
        assert!(prescription.contains("fever, cough"));
        assert!(prescription.contains("**Disclaimer:**"));

        let reformat = json_reformat_prompt("free text");
        assert!(reformat.contains("free text"));
        assert!(reformat.contains("valid JSON object"));
    }

    #[test]
    fn parses_full_prescription_payload() {
        let output = r#"{"assessment":"A","treatment":[{"medication":"X","dosage":"Y","instructions":"Z"},{"lifestyle":"L"}],"considerations":["C1"],"follow_up":"F"}"#;
        let record = extract_prescription(output);
        assert_eq!(record.assessment, "A");
        assert_eq!(
            record.medications,
            vec![MedicationEntry {
                medication: "X".to_string(),
                dosage: "Y".to_string(),
                instructions: "Z".to_string(),
            }]
        );
        assert_eq!(record.lifestyle.as_deref(), Some("L"));
        assert_eq!(record.considerations, vec!["C1"]);
        assert_eq!(record.follow_up, "F");
    }

    #[test]
    fn tolerates_a_surrounding_code_fence() {
        let output = "```json\n{\"assessment\": \"Fenced\", \"treatment\": [], \"considerations\": [], \"follow_up\": \"\"}\n```";
        let record = extract_prescription(output);
        assert_eq!(record.assessment, "Fenced");
    }

    #[test]
    fn malformed_json_yields_an_empty_record() {
        let record = extract_prescription("I'm sorry, I cannot produce JSON.");
        assert_eq!(record, PrescriptionRecord::default());
        assert!(record.assessment.is_empty());
        assert!(record.medications.is_empty());
        assert!(record.lifestyle.is_none());
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let record = extract_prescription("{}");
        assert_eq!(record.assessment, "");
        assert!(record.medications.is_empty());
        assert!(record.considerations.is_empty());
        assert_eq!(record.follow_up, "");
    }

    #[test]
    fn first_lifestyle_entry_wins() {
        let output = r#"{"treatment":[{"lifestyle":"first"},{"lifestyle":"second"}]}"#;
        let record = extract_prescription(output);
        assert_eq!(record.lifestyle.as_deref(), Some("first"));
    }

    #[test]
    fn incomplete_medication_entries_default_missing_fields() {
        let output = r#"{"treatment":[{"medication":"Aspirin"}]}"#;
        let record = extract_prescription(output);
        assert_eq!(record.medications[0].medication, "Aspirin");
        assert_eq!(record.medications[0].dosage, "");
        assert_eq!(record.medications[0].instructions, "");
    }
}
