use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratePrescriptionRequest {
    pub medical_report_text: String,
    #[serde(default)]
    pub current_symptoms: Vec<String>,
}
