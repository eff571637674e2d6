use serde::{Deserialize, Serialize};

/// Body of `POST /analyze`. Missing fields deserialize as empty strings and are rejected by
/// the orchestrator's entry checks; unknown fields (e.g. `requiredSkills`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisRequest {
    pub resume_text: String,
    pub role_id: String,
    pub role_name: String,
}

/// Externally visible outcome of one analysis. Built once per request, never retained.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub match_percentage: f64,
    pub ats_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub suggestions: Vec<String>,
    pub detailed_feedback: String,
    pub model_type: &'static str,
    #[serde(rename = "isAIPowered")]
    pub is_ai_powered: bool,
}
