use serde::{Deserialize, Serialize};

/// POST /analyze { image_url } or { base64_image }.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub base64_image: Option<String>,
}

/// Structured estimate returned by the vision model. Transient: the user
/// confirms or edits it before anything is written to the diary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionEstimate {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    /// 0 to 1; 0 means the model could not identify the food.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
