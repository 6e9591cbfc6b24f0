use axum::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::VisionConfig;

use super::dto::NutritionEstimate;

const ANALYZE_PROMPT: &str = "Analyze this food image and return ONLY a valid JSON object \
(no markdown, no ```json) with the following fields:\n\
{\n\
  \"name\": \"name of the food\",\n\
  \"calories\": estimated calories,\n\
  \"protein\": grams of protein,\n\
  \"carbs\": grams of carbohydrates,\n\
  \"fat\": grams of fat,\n\
  \"confidence\": number from 0 to 1 indicating confidence in the analysis,\n\
  \"description\": \"short description of the food and estimated portion\"\n\
}\n\
If you cannot identify the food, return confidence: 0 and approximate values.";

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("vision API key is not configured. Set OPENAI_API_KEY in the environment.")]
    MissingApiKey,
    #[error("vision request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("vision service error: {0}")]
    Upstream(String),
    #[error("could not parse nutrition estimate: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait VisionClient: Send + Sync {
    /// `image` is either a fetchable URL or a data URL.
    async fn analyze(&self, image: &str) -> Result<NutritionEstimate, VisionError>;
}

/// OpenAI-style vision chat-completions client.
pub struct OpenAiVision {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiVision {
    pub fn new(http: reqwest::Client, config: &VisionConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl VisionClient for OpenAiVision {
    async fn analyze(&self, image: &str) -> Result<NutritionEstimate, VisionError> {
        let api_key = self.api_key.as_deref().ok_or(VisionError::MissingApiKey)?;

        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": ANALYZE_PROMPT },
                    { "type": "image_url", "image_url": { "url": image } },
                ],
            }],
            "max_tokens": self.max_tokens,
        });

        let res = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let payload: serde_json::Value = res.json().await?;

        if !status.is_success() {
            let message = payload
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .unwrap_or("vision service returned an error")
                .to_string();
            return Err(VisionError::Upstream(message));
        }

        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| VisionError::MalformedResponse("empty completion".into()))?;
        debug!(model = %self.model, "vision completion received");

        parse_estimate(content)
    }
}

/// The model is asked for bare JSON but still fences it now and then.
pub(crate) fn parse_estimate(content: &str) -> Result<NutritionEstimate, VisionError> {
    let cleaned = strip_code_fences(content);
    serde_json::from_str(cleaned).map_err(|e| VisionError::MalformedResponse(e.to_string()))
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    body.strip_suffix("```").unwrap_or(body).trim()
}
