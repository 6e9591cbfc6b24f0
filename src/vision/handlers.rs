use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, instrument, warn};

use crate::state::AppState;

use super::client::VisionError;
use super::dto::{AnalyzeRequest, NutritionEstimate};

/// POST /analyze — forward an image to the vision service and return the
/// structured estimate. Nothing is persisted here; the client confirms the
/// estimate and then commits it through the diary routes.
#[instrument(skip(state, body))]
pub async fn analyze_food(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<NutritionEstimate>, (StatusCode, String)> {
    let image = match (body.base64_image, body.image_url) {
        (Some(b64), _) if !b64.trim().is_empty() => {
            format!("data:image/jpeg;base64,{}", b64.trim())
        }
        (_, Some(url)) if !url.trim().is_empty() => url,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                "image_url or base64_image is required".into(),
            ))
        }
    };

    let estimate = state.vision.analyze(&image).await.map_err(vision_error)?;
    if estimate.confidence == 0.0 {
        warn!(name = %estimate.name, "vision model could not identify the food");
    }
    Ok(Json(estimate))
}

fn vision_error(e: VisionError) -> (StatusCode, String) {
    let status = match e {
        VisionError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
        VisionError::Http(_) | VisionError::Upstream(_) | VisionError::MalformedResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    error!(error = %e, "food analysis failed");
    (status, e.to_string())
}
