pub mod client;
pub mod dto;
pub mod handlers;

use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(handlers::analyze_food))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // inline base64 images
}
