pub mod client;
pub mod dto;
pub mod handlers;

use crate::state::AppState;
use axum::routing::post;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().route("/payments", post(handlers::create_payment))
}
