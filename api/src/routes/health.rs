use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{Json, Router, response::IntoResponse, routing::get};

/// `GET /health`, for uptime checks and load balancers.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK", "Health check passed"))
}
