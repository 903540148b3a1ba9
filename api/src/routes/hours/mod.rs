//! `/api/hours`: professor review of submitted hours.

use crate::state::AppState;
use axum::{
    Router,
    routing::{post, put},
};

pub mod common;
pub mod post;
pub mod put;

pub fn hours_routes() -> Router<AppState> {
    Router::new()
        .route("/review", post(post::bulk_review))
        .route("/{request_id}/review", post(post::review_hours))
        .route("/{request_id}/notes", put(put::update_notes))
}
