//! `/api/activities/{activity_id}/enrollments`

use crate::auth::guards::require_reviewer;
use crate::state::AppState;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

pub mod common;
pub mod get;
pub mod post;

pub fn enrollment_routes(app_state: AppState) -> Router<AppState> {
    let reviewer = || from_fn_with_state(app_state.clone(), require_reviewer);

    Router::new()
        .route("/", post(post::apply))
        .route("/", get(get::list_enrollments).route_layer(reviewer()))
        .route("/review", post(post::bulk_review).route_layer(reviewer()))
        .route(
            "/{enrollment_id}/review",
            post(post::review_application).route_layer(reviewer()),
        )
        .route(
            "/{enrollment_id}/promote",
            post(post::promote).route_layer(reviewer()),
        )
        .route(
            "/{enrollment_id}/remove",
            post(post::remove_participant).route_layer(reviewer()),
        )
}
