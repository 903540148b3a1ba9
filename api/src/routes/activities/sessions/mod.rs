//! `/api/activities/{activity_id}/sessions`

use crate::auth::guards::require_reviewer;
use crate::state::AppState;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};

pub mod common;
pub mod delete;
pub mod get;
pub mod post;
pub mod put;

/// Everything except check-in is restricted to the activity's reviewers.
/// Check-in authorizes per method inside the service.
pub fn session_routes(app_state: AppState) -> Router<AppState> {
    let reviewer = || from_fn_with_state(app_state.clone(), require_reviewer);

    Router::new()
        .route("/", get(get::list_sessions))
        .route("/", post(post::create_session).route_layer(reviewer()))
        .route("/preview", post(post::preview_sessions))
        .route("/recurring", post(post::create_recurring).route_layer(reviewer()))
        .route("/{session_id}", delete(delete::cancel_session).route_layer(reviewer()))
        .route("/{session_id}/qr", post(post::issue_qr).route_layer(reviewer()))
        .route("/{session_id}/qr", delete(delete::clear_qr).route_layer(reviewer()))
        .route("/{session_id}/check-in", post(post::check_in))
        .route(
            "/{session_id}/attendance/{enrollment_id}",
            put(put::correct_attendance).route_layer(reviewer()),
        )
}
