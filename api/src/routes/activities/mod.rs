//! `/api/activities`: activities plus the sessions and enrollments under them.

use crate::auth::guards::{allow_staff, require_reviewer};
use crate::state::AppState;
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};

pub mod common;
pub mod delete;
pub mod enrollments;
pub mod get;
pub mod post;
pub mod put;
pub mod sessions;

pub fn activities_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get::list_activities))
        .route("/", post(post::create_activity).route_layer(from_fn(allow_staff)))
        .route("/{activity_id}", get(get::get_activity))
        .route(
            "/{activity_id}",
            put(put::update_activity)
                .route_layer(from_fn_with_state(app_state.clone(), require_reviewer)),
        )
        .route(
            "/{activity_id}",
            delete(delete::delete_activity)
                .route_layer(from_fn_with_state(app_state.clone(), require_reviewer)),
        )
        .route(
            "/{activity_id}/status",
            put(put::set_activity_status)
                .route_layer(from_fn_with_state(app_state.clone(), require_reviewer)),
        )
        .nest(
            "/{activity_id}/sessions",
            sessions::session_routes(app_state.clone()),
        )
        .nest(
            "/{activity_id}/enrollments",
            enrollments::enrollment_routes(app_state),
        )
}
