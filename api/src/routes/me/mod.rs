//! `/api/me`: the caller's own profile, enrollments and notifications.

use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};

pub mod get;
pub mod put;

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get::get_profile))
        .route("/enrollments", get(get::list_my_enrollments))
        .route("/notifications", get(get::list_notifications))
        .route(
            "/notifications/{notification_id}/read",
            put(put::mark_notification_read),
        )
}
