//! `/api/enrollments/{enrollment_id}`: one enrollment seen from the student side.
//!
//! Read endpoints are open to the student and to the activity's reviewers;
//! each service call checks which of the two the caller is.

use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub mod common;
pub mod get;
pub mod post;

pub fn enrollments_routes() -> Router<AppState> {
    Router::new()
        .route("/{enrollment_id}", get(get::get_enrollment))
        .route("/{enrollment_id}/withdraw", post(post::withdraw))
        .route("/{enrollment_id}/attendance", get(get::get_attendance))
        .route("/{enrollment_id}/hours", get(get::list_hours))
        .route("/{enrollment_id}/hours", post(post::submit_hours))
        .route("/{enrollment_id}/certificate", get(get::get_certificate))
        .route("/{enrollment_id}/feedback", post(post::submit_feedback))
}
