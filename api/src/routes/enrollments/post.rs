use super::common::SubmitHoursRequest;
use crate::auth::AuthUser;
use crate::response::{ApiResult, created, ok};
use crate::routes::common::today;
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use db::models::{enrollment, hours_request};

/// POST /api/enrollments/{enrollment_id}/withdraw
///
/// The student cancels their own enrollment. A confirmed seat is released.
pub async fn withdraw(
    State(state): State<AppState>,
    Path(enrollment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<enrollment::Model> {
    let enrollment = state
        .enrollments()
        .withdraw(&user.actor(), enrollment_id)
        .await?;
    ok(enrollment, "Enrollment withdrawn")
}

/// POST /api/enrollments/{enrollment_id}/hours
///
/// ### Request Body
/// ```json
/// {
///   "date": "2025-04-07",
///   "hours": 3.5,
///   "description": "Sorted the donated books",
///   "evidence_urls": ["https://photos.example.org/abc"]
/// }
/// ```
///
/// ### Responses
/// - `201 Created` with the pending request
/// - `409 Conflict` unless the enrollment is confirmed
/// - `422 Unprocessable Entity` for hours outside (0, 24], a future date, a
///   short description or a malformed evidence link
pub async fn submit_hours(
    State(state): State<AppState>,
    Path(enrollment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SubmitHoursRequest>,
) -> ApiResult<hours_request::Model> {
    let request = state
        .hours()
        .submit(&user.actor(), enrollment_id, req.into(), today())
        .await?;
    created(request, "Hours submitted")
}

/// POST /api/enrollments/{enrollment_id}/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(enrollment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<enrollment::Model> {
    let enrollment = state
        .enrollments()
        .mark_feedback_submitted(&user.actor(), enrollment_id)
        .await?;
    ok(enrollment, "Feedback recorded")
}
