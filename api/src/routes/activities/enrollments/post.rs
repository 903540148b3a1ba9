use super::common::{ApplyRequest, BulkReviewBody, RemoveBody, ReviewBody, enrollment_in};
use crate::auth::AuthUser;
use crate::response::{ApiResult, created, ok};
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use db::models::enrollment;
use services::batch::BatchOutcome;
use validator::Validate;

/// POST /api/activities/{activity_id}/enrollments
///
/// Students only. With auto-accept on, the result is already `confirmed`
/// (or `waitlisted` when the activity is full).
///
/// ### Request Body
/// ```json
/// {
///   "motivation": "I volunteer at a community garden at home",
///   "availability": "Tuesday afternoons",
///   "experience": "Two seasons of vegetable growing"
/// }
/// ```
///
/// ### Responses
///
/// - `201 Created`
/// ```json
/// {
///   "success": true,
///   "data": { "id": 15, "activity_id": 7, "student_id": 22, "status": "pending" },
///   "message": "Application submitted"
/// }
/// ```
///
/// - `403 Forbidden` for non-students
/// - `409 Conflict` when the student already holds a live enrollment here
/// - `422 Unprocessable Entity` for an empty motivation or a closed activity
pub async fn apply(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ApplyRequest>,
) -> ApiResult<enrollment::Model> {
    req.validate()?;
    let enrollment = state
        .enrollments()
        .apply(&user.actor(), activity_id, req.into())
        .await?;
    created(enrollment, "Application submitted")
}

/// POST /api/activities/{activity_id}/enrollments/{enrollment_id}/review
///
/// ### Request Body
/// ```json
/// { "decision": "accept", "message": "See you on Tuesday" }
/// { "decision": "reject", "reason": "custom", "reason_text": "Places are reserved for first years" }
/// ```
///
/// `reason` is one of `activity_full`, `schedule_conflict`,
/// `insufficient_experience`, `requirements_not_met` or `custom`.
///
/// ### Responses
/// - `200 OK` with the updated enrollment
/// - `409 Conflict` when the application is no longer pending or no seat is left
/// ```json
/// {
///   "success": false,
///   "data": {},
///   "message": "Someone else just filled the last spot"
/// }
/// ```
/// - `422 Unprocessable Entity` for a rejection without a reason
pub async fn review_application(
    State(state): State<AppState>,
    Path((activity_id, enrollment_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ReviewBody>,
) -> ApiResult<enrollment::Model> {
    let actor = user.actor();
    let review = body.into_review()?;
    enrollment_in(&state, &actor, activity_id, enrollment_id).await?;
    let enrollment = state
        .enrollments()
        .review_application(&actor, enrollment_id, review)
        .await?;
    ok(enrollment, "Application reviewed")
}

/// POST /api/activities/{activity_id}/enrollments/review
///
/// Applies one decision to many applications. Always `200`; per-item results
/// are in `items`.
///
/// ### Request Body
/// ```json
/// { "enrollment_ids": [15, 16, 17], "decision": "accept" }
/// ```
///
/// ### Response
/// ```json
/// {
///   "success": true,
///   "data": {
///     "success": 2,
///     "failed": 1,
///     "items": [
///       { "id": 15, "outcome": "ok" },
///       { "id": 16, "outcome": "ok" },
///       { "id": 17, "outcome": "capacity_exceeded" }
///     ]
///   },
///   "message": "2 reviewed, 1 failed"
/// }
/// ```
pub async fn bulk_review(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<BulkReviewBody>,
) -> ApiResult<BatchOutcome> {
    let review = body.review.into_review()?;
    let outcome = state
        .enrollments()
        .bulk_review(&user.actor(), activity_id, &body.enrollment_ids, review)
        .await?;
    let message = format!("{} reviewed, {} failed", outcome.success, outcome.failed);
    ok(outcome, message)
}

/// POST /api/activities/{activity_id}/enrollments/{enrollment_id}/promote
pub async fn promote(
    State(state): State<AppState>,
    Path((activity_id, enrollment_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<enrollment::Model> {
    let actor = user.actor();
    enrollment_in(&state, &actor, activity_id, enrollment_id).await?;
    let enrollment = state.enrollments().promote(&actor, enrollment_id).await?;
    ok(enrollment, "Promoted from waitlist")
}

/// POST /api/activities/{activity_id}/enrollments/{enrollment_id}/remove
///
/// Cancels a confirmed or waitlisted participant and frees their seat.
///
/// ```json
/// { "reason": "Missed three sessions without notice" }
/// ```
pub async fn remove_participant(
    State(state): State<AppState>,
    Path((activity_id, enrollment_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<RemoveBody>,
) -> ApiResult<enrollment::Model> {
    let actor = user.actor();
    enrollment_in(&state, &actor, activity_id, enrollment_id).await?;
    let enrollment = state
        .enrollments()
        .remove(&actor, enrollment_id, body.reason)
        .await?;
    ok(enrollment, "Participant removed")
}
