use super::common::{BulkReviewHoursBody, ReviewHoursBody};
use crate::auth::AuthUser;
use crate::response::{ApiResult, ok};
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use db::models::hours_request;
use services::batch::BatchOutcome;

/// POST /api/hours/{request_id}/review
///
/// ### Request Body
/// ```json
/// { "verdict": "approve", "approved_hours": 3.0, "notes": "Left early" }
/// { "verdict": "reject", "rejection_reason": "No evidence of attendance" }
/// ```
///
/// An approval that brings the enrollment to its hour target issues the
/// certificate in the same call.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": { "id": 9, "hours": 3.5, "approved_hours": 3.0, "status": "approved" },
///   "message": "Hours reviewed"
/// }
/// ```
///
/// - `409 Conflict` when the request was already decided
/// - `422 Unprocessable Entity` for a rejection reason under 10 characters
pub async fn review_hours(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ReviewHoursBody>,
) -> ApiResult<hours_request::Model> {
    let request = state
        .hours()
        .review(&user.actor(), request_id, body.into())
        .await?;
    ok(request, "Hours reviewed")
}

/// POST /api/hours/review
///
/// ```json
/// { "request_ids": [9, 10, 11], "verdict": "approve" }
/// ```
///
/// `approved_hours` is ignored here; each approval grants what was claimed.
/// Results come back per item, as for bulk application review.
pub async fn bulk_review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<BulkReviewHoursBody>,
) -> ApiResult<BatchOutcome> {
    let outcome = state
        .hours()
        .bulk_review(&user.actor(), &body.request_ids, body.review.into())
        .await?;
    let message = format!("{} reviewed, {} failed", outcome.success, outcome.failed);
    ok(outcome, message)
}
