use super::common::{ActivityResponse, SetStatusRequest, UpdateActivityRequest};
use crate::auth::AuthUser;
use crate::response::{ApiResult, ok};
use crate::routes::common::today;
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use validator::Validate;

/// PUT /api/activities/{activity_id}
///
/// Partial update; omitted fields keep their value. Owner or admin only.
///
/// ### Request Body
/// ```json
/// {
///   "location": "Garden plot C",
///   "max_participants": 8,
///   "required_hours": 6.0
/// }
/// ```
///
/// Capacity is checked against the confirmed count in the same statement that
/// writes it, so it can never end up below the seats already taken.
///
/// ### Responses
///
/// - `200 OK` with the updated activity
/// - `403 Forbidden` (not the owner)
/// - `422 Unprocessable Entity`
/// ```json
/// {
///   "success": false,
///   "data": {},
///   "message": "max_participants cannot drop below the confirmed participants"
/// }
/// ```
pub async fn update_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateActivityRequest>,
) -> ApiResult<ActivityResponse> {
    req.validate()?;
    let activity = state
        .activities()
        .update(&user.actor(), activity_id, req.into())
        .await?;
    ok(ActivityResponse::new(activity, today()), "Activity updated")
}

/// PUT /api/activities/{activity_id}/status
///
/// ```json
/// { "status": "cancelled" }
/// ```
///
/// `cancelled` and `completed` are final; moving out of either answers `409`.
pub async fn set_activity_status(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<ActivityResponse> {
    let activity = state
        .activities()
        .set_status(&user.actor(), activity_id, req.status)
        .await?;
    ok(ActivityResponse::new(activity, today()), "Activity status updated")
}
