use super::common::ActivityResponse;
use crate::response::{ApiResult, ok};
use crate::routes::common::today;
use crate::state::AppState;
use axum::extract::{Path, State};

/// GET /api/activities
///
/// Every non-deleted activity, newest first.
pub async fn list_activities(State(state): State<AppState>) -> ApiResult<Vec<ActivityResponse>> {
    let today = today();
    let activities = state
        .activities()
        .list()
        .await?
        .into_iter()
        .map(|a| ActivityResponse::new(a, today))
        .collect();
    ok(activities, "Activities retrieved")
}

/// GET /api/activities/{activity_id}
pub async fn get_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
) -> ApiResult<ActivityResponse> {
    let activity = state.activities().get(activity_id).await?;
    ok(ActivityResponse::new(activity, today()), "Activity retrieved")
}
