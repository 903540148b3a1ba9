use super::common::ListQuery;
use crate::auth::AuthUser;
use crate::response::{ApiResult, ok};
use crate::state::AppState;
use axum::{
    Extension,
    extract::{Path, Query, State},
};
use db::models::enrollment;

/// GET /api/activities/{activity_id}/enrollments?status=pending
pub async fn list_enrollments(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<enrollment::Model>> {
    let enrollments = state
        .enrollments()
        .list(&user.actor(), activity_id, query.status)
        .await?;
    ok(enrollments, "Enrollments retrieved")
}
