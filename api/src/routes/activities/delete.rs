use crate::auth::AuthUser;
use crate::response::{ApiResult, Empty, ok};
use crate::state::AppState;
use axum::{
    Extension,
    extract::{Path, State},
};

/// DELETE /api/activities/{activity_id}
///
/// Soft delete: the row stays for history but disappears from every listing.
pub async fn delete_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Empty> {
    state.activities().delete(&user.actor(), activity_id).await?;
    ok(Empty::default(), "Activity deleted")
}
