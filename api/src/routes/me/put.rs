use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResult, Empty, ok};
use crate::state::AppState;
use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use db::models::notification;

/// PUT /api/me/notifications/{notification_id}/read
///
/// Someone else's notification answers `404`, the same as a missing one.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<Empty> {
    if !notification::Model::mark_read(state.db(), notification_id, claims.sub).await? {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Notification {notification_id} not found"),
        ));
    }
    ok(Empty::default(), "Notification marked as read")
}
