use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResult, ok};
use crate::routes::common::UserResponse;
use crate::state::AppState;
use axum::{Extension, extract::State, http::StatusCode};
use db::models::{enrollment, notification, user};
use sea_orm::EntityTrait;

/// GET /api/me
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<UserResponse> {
    let user = user::Entity::find_by_id(claims.sub)
        .one(state.db())
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "User not found"))?;
    ok(user.into(), "Profile retrieved")
}

/// GET /api/me/enrollments
pub async fn list_my_enrollments(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<Vec<enrollment::Model>> {
    let enrollments = enrollment::Model::list_for_student(state.db(), claims.sub).await?;
    ok(enrollments, "Enrollments retrieved")
}

/// GET /api/me/notifications
///
/// Newest first, read and unread alike.
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<Vec<notification::Model>> {
    let notifications = notification::Model::list_for_user(state.db(), claims.sub).await?;
    ok(notifications, "Notifications retrieved")
}
