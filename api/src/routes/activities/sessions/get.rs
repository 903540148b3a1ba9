use crate::response::{ApiResult, ok};
use crate::state::AppState;
use axum::extract::{Path, State};
use db::models::session;

/// GET /api/activities/{activity_id}/sessions
///
/// Ordered by date then start time. QR payloads are never included.
pub async fn list_sessions(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
) -> ApiResult<Vec<session::Model>> {
    let sessions = state.sessions().list(activity_id).await?;
    ok(sessions, "Sessions retrieved")
}
