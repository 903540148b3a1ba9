use crate::auth::AuthUser;
use crate::response::{ApiResult, Empty, ok};
use crate::state::AppState;
use axum::{
    Extension,
    extract::{Path, State},
};
use db::models::session;

/// DELETE /api/activities/{activity_id}/sessions/{session_id}
///
/// Marks the session cancelled. Attendance already recorded is kept.
pub async fn cancel_session(
    State(state): State<AppState>,
    Path((activity_id, session_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Empty> {
    state
        .sessions()
        .cancel(&user.actor(), activity_id, session_id)
        .await?;
    ok(Empty::default(), "Session cancelled")
}

/// DELETE /api/activities/{activity_id}/sessions/{session_id}/qr
pub async fn clear_qr(
    State(state): State<AppState>,
    Path((activity_id, session_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<session::Model> {
    let session = state
        .sessions()
        .clear_qr(&user.actor(), activity_id, session_id)
        .await?;
    ok(session, "QR code cleared")
}
