use super::common::CorrectionBody;
use crate::auth::AuthUser;
use crate::response::{ApiResult, ok};
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use db::models::attendance;

/// PUT /api/activities/{activity_id}/sessions/{session_id}/attendance/{enrollment_id}
///
/// Overrides status, credited hours or notes on an existing record.
///
/// ```json
/// { "status": "excused", "hours": 1.5, "notes": "Left for a clinic appointment" }
/// ```
pub async fn correct_attendance(
    State(state): State<AppState>,
    Path((activity_id, session_id, enrollment_id)): Path<(i64, i64, i64)>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CorrectionBody>,
) -> ApiResult<attendance::Model> {
    state.sessions().get(activity_id, session_id).await?;
    let record = state
        .attendance()
        .correct(&user.actor(), session_id, enrollment_id, body.into())
        .await?;
    ok(record, "Attendance updated")
}
