use super::common::NotesBody;
use crate::auth::AuthUser;
use crate::response::{ApiResult, ok};
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use db::models::hours_request;

/// PUT /api/hours/{request_id}/notes
///
/// ```json
/// { "notes": "Confirmed with the site coordinator" }
/// ```
///
/// Allowed before or after the decision; `null` clears the notes.
pub async fn update_notes(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NotesBody>,
) -> ApiResult<hours_request::Model> {
    let request = state
        .hours()
        .update_notes(&user.actor(), request_id, body.notes)
        .await?;
    ok(request, "Notes updated")
}
