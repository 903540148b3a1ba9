use super::common::{CheckInBody, CreateSessionRequest, RecurringRequest};
use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResult, created, ok};
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use db::models::{attendance, enrollment, session};
use services::session::{QrCode, RecurringOutcome};
use services::session_generator::Expansion;

/// POST /api/activities/{activity_id}/sessions
///
/// ### Request Body
/// ```json
/// {
///   "date": "2025-08-05",
///   "start_time": "09:00",
///   "end_time": "11:30",
///   "location": "Garden plot B",
///   "max_participants": null
/// }
/// ```
///
/// ### Responses
/// - `201 Created` with the session
/// - `409 Conflict` when a session already starts at that date and time
/// - `422 Unprocessable Entity` when the end time is not after the start time
pub async fn create_session(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<session::Model> {
    let input = req.into_input()?;
    let session = state
        .sessions()
        .create_single(&user.actor(), activity_id, input)
        .await?;
    created(session, "Session created")
}

/// POST /api/activities/{activity_id}/sessions/preview
///
/// Expands the recurrence without saving anything.
pub async fn preview_sessions(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
    Json(req): Json<RecurringRequest>,
) -> ApiResult<Expansion> {
    let pattern = req.into_pattern()?;
    let expansion = state.sessions().preview(activity_id, &pattern).await?;
    let message = format!("{} sessions would be created", expansion.sessions.len());
    ok(expansion, message)
}

/// POST /api/activities/{activity_id}/sessions/recurring
///
/// ### Request Body
/// ```json
/// {
///   "start_date": "2025-08-04",
///   "end_date": "2025-09-26",
///   "start_time": "14:00",
///   "end_time": "16:00",
///   "frequency": "custom",
///   "days": ["tue", "thu"],
///   "location": "Library Hall B"
/// }
/// ```
///
/// `frequency` is `weekly`, `biweekly` or `custom`; `days` is only read for
/// `custom`. Weekly patterns repeat on the weekday of `start_date`.
///
/// ### Responses
///
/// - `201 Created`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "sessions": [
///       { "id": 41, "date": "2025-08-05", "start_time": "14:00:00", "end_time": "16:00:00", "status": "scheduled" }
///     ],
///     "truncated": false
///   },
///   "message": "16 sessions created"
/// }
/// ```
///
/// - `409 Conflict` when any slot collides; nothing is saved
/// - `422 Unprocessable Entity` for an inverted range or times
pub async fn create_recurring(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<RecurringRequest>,
) -> ApiResult<RecurringOutcome> {
    let pattern = req.into_pattern()?;
    let outcome = state
        .sessions()
        .create_recurring(&user.actor(), activity_id, &pattern)
        .await?;
    let message = format!("{} sessions created", outcome.sessions.len());
    created(outcome, message)
}

/// POST /api/activities/{activity_id}/sessions/{session_id}/qr
///
/// Replaces any previous code for the session.
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "session_id": 41,
///     "code": "9f2c...e81a",
///     "expires_at": "2025-08-05T14:15:00Z"
///   },
///   "message": "QR code issued"
/// }
/// ```
pub async fn issue_qr(
    State(state): State<AppState>,
    Path((activity_id, session_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<QrCode> {
    let qr = state
        .sessions()
        .issue_qr(&user.actor(), activity_id, session_id)
        .await?;
    ok(qr, "QR code issued")
}

/// POST /api/activities/{activity_id}/sessions/{session_id}/check-in
///
/// Students check in with the scanned code; `enrollment_id` may be left out
/// and their live enrollment in the activity is used. Reviewers record manual
/// check-ins and must name the enrollment.
///
/// ### Request Body
/// ```json
/// {
///   "method": "qr",
///   "code": "9f2c...e81a",
///   "latitude": -25.7545,
///   "longitude": 28.2314,
///   "accuracy": 12.0
/// }
/// ```
///
/// ### Responses
/// - `201 Created` with the attendance record, `hours_credited` set to the
///   session length
/// - `400 Bad Request` for a wrong or expired code
/// - `409 Conflict` when the enrollment already checked in, or is not confirmed
/// - `422 Unprocessable Entity` for a cancelled session
pub async fn check_in(
    State(state): State<AppState>,
    Path((activity_id, session_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CheckInBody>,
) -> ApiResult<attendance::Model> {
    let actor = user.actor();
    state.sessions().get(activity_id, session_id).await?;

    let enrollment_id = match body.enrollment_id {
        Some(id) => id,
        None => {
            enrollment::Model::find_live(state.db(), actor.id, activity_id)
                .await?
                .ok_or_else(|| ApiError::unprocessable("No enrollment in this activity"))?
                .id
        }
    };

    let record = state
        .attendance()
        .check_in(&actor, session_id, enrollment_id, body.request())
        .await?;
    created(record, "Checked in")
}
