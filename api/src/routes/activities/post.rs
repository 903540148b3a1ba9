use super::common::{ActivityResponse, CreateActivityRequest};
use crate::auth::AuthUser;
use crate::response::{ApiResult, created};
use crate::routes::common::today;
use crate::state::AppState;
use axum::{Extension, Json, extract::State};
use validator::Validate;

/// POST /api/activities
///
/// Create an activity. Professors and admins only; the caller becomes its owner.
///
/// ### Request Body
/// ```json
/// {
///   "title": "Community garden",
///   "description": "Weekly planting and weeding",
///   "category": "environment",
///   "department": "Botany",
///   "location": "Garden plot B",
///   "max_participants": 12,
///   "auto_accept": false,
///   "required_hours": 10.0,
///   "start_date": "2025-08-01",
///   "end_date": "2025-09-30"
/// }
/// ```
///
/// ### Validation Rules
/// * `title`: required, 1 to 200 characters
/// * `category`, `location`: required
/// * `max_participants`: at least 1
/// * `required_hours`: optional, zero or more
/// * `end_date`: not before `start_date`
///
/// ### Responses
///
/// - `201 Created`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 7,
///     "title": "Community garden",
///     "max_participants": 12,
///     "current_participants": 0,
///     "seats_left": 12,
///     "status": "open",
///     "auto_accept": false,
///     "required_hours": 10.0,
///     "created_by": 3
///   },
///   "message": "Activity created"
/// }
/// ```
///
/// - `403 Forbidden` (students)
/// - `422 Unprocessable Entity`
/// ```json
/// {
///   "success": false,
///   "data": {},
///   "message": "end date 2025-07-01 is before start date 2025-08-01"
/// }
/// ```
pub async fn create_activity(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateActivityRequest>,
) -> ApiResult<ActivityResponse> {
    req.validate()?;
    let activity = state.activities().create(&user.actor(), req.into()).await?;
    created(ActivityResponse::new(activity, today()), "Activity created")
}
