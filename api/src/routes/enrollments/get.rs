use super::common::AttendanceResponse;
use crate::auth::AuthUser;
use crate::response::{ApiResult, ok};
use crate::routes::common::today;
use crate::state::AppState;
use axum::{
    Extension,
    extract::{Path, State},
};
use db::models::{enrollment, hours_request};
use services::certificate::CertificateStatus;

/// GET /api/enrollments/{enrollment_id}
pub async fn get_enrollment(
    State(state): State<AppState>,
    Path(enrollment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<enrollment::Model> {
    let enrollment = state.enrollments().get(&user.actor(), enrollment_id).await?;
    ok(enrollment, "Enrollment retrieved")
}

/// GET /api/enrollments/{enrollment_id}/attendance
///
/// Attendance rate over sessions held so far, plus the individual records.
pub async fn get_attendance(
    State(state): State<AppState>,
    Path(enrollment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<AttendanceResponse> {
    let actor = user.actor();
    let attendance = state.attendance();
    let summary = attendance.summary(&actor, enrollment_id, today()).await?;
    let records = attendance.list(&actor, enrollment_id).await?;
    ok(AttendanceResponse { summary, records }, "Attendance retrieved")
}

/// GET /api/enrollments/{enrollment_id}/hours
pub async fn list_hours(
    State(state): State<AppState>,
    Path(enrollment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<hours_request::Model>> {
    let requests = state.hours().list(&user.actor(), enrollment_id).await?;
    ok(requests, "Hours requests retrieved")
}

/// GET /api/enrollments/{enrollment_id}/certificate
///
/// Approved hours against the target, and the certificate. A confirmed
/// enrollment that qualifies but has none yet is issued one here.
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "approved_hours": 11.0,
///     "required_hours": 10.0,
///     "eligible": true,
///     "certificate": {
///       "certificate_number": "CC-2025-4F9A1C2B",
///       "total_hours": 11.0,
///       "artifact_url": "https://certs.example.org/CC-2025-4F9A1C2B.pdf"
///     }
///   },
///   "message": "Certificate status retrieved"
/// }
/// ```
pub async fn get_certificate(
    State(state): State<AppState>,
    Path(enrollment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<CertificateStatus> {
    let status = state
        .certificates()
        .status(&user.actor(), enrollment_id)
        .await?;
    ok(status, "Certificate status retrieved")
}
