use crate::activity::ActivityService;
use crate::context::ActingUser;
use crate::error::{ServiceError, ServiceResult};
use chrono::{NaiveDate, Utc};
use db::models::attendance::{self, AttendanceStatus, CheckInMethod, NewAttendance};
use db::models::enrollment::{self, EnrollmentStatus};
use db::models::session::{self, MAX_SESSION_HOURS};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CheckInRequest {
    pub method: CheckInMethod,
    /// Scanned payload; required for QR check-in.
    pub code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
}

impl CheckInRequest {
    pub fn qr(code: impl Into<String>) -> Self {
        Self {
            method: CheckInMethod::Qr,
            code: Some(code.into()),
            latitude: None,
            longitude: None,
            accuracy: None,
        }
    }

    pub fn manual() -> Self {
        Self {
            method: CheckInMethod::Manual,
            code: None,
            latitude: None,
            longitude: None,
            accuracy: None,
        }
    }

    fn validate_location(&self) -> ServiceResult<()> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(ServiceError::validation("coordinates are out of range"));
                }
            }
            (None, None) => {}
            _ => {
                return Err(ServiceError::validation(
                    "latitude and longitude must be given together",
                ));
            }
        }
        if self.accuracy.is_some_and(|a| !a.is_finite() || a < 0.0) {
            return Err(ServiceError::validation("accuracy must be zero or more"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceCorrection {
    pub status: Option<AttendanceStatus>,
    pub hours: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub attended: u64,
    pub scheduled: u64,
    /// `attended / scheduled`, capped at 1. Zero when nothing was scheduled yet.
    pub rate: f64,
}

impl AttendanceSummary {
    pub fn new(attended: u64, scheduled: u64) -> Self {
        let rate = if scheduled == 0 {
            0.0
        } else {
            (attended as f64 / scheduled as f64).min(1.0)
        };
        Self {
            attended,
            scheduled,
            rate,
        }
    }
}

pub struct AttendanceService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AttendanceService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_enrollment(&self, id: i64) -> ServiceResult<enrollment::Model> {
        enrollment::Model::find(self.db, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Enrollment {id}")))
    }

    async fn load_session(&self, id: i64) -> ServiceResult<session::Model> {
        session::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Session {id}")))
    }

    /// Records the first check-in of an enrollment at a session.
    ///
    /// QR check-in is done by the student with the session's live code.
    /// Manual check-in is done by a reviewer of the activity.
    pub async fn check_in(
        &self,
        actor: &ActingUser,
        session_id: i64,
        enrollment_id: i64,
        request: CheckInRequest,
    ) -> ServiceResult<attendance::Model> {
        request.validate_location()?;

        let enrollment = self.load_enrollment(enrollment_id).await?;
        let session = self.load_session(session_id).await?;

        if session.activity_id != enrollment.activity_id {
            return Err(ServiceError::not_found(format!(
                "Session {session_id} for enrollment {enrollment_id}"
            )));
        }
        if session.is_cancelled() {
            return Err(ServiceError::validation("This session was cancelled"));
        }

        match request.method {
            CheckInMethod::Qr => {
                if actor.id != enrollment.student_id {
                    return Err(ServiceError::forbidden(
                        "QR check-in is only for the enrolled student",
                    ));
                }
                let scanned = request
                    .code
                    .as_deref()
                    .ok_or_else(|| ServiceError::validation("code is required for QR check-in"))?;
                verify_code(&session, scanned)?;
            }
            CheckInMethod::Manual => {
                let activity = ActivityService::new(self.db)
                    .get(enrollment.activity_id)
                    .await?;
                actor.require_reviewer(&activity)?;
            }
        }

        if enrollment.status != EnrollmentStatus::Confirmed {
            return Err(ServiceError::transition(enrollment.status, "checked_in"));
        }

        let record = attendance::Model::create(
            self.db,
            NewAttendance {
                enrollment_id,
                session_id,
                student_id: enrollment.student_id,
                method: request.method,
                checked_in_by: actor.id,
                latitude: request.latitude,
                longitude: request.longitude,
                accuracy: request.accuracy,
                hours_credited: session.duration_hours(),
            },
        )
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                ServiceError::AlreadyCheckedIn
            } else {
                ServiceError::Database(e)
            }
        })?;

        tracing::info!(
            enrollment_id,
            session_id,
            method = %request.method,
            hours = record.hours_credited,
            "Check-in recorded"
        );
        Ok(record)
    }

    pub async fn correct(
        &self,
        actor: &ActingUser,
        session_id: i64,
        enrollment_id: i64,
        correction: AttendanceCorrection,
    ) -> ServiceResult<attendance::Model> {
        if correction
            .hours
            .is_some_and(|h| !h.is_finite() || !(0.0..=MAX_SESSION_HOURS).contains(&h))
        {
            return Err(ServiceError::validation(format!(
                "hours must be between 0 and {MAX_SESSION_HOURS}"
            )));
        }

        let enrollment = self.load_enrollment(enrollment_id).await?;
        ActivityService::new(self.db)
            .get_for_review(actor, enrollment.activity_id)
            .await?;

        if attendance::Model::find(self.db, enrollment_id, session_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found(format!(
                "Attendance for enrollment {enrollment_id} at session {session_id}"
            )));
        }

        let updated = attendance::Model::correct(
            self.db,
            enrollment_id,
            session_id,
            correction.status,
            correction.hours,
            correction.notes,
        )
        .await?;

        tracing::info!(enrollment_id, session_id, corrected_by = actor.id, "Attendance corrected");
        Ok(updated)
    }

    pub async fn list(
        &self,
        actor: &ActingUser,
        enrollment_id: i64,
    ) -> ServiceResult<Vec<attendance::Model>> {
        self.authorize_read(actor, enrollment_id).await?;
        Ok(attendance::Model::list_for_enrollment(self.db, enrollment_id).await?)
    }

    /// Present check-ins over non-cancelled sessions held up to `today`.
    pub async fn summary(
        &self,
        actor: &ActingUser,
        enrollment_id: i64,
        today: NaiveDate,
    ) -> ServiceResult<AttendanceSummary> {
        let enrollment = self.authorize_read(actor, enrollment_id).await?;
        let attended = attendance::Model::count_present(self.db, enrollment_id).await?;
        let scheduled =
            session::Model::count_held_until(self.db, enrollment.activity_id, today).await?;
        Ok(AttendanceSummary::new(attended, scheduled))
    }

    async fn authorize_read(
        &self,
        actor: &ActingUser,
        enrollment_id: i64,
    ) -> ServiceResult<enrollment::Model> {
        let enrollment = self.load_enrollment(enrollment_id).await?;
        if enrollment.student_id != actor.id {
            let activity = ActivityService::new(self.db)
                .get(enrollment.activity_id)
                .await?;
            actor.require_reviewer(&activity)?;
        }
        Ok(enrollment)
    }
}

fn verify_code(session: &session::Model, scanned: &str) -> ServiceResult<()> {
    let Some(expected) = session.qr_code.as_deref() else {
        return Err(ServiceError::CodeMismatch);
    };
    if session.qr_expires_at.is_some_and(|exp| Utc::now() > exp) {
        return Err(ServiceError::ExpiredCode);
    }
    if expected != scanned.trim() {
        return Err(ServiceError::CodeMismatch);
    }
    Ok(())
}
