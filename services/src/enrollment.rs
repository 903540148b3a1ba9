//! Enrollment lifecycle: application, review, waitlist promotion, withdrawal.
//!
//! Every status change is a conditional update keyed on the expected current
//! status. Acceptance additionally takes a seat with the bounded increment in
//! the same transaction, so two racing accepts can never both confirm the last
//! seat.

use crate::activity::ActivityService;
use crate::batch::BatchOutcome;
use crate::context::ActingUser;
use crate::error::{ServiceError, ServiceResult};
use crate::notifier::{Notification, Notifier};
use chrono::Utc;
use db::models::activity::{self, ActivityStatus};
use db::models::enrollment::{self, EnrollmentStatus, NewEnrollment, ReviewStamp};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

const MAX_APPLICATION_FIELD: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReviewDecision {
    Accept,
    Reject,
    Waitlist,
}

impl ReviewDecision {
    fn target(self) -> EnrollmentStatus {
        match self {
            ReviewDecision::Accept => EnrollmentStatus::Confirmed,
            ReviewDecision::Reject => EnrollmentStatus::Cancelled,
            ReviewDecision::Waitlist => EnrollmentStatus::Waitlisted,
        }
    }
}

/// Why an application was declined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    ActivityFull,
    ScheduleConflict,
    InsufficientExperience,
    RequirementsNotMet,
    Custom(String),
}

impl RejectionReason {
    /// Parses a reason code; `custom` needs accompanying text.
    pub fn parse(code: &str, detail: Option<&str>) -> ServiceResult<Self> {
        let detail = detail.map(str::trim).filter(|d| !d.is_empty());
        match code.trim().to_ascii_lowercase().as_str() {
            "activity_full" => Ok(RejectionReason::ActivityFull),
            "schedule_conflict" => Ok(RejectionReason::ScheduleConflict),
            "insufficient_experience" => Ok(RejectionReason::InsufficientExperience),
            "requirements_not_met" => Ok(RejectionReason::RequirementsNotMet),
            "custom" => detail
                .map(|d| RejectionReason::Custom(d.to_owned()))
                .ok_or_else(|| ServiceError::validation("A custom rejection reason needs text")),
            other => Err(ServiceError::validation(format!(
                "Unknown rejection reason '{other}'"
            ))),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            RejectionReason::ActivityFull => "The activity is full".into(),
            RejectionReason::ScheduleConflict => "Your availability does not match the schedule".into(),
            RejectionReason::InsufficientExperience => "More experience is needed for this role".into(),
            RejectionReason::RequirementsNotMet => "The activity requirements are not met".into(),
            RejectionReason::Custom(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationInput {
    pub motivation: String,
    pub availability: Option<String>,
    pub experience: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    pub message: Option<String>,
    pub reason: Option<RejectionReason>,
}

impl ReviewRequest {
    pub fn accept() -> Self {
        Self {
            decision: ReviewDecision::Accept,
            message: None,
            reason: None,
        }
    }

    pub fn waitlist() -> Self {
        Self {
            decision: ReviewDecision::Waitlist,
            message: None,
            reason: None,
        }
    }

    pub fn reject(reason: RejectionReason) -> Self {
        Self {
            decision: ReviewDecision::Reject,
            message: None,
            reason: Some(reason),
        }
    }

    fn validate(&self) -> ServiceResult<()> {
        if self.decision == ReviewDecision::Reject && self.reason.is_none() {
            return Err(ServiceError::validation(
                "A rejection reason is required to reject an application",
            ));
        }
        Ok(())
    }
}

pub struct EnrollmentService<'a> {
    db: &'a DatabaseConnection,
    notifier: &'a dyn Notifier,
}

impl<'a> EnrollmentService<'a> {
    pub fn new(db: &'a DatabaseConnection, notifier: &'a dyn Notifier) -> Self {
        Self { db, notifier }
    }

    fn activities(&self) -> ActivityService<'a> {
        ActivityService::new(self.db)
    }

    async fn load(&self, id: i64) -> ServiceResult<enrollment::Model> {
        enrollment::Model::find(self.db, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Enrollment {id}")))
    }

    /// Owner, activity reviewer or admin.
    pub async fn get(&self, actor: &ActingUser, id: i64) -> ServiceResult<enrollment::Model> {
        let enrollment = self.load(id).await?;
        if enrollment.student_id != actor.id {
            let activity = self.activities().get(enrollment.activity_id).await?;
            actor.require_reviewer(&activity)?;
        }
        Ok(enrollment)
    }

    pub async fn list(
        &self,
        actor: &ActingUser,
        activity_id: i64,
        status: Option<EnrollmentStatus>,
    ) -> ServiceResult<Vec<enrollment::Model>> {
        self.activities().get_for_review(actor, activity_id).await?;
        Ok(enrollment::Model::list_for_activity(self.db, activity_id, status).await?)
    }

    /// Student applies to an activity. With auto-accept on, the application is
    /// confirmed straight away, or waitlisted when no seat is left.
    pub async fn apply(
        &self,
        actor: &ActingUser,
        activity_id: i64,
        input: ApplicationInput,
    ) -> ServiceResult<enrollment::Model> {
        if !actor.is_student() {
            return Err(ServiceError::forbidden("Only students can apply to activities"));
        }
        let motivation = input.motivation.trim();
        if motivation.is_empty() {
            return Err(ServiceError::validation("motivation cannot be empty"));
        }
        let too_long = |s: &str| s.chars().count() > MAX_APPLICATION_FIELD;
        if too_long(motivation)
            || input.availability.as_deref().is_some_and(too_long)
            || input.experience.as_deref().is_some_and(too_long)
        {
            return Err(ServiceError::validation(format!(
                "application fields are limited to {MAX_APPLICATION_FIELD} characters"
            )));
        }

        let activity = self.activities().get(activity_id).await?;
        let today = Utc::now().date_naive();
        if !activity.accepts_applications()
            || activity.derived_status(today) == ActivityStatus::Completed
        {
            return Err(ServiceError::validation(
                "This activity is not accepting applications",
            ));
        }

        if enrollment::Model::find_live(self.db, actor.id, activity_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::AlreadyEnrolled);
        }

        let created = enrollment::Model::create(
            self.db,
            NewEnrollment {
                student_id: actor.id,
                activity_id,
                motivation: motivation.to_owned(),
                availability: input.availability,
                experience: input.experience,
            },
        )
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                ServiceError::AlreadyEnrolled
            } else {
                ServiceError::Database(e)
            }
        })?;

        tracing::info!(
            enrollment_id = created.id,
            activity_id,
            student_id = actor.id,
            "Application submitted"
        );

        if activity.auto_accept {
            self.auto_accept(&created, &activity).await?;
        }

        self.load(created.id).await
    }

    async fn auto_accept(
        &self,
        enrollment: &enrollment::Model,
        activity: &activity::Model,
    ) -> ServiceResult<()> {
        let stamp = || ReviewStamp {
            reviewed_by: activity.created_by,
            message: Some("Automatically accepted".into()),
            rejection_reason: None,
        };

        match self
            .confirm(enrollment.id, activity.id, EnrollmentStatus::Pending, stamp())
            .await
        {
            Ok(()) => {
                self.notifier
                    .notify(Notification::application_accepted(enrollment, activity));
                Ok(())
            }
            Err(ServiceError::CapacityExceeded) => {
                self.move_to(
                    enrollment.id,
                    EnrollmentStatus::Pending,
                    EnrollmentStatus::Waitlisted,
                    Some(ReviewStamp {
                        message: Some("Activity full; added to waitlist".into()),
                        ..stamp()
                    }),
                )
                .await?;
                self.notifier
                    .notify(Notification::application_waitlisted(enrollment, activity));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Status change plus seat reservation, all or nothing.
    async fn confirm(
        &self,
        enrollment_id: i64,
        activity_id: i64,
        from: EnrollmentStatus,
        stamp: ReviewStamp,
    ) -> ServiceResult<()> {
        let txn = self.db.begin().await?;

        let moved = enrollment::Model::transition(
            &txn,
            enrollment_id,
            from,
            EnrollmentStatus::Confirmed,
            Some(stamp),
        )
        .await?;
        if !moved {
            txn.rollback().await?;
            let current = self.load(enrollment_id).await?;
            return Err(ServiceError::transition(
                current.status,
                EnrollmentStatus::Confirmed,
            ));
        }

        if !activity::Model::try_reserve_seat(&txn, activity_id).await? {
            txn.rollback().await?;
            tracing::info!(enrollment_id, activity_id, "Acceptance refused; activity is full");
            return Err(ServiceError::CapacityExceeded);
        }

        txn.commit().await?;
        Ok(())
    }

    async fn move_to(
        &self,
        enrollment_id: i64,
        from: EnrollmentStatus,
        to: EnrollmentStatus,
        stamp: Option<ReviewStamp>,
    ) -> ServiceResult<()> {
        if enrollment::Model::transition(self.db, enrollment_id, from, to, stamp).await? {
            return Ok(());
        }
        let current = self.load(enrollment_id).await?;
        Err(ServiceError::transition(current.status, to))
    }

    /// Cancels and gives back the seat if the enrollment held one.
    async fn cancel(
        &self,
        enrollment: &enrollment::Model,
        stamp: Option<ReviewStamp>,
    ) -> ServiceResult<()> {
        let txn = self.db.begin().await?;
        let moved = enrollment::Model::transition(
            &txn,
            enrollment.id,
            enrollment.status,
            EnrollmentStatus::Cancelled,
            stamp,
        )
        .await?;
        if !moved {
            txn.rollback().await?;
            let current = self.load(enrollment.id).await?;
            return Err(ServiceError::transition(
                current.status,
                EnrollmentStatus::Cancelled,
            ));
        }

        if enrollment.status == EnrollmentStatus::Confirmed {
            activity::Model::release_seat(&txn, enrollment.activity_id).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    /// Accept, reject or waitlist a PENDING application.
    pub async fn review_application(
        &self,
        actor: &ActingUser,
        enrollment_id: i64,
        review: ReviewRequest,
    ) -> ServiceResult<enrollment::Model> {
        review.validate()?;

        let enrollment = self.load(enrollment_id).await?;
        let activity = self
            .activities()
            .get_for_review(actor, enrollment.activity_id)
            .await?;

        let target = review.decision.target();
        if enrollment.status != EnrollmentStatus::Pending {
            return Err(ServiceError::transition(enrollment.status, target));
        }

        let reason_text = review.reason.as_ref().map(RejectionReason::describe);
        let stamp = ReviewStamp {
            reviewed_by: actor.id,
            message: review.message.clone(),
            rejection_reason: reason_text.clone(),
        };

        match review.decision {
            ReviewDecision::Accept => {
                self.confirm(enrollment.id, activity.id, EnrollmentStatus::Pending, stamp)
                    .await?;
                self.notifier
                    .notify(Notification::application_accepted(&enrollment, &activity));
            }
            ReviewDecision::Reject => {
                self.move_to(enrollment.id, EnrollmentStatus::Pending, target, Some(stamp))
                    .await?;
                self.notifier.notify(Notification::application_rejected(
                    &enrollment,
                    &activity,
                    reason_text.as_deref().unwrap_or_default(),
                ));
            }
            ReviewDecision::Waitlist => {
                self.move_to(enrollment.id, EnrollmentStatus::Pending, target, Some(stamp))
                    .await?;
                self.notifier
                    .notify(Notification::application_waitlisted(&enrollment, &activity));
            }
        }

        tracing::info!(
            enrollment_id,
            activity_id = activity.id,
            reviewed_by = actor.id,
            decision = %review.decision,
            "Application reviewed"
        );
        self.load(enrollment_id).await
    }

    /// Reviews each id on its own; one failure never stops the rest.
    pub async fn bulk_review(
        &self,
        actor: &ActingUser,
        activity_id: i64,
        enrollment_ids: &[i64],
        review: ReviewRequest,
    ) -> ServiceResult<BatchOutcome> {
        review.validate()?;
        self.activities().get_for_review(actor, activity_id).await?;

        let mut outcome = BatchOutcome::default();
        for &id in enrollment_ids {
            let result = match self.load(id).await {
                Ok(e) if e.activity_id != activity_id => {
                    Err(ServiceError::not_found(format!("Enrollment {id}")))
                }
                Ok(_) => self.review_application(actor, id, review.clone()).await,
                Err(e) => Err(e),
            };
            outcome.record(id, &result);
        }

        tracing::info!(
            activity_id,
            success = outcome.success,
            failed = outcome.failed,
            "Bulk review finished"
        );
        Ok(outcome)
    }

    /// WAITLISTED to CONFIRMED, under the same seat guard as acceptance.
    pub async fn promote(
        &self,
        actor: &ActingUser,
        enrollment_id: i64,
    ) -> ServiceResult<enrollment::Model> {
        let enrollment = self.load(enrollment_id).await?;
        let activity = self
            .activities()
            .get_for_review(actor, enrollment.activity_id)
            .await?;

        if enrollment.status != EnrollmentStatus::Waitlisted {
            return Err(ServiceError::transition(
                enrollment.status,
                EnrollmentStatus::Confirmed,
            ));
        }

        self.confirm(
            enrollment.id,
            activity.id,
            EnrollmentStatus::Waitlisted,
            ReviewStamp {
                reviewed_by: actor.id,
                message: Some("Promoted from waitlist".into()),
                rejection_reason: None,
            },
        )
        .await?;

        self.notifier
            .notify(Notification::application_promoted(&enrollment, &activity));
        tracing::info!(enrollment_id, activity_id = activity.id, "Promoted from waitlist");
        self.load(enrollment_id).await
    }

    /// The student backs out.
    pub async fn withdraw(
        &self,
        actor: &ActingUser,
        enrollment_id: i64,
    ) -> ServiceResult<enrollment::Model> {
        let enrollment = self.load(enrollment_id).await?;
        if enrollment.student_id != actor.id {
            return Err(ServiceError::forbidden("You can only withdraw your own enrollment"));
        }
        if enrollment.status.is_terminal() {
            return Err(ServiceError::transition(
                enrollment.status,
                EnrollmentStatus::Cancelled,
            ));
        }

        self.cancel(&enrollment, None).await?;
        tracing::info!(enrollment_id, student_id = actor.id, "Enrollment withdrawn");
        self.load(enrollment_id).await
    }

    /// A reviewer removes a confirmed or waitlisted participant.
    pub async fn remove(
        &self,
        actor: &ActingUser,
        enrollment_id: i64,
        reason: Option<String>,
    ) -> ServiceResult<enrollment::Model> {
        let enrollment = self.load(enrollment_id).await?;
        self.activities()
            .get_for_review(actor, enrollment.activity_id)
            .await?;

        if !matches!(
            enrollment.status,
            EnrollmentStatus::Confirmed | EnrollmentStatus::Waitlisted
        ) {
            return Err(ServiceError::transition(
                enrollment.status,
                EnrollmentStatus::Cancelled,
            ));
        }

        self.cancel(
            &enrollment,
            Some(ReviewStamp {
                reviewed_by: actor.id,
                message: None,
                rejection_reason: reason,
            }),
        )
        .await?;
        tracing::info!(enrollment_id, removed_by = actor.id, "Participant removed");
        self.load(enrollment_id).await
    }

    pub async fn mark_feedback_submitted(
        &self,
        actor: &ActingUser,
        enrollment_id: i64,
    ) -> ServiceResult<enrollment::Model> {
        let enrollment = self.load(enrollment_id).await?;
        if enrollment.student_id != actor.id {
            return Err(ServiceError::forbidden("Not your enrollment"));
        }
        if enrollment.status != EnrollmentStatus::Confirmed {
            return Err(ServiceError::transition(enrollment.status, "feedback_submitted"));
        }
        Ok(enrollment::Model::set_feedback_submitted(self.db, enrollment_id).await?)
    }
}
