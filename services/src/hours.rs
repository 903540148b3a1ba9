//! Volunteer hours: submission by the student, review by the professor.
//!
//! A request leaves PENDING exactly once. Each approval re-checks certificate
//! eligibility for the enrollment.

use crate::activity::ActivityService;
use crate::batch::BatchOutcome;
use crate::certificate::CertificateService;
use crate::context::ActingUser;
use crate::error::{ServiceError, ServiceResult};
use crate::notifier::{Notification, Notifier};
use chrono::NaiveDate;
use db::models::enrollment::{self, EnrollmentStatus};
use db::models::hours_request::{self, HoursDecision, HoursStatus, NewHoursRequest};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::{Validate, ValidateUrl};

pub const MIN_REJECTION_REASON: usize = 10;
pub const MAX_EVIDENCE_URLS: usize = 10;

#[derive(Debug, Clone, Validate)]
pub struct HoursSubmission {
    pub date: NaiveDate,
    #[validate(range(
        exclusive_min = 0.0,
        max = 24.0,
        message = "hours must be more than 0 and at most 24"
    ))]
    pub hours: f64,
    #[validate(length(min = 10, max = 2000, message = "description must be 10 to 2000 characters"))]
    pub description: String,
    #[validate(length(max = 10, message = "at most 10 evidence links are allowed"))]
    pub evidence_urls: Vec<String>,
}

impl HoursSubmission {
    fn check(&self, today: NaiveDate) -> ServiceResult<()> {
        self.validate()?;
        if self.date > today {
            return Err(ServiceError::validation("date cannot be in the future"));
        }
        if let Some(bad) = self.evidence_urls.iter().find(|u| !is_web_url(u)) {
            return Err(ServiceError::validation(format!(
                "evidence link '{bad}' is not an http(s) URL"
            )));
        }
        Ok(())
    }
}

fn is_web_url(url: &str) -> bool {
    let url = url.trim();
    url.validate_url() && (url.starts_with("http://") || url.starts_with("https://"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HoursVerdict {
    Approve,
    Reject,
}

impl HoursVerdict {
    fn target(self) -> HoursStatus {
        match self {
            HoursVerdict::Approve => HoursStatus::Approved,
            HoursVerdict::Reject => HoursStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HoursReview {
    pub verdict: HoursVerdict,
    /// Lower than claimed when the professor grants only part of the request.
    pub approved_hours: Option<f64>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
}

impl HoursReview {
    pub fn approve() -> Self {
        Self {
            verdict: HoursVerdict::Approve,
            approved_hours: None,
            rejection_reason: None,
            notes: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            verdict: HoursVerdict::Reject,
            approved_hours: None,
            rejection_reason: Some(reason.into()),
            notes: None,
        }
    }

    fn validate(&self) -> ServiceResult<()> {
        match self.verdict {
            HoursVerdict::Reject => {
                let length = self
                    .rejection_reason
                    .as_deref()
                    .map(|r| r.trim().chars().count())
                    .unwrap_or(0);
                if length < MIN_REJECTION_REASON {
                    return Err(ServiceError::validation(format!(
                        "a rejection reason of at least {MIN_REJECTION_REASON} characters is required"
                    )));
                }
            }
            HoursVerdict::Approve => {
                if self
                    .approved_hours
                    .is_some_and(|h| !h.is_finite() || h <= 0.0)
                {
                    return Err(ServiceError::validation("approved hours must be positive"));
                }
            }
        }
        Ok(())
    }
}

pub struct HoursService<'a> {
    db: &'a DatabaseConnection,
    notifier: &'a dyn Notifier,
    certificates: CertificateService<'a>,
}

impl<'a> HoursService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        notifier: &'a dyn Notifier,
        certificates: CertificateService<'a>,
    ) -> Self {
        Self {
            db,
            notifier,
            certificates,
        }
    }

    async fn load_request(&self, id: i64) -> ServiceResult<hours_request::Model> {
        hours_request::Model::find(self.db, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Hours request {id}")))
    }

    async fn load_enrollment(&self, id: i64) -> ServiceResult<enrollment::Model> {
        enrollment::Model::find(self.db, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Enrollment {id}")))
    }

    async fn require_reviewer(&self, actor: &ActingUser, activity_id: i64) -> ServiceResult<()> {
        ActivityService::new(self.db)
            .get_for_review(actor, activity_id)
            .await
            .map(|_| ())
    }

    pub async fn submit(
        &self,
        actor: &ActingUser,
        enrollment_id: i64,
        submission: HoursSubmission,
        today: NaiveDate,
    ) -> ServiceResult<hours_request::Model> {
        submission.check(today)?;

        let enrollment = self.load_enrollment(enrollment_id).await?;
        if enrollment.student_id != actor.id {
            return Err(ServiceError::forbidden(
                "Hours can only be logged against your own enrollment",
            ));
        }
        if enrollment.status != EnrollmentStatus::Confirmed {
            return Err(ServiceError::transition(enrollment.status, "hours_submitted"));
        }

        let created = hours_request::Model::create(
            self.db,
            NewHoursRequest {
                enrollment_id,
                activity_id: enrollment.activity_id,
                student_id: enrollment.student_id,
                date: submission.date,
                hours: submission.hours,
                description: submission.description.trim().to_owned(),
                evidence_urls: submission
                    .evidence_urls
                    .iter()
                    .map(|u| u.trim().to_owned())
                    .collect(),
            },
        )
        .await?;

        tracing::info!(
            request_id = created.id,
            enrollment_id,
            hours = created.hours,
            "Hours submitted"
        );
        Ok(created)
    }

    pub async fn list(
        &self,
        actor: &ActingUser,
        enrollment_id: i64,
    ) -> ServiceResult<Vec<hours_request::Model>> {
        let enrollment = self.load_enrollment(enrollment_id).await?;
        if enrollment.student_id != actor.id {
            self.require_reviewer(actor, enrollment.activity_id).await?;
        }
        Ok(hours_request::Model::list_for_enrollment(self.db, enrollment_id).await?)
    }

    /// Sum of granted hours across approved requests.
    pub async fn validated_hours(&self, enrollment_id: i64) -> ServiceResult<f64> {
        Ok(hours_request::Model::approved_total(self.db, enrollment_id).await?)
    }

    pub async fn review(
        &self,
        actor: &ActingUser,
        request_id: i64,
        review: HoursReview,
    ) -> ServiceResult<hours_request::Model> {
        review.validate()?;

        let request = self.load_request(request_id).await?;
        self.require_reviewer(actor, request.activity_id).await?;

        let target = review.verdict.target();
        if request.status != HoursStatus::Pending {
            return Err(ServiceError::transition(request.status, target));
        }
        if let Some(granted) = review.approved_hours {
            if granted > request.hours {
                return Err(ServiceError::validation(format!(
                    "cannot approve more than the {} hours claimed",
                    request.hours
                )));
            }
        }

        let rejection_reason = review
            .rejection_reason
            .as_deref()
            .map(|r| r.trim().to_owned())
            .filter(|_| review.verdict == HoursVerdict::Reject);
        let decided = hours_request::Model::decide(
            self.db,
            request_id,
            HoursDecision {
                status: target,
                approved_hours: match review.verdict {
                    HoursVerdict::Approve => Some(review.approved_hours.unwrap_or(request.hours)),
                    HoursVerdict::Reject => None,
                },
                reviewed_by: actor.id,
                rejection_reason: rejection_reason.clone(),
                professor_notes: review.notes.clone(),
            },
        )
        .await?;
        if !decided {
            let current = self.load_request(request_id).await?;
            return Err(ServiceError::transition(current.status, target));
        }

        let updated = self.load_request(request_id).await?;
        let enrollment = self.load_enrollment(updated.enrollment_id).await?;

        match review.verdict {
            HoursVerdict::Approve => {
                self.notifier
                    .notify(Notification::hours_approved(&enrollment, updated.granted_hours()));
                if let Err(e) = self
                    .certificates
                    .issue_if_eligible(enrollment.id, actor.id)
                    .await
                {
                    tracing::warn!(
                        enrollment_id = enrollment.id,
                        error = %e,
                        "Certificate check after approval failed"
                    );
                }
            }
            HoursVerdict::Reject => {
                self.notifier.notify(Notification::hours_rejected(
                    &enrollment,
                    rejection_reason.as_deref().unwrap_or_default(),
                ));
            }
        }

        tracing::info!(
            request_id,
            enrollment_id = enrollment.id,
            verdict = %review.verdict,
            reviewed_by = actor.id,
            "Hours request reviewed"
        );
        Ok(updated)
    }

    /// Reviews each request on its own. Partial hour adjustments do not apply
    /// to batches; every approval grants the claimed amount.
    pub async fn bulk_review(
        &self,
        actor: &ActingUser,
        request_ids: &[i64],
        review: HoursReview,
    ) -> ServiceResult<BatchOutcome> {
        let review = HoursReview {
            approved_hours: None,
            ..review
        };
        review.validate()?;

        let mut outcome = BatchOutcome::default();
        for &id in request_ids {
            let result = self.review(actor, id, review.clone()).await;
            outcome.record(id, &result);
        }

        tracing::info!(
            success = outcome.success,
            failed = outcome.failed,
            "Bulk hours review finished"
        );
        Ok(outcome)
    }

    /// Notes stay editable after a decision.
    pub async fn update_notes(
        &self,
        actor: &ActingUser,
        request_id: i64,
        notes: Option<String>,
    ) -> ServiceResult<hours_request::Model> {
        let request = self.load_request(request_id).await?;
        self.require_reviewer(actor, request.activity_id).await?;
        Ok(hours_request::Model::set_notes(self.db, request_id, notes).await?)
    }
}
