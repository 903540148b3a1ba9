//! Certificate eligibility and issuance.

use crate::context::ActingUser;
use crate::error::{ServiceError, ServiceResult};
use crate::notifier::{Notification, Notifier};
use db::models::certificate::{self, NewCertificate};
use db::models::enrollment::{self, EnrollmentStatus};
use db::models::{activity, hours_request};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use serde::Serialize;
use thiserror::Error;
use util::config;

const NUMBER_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
#[error("certificate rendering failed: {0}")]
pub struct RenderError(pub String);

/// Produces the downloadable artifact for an issued certificate.
pub trait CertificateRenderer: Send + Sync {
    fn render(
        &self,
        certificate_number: &str,
        enrollment: &enrollment::Model,
    ) -> Result<String, RenderError>;
}

/// Points at `{base_url}/{number}.pdf`; the file itself is produced elsewhere.
#[derive(Debug, Clone)]
pub struct UrlRenderer {
    base_url: String,
}

impl UrlRenderer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::certificate_base_url())
    }
}

impl CertificateRenderer for UrlRenderer {
    fn render(
        &self,
        certificate_number: &str,
        _enrollment: &enrollment::Model,
    ) -> Result<String, RenderError> {
        let base = self.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(RenderError("no certificate base URL configured".into()));
        }
        Ok(format!("{base}/{certificate_number}.pdf"))
    }
}

/// With a target, the approved total must reach it. Without one, any
/// positive total qualifies.
pub fn is_eligible(approved_hours: f64, required_hours: Option<f64>) -> bool {
    match required_hours {
        Some(required) if required > 0.0 => approved_hours >= required,
        _ => approved_hours > 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Eligibility {
    pub approved_hours: f64,
    pub required_hours: Option<f64>,
    pub eligible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateStatus {
    #[serde(flatten)]
    pub eligibility: Eligibility,
    pub certificate: Option<certificate::Model>,
}

pub struct CertificateService<'a> {
    db: &'a DatabaseConnection,
    notifier: &'a dyn Notifier,
    renderer: &'a dyn CertificateRenderer,
    prefix: String,
}

impl<'a> CertificateService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        notifier: &'a dyn Notifier,
        renderer: &'a dyn CertificateRenderer,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            db,
            notifier,
            renderer,
            prefix: prefix.into(),
        }
    }

    async fn load(&self, enrollment_id: i64) -> ServiceResult<(enrollment::Model, activity::Model)> {
        let enrollment = enrollment::Model::find(self.db, enrollment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Enrollment {enrollment_id}")))?;
        // Soft-deleted activities still back their certificates.
        let activity = activity::Entity::find_by_id(enrollment.activity_id)
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Activity {}", enrollment.activity_id)))?;
        Ok((enrollment, activity))
    }

    pub async fn eligibility(&self, enrollment_id: i64) -> ServiceResult<Eligibility> {
        let (_, activity) = self.load(enrollment_id).await?;
        self.eligibility_for(enrollment_id, &activity).await
    }

    async fn eligibility_for(
        &self,
        enrollment_id: i64,
        activity: &activity::Model,
    ) -> ServiceResult<Eligibility> {
        let approved_hours = hours_request::Model::approved_total(self.db, enrollment_id).await?;
        Ok(Eligibility {
            approved_hours,
            required_hours: activity.required_hours,
            eligible: is_eligible(approved_hours, activity.required_hours),
        })
    }

    /// Eligibility plus the certificate, for the student or a reviewer.
    ///
    /// A confirmed enrollment that qualifies but has no certificate yet gets
    /// one here. That covers a target lowered after the approvals and an
    /// issuance that failed inside the approval hook.
    pub async fn status(
        &self,
        actor: &ActingUser,
        enrollment_id: i64,
    ) -> ServiceResult<CertificateStatus> {
        let (enrollment, activity) = self.load(enrollment_id).await?;
        if enrollment.student_id != actor.id {
            actor.require_reviewer(&activity)?;
        }

        let eligibility = self.eligibility_for(enrollment_id, &activity).await?;
        let mut certificate = certificate::Model::find_by_enrollment(self.db, enrollment_id).await?;
        if certificate.is_none()
            && eligibility.eligible
            && enrollment.status == EnrollmentStatus::Confirmed
        {
            certificate = Some(self.issue(enrollment_id, activity.created_by).await?);
        }

        Ok(CertificateStatus {
            eligibility,
            certificate,
        })
    }

    /// Issues the enrollment's certificate, or returns the one it already has.
    pub async fn issue(
        &self,
        enrollment_id: i64,
        issued_by: i64,
    ) -> ServiceResult<certificate::Model> {
        if let Some(existing) = certificate::Model::find_by_enrollment(self.db, enrollment_id).await? {
            return Ok(existing);
        }

        let (enrollment, activity) = self.load(enrollment_id).await?;
        if enrollment.status != EnrollmentStatus::Confirmed {
            return Err(ServiceError::transition(enrollment.status, "certified"));
        }
        let eligibility = self.eligibility_for(enrollment_id, &activity).await?;
        if !eligibility.eligible {
            return Err(ServiceError::validation(format!(
                "{:.2} approved hours do not meet the requirement",
                eligibility.approved_hours
            )));
        }

        for _ in 0..NUMBER_ATTEMPTS {
            let number = certificate::Model::generate_number(&self.prefix);
            let artifact_url = match self.renderer.render(&number, &enrollment) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(enrollment_id, error = %e, "Issuing certificate without artifact");
                    None
                }
            };

            let created = certificate::Model::create(
                self.db,
                NewCertificate {
                    enrollment_id,
                    certificate_number: number,
                    total_hours: eligibility.approved_hours,
                    issued_by,
                    artifact_url,
                },
            )
            .await;

            match created {
                Ok(cert) => {
                    enrollment::Model::mark_validated(self.db, enrollment_id).await?;
                    self.notifier.notify(Notification::certificate_issued(
                        &enrollment,
                        &cert.certificate_number,
                    ));
                    tracing::info!(
                        enrollment_id,
                        certificate_number = %cert.certificate_number,
                        total_hours = cert.total_hours,
                        "Certificate issued"
                    );
                    return Ok(cert);
                }
                Err(e) if db::is_unique_violation(&e) => {
                    // Lost a race for this enrollment, or drew a taken number.
                    if let Some(existing) =
                        certificate::Model::find_by_enrollment(self.db, enrollment_id).await?
                    {
                        return Ok(existing);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::Database(DbErr::Custom(
            "could not allocate a unique certificate number".into(),
        )))
    }

    /// Issues when the enrollment qualifies; `None` otherwise.
    pub async fn issue_if_eligible(
        &self,
        enrollment_id: i64,
        issued_by: i64,
    ) -> ServiceResult<Option<certificate::Model>> {
        if !self.eligibility(enrollment_id).await?.eligible {
            return Ok(None);
        }
        self.issue(enrollment_id, issued_by).await.map(Some)
    }
}
