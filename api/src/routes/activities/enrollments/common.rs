use crate::response::ApiError;
use crate::state::AppState;
use db::models::enrollment::{self, EnrollmentStatus};
use serde::Deserialize;
use services::ActingUser;
use services::enrollment::{ApplicationInput, RejectionReason, ReviewDecision, ReviewRequest};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyRequest {
    #[validate(length(min = 1, max = 2000, message = "Motivation must be 1 to 2000 characters"))]
    pub motivation: String,
    #[validate(length(max = 2000, message = "Availability must be at most 2000 characters"))]
    pub availability: Option<String>,
    #[validate(length(max = 2000, message = "Experience must be at most 2000 characters"))]
    pub experience: Option<String>,
}

impl From<ApplyRequest> for ApplicationInput {
    fn from(req: ApplyRequest) -> Self {
        Self {
            motivation: req.motivation,
            availability: req.availability,
            experience: req.experience,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<EnrollmentStatus>,
}

/// `reason` is one of `activity_full`, `schedule_conflict`,
/// `insufficient_experience`, `requirements_not_met` or `custom`; the latter
/// takes its wording from `reason_text`.
#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub decision: ReviewDecision,
    pub message: Option<String>,
    pub reason: Option<String>,
    pub reason_text: Option<String>,
}

impl ReviewBody {
    pub fn into_review(self) -> Result<ReviewRequest, ApiError> {
        let reason = self
            .reason
            .as_deref()
            .map(|code| RejectionReason::parse(code, self.reason_text.as_deref()))
            .transpose()?;
        Ok(ReviewRequest {
            decision: self.decision,
            message: self.message,
            reason,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkReviewBody {
    pub enrollment_ids: Vec<i64>,
    #[serde(flatten)]
    pub review: ReviewBody,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoveBody {
    pub reason: Option<String>,
}

/// Loads an enrollment and checks it belongs to the activity in the path.
pub async fn enrollment_in(
    state: &AppState,
    actor: &ActingUser,
    activity_id: i64,
    enrollment_id: i64,
) -> Result<enrollment::Model, ApiError> {
    let enrollment = state.enrollments().get(actor, enrollment_id).await?;
    if enrollment.activity_id != activity_id {
        return Err(ApiError::new(
            axum::http::StatusCode::NOT_FOUND,
            format!("Enrollment {enrollment_id} not found"),
        ));
    }
    Ok(enrollment)
}
