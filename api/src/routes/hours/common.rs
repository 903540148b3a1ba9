use serde::Deserialize;
use services::hours::{HoursReview, HoursVerdict};

#[derive(Debug, Deserialize)]
pub struct ReviewHoursBody {
    pub verdict: HoursVerdict,
    pub approved_hours: Option<f64>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
}

impl From<ReviewHoursBody> for HoursReview {
    fn from(body: ReviewHoursBody) -> Self {
        Self {
            verdict: body.verdict,
            approved_hours: body.approved_hours,
            rejection_reason: body.rejection_reason,
            notes: body.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkReviewHoursBody {
    pub request_ids: Vec<i64>,
    #[serde(flatten)]
    pub review: ReviewHoursBody,
}

#[derive(Debug, Deserialize)]
pub struct NotesBody {
    pub notes: Option<String>,
}
