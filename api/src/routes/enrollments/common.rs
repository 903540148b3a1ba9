use chrono::NaiveDate;
use db::models::attendance;
use serde::{Deserialize, Serialize};
use services::attendance::AttendanceSummary;
use services::hours::HoursSubmission;

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    #[serde(flatten)]
    pub summary: AttendanceSummary,
    pub records: Vec<attendance::Model>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitHoursRequest {
    pub date: NaiveDate,
    pub hours: f64,
    pub description: String,
    #[serde(default)]
    pub evidence_urls: Vec<String>,
}

impl From<SubmitHoursRequest> for HoursSubmission {
    fn from(req: SubmitHoursRequest) -> Self {
        Self {
            date: req.date,
            hours: req.hours,
            description: req.description,
            evidence_urls: req.evidence_urls,
        }
    }
}
