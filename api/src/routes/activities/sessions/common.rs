use crate::response::ApiError;
use crate::routes::common::{parse_time, parse_weekday};
use chrono::NaiveDate;
use db::models::attendance::{AttendanceStatus, CheckInMethod};
use serde::Deserialize;
use services::attendance::{AttendanceCorrection, CheckInRequest};
use services::session::SessionInput;
use services::session_generator::{Frequency, RecurrencePattern};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
}

impl CreateSessionRequest {
    pub fn into_input(self) -> Result<SessionInput, ApiError> {
        Ok(SessionInput {
            date: self.date,
            start_time: parse_time("start_time", &self.start_time)?,
            end_time: parse_time("end_time", &self.end_time)?,
            location: self.location,
            max_participants: self.max_participants,
        })
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyKind {
    Weekly,
    Biweekly,
    Custom,
}

/// Body of both `/recurring` and `/preview`.
///
/// ```json
/// {
///   "start_date": "2025-03-03",
///   "end_date": "2025-03-31",
///   "start_time": "14:00",
///   "end_time": "16:00",
///   "frequency": "custom",
///   "days": ["tue", "thu"]
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct RecurringRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub frequency: FrequencyKind,
    /// Only read for `custom`.
    #[serde(default)]
    pub days: Vec<String>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
}

impl RecurringRequest {
    pub fn into_pattern(self) -> Result<RecurrencePattern, ApiError> {
        let frequency = match self.frequency {
            FrequencyKind::Weekly => Frequency::Weekly,
            FrequencyKind::Biweekly => Frequency::Biweekly,
            FrequencyKind::Custom => Frequency::Custom(
                self.days
                    .iter()
                    .map(|d| parse_weekday(d))
                    .collect::<Result<_, _>>()?,
            ),
        };

        Ok(RecurrencePattern {
            start_date: self.start_date,
            end_date: self.end_date,
            start_time: parse_time("start_time", &self.start_time)?,
            end_time: parse_time("end_time", &self.end_time)?,
            frequency,
            location: self.location,
            max_participants: self.max_participants,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckInBody {
    /// Students may leave this out; their live enrollment is looked up.
    pub enrollment_id: Option<i64>,
    pub method: CheckInMethod,
    pub code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
}

impl CheckInBody {
    pub fn request(&self) -> CheckInRequest {
        CheckInRequest {
            method: self.method,
            code: self.code.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy: self.accuracy,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CorrectionBody {
    pub status: Option<AttendanceStatus>,
    pub hours: Option<f64>,
    pub notes: Option<String>,
}

impl From<CorrectionBody> for AttendanceCorrection {
    fn from(body: CorrectionBody) -> Self {
        Self {
            status: body.status,
            hours: body.hours,
            notes: body.notes,
        }
    }
}
