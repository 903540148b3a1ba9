use crate::response::ApiError;
use chrono::{NaiveDate, NaiveTime, Utc, Weekday};
use db::models::user;
use serde::Serialize;

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(field: &str, raw: &str) -> Result<NaiveTime, ApiError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ApiError::unprocessable(format!("{field} must be a time like 09:30")))
}

/// Accepts `mon`, `Monday`, `TUE` and so on.
pub fn parse_weekday(raw: &str) -> Result<Weekday, ApiError> {
    raw.trim()
        .parse::<Weekday>()
        .map_err(|_| ApiError::unprocessable(format!("'{raw}' is not a weekday")))
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: user::Role,
    pub department: Option<String>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            department: user.department,
        }
    }
}
