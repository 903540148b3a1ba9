use chrono::{DateTime, NaiveDate, Utc};
use db::models::activity::{self, ActivityStatus};
use serde::{Deserialize, Serialize};
use services::activity::{ActivityChanges, ActivityInput};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateActivityRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub department: Option<String>,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(range(min = 1, message = "max_participants must be at least 1"))]
    pub max_participants: i32,
    #[serde(default)]
    pub auto_accept: bool,
    #[validate(range(min = 0.0, message = "required_hours cannot be negative"))]
    pub required_hours: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<CreateActivityRequest> for ActivityInput {
    fn from(req: CreateActivityRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            category: req.category,
            department: req.department,
            location: req.location,
            max_participants: req.max_participants,
            auto_accept: req.auto_accept,
            required_hours: req.required_hours,
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateActivityRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
    pub category: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = 1, message = "max_participants must be at least 1"))]
    pub max_participants: Option<i32>,
    pub auto_accept: Option<bool>,
    #[validate(range(min = 0.0, message = "required_hours cannot be negative"))]
    pub required_hours: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<UpdateActivityRequest> for ActivityChanges {
    fn from(req: UpdateActivityRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            category: req.category,
            department: req.department,
            location: req.location,
            max_participants: req.max_participants,
            auto_accept: req.auto_accept,
            required_hours: req.required_hours,
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: ActivityStatus,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub department: Option<String>,
    pub location: String,
    pub max_participants: i32,
    pub current_participants: i32,
    pub seats_left: i32,
    /// Stored status adjusted for today's date.
    pub status: ActivityStatus,
    pub auto_accept: bool,
    pub required_hours: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActivityResponse {
    pub fn new(m: activity::Model, today: NaiveDate) -> Self {
        Self {
            status: m.derived_status(today),
            seats_left: m.seats_left(),
            id: m.id,
            title: m.title,
            description: m.description,
            category: m.category,
            department: m.department,
            location: m.location,
            max_participants: m.max_participants,
            current_participants: m.current_participants,
            auto_accept: m.auto_accept,
            required_hours: m.required_hours,
            start_date: m.start_date,
            end_date: m.end_date,
            created_by: m.created_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
