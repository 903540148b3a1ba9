use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Upper bound on hours credited for a single session.
pub const MAX_SESSION_HOURS: f64 = 24.0;

/// One scheduled occurrence of an activity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub activity_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    /// Overrides the activity capacity for this occurrence.
    pub max_participants: Option<i32>,
    pub status: SessionStatus,
    #[serde(skip_serializing)]
    pub qr_code: Option<String>,
    pub qr_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SessionStatus {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::activity::Entity",
        from = "Column::ActivityId",
        to = "super::activity::Column::Id"
    )]
    Activity,
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Insert payload for a single session row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSession {
    pub activity_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub max_participants: Option<i32>,
}

impl Model {
    pub async fn create<C>(db: &C, new: NewSession) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        let active_model = ActiveModel {
            activity_id: Set(new.activity_id),
            date: Set(new.date),
            start_time: Set(new.start_time),
            end_time: Set(new.end_time),
            location: Set(new.location),
            max_participants: Set(new.max_participants),
            status: Set(SessionStatus::Scheduled),
            qr_code: Set(None),
            qr_expires_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find_for_activity<C>(db: &C, activity_id: i64) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::ActivityId.eq(activity_id))
            .order_by_asc(Column::Date)
            .order_by_asc(Column::StartTime)
            .all(db)
            .await
    }

    /// Whether a session already occupies this activity/date/start slot.
    pub async fn slot_taken<C>(
        db: &C,
        activity_id: i64,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let count = Entity::find()
            .filter(Column::ActivityId.eq(activity_id))
            .filter(Column::Date.eq(date))
            .filter(Column::StartTime.eq(start_time))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// Non-cancelled sessions dated on or before `today`.
    pub async fn count_held_until<C>(
        db: &C,
        activity_id: i64,
        today: NaiveDate,
    ) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::ActivityId.eq(activity_id))
            .filter(Column::Status.ne(SessionStatus::Cancelled))
            .filter(Column::Date.lte(today))
            .count(db)
            .await
    }

    pub async fn set_qr<C>(
        db: &C,
        id: i64,
        code: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let model = Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Session {id} not found")))?;

        let mut active_model: ActiveModel = model.into();
        active_model.qr_code = Set(code);
        active_model.qr_expires_at = Set(expires_at);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }

    /// Soft-cancels the session; returns `false` if it was already cancelled.
    pub async fn cancel<C>(db: &C, id: i64) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let res = Entity::update_many()
            .col_expr(Column::Status, Expr::value(SessionStatus::Cancelled))
            .col_expr(Column::QrCode, Expr::value(Option::<String>::None))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.ne(SessionStatus::Cancelled))
            .exec(db)
            .await?;
        Ok(res.rows_affected == 1)
    }

    /// Length of the time window in hours, clamped to `(0, 24]`.
    pub fn duration_hours(&self) -> f64 {
        let minutes = (self.end_time - self.start_time).num_minutes();
        (minutes as f64 / 60.0).clamp(0.0, MAX_SESSION_HOURS)
    }

    /// No QR payload means attendance is taken manually.
    pub fn is_manual_only(&self) -> bool {
        self.qr_code.is_none()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == SessionStatus::Cancelled
    }
}
