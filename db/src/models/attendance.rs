use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One check-in of an enrollment at a session. Keyed by the pair, so a second
/// insert for the same pair fails at the storage layer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub enrollment_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: i64,
    pub student_id: i64,
    pub method: CheckInMethod,
    pub status: AttendanceStatus,
    pub checked_in_at: DateTime<Utc>,
    pub checked_in_by: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub hours_credited: f64,
    /// True once a professor replaced the derived hours.
    pub hours_overridden: bool,
    pub notes: Option<String>,
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
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CheckInMethod {
    #[sea_orm(string_value = "qr")]
    Qr,
    #[sea_orm(string_value = "manual")]
    Manual,
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
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "absent")]
    Absent,
    #[sea_orm(string_value = "excused")]
    Excused,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::enrollment::Entity",
        from = "Column::EnrollmentId",
        to = "super::enrollment::Column::Id"
    )]
    Enrollment,
    #[sea_orm(
        belongs_to = "super::session::Entity",
        from = "Column::SessionId",
        to = "super::session::Column::Id"
    )]
    Session,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub enrollment_id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub method: CheckInMethod,
    pub checked_in_by: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub hours_credited: f64,
}

impl Model {
    /// Plain insert. Callers rely on the composite key to reject duplicates.
    pub async fn create<C>(db: &C, new: NewAttendance) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        let active_model = ActiveModel {
            enrollment_id: Set(new.enrollment_id),
            session_id: Set(new.session_id),
            student_id: Set(new.student_id),
            method: Set(new.method),
            status: Set(AttendanceStatus::Present),
            checked_in_at: Set(now),
            checked_in_by: Set(new.checked_in_by),
            latitude: Set(new.latitude),
            longitude: Set(new.longitude),
            accuracy: Set(new.accuracy),
            hours_credited: Set(new.hours_credited),
            hours_overridden: Set(false),
            notes: Set(None),
            updated_at: Set(now),
        };

        active_model.insert(db).await
    }

    pub async fn find<C>(db: &C, enrollment_id: i64, session_id: i64) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find_by_id((enrollment_id, session_id)).one(db).await
    }

    pub async fn list_for_enrollment<C>(db: &C, enrollment_id: i64) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::EnrollmentId.eq(enrollment_id))
            .order_by_asc(Column::CheckedInAt)
            .all(db)
            .await
    }

    pub async fn count_present<C>(db: &C, enrollment_id: i64) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::EnrollmentId.eq(enrollment_id))
            .filter(Column::Status.eq(AttendanceStatus::Present))
            .count(db)
            .await
    }

    /// Professor correction. `None` leaves the field as it was.
    pub async fn correct<C>(
        db: &C,
        enrollment_id: i64,
        session_id: i64,
        status: Option<AttendanceStatus>,
        hours: Option<f64>,
        notes: Option<String>,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let model = Self::find(db, enrollment_id, session_id)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "Attendance for enrollment {enrollment_id} at session {session_id} not found"
                ))
            })?;

        let mut active_model: ActiveModel = model.into();
        if let Some(status) = status {
            active_model.status = Set(status);
        }
        if let Some(hours) = hours {
            active_model.hours_credited = Set(hours);
            active_model.hours_overridden = Set(true);
        }
        if notes.is_some() {
            active_model.notes = Set(notes);
        }
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }
}
