use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A student's application/participation record for one activity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub activity_id: i64,
    #[sea_orm(column_type = "Text")]
    pub motivation: String,
    pub availability: Option<String>,
    pub experience: Option<String>,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Set once a certificate has been issued.
    pub validated_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_message: Option<String>,
    pub rejection_reason: Option<String>,
    pub feedback_submitted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
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
pub enum EnrollmentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "waitlisted")]
    Waitlisted,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl EnrollmentStatus {
    /// Edges of the enrollment state machine.
    pub fn can_transition_to(self, to: EnrollmentStatus) -> bool {
        use EnrollmentStatus::*;
        matches!(
            (self, to),
            (Pending, Confirmed | Waitlisted | Cancelled)
                | (Waitlisted, Confirmed | Cancelled)
                | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == EnrollmentStatus::Cancelled
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::activity::Entity",
        from = "Column::ActivityId",
        to = "super::activity::Column::Id"
    )]
    Activity,
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
    #[sea_orm(has_many = "super::hours_request::Entity")]
    HoursRequests,
    #[sea_orm(has_one = "super::certificate::Entity")]
    Certificate,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
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

impl Related<super::hours_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HoursRequests.def()
    }
}

impl Related<super::certificate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Certificate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Application fields submitted by the student.
#[derive(Debug, Clone, Default)]
pub struct NewEnrollment {
    pub student_id: i64,
    pub activity_id: i64,
    pub motivation: String,
    pub availability: Option<String>,
    pub experience: Option<String>,
}

/// Audit fields recorded alongside a reviewer-driven transition.
#[derive(Debug, Clone, Default)]
pub struct ReviewStamp {
    pub reviewed_by: i64,
    pub message: Option<String>,
    pub rejection_reason: Option<String>,
}

impl Model {
    pub async fn create<C>(db: &C, new: NewEnrollment) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        let active_model = ActiveModel {
            student_id: Set(new.student_id),
            activity_id: Set(new.activity_id),
            motivation: Set(new.motivation),
            availability: Set(new.availability),
            experience: Set(new.experience),
            status: Set(EnrollmentStatus::Pending),
            enrolled_at: Set(now),
            feedback_submitted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find<C>(db: &C, id: i64) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find_by_id(id).one(db).await
    }

    /// The single non-cancelled enrollment for a (student, activity) pair, if any.
    pub async fn find_live<C>(
        db: &C,
        student_id: i64,
        activity_id: i64,
    ) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::ActivityId.eq(activity_id))
            .filter(Column::Status.ne(EnrollmentStatus::Cancelled))
            .one(db)
            .await
    }

    pub async fn list_for_activity<C>(
        db: &C,
        activity_id: i64,
        status: Option<EnrollmentStatus>,
    ) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut query = Entity::find().filter(Column::ActivityId.eq(activity_id));
        if let Some(status) = status {
            query = query.filter(Column::Status.eq(status));
        }
        query.order_by_asc(Column::EnrolledAt).all(db).await
    }

    /// A student's enrollments across all activities, newest first.
    pub async fn list_for_student<C>(db: &C, student_id: i64) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::EnrolledAt)
            .order_by_desc(Column::Id)
            .all(db)
            .await
    }

    /// Moves the enrollment from `from` to `to` with a single conditional `UPDATE`.
    ///
    /// Returns `false` when the row was not in `from` any more (or does not
    /// exist); nothing is written in that case.
    pub async fn transition<C>(
        db: &C,
        id: i64,
        from: EnrollmentStatus,
        to: EnrollmentStatus,
        stamp: Option<ReviewStamp>,
    ) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        let mut update = Entity::update_many()
            .col_expr(Column::Status, Expr::value(to))
            .col_expr(Column::UpdatedAt, Expr::value(now));

        if to == EnrollmentStatus::Cancelled {
            update = update.col_expr(Column::CancelledAt, Expr::value(now));
        }

        if let Some(stamp) = stamp {
            let cols: [(Column, SimpleExpr); 4] = [
                (Column::ReviewedBy, Expr::value(stamp.reviewed_by)),
                (Column::ReviewedAt, Expr::value(now)),
                (Column::ReviewMessage, Expr::value(stamp.message)),
                (Column::RejectionReason, Expr::value(stamp.rejection_reason)),
            ];
            for (col, value) in cols {
                update = update.col_expr(col, value);
            }
        }

        let res = update
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(from))
            .exec(db)
            .await?;

        Ok(res.rows_affected == 1)
    }

    /// Stamps `validated_at` once; later calls leave the first stamp alone.
    pub async fn mark_validated<C>(db: &C, id: i64) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        Entity::update_many()
            .col_expr(Column::ValidatedAt, Expr::value(now))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::ValidatedAt.is_null())
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn set_feedback_submitted<C>(db: &C, id: i64) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let model = Self::find(db, id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Enrollment {id} not found")))?;

        let mut active_model: ActiveModel = model.into();
        active_model.feedback_submitted = Set(true);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }
}
