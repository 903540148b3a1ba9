use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A student's claim for volunteer hours, reviewed by a professor.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "hours_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub enrollment_id: i64,
    pub activity_id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    /// Hours claimed by the student.
    pub hours: f64,
    /// Hours granted on approval; may be lower than `hours`.
    pub approved_hours: Option<f64>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// JSON array of evidence links.
    #[sea_orm(column_type = "Json")]
    pub evidence_urls: Json,
    pub status: HoursStatus,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub professor_notes: Option<String>,
    pub rejection_reason: Option<String>,
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
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HoursStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
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
        belongs_to = "super::activity::Entity",
        from = "Column::ActivityId",
        to = "super::activity::Column::Id"
    )]
    Activity,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone)]
pub struct NewHoursRequest {
    pub enrollment_id: i64,
    pub activity_id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    pub hours: f64,
    pub description: String,
    pub evidence_urls: Vec<String>,
}

/// Terminal outcome written by [`Model::decide`].
#[derive(Debug, Clone)]
pub struct HoursDecision {
    pub status: HoursStatus,
    pub approved_hours: Option<f64>,
    pub reviewed_by: i64,
    pub rejection_reason: Option<String>,
    pub professor_notes: Option<String>,
}

impl Model {
    pub async fn create<C>(db: &C, new: NewHoursRequest) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        let active_model = ActiveModel {
            enrollment_id: Set(new.enrollment_id),
            activity_id: Set(new.activity_id),
            student_id: Set(new.student_id),
            date: Set(new.date),
            hours: Set(new.hours),
            approved_hours: Set(None),
            description: Set(new.description),
            evidence_urls: Set(serde_json::json!(new.evidence_urls)),
            status: Set(HoursStatus::Pending),
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

    pub async fn list_for_enrollment<C>(db: &C, enrollment_id: i64) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::EnrollmentId.eq(enrollment_id))
            .order_by_asc(Column::Date)
            .all(db)
            .await
    }

    /// Writes a terminal decision only if the request is still pending.
    ///
    /// Returns `false` when another reviewer got there first.
    pub async fn decide<C>(db: &C, id: i64, decision: HoursDecision) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        let mut update = Entity::update_many()
            .col_expr(Column::Status, Expr::value(decision.status))
            .col_expr(Column::ApprovedHours, Expr::value(decision.approved_hours))
            .col_expr(Column::ReviewedBy, Expr::value(decision.reviewed_by))
            .col_expr(Column::ReviewedAt, Expr::value(now))
            .col_expr(
                Column::RejectionReason,
                Expr::value(decision.rejection_reason),
            )
            .col_expr(Column::UpdatedAt, Expr::value(now));

        if decision.professor_notes.is_some() {
            update = update.col_expr(
                Column::ProfessorNotes,
                Expr::value(decision.professor_notes),
            );
        }

        let res = update
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(HoursStatus::Pending))
            .exec(db)
            .await?;

        Ok(res.rows_affected == 1)
    }

    /// Notes stay editable in every state.
    pub async fn set_notes<C>(db: &C, id: i64, notes: Option<String>) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let model = Self::find(db, id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Hours request {id} not found")))?;

        let mut active_model: ActiveModel = model.into();
        active_model.professor_notes = Set(notes);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }

    /// Sum of granted hours over the enrollment's approved requests.
    pub async fn approved_total<C>(db: &C, enrollment_id: i64) -> Result<f64, DbErr>
    where
        C: ConnectionTrait,
    {
        let approved = Entity::find()
            .filter(Column::EnrollmentId.eq(enrollment_id))
            .filter(Column::Status.eq(HoursStatus::Approved))
            .all(db)
            .await?;

        Ok(approved.iter().map(Model::granted_hours).sum())
    }

    pub fn granted_hours(&self) -> f64 {
        match self.status {
            HoursStatus::Approved => self.approved_hours.unwrap_or(self.hours),
            HoursStatus::Pending | HoursStatus::Rejected => 0.0,
        }
    }

    pub fn evidence(&self) -> Vec<String> {
        serde_json::from_value(self.evidence_urls.clone()).unwrap_or_default()
    }
}
