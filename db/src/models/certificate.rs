use chrono::{DateTime, Datelike, Utc};
use rand::{Rng, distributions::Alphanumeric};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, Set};
use serde::Serialize;

/// Proof of completion, one per enrollment. Never updated after insert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "certificates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub enrollment_id: i64,
    #[sea_orm(unique)]
    pub certificate_number: String,
    pub total_hours: f64,
    pub issued_at: DateTime<Utc>,
    pub issued_by: i64,
    pub artifact_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::enrollment::Entity",
        from = "Column::EnrollmentId",
        to = "super::enrollment::Column::Id"
    )]
    Enrollment,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone)]
pub struct NewCertificate {
    pub enrollment_id: i64,
    pub certificate_number: String,
    pub total_hours: f64,
    pub issued_by: i64,
    pub artifact_url: Option<String>,
}

impl Model {
    pub async fn create<C>(db: &C, new: NewCertificate) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let active_model = ActiveModel {
            enrollment_id: Set(new.enrollment_id),
            certificate_number: Set(new.certificate_number),
            total_hours: Set(new.total_hours),
            issued_at: Set(Utc::now()),
            issued_by: Set(new.issued_by),
            artifact_url: Set(new.artifact_url),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find_by_enrollment<C>(db: &C, enrollment_id: i64) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::EnrollmentId.eq(enrollment_id))
            .one(db)
            .await
    }

    /// Builds a number such as `CC-2025-7F3K9QAZ`.
    pub fn generate_number(prefix: &str) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();
        format!("{prefix}-{}-{suffix}", Utc::now().year())
    }
}
