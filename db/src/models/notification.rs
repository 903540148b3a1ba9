use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A persisted in-app notification.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub activity_id: Option<i64>,
    pub enrollment_id: Option<i64>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    #[sea_orm(string_value = "application_accepted")]
    ApplicationAccepted,
    #[sea_orm(string_value = "application_rejected")]
    ApplicationRejected,
    #[sea_orm(string_value = "application_waitlisted")]
    ApplicationWaitlisted,
    #[sea_orm(string_value = "application_promoted")]
    ApplicationPromoted,
    #[sea_orm(string_value = "hours_approved")]
    HoursApproved,
    #[sea_orm(string_value = "hours_rejected")]
    HoursRejected,
    #[sea_orm(string_value = "certificate_issued")]
    CertificateIssued,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub activity_id: Option<i64>,
    pub enrollment_id: Option<i64>,
}

impl Model {
    pub async fn create<C>(db: &C, new: NewNotification) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let active_model = ActiveModel {
            user_id: Set(new.user_id),
            kind: Set(new.kind),
            title: Set(new.title),
            message: Set(new.message),
            activity_id: Set(new.activity_id),
            enrollment_id: Set(new.enrollment_id),
            read: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    /// Newest first.
    pub async fn list_for_user<C>(db: &C, user_id: i64) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(db)
            .await
    }

    pub async fn mark_read<C>(db: &C, id: i64, user_id: i64) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let res = Entity::update_many()
            .col_expr(Column::Read, Expr::value(true))
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(res.rows_affected == 1)
    }
}
