use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A volunteer opportunity published by a professor or admin.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: String,
    pub department: Option<String>,
    /// Default location for sessions that don't override it.
    pub location: String,
    pub max_participants: i32,
    /// Denormalized count of CONFIRMED enrollments. Only moved through
    /// [`Model::try_reserve_seat`] and [`Model::release_seat`].
    pub current_participants: i32,
    pub status: ActivityStatus,
    pub auto_accept: bool,
    pub required_hours: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
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
pub enum ActivityStatus {
    #[sea_orm(string_value = "open")]
    Open,
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
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Insert payload for [`Model::create`].
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub title: String,
    pub description: String,
    pub category: String,
    pub department: Option<String>,
    pub location: String,
    pub max_participants: i32,
    pub auto_accept: bool,
    pub required_hours: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: i64,
}

impl Model {
    pub async fn create<C>(db: &C, new: NewActivity) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        let active_model = ActiveModel {
            title: Set(new.title),
            description: Set(new.description),
            category: Set(new.category),
            department: Set(new.department),
            location: Set(new.location),
            max_participants: Set(new.max_participants),
            current_participants: Set(0),
            status: Set(ActivityStatus::Open),
            auto_accept: Set(new.auto_accept),
            required_hours: Set(new.required_hours),
            start_date: Set(new.start_date),
            end_date: Set(new.end_date),
            created_by: Set(new.created_by),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    /// Fetches an activity that has not been soft-deleted.
    pub async fn find_live<C>(db: &C, id: i64) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find_by_id(id)
            .filter(Column::DeletedAt.is_null())
            .one(db)
            .await
    }

    pub async fn list_live<C>(db: &C) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::DeletedAt.is_null())
            .order_by_desc(Column::CreatedAt)
            .all(db)
            .await
    }

    /// Takes one seat if any is left, as a single conditional `UPDATE`.
    ///
    /// Returns `false` when the activity is full (or gone); the counter is
    /// never read into application code first.
    pub async fn try_reserve_seat<C>(db: &C, id: i64) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let res = Entity::update_many()
            .col_expr(
                Column::CurrentParticipants,
                Expr::col(Column::CurrentParticipants).add(1),
            )
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .filter(Column::DeletedAt.is_null())
            .filter(
                Expr::col(Column::CurrentParticipants).lt(Expr::col(Column::MaxParticipants)),
            )
            .exec(db)
            .await?;

        Ok(res.rows_affected == 1)
    }

    /// Gives a seat back. Bounded at zero.
    pub async fn release_seat<C>(db: &C, id: i64) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let res = Entity::update_many()
            .col_expr(
                Column::CurrentParticipants,
                Expr::col(Column::CurrentParticipants).sub(1),
            )
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .filter(Column::CurrentParticipants.gt(0))
            .exec(db)
            .await?;

        Ok(res.rows_affected == 1)
    }

    /// Sets a new seat limit unless it would fall below the seats already taken.
    /// The check and the write are one statement, so a concurrent reservation
    /// cannot slip in between.
    pub async fn set_capacity<C>(db: &C, id: i64, max_participants: i32) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let res = Entity::update_many()
            .col_expr(Column::MaxParticipants, Expr::value(max_participants))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .filter(Column::DeletedAt.is_null())
            .filter(Column::CurrentParticipants.lte(max_participants))
            .exec(db)
            .await?;

        Ok(res.rows_affected == 1)
    }

    pub async fn set_status<C>(db: &C, id: i64, status: ActivityStatus) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let model = Self::find_live(db, id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Activity {id} not found")))?;

        let mut active_model: ActiveModel = model.into();
        active_model.status = Set(status);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }

    /// Tombstones the activity. Rows referencing it are left untouched.
    pub async fn soft_delete<C>(db: &C, id: i64) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        let res = Entity::update_many()
            .col_expr(Column::DeletedAt, Expr::value(now))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::DeletedAt.is_null())
            .exec(db)
            .await?;

        if res.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("Activity {id} not found")));
        }
        Ok(())
    }

    /// Status implied by the calendar. Cancelled and completed activities stay put.
    pub fn derived_status(&self, today: NaiveDate) -> ActivityStatus {
        match self.status {
            ActivityStatus::Cancelled | ActivityStatus::Completed => self.status,
            ActivityStatus::Open | ActivityStatus::InProgress => {
                if self.end_date.is_some_and(|end| today > end) {
                    ActivityStatus::Completed
                } else if self.start_date.is_some_and(|start| today >= start) {
                    ActivityStatus::InProgress
                } else {
                    self.status
                }
            }
        }
    }

    pub fn accepts_applications(&self) -> bool {
        self.deleted_at.is_none() && self.status == ActivityStatus::Open
    }

    pub fn seats_left(&self) -> i32 {
        (self.max_participants - self.current_participants).max(0)
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.created_by == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Model as UserModel, Role};
    use crate::test_utils::setup_test_db;

    fn new_activity(created_by: i64, max_participants: i32) -> NewActivity {
        NewActivity {
            title: "Campus Clean-up".into(),
            description: "Litter picking around the library".into(),
            category: "environment".into(),
            department: Some("Engineering".into()),
            location: "Main Library".into(),
            max_participants,
            auto_accept: false,
            required_hours: Some(10.0),
            start_date: None,
            end_date: None,
            created_by,
        }
    }

    #[tokio::test]
    async fn test_reserve_seat_stops_at_capacity() {
        let db = setup_test_db().await;
        let prof = UserModel::create(&db, "prof1", "prof1@test.com", "pw", Role::Professor)
            .await
            .unwrap();
        let activity = Model::create(&db, new_activity(prof.id, 2)).await.unwrap();

        assert!(Model::try_reserve_seat(&db, activity.id).await.unwrap());
        assert!(Model::try_reserve_seat(&db, activity.id).await.unwrap());
        assert!(!Model::try_reserve_seat(&db, activity.id).await.unwrap());

        let reloaded = Model::find_live(&db, activity.id).await.unwrap().unwrap();
        assert_eq!(reloaded.current_participants, 2);
        assert_eq!(reloaded.seats_left(), 0);
    }

    #[tokio::test]
    async fn test_set_capacity_refuses_seats_taken_after_read() {
        let db = setup_test_db().await;
        let prof = UserModel::create(&db, "prof4", "prof4@test.com", "pw", Role::Professor)
            .await
            .unwrap();
        let activity = Model::create(&db, new_activity(prof.id, 3)).await.unwrap();
        assert!(Model::try_reserve_seat(&db, activity.id).await.unwrap());

        // Capacity decided against a stale read of one seat taken.
        let stale = Model::find_live(&db, activity.id).await.unwrap().unwrap();
        assert_eq!(stale.current_participants, 1);
        assert!(Model::try_reserve_seat(&db, activity.id).await.unwrap());

        assert!(!Model::set_capacity(&db, activity.id, 1).await.unwrap());
        let reloaded = Model::find_live(&db, activity.id).await.unwrap().unwrap();
        assert_eq!(reloaded.max_participants, 3);
        assert_eq!(reloaded.current_participants, 2);

        assert!(Model::set_capacity(&db, activity.id, 2).await.unwrap());
        assert!(!Model::try_reserve_seat(&db, activity.id).await.unwrap());
        let reloaded = Model::find_live(&db, activity.id).await.unwrap().unwrap();
        assert_eq!(reloaded.max_participants, 2);
    }

    #[tokio::test]
    async fn test_release_seat_never_goes_negative() {
        let db = setup_test_db().await;
        let prof = UserModel::create(&db, "prof2", "prof2@test.com", "pw", Role::Professor)
            .await
            .unwrap();
        let activity = Model::create(&db, new_activity(prof.id, 1)).await.unwrap();

        assert!(!Model::release_seat(&db, activity.id).await.unwrap());
        assert!(Model::try_reserve_seat(&db, activity.id).await.unwrap());
        assert!(Model::release_seat(&db, activity.id).await.unwrap());

        let reloaded = Model::find_live(&db, activity.id).await.unwrap().unwrap();
        assert_eq!(reloaded.current_participants, 0);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_activity_and_blocks_seats() {
        let db = setup_test_db().await;
        let prof = UserModel::create(&db, "prof3", "prof3@test.com", "pw", Role::Professor)
            .await
            .unwrap();
        let activity = Model::create(&db, new_activity(prof.id, 5)).await.unwrap();

        Model::soft_delete(&db, activity.id).await.unwrap();
        assert!(Model::find_live(&db, activity.id).await.unwrap().is_none());
        assert!(!Model::try_reserve_seat(&db, activity.id).await.unwrap());
        assert!(Model::soft_delete(&db, activity.id).await.is_err());

        // Row is still there for anything that references it.
        assert!(Entity::find_by_id(activity.id).one(&db).await.unwrap().is_some());
    }

    #[test]
    fn test_derived_status_follows_calendar() {
        let date = |d: u32| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
        let now = Utc::now();
        let mut activity = Model {
            id: 1,
            title: "t".into(),
            description: "d".into(),
            category: "c".into(),
            department: None,
            location: "l".into(),
            max_participants: 10,
            current_participants: 0,
            status: ActivityStatus::Open,
            auto_accept: false,
            required_hours: None,
            start_date: Some(date(10)),
            end_date: Some(date(20)),
            created_by: 1,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        assert_eq!(activity.derived_status(date(9)), ActivityStatus::Open);
        assert_eq!(activity.derived_status(date(10)), ActivityStatus::InProgress);
        assert_eq!(activity.derived_status(date(20)), ActivityStatus::InProgress);
        assert_eq!(activity.derived_status(date(21)), ActivityStatus::Completed);

        activity.status = ActivityStatus::Cancelled;
        assert_eq!(activity.derived_status(date(15)), ActivityStatus::Cancelled);
    }
}
