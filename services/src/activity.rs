use crate::context::ActingUser;
use crate::error::{ServiceError, ServiceResult};
use chrono::{NaiveDate, Utc};
use db::models::activity::{self, ActivityStatus, NewActivity};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};

#[derive(Debug, Clone)]
pub struct ActivityInput {
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
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ActivityChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub auto_accept: Option<bool>,
    pub required_hours: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn check_required_hours(hours: Option<f64>) -> ServiceResult<()> {
    match hours {
        Some(h) if !h.is_finite() || h < 0.0 => Err(ServiceError::validation(
            "required_hours must be zero or more",
        )),
        _ => Ok(()),
    }
}

fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> ServiceResult<()> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(ServiceError::InvalidRange(format!(
            "end date {e} is before start date {s}"
        ))),
        _ => Ok(()),
    }
}

pub struct ActivityService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ActivityService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: i64) -> ServiceResult<activity::Model> {
        activity::Model::find_live(self.db, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Activity {id}")))
    }

    pub async fn list(&self) -> ServiceResult<Vec<activity::Model>> {
        Ok(activity::Model::list_live(self.db).await?)
    }

    /// Loads the activity and checks that `actor` may manage it.
    pub async fn get_for_review(
        &self,
        actor: &ActingUser,
        id: i64,
    ) -> ServiceResult<activity::Model> {
        let activity = self.get(id).await?;
        actor.require_reviewer(&activity)?;
        Ok(activity)
    }

    pub async fn create(
        &self,
        actor: &ActingUser,
        input: ActivityInput,
    ) -> ServiceResult<activity::Model> {
        if !actor.can_create_activities() {
            return Err(ServiceError::forbidden(
                "Only professors and admins can create activities",
            ));
        }
        if input.title.trim().is_empty() {
            return Err(ServiceError::validation("title cannot be empty"));
        }
        if input.max_participants < 1 {
            return Err(ServiceError::validation(
                "max_participants must be at least 1",
            ));
        }
        check_required_hours(input.required_hours)?;
        check_dates(input.start_date, input.end_date)?;

        let created = activity::Model::create(
            self.db,
            NewActivity {
                title: input.title.trim().to_owned(),
                description: input.description,
                category: input.category,
                department: input.department,
                location: input.location,
                max_participants: input.max_participants,
                auto_accept: input.auto_accept,
                required_hours: input.required_hours,
                start_date: input.start_date,
                end_date: input.end_date,
                created_by: actor.id,
            },
        )
        .await?;

        tracing::info!(activity_id = created.id, created_by = actor.id, "Activity created");
        Ok(created)
    }

    pub async fn update(
        &self,
        actor: &ActingUser,
        id: i64,
        changes: ActivityChanges,
    ) -> ServiceResult<activity::Model> {
        let current = self.get_for_review(actor, id).await?;

        if let Some(title) = &changes.title {
            if title.trim().is_empty() {
                return Err(ServiceError::validation("title cannot be empty"));
            }
        }
        if let Some(max) = changes.max_participants {
            if max < 1 {
                return Err(ServiceError::validation(
                    "max_participants must be at least 1",
                ));
            }
        }
        check_required_hours(changes.required_hours)?;
        check_dates(
            changes.start_date.or(current.start_date),
            changes.end_date.or(current.end_date),
        )?;

        let txn = self.db.begin().await?;
        if let Some(max) = changes.max_participants {
            if !activity::Model::set_capacity(&txn, id, max).await? {
                return Err(ServiceError::validation(
                    "max_participants cannot drop below the confirmed participants",
                ));
            }
        }

        let mut model: activity::ActiveModel = current.into();
        if let Some(v) = changes.title {
            model.title = Set(v.trim().to_owned());
        }
        if let Some(v) = changes.description {
            model.description = Set(v);
        }
        if let Some(v) = changes.category {
            model.category = Set(v);
        }
        if let Some(v) = changes.department {
            model.department = Set(Some(v));
        }
        if let Some(v) = changes.location {
            model.location = Set(v);
        }
        if let Some(v) = changes.auto_accept {
            model.auto_accept = Set(v);
        }
        if let Some(v) = changes.required_hours {
            model.required_hours = Set(Some(v));
        }
        if let Some(v) = changes.start_date {
            model.start_date = Set(Some(v));
        }
        if let Some(v) = changes.end_date {
            model.end_date = Set(Some(v));
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Explicit professor status change. Cancelled and completed are final.
    pub async fn set_status(
        &self,
        actor: &ActingUser,
        id: i64,
        status: ActivityStatus,
    ) -> ServiceResult<activity::Model> {
        let current = self.get_for_review(actor, id).await?;
        let is_final = matches!(
            current.status,
            ActivityStatus::Cancelled | ActivityStatus::Completed
        );
        if is_final && status != current.status {
            return Err(ServiceError::transition(current.status, status));
        }

        let updated = activity::Model::set_status(self.db, id, status).await?;
        tracing::info!(activity_id = id, status = %status, "Activity status changed");
        Ok(updated)
    }

    pub async fn delete(&self, actor: &ActingUser, id: i64) -> ServiceResult<()> {
        self.get_for_review(actor, id).await?;
        activity::Model::soft_delete(self.db, id).await?;
        tracing::info!(activity_id = id, deleted_by = actor.id, "Activity soft-deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, date};
    use db::models::user::Role;

    fn input() -> ActivityInput {
        ActivityInput {
            title: "  Soup kitchen  ".into(),
            description: "Serve dinner".into(),
            category: "community".into(),
            department: None,
            location: "Hatfield".into(),
            max_participants: 12,
            auto_accept: true,
            required_hours: Some(8.0),
            start_date: Some(date(2025, 8, 1)),
            end_date: Some(date(2025, 9, 1)),
        }
    }

    #[tokio::test]
    async fn test_create_validates_and_records_creator() {
        let fx = Fixture::new().await;
        let svc = ActivityService::new(&fx.db);

        let created = svc.create(&fx.prof_actor(), input()).await.unwrap();
        assert_eq!(created.title, "Soup kitchen");
        assert_eq!(created.created_by, fx.prof.id);
        assert_eq!(created.current_participants, 0);

        let err = svc.create(&fx.student_actor(), input()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let mut bad = input();
        bad.end_date = Some(date(2025, 7, 1));
        assert!(matches!(
            svc.create(&fx.prof_actor(), bad).await,
            Err(ServiceError::InvalidRange(_))
        ));

        let mut bad = input();
        bad.max_participants = 0;
        assert!(matches!(
            svc.create(&fx.prof_actor(), bad).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_is_reviewer_only_and_respects_confirmed_count() {
        let fx = Fixture::new().await;
        let svc = ActivityService::new(&fx.db);
        fx.confirmed(fx.student.id).await;

        let other_prof = fx.new_user("other_prof", Role::Professor).await;
        let outsider = ActingUser::new(other_prof.id, Role::Professor);
        let err = svc
            .update(&outsider, fx.activity.id, ActivityChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = svc
            .update(
                &fx.prof_actor(),
                fx.activity.id,
                ActivityChanges {
                    max_participants: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let updated = svc
            .update(
                &fx.admin_actor(),
                fx.activity.id,
                ActivityChanges {
                    location: Some("Garden plot C".into()),
                    max_participants: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.location, "Garden plot C");
        assert_eq!(updated.max_participants, 1);
    }

    #[tokio::test]
    async fn test_capacity_shrink_is_checked_against_live_count() {
        let fx = Fixture::with_activity(3, Some(10.0), false).await;
        let svc = ActivityService::new(&fx.db);
        fx.confirmed(fx.student.id).await;
        let second = fx.new_user("second_student", Role::Student).await;
        fx.confirmed(second.id).await;

        let err = svc
            .update(
                &fx.prof_actor(),
                fx.activity.id,
                ActivityChanges {
                    location: Some("Somewhere else".into()),
                    max_participants: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let reloaded = fx.reload_activity().await;
        assert_eq!(reloaded.max_participants, 3);
        assert_eq!(reloaded.current_participants, 2);
        assert_ne!(reloaded.location, "Somewhere else");

        let updated = svc
            .update(
                &fx.prof_actor(),
                fx.activity.id,
                ActivityChanges {
                    max_participants: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.max_participants, 2);
        assert_eq!(updated.seats_left(), 0);
    }

    #[tokio::test]
    async fn test_completed_cannot_be_reopened() {
        let fx = Fixture::new().await;
        let svc = ActivityService::new(&fx.db);
        let actor = fx.prof_actor();

        svc.set_status(&actor, fx.activity.id, ActivityStatus::Completed)
            .await
            .unwrap();
        for next in [ActivityStatus::Open, ActivityStatus::InProgress, ActivityStatus::Cancelled] {
            let err = svc.set_status(&actor, fx.activity.id, next).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidStateTransition { .. }));
        }
        assert_eq!(fx.reload_activity().await.status, ActivityStatus::Completed);

        // Re-asserting the current status is a no-op.
        svc.set_status(&actor, fx.activity.id, ActivityStatus::Completed)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_is_sticky_and_delete_is_soft() {
        let fx = Fixture::new().await;
        let svc = ActivityService::new(&fx.db);
        let actor = fx.prof_actor();

        svc.set_status(&actor, fx.activity.id, ActivityStatus::Cancelled)
            .await
            .unwrap();
        let err = svc
            .set_status(&actor, fx.activity.id, ActivityStatus::Open)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidStateTransition { .. }));

        svc.delete(&actor, fx.activity.id).await.unwrap();
        assert!(matches!(
            svc.get(fx.activity.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(fx.reload_activity().await.deleted_at.is_some());
    }
}
