use crate::context::ActingUser;
use crate::notifier::RecordingNotifier;
use chrono::{NaiveDate, NaiveTime};
use db::models::activity::{self, NewActivity};
use db::models::enrollment::{self, EnrollmentStatus, NewEnrollment};
use db::models::session::{self, NewSession};
use db::models::user::{self, Role};
use db::test_utils::setup_test_db;
use sea_orm::{DatabaseConnection, EntityTrait};

/// A professor-owned activity with one student, on a fresh in-memory database.
pub struct Fixture {
    pub db: DatabaseConnection,
    pub notifier: RecordingNotifier,
    pub prof: user::Model,
    pub admin: user::Model,
    pub student: user::Model,
    pub activity: activity::Model,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_activity(2, Some(10.0), false).await
    }

    pub async fn with_activity(
        max_participants: i32,
        required_hours: Option<f64>,
        auto_accept: bool,
    ) -> Self {
        let db = setup_test_db().await;
        let prof = user::Model::create(&db, "prof", "prof@up.ac.za", "pw", Role::Professor)
            .await
            .unwrap();
        let admin = user::Model::create(&db, "admin", "admin@up.ac.za", "pw", Role::Admin)
            .await
            .unwrap();
        let student = user::Model::create(&db, "student", "student@up.ac.za", "pw", Role::Student)
            .await
            .unwrap();
        let activity = activity::Model::create(
            &db,
            NewActivity {
                title: "Community garden".into(),
                description: "Weekly planting and weeding".into(),
                category: "environment".into(),
                department: Some("Botany".into()),
                location: "Garden plot B".into(),
                max_participants,
                auto_accept,
                required_hours,
                start_date: None,
                end_date: None,
                created_by: prof.id,
            },
        )
        .await
        .unwrap();

        Self {
            db,
            notifier: RecordingNotifier::new(),
            prof,
            admin,
            student,
            activity,
        }
    }

    pub fn prof_actor(&self) -> ActingUser {
        ActingUser::new(self.prof.id, Role::Professor)
    }

    pub fn admin_actor(&self) -> ActingUser {
        ActingUser::new(self.admin.id, Role::Admin)
    }

    pub fn student_actor(&self) -> ActingUser {
        ActingUser::new(self.student.id, Role::Student)
    }

    pub async fn new_user(&self, username: &str, role: Role) -> user::Model {
        user::Model::create(
            &self.db,
            username,
            &format!("{username}@up.ac.za"),
            "pw",
            role,
        )
        .await
        .unwrap()
    }

    /// Inserts a PENDING enrollment directly.
    pub async fn apply(&self, student_id: i64) -> enrollment::Model {
        enrollment::Model::create(
            &self.db,
            NewEnrollment {
                student_id,
                activity_id: self.activity.id,
                motivation: "I would like to help out".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    /// Inserts an enrollment and confirms it, taking a seat.
    pub async fn confirmed(&self, student_id: i64) -> enrollment::Model {
        let e = self.apply(student_id).await;
        assert!(
            enrollment::Model::transition(
                &self.db,
                e.id,
                EnrollmentStatus::Pending,
                EnrollmentStatus::Confirmed,
                None,
            )
            .await
            .unwrap()
        );
        assert!(
            activity::Model::try_reserve_seat(&self.db, self.activity.id)
                .await
                .unwrap()
        );
        self.reload_enrollment(e.id).await
    }

    pub async fn session_on(&self, date: NaiveDate, start: (u32, u32), end: (u32, u32)) -> session::Model {
        session::Model::create(
            &self.db,
            NewSession {
                activity_id: self.activity.id,
                date,
                start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
                location: self.activity.location.clone(),
                max_participants: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn reload_enrollment(&self, id: i64) -> enrollment::Model {
        enrollment::Model::find(&self.db, id).await.unwrap().unwrap()
    }

    pub async fn reload_activity(&self) -> activity::Model {
        activity::Entity::find_by_id(self.activity.id)
            .one(&self.db)
            .await
            .unwrap()
            .unwrap()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
