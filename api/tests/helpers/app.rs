use api::auth::generate_jwt;
use api::routes::routes;
use api::state::AppState;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use db::models::user::{self, Role};
use db::test_utils::setup_test_db;
use serde_json::Value;
use services::certificate::UrlRenderer;
use services::notifier::RecordingNotifier;
use std::sync::Arc;
use tower::ServiceExt;
use util::test_helpers::setup_test_env;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
}

/// Fresh in-memory database, recorded notifications and a fixed certificate host.
pub async fn make_test_app() -> TestApp {
    setup_test_env();
    let db = setup_test_db().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let state = AppState::with_collaborators(
        db,
        notifier.clone(),
        Arc::new(UrlRenderer::new("https://certs.test")),
    );
    let router = Router::new().nest("/api", routes(state.clone()));

    TestApp {
        router,
        state,
        notifier,
    }
}

impl TestApp {
    /// Creates a user with password `password` and returns it with a bearer token.
    pub async fn user(&self, username: &str, role: Role) -> (user::Model, String) {
        let user = user::Model::create(
            self.state.db(),
            username,
            &format!("{username}@campus.test"),
            "password",
            role,
        )
        .await
        .expect("Failed to create user");
        let (token, _) = generate_jwt(user.id, user.role).expect("Failed to sign token");
        (user, token)
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, Some(token), None).await
    }

    /// Creates an activity owned by the professor behind `token`; returns its id.
    pub async fn activity(&self, token: &str, max_participants: i32, auto_accept: bool) -> i64 {
        let (status, json) = self
            .post(
                "/api/activities",
                token,
                serde_json::json!({
                    "title": "Reading buddies",
                    "description": "Weekly reading sessions at the community library",
                    "category": "education",
                    "location": "Library Hall B",
                    "max_participants": max_participants,
                    "auto_accept": auto_accept,
                    "required_hours": 10.0
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["data"]["id"].as_i64().unwrap()
    }

    /// Applies as the student behind `token`; returns the enrollment id.
    pub async fn apply(&self, token: &str, activity_id: i64) -> i64 {
        let (status, json) = self
            .post(
                &format!("/api/activities/{activity_id}/enrollments"),
                token,
                serde_json::json!({ "motivation": "I volunteer at my local library already" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["data"]["id"].as_i64().unwrap()
    }

    /// Applies and has the professor accept; returns the enrollment id.
    pub async fn confirmed(&self, prof_token: &str, student_token: &str, activity_id: i64) -> i64 {
        let enrollment_id = self.apply(student_token, activity_id).await;
        let (status, json) = self
            .post(
                &format!("/api/activities/{activity_id}/enrollments/{enrollment_id}/review"),
                prof_token,
                serde_json::json!({ "decision": "accept" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        enrollment_id
    }
}
