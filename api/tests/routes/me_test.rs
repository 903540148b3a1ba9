use crate::helpers::make_test_app;
use axum::http::StatusCode;
use db::models::notification::{self, NewNotification, NotificationKind};
use db::models::user::Role;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_profile_and_enrollments() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_me", Role::Professor).await;
    let (student, token) = app.user("u25000001", Role::Student).await;
    let activity_id = app.activity(&prof, 5, false).await;
    let enrollment_id = app.apply(&token, activity_id).await;

    let (status, json) = app.get("/api/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], student.id);
    assert_eq!(json["data"]["username"], "u25000001");

    let (status, json) = app.get("/api/me/enrollments", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["id"], enrollment_id);

    let (_, json) = app.get("/api/me/enrollments", &prof).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_notifications_are_private() {
    let app = make_test_app().await;
    let (owner, token) = app.user("u25000011", Role::Student).await;
    let (_, other) = app.user("u25000012", Role::Student).await;

    let stored = notification::Model::create(
        app.state.db(),
        NewNotification {
            user_id: owner.id,
            kind: NotificationKind::ApplicationAccepted,
            title: "Application accepted".into(),
            message: "See you on Saturday".into(),
            activity_id: None,
            enrollment_id: None,
        },
    )
    .await
    .unwrap();
    let uri = format!("/api/me/notifications/{}/read", stored.id);

    let (status, _) = app.send("PUT", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("PUT", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app.get("/api/me/notifications", &token).await;
    assert_eq!(json["data"][0]["read"], true);
    assert_eq!(json["data"][0]["kind"], "application_accepted");

    let (_, json) = app.get("/api/me/notifications", &other).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}
