use crate::helpers::make_test_app;
use axum::http::StatusCode;
use db::models::user::Role;
use serde_json::json;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_create_activity_as_professor() {
    let app = make_test_app().await;
    let (prof, token) = app.user("prof_smith", Role::Professor).await;

    let (status, json) = app
        .post(
            "/api/activities",
            &token,
            json!({
                "title": "Beach clean-up",
                "category": "environment",
                "location": "Muizenberg",
                "max_participants": 12,
                "start_date": "2025-03-01",
                "end_date": "2025-03-31"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{json}");
    let data = &json["data"];
    assert_eq!(data["title"], "Beach clean-up");
    assert_eq!(data["created_by"], prof.id);
    assert_eq!(data["current_participants"], 0);
    assert_eq!(data["seats_left"], 12);
    assert_eq!(data["auto_accept"], false);
}

#[tokio::test]
#[serial]
async fn test_student_cannot_create_activity() {
    let app = make_test_app().await;
    let (_, token) = app.user("u21000001", Role::Student).await;

    let (status, _) = app
        .post(
            "/api/activities",
            &token,
            json!({
                "title": "Beach clean-up",
                "category": "environment",
                "location": "Muizenberg",
                "max_participants": 12
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn test_create_activity_rejects_reversed_dates() {
    let app = make_test_app().await;
    let (_, token) = app.user("prof_dates", Role::Professor).await;

    let (status, json) = app
        .post(
            "/api/activities",
            &token,
            json!({
                "title": "Beach clean-up",
                "category": "environment",
                "location": "Muizenberg",
                "max_participants": 12,
                "start_date": "2025-03-31",
                "end_date": "2025-03-01"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{json}");
    assert_eq!(json["success"], false);
}

#[tokio::test]
#[serial]
async fn test_only_owner_or_admin_can_update() {
    let app = make_test_app().await;
    let (_, owner) = app.user("prof_owner", Role::Professor).await;
    let (_, other) = app.user("prof_other", Role::Professor).await;
    let (_, admin) = app.user("admin", Role::Admin).await;
    let id = app.activity(&owner, 5, false).await;
    let uri = format!("/api/activities/{id}");

    let (status, _) = app.put(&uri, &other, json!({ "title": "Hijacked" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = app.put(&uri, &owner, json!({ "max_participants": 8 })).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["max_participants"], 8);
    assert_eq!(json["data"]["title"], "Reading buddies");

    let (status, json) = app.put(&uri, &admin, json!({ "title": "Reading pals" })).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["title"], "Reading pals");
}

#[tokio::test]
#[serial]
async fn test_capacity_cannot_drop_below_confirmed() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_cap", Role::Professor).await;
    let (_, s1) = app.user("u21000011", Role::Student).await;
    let (_, s2) = app.user("u21000012", Role::Student).await;
    let id = app.activity(&prof, 3, false).await;
    app.confirmed(&prof, &s1, id).await;
    app.confirmed(&prof, &s2, id).await;

    let (status, _) = app
        .put(&format!("/api/activities/{id}"), &prof, json!({ "max_participants": 1 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[serial]
async fn test_status_change_and_soft_delete() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_status", Role::Professor).await;
    let (_, student) = app.user("u21000021", Role::Student).await;
    let id = app.activity(&prof, 5, false).await;
    let uri = format!("/api/activities/{id}");

    let (status, json) = app
        .put(&format!("{uri}/status"), &prof, json!({ "status": "cancelled" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["status"], "cancelled");

    let (status, _) = app
        .post(
            &format!("{uri}/enrollments"),
            &student,
            json!({ "motivation": "Happy to help" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.delete(&uri, &prof).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&uri, &student).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = app.get("/api/activities", &student).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}
