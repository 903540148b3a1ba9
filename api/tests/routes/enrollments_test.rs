use crate::helpers::make_test_app;
use axum::http::StatusCode;
use db::models::notification::NotificationKind;
use db::models::user::Role;
use serde_json::json;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_apply_then_accept() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_apply", Role::Professor).await;
    let (student, token) = app.user("u22000001", Role::Student).await;
    let activity_id = app.activity(&prof, 2, false).await;

    let enrollment_id = app.apply(&token, activity_id).await;
    let (status, json) = app
        .get(&format!("/api/enrollments/{enrollment_id}"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["student_id"], student.id);

    let (status, json) = app
        .post(
            &format!("/api/activities/{activity_id}/enrollments/{enrollment_id}/review"),
            &prof,
            json!({ "decision": "accept", "message": "Welcome aboard" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["status"], "confirmed");
    assert_eq!(json["data"]["review_message"], "Welcome aboard");

    let (_, json) = app
        .get(&format!("/api/activities/{activity_id}"), &token)
        .await;
    assert_eq!(json["data"]["current_participants"], 1);
    assert_eq!(
        app.notifier.kinds(),
        vec![NotificationKind::ApplicationAccepted]
    );
}

#[tokio::test]
#[serial]
async fn test_duplicate_application_conflicts() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_dup", Role::Professor).await;
    let (_, token) = app.user("u22000011", Role::Student).await;
    let activity_id = app.activity(&prof, 2, false).await;
    app.apply(&token, activity_id).await;

    let (status, json) = app
        .post(
            &format!("/api/activities/{activity_id}/enrollments"),
            &token,
            json!({ "motivation": "Applying twice" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
}

#[tokio::test]
#[serial]
async fn test_accept_beyond_capacity_conflicts() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_full", Role::Professor).await;
    let (_, s1) = app.user("u22000021", Role::Student).await;
    let (_, s2) = app.user("u22000022", Role::Student).await;
    let activity_id = app.activity(&prof, 1, false).await;

    app.confirmed(&prof, &s1, activity_id).await;
    let second = app.apply(&s2, activity_id).await;

    let (status, _) = app
        .post(
            &format!("/api/activities/{activity_id}/enrollments/{second}/review"),
            &prof,
            json!({ "decision": "accept" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, json) = app
        .get(&format!("/api/enrollments/{second}"), &s2)
        .await;
    assert_eq!(json["data"]["status"], "pending");
}

#[tokio::test]
#[serial]
async fn test_reject_needs_reason() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_reject", Role::Professor).await;
    let (_, token) = app.user("u22000031", Role::Student).await;
    let activity_id = app.activity(&prof, 2, false).await;
    let enrollment_id = app.apply(&token, activity_id).await;
    let uri = format!("/api/activities/{activity_id}/enrollments/{enrollment_id}/review");

    let (status, _) = app.post(&uri, &prof, json!({ "decision": "reject" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, json) = app
        .post(
            &uri,
            &prof,
            json!({ "decision": "reject", "reason": "schedule_conflict" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["status"], "cancelled");
    assert!(json["data"]["rejection_reason"].as_str().is_some());
}

#[tokio::test]
#[serial]
async fn test_other_professor_cannot_review() {
    let app = make_test_app().await;
    let (_, owner) = app.user("prof_mine", Role::Professor).await;
    let (_, other) = app.user("prof_yours", Role::Professor).await;
    let (_, token) = app.user("u22000041", Role::Student).await;
    let activity_id = app.activity(&owner, 2, false).await;
    let enrollment_id = app.apply(&token, activity_id).await;

    let (status, _) = app
        .post(
            &format!("/api/activities/{activity_id}/enrollments/{enrollment_id}/review"),
            &other,
            json!({ "decision": "accept" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .get(&format!("/api/activities/{activity_id}/enrollments"), &other)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn test_bulk_review_reports_each_item() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_bulk", Role::Professor).await;
    let activity_id = app.activity(&prof, 2, false).await;

    let mut ids = Vec::new();
    for n in 0..3 {
        let (_, token) = app.user(&format!("u2200005{n}"), Role::Student).await;
        ids.push(app.apply(&token, activity_id).await);
    }

    let (status, json) = app
        .post(
            &format!("/api/activities/{activity_id}/enrollments/review"),
            &prof,
            json!({ "enrollment_ids": ids, "decision": "accept" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["success"], 2);
    assert_eq!(json["data"]["failed"], 1);
    assert_eq!(json["data"]["items"][2]["outcome"], "capacity_exceeded");

    let (_, json) = app
        .get(
            &format!("/api/activities/{activity_id}/enrollments?status=pending"),
            &prof,
        )
        .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_withdraw_frees_seat_for_promotion() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_wait", Role::Professor).await;
    let (_, s1) = app.user("u22000061", Role::Student).await;
    let (_, s2) = app.user("u22000062", Role::Student).await;
    let activity_id = app.activity(&prof, 1, true).await;

    let first = app.apply(&s1, activity_id).await;
    let second = app.apply(&s2, activity_id).await;
    let (_, json) = app.get(&format!("/api/enrollments/{second}"), &s2).await;
    assert_eq!(json["data"]["status"], "waitlisted");

    let promote = format!("/api/activities/{activity_id}/enrollments/{second}/promote");
    let (status, _) = app.post(&promote, &prof, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = app
        .post(&format!("/api/enrollments/{first}/withdraw"), &s1, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["status"], "cancelled");

    let (status, json) = app.post(&promote, &prof, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["status"], "confirmed");

    let (status, _) = app
        .post(&format!("/api/enrollments/{first}/withdraw"), &s1, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[serial]
async fn test_remove_participant() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_remove", Role::Professor).await;
    let (_, token) = app.user("u22000071", Role::Student).await;
    let activity_id = app.activity(&prof, 2, false).await;
    let enrollment_id = app.confirmed(&prof, &token, activity_id).await;

    let (status, json) = app
        .post(
            &format!("/api/activities/{activity_id}/enrollments/{enrollment_id}/remove"),
            &prof,
            json!({ "reason": "Missed three sessions" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["status"], "cancelled");

    let (_, json) = app
        .get(&format!("/api/activities/{activity_id}"), &prof)
        .await;
    assert_eq!(json["data"]["current_participants"], 0);
}

#[tokio::test]
#[serial]
async fn test_enrollment_from_other_activity_is_not_found() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_paths", Role::Professor).await;
    let (_, token) = app.user("u22000081", Role::Student).await;
    let a = app.activity(&prof, 2, false).await;
    let b = app.activity(&prof, 2, false).await;
    let enrollment_id = app.apply(&token, a).await;

    let (status, _) = app
        .post(
            &format!("/api/activities/{b}/enrollments/{enrollment_id}/review"),
            &prof,
            json!({ "decision": "accept" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
