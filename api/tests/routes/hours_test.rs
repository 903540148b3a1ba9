use crate::helpers::{TestApp, make_test_app};
use axum::http::StatusCode;
use db::models::notification::NotificationKind;
use db::models::user::Role;
use serde_json::json;
use serial_test::serial;

async fn submit(app: &TestApp, token: &str, enrollment_id: i64, hours: f64) -> i64 {
    let (status, json) = app
        .post(
            &format!("/api/enrollments/{enrollment_id}/hours"),
            token,
            json!({
                "date": "2025-04-07",
                "hours": hours,
                "description": "Helped run the Saturday reading circle",
                "evidence_urls": ["https://photos.example.org/reading-circle"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["data"]["status"], "pending");
    json["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
#[serial]
async fn test_approvals_reaching_target_issue_certificate() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_hours", Role::Professor).await;
    let (_, token) = app.user("u24000001", Role::Student).await;
    let activity_id = app.activity(&prof, 5, false).await;
    let enrollment_id = app.confirmed(&prof, &token, activity_id).await;

    let first = submit(&app, &token, enrollment_id, 6.0).await;
    let second = submit(&app, &token, enrollment_id, 5.0).await;

    let (status, json) = app
        .post(
            &format!("/api/hours/{first}/review"),
            &prof,
            json!({ "verdict": "approve" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["status"], "approved");

    let certificate = format!("/api/enrollments/{enrollment_id}/certificate");
    let (_, json) = app.get(&certificate, &token).await;
    assert_eq!(json["data"]["approved_hours"], 6.0);
    assert_eq!(json["data"]["eligible"], false);
    assert!(json["data"]["certificate"].is_null());

    let (status, _) = app
        .post(
            &format!("/api/hours/{second}/review"),
            &prof,
            json!({ "verdict": "approve" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = app.get(&certificate, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["approved_hours"], 11.0);
    assert_eq!(json["data"]["eligible"], true);
    let number = json["data"]["certificate"]["certificate_number"]
        .as_str()
        .unwrap();
    assert!(number.starts_with("CC-"));
    assert_eq!(
        json["data"]["certificate"]["artifact_url"],
        format!("https://certs.test/{number}.pdf")
    );
    assert!(
        app.notifier
            .kinds()
            .contains(&NotificationKind::CertificateIssued)
    );
}

#[tokio::test]
#[serial]
async fn test_lowered_target_issues_certificate_on_next_check() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_lower_target", Role::Professor).await;
    let (_, token) = app.user("u24000021", Role::Student).await;
    let activity_id = app.activity(&prof, 5, false).await;
    let enrollment_id = app.confirmed(&prof, &token, activity_id).await;

    let request = submit(&app, &token, enrollment_id, 6.0).await;
    let (status, _) = app
        .post(
            &format!("/api/hours/{request}/review"),
            &prof,
            json!({ "verdict": "approve" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let certificate = format!("/api/enrollments/{enrollment_id}/certificate");
    let (_, json) = app.get(&certificate, &token).await;
    assert_eq!(json["data"]["eligible"], false);
    assert!(json["data"]["certificate"].is_null());

    let (status, json) = app
        .put(
            &format!("/api/activities/{activity_id}"),
            &prof,
            json!({ "required_hours": 5.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");

    let (status, json) = app.get(&certificate, &token).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["eligible"], true);
    assert_eq!(json["data"]["certificate"]["total_hours"], 6.0);
    let number = json["data"]["certificate"]["certificate_number"].clone();
    assert!(number.as_str().unwrap().starts_with("CC-"));

    let (_, json) = app.get(&certificate, &prof).await;
    assert_eq!(json["data"]["certificate"]["certificate_number"], number);
}

#[tokio::test]
#[serial]
async fn test_rejections_leave_total_unchanged() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_reject_hours", Role::Professor).await;
    let (_, token) = app.user("u24000011", Role::Student).await;
    let activity_id = app.activity(&prof, 5, false).await;
    let enrollment_id = app.confirmed(&prof, &token, activity_id).await;
    let request = submit(&app, &token, enrollment_id, 4.0).await;
    let uri = format!("/api/hours/{request}/review");

    let (status, _) = app
        .post(&uri, &prof, json!({ "verdict": "reject", "rejection_reason": "No" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, json) = app
        .post(
            &uri,
            &prof,
            json!({ "verdict": "reject", "rejection_reason": "No sign-in sheet for that day" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["status"], "rejected");

    let (status, _) = app.post(&uri, &prof, json!({ "verdict": "approve" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, json) = app
        .get(&format!("/api/enrollments/{enrollment_id}/certificate"), &token)
        .await;
    assert_eq!(json["data"]["approved_hours"], 0.0);
}

#[tokio::test]
#[serial]
async fn test_submission_rules() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_rules", Role::Professor).await;
    let (_, token) = app.user("u24000021", Role::Student).await;
    let (_, pending_token) = app.user("u24000022", Role::Student).await;
    let activity_id = app.activity(&prof, 5, false).await;
    let enrollment_id = app.confirmed(&prof, &token, activity_id).await;
    let pending_id = app.apply(&pending_token, activity_id).await;
    let uri = format!("/api/enrollments/{enrollment_id}/hours");

    let body = |hours: f64, date: &str, url: &str| {
        json!({
            "date": date,
            "hours": hours,
            "description": "Helped run the Saturday reading circle",
            "evidence_urls": [url]
        })
    };

    let (status, _) = app
        .post(&uri, &token, body(0.0, "2025-04-07", "https://ok.example.org"))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .post(&uri, &token, body(25.0, "2025-04-07", "https://ok.example.org"))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .post(&uri, &token, body(2.0, "2999-01-01", "https://ok.example.org"))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .post(&uri, &token, body(2.0, "2025-04-07", "ftp://files.example.org"))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .post(
            &format!("/api/enrollments/{pending_id}/hours"),
            &pending_token,
            body(2.0, "2025-04-07", "https://ok.example.org"),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(&uri, &pending_token, body(2.0, "2025-04-07", "https://ok.example.org"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn test_bulk_review_and_notes() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_bulk_hours", Role::Professor).await;
    let (_, other) = app.user("prof_not_mine", Role::Professor).await;
    let (_, token) = app.user("u24000031", Role::Student).await;
    let activity_id = app.activity(&prof, 5, false).await;
    let enrollment_id = app.confirmed(&prof, &token, activity_id).await;
    let a = submit(&app, &token, enrollment_id, 2.0).await;
    let b = submit(&app, &token, enrollment_id, 3.0).await;

    let (status, json) = app
        .post(
            "/api/hours/review",
            &prof,
            json!({ "request_ids": [a, b, 9999], "verdict": "approve" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["success"], 2);
    assert_eq!(json["data"]["failed"], 1);

    let (status, _) = app
        .put(&format!("/api/hours/{a}/notes"), &other, json!({ "notes": "Nice" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = app
        .put(
            &format!("/api/hours/{a}/notes"),
            &prof,
            json!({ "notes": "Confirmed with the librarian" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["professor_notes"], "Confirmed with the librarian");

    let (_, json) = app
        .get(&format!("/api/enrollments/{enrollment_id}/hours"), &token)
        .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}
