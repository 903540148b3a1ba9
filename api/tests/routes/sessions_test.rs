use crate::helpers::{TestApp, make_test_app};
use axum::http::StatusCode;
use db::models::user::Role;
use serde_json::{Value, json};
use serial_test::serial;

fn tue_thu_march() -> Value {
    json!({
        "start_date": "2025-03-01",
        "end_date": "2025-03-31",
        "start_time": "14:00",
        "end_time": "16:00",
        "frequency": "custom",
        "days": ["tue", "thu"]
    })
}

async fn single_session(app: &TestApp, prof: &str, activity_id: i64) -> i64 {
    let (status, json) = app
        .post(
            &format!("/api/activities/{activity_id}/sessions"),
            prof,
            json!({ "date": "2025-03-04", "start_time": "09:00", "end_time": "11:30" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
#[serial]
async fn test_preview_does_not_persist() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_preview", Role::Professor).await;
    let activity_id = app.activity(&prof, 10, false).await;
    let base = format!("/api/activities/{activity_id}/sessions");

    let (status, json) = app
        .post(&format!("{base}/preview"), &prof, tue_thu_march())
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    let sessions = json["data"]["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 8);
    assert_eq!(sessions[0]["date"], "2025-03-04");
    assert_eq!(sessions[1]["date"], "2025-03-06");
    assert_eq!(sessions[0]["location"], "Library Hall B");
    assert_eq!(json["data"]["truncated"], false);

    let (_, json) = app.get(&base, &prof).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_recurring_creates_all_or_nothing() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_recurring", Role::Professor).await;
    let activity_id = app.activity(&prof, 10, false).await;
    let base = format!("/api/activities/{activity_id}/sessions");

    let (status, json) = app
        .post(&format!("{base}/recurring"), &prof, tue_thu_march())
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["data"]["sessions"].as_array().unwrap().len(), 8);

    let mut overlapping = tue_thu_march();
    overlapping["days"] = json!(["mon", "thu"]);
    let (status, _) = app
        .post(&format!("{base}/recurring"), &prof, overlapping)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, json) = app.get(&base, &prof).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 8);
}

#[tokio::test]
#[serial]
async fn test_recurring_rejects_bad_input() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_bad_input", Role::Professor).await;
    let (_, student) = app.user("u23000001", Role::Student).await;
    let activity_id = app.activity(&prof, 10, false).await;
    let uri = format!("/api/activities/{activity_id}/sessions/recurring");

    let mut reversed = tue_thu_march();
    reversed["end_time"] = json!("13:00");
    let (status, _) = app.post(&uri, &prof, reversed).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let mut no_days = tue_thu_march();
    no_days["days"] = json!([]);
    let (status, _) = app.post(&uri, &prof, no_days).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.post(&uri, &student, tue_thu_march()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn test_qr_check_in_once() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_qr", Role::Professor).await;
    let (student, token) = app.user("u23000011", Role::Student).await;
    let activity_id = app.activity(&prof, 10, false).await;
    let enrollment_id = app.confirmed(&prof, &token, activity_id).await;
    let session_id = single_session(&app, &prof, activity_id).await;
    let base = format!("/api/activities/{activity_id}/sessions/{session_id}");

    let (status, json) = app.post(&format!("{base}/qr"), &prof, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    let code = json["data"]["code"].as_str().unwrap().to_owned();
    assert_eq!(code.len(), 64);

    let (status, _) = app
        .post(
            &format!("{base}/check-in"),
            &token,
            json!({ "method": "qr", "code": "0000" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = app
        .post(
            &format!("{base}/check-in"),
            &token,
            json!({ "method": "qr", "code": code, "latitude": -33.95, "longitude": 18.46 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["data"]["enrollment_id"], enrollment_id);
    assert_eq!(json["data"]["student_id"], student.id);
    assert_eq!(json["data"]["hours_credited"], 2.5);

    let (status, _) = app
        .post(
            &format!("{base}/check-in"),
            &token,
            json!({ "method": "qr", "code": code }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[serial]
async fn test_manual_check_in_and_correction() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_manual", Role::Professor).await;
    let (_, token) = app.user("u23000021", Role::Student).await;
    let activity_id = app.activity(&prof, 10, false).await;
    let enrollment_id = app.confirmed(&prof, &token, activity_id).await;
    let session_id = single_session(&app, &prof, activity_id).await;
    let base = format!("/api/activities/{activity_id}/sessions/{session_id}");

    let (status, _) = app
        .post(
            &format!("{base}/check-in"),
            &token,
            json!({ "method": "manual" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = app
        .post(
            &format!("{base}/check-in"),
            &prof,
            json!({ "method": "manual", "enrollment_id": enrollment_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["data"]["method"], "manual");

    let (status, json) = app
        .put(
            &format!("{base}/attendance/{enrollment_id}"),
            &prof,
            json!({ "hours": 1.0, "notes": "Left early" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["hours_credited"], 1.0);
    assert_eq!(json["data"]["hours_overridden"], true);
}

#[tokio::test]
#[serial]
async fn test_cancelled_session_refuses_qr() {
    let app = make_test_app().await;
    let (_, prof) = app.user("prof_cancel", Role::Professor).await;
    let activity_id = app.activity(&prof, 10, false).await;
    let session_id = single_session(&app, &prof, activity_id).await;
    let base = format!("/api/activities/{activity_id}/sessions/{session_id}");

    let (status, _) = app.delete(&base, &prof).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&base, &prof).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.post(&format!("{base}/qr"), &prof, json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, json) = app
        .get(&format!("/api/activities/{activity_id}/sessions"), &prof)
        .await;
    assert_eq!(json["data"][0]["status"], "cancelled");
    assert!(json["data"][0].get("qr_code").is_none());
}
