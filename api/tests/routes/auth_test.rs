use crate::helpers::make_test_app;
use axum::http::StatusCode;
use db::models::user::Role;
use serde_json::json;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_login_success() {
    let app = make_test_app().await;
    let (user, _) = app.user("u20000001", Role::Student).await;

    let (status, json) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "u20000001", "password": "password" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(json["data"]["user"]["id"], user.id);
    assert_eq!(json["data"]["user"]["role"], "student");
    assert!(json["data"]["user"].get("password_hash").is_none());
}

#[tokio::test]
#[serial]
async fn test_login_wrong_password() {
    let app = make_test_app().await;
    app.user("u20000002", Role::Student).await;

    let (status, json) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "u20000002", "password": "nope" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Invalid username or password");
}

#[tokio::test]
#[serial]
async fn test_login_empty_username() {
    let app = make_test_app().await;

    let (status, json) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "", "password": "password" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["message"], "Username is required");
}

#[tokio::test]
#[serial]
async fn test_protected_route_requires_token() {
    let app = make_test_app().await;

    let (status, _) = app.send("GET", "/api/activities", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("GET", "/api/activities", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
