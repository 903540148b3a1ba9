use crate::auth::generate_jwt;
use crate::response::{ApiError, ApiResult, ok};
use crate::routes::common::UserResponse;
use crate::state::AppState;
use axum::{Json, extract::State};
use db::models::user;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

/// POST /api/auth/login
///
/// Verifies the password against the stored argon2 hash and issues a bearer
/// token carrying the user's id and role.
///
/// ### Responses
/// - `200 OK` with `{ token, expires_at, user }`
/// - `401 Unauthorized` for an unknown user or wrong password
/// - `422 Unprocessable Entity` for empty fields
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    req.validate()?;

    let found = user::Model::find_by_username(state.db(), req.username.trim()).await?;
    let Some(user) = found.filter(|u| u.verify_password(&req.password)) else {
        tracing::info!(username = %req.username, "Failed login");
        return Err(ApiError::unauthorized("Invalid username or password"));
    };

    let (token, expires_at) = generate_jwt(user.id, user.role).map_err(|e| {
        tracing::error!(user_id = user.id, error = %e, "Token encoding failed");
        ApiError::internal()
    })?;

    ok(
        LoginResponse {
            token,
            expires_at,
            user: user.into(),
        },
        "Login successful",
    )
}
