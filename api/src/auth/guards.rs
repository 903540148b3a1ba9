use crate::auth::claims::AuthUser;
use crate::response::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{FromRequestParts, Path, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;

/// Helper to extract and validate the user, then insert it back into the request.
async fn extract_and_insert_authuser(
    req: Request<Body>,
) -> Result<(Request<Body>, AuthUser), ApiError> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| ApiError::unauthorized("Authentication required"))?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

/// Basic guard to ensure the request is authenticated.
pub async fn allow_authenticated(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let (req, _user) = extract_and_insert_authuser(req).await?;
    Ok(next.run(req).await)
}

/// Professors and admins only.
pub async fn allow_staff(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let (req, user) = extract_and_insert_authuser(req).await?;
    if !user.actor().can_create_activities() {
        return Err(ApiError::forbidden("Professor or admin access required"));
    }
    Ok(next.run(req).await)
}

/// Admin, or the professor who created the activity named by `{activity_id}`.
pub async fn require_reviewer(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let (req, user) = extract_and_insert_authuser(req).await?;

    let activity_id = params
        .get("activity_id")
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| ApiError::bad_request("Missing or invalid activity_id"))?;

    let activity = state.activities().get(activity_id).await?;
    let actor = user.actor();
    if !actor.can_review(&activity) {
        tracing::info!(
            user_id = actor.id,
            activity_id,
            "Reviewer access denied"
        );
        return Err(ApiError::forbidden(
            "Only the activity owner or an admin can do this",
        ));
    }

    Ok(next.run(req).await)
}
