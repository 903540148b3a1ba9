use crate::auth::claims::AuthUser;
use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts},
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::TypedHeader;
use headers::UserAgent;
use std::net::SocketAddr;
use std::time::Instant;

/// Logs every non-preflight request once it has been answered: method, path,
/// client IP, the caller's id and role when a valid token was sent, the
/// response status and how long the handler took.
///
/// ```ignore
/// let app = Router::new().layer(axum::middleware::from_fn(log_request));
/// ```
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();
    let caller = AuthUser::from_request_parts(&mut parts, &()).await.ok();
    let user_agent = TypedHeader::<UserAgent>::from_request_parts(&mut parts, &())
        .await
        .ok()
        .map(|TypedHeader(ua)| ua.to_string());

    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();
    let started = Instant::now();

    let response = next.run(Request::from_parts(parts, body)).await;

    tracing::info!(
        method = %method,
        path = %path,
        ip = %addr.ip(),
        user = caller.as_ref().map(|AuthUser(c)| c.sub).unwrap_or(0),
        role = caller.as_ref().map(|AuthUser(c)| c.role.to_string()).unwrap_or_default(),
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        user_agent = user_agent.unwrap_or_else(|| "unknown".into()),
        "Request handled"
    );

    response
}
