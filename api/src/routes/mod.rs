//! HTTP route entry point for `/api/...`.
//!
//! - `/health` → liveness (public)
//! - `/auth` → login (public)
//! - `/activities` → activities, their sessions and enrollments (authenticated)
//! - `/enrollments` → a student's view of one enrollment (authenticated)
//! - `/hours` → hours review (authenticated; reviewer checks per request)
//! - `/me` → the caller's profile and notifications (authenticated)

use crate::auth::guards::allow_authenticated;
use crate::routes::{
    activities::activities_routes, auth::auth_routes, enrollments::enrollments_routes,
    health::health_routes, hours::hours_routes, me::me_routes,
};
use crate::state::AppState;
use axum::{Router, middleware::from_fn};

pub mod activities;
pub mod auth;
pub mod common;
pub mod enrollments;
pub mod health;
pub mod hours;
pub mod me;

/// Builds the `/api` router with its state applied.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest(
            "/activities",
            activities_routes(app_state.clone()).route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/enrollments",
            enrollments_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/hours",
            hours_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest("/me", me_routes().route_layer(from_fn(allow_authenticated)))
        .with_state(app_state)
}
