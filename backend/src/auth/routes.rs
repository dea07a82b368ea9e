//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle user registration, login, logout, and token
//! refreshing. They are designed to be nested under `/api/v1/users` in the
//! main Axum router; the profile routes from `api::user` are mounted here
//! too so everything user-facing shares the prefix and the auth guard.

use axum::middleware::from_fn_with_state;
use axum::routing::post;
use axum::Router;

use crate::auth::{handlers, middleware};
use crate::state::AppState;

pub fn user_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/logout", post(handlers::logout))
        .merge(crate::api::user::routes::router())
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh-token", post(handlers::refresh_token))
        .merge(protected)
        .with_state(state)
}
