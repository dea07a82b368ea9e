//! Middleware for protecting authenticated routes.
//!
//! Validates the access token from the `accessToken` cookie or the
//! `Authorization: Bearer` header, confirms the user still exists, and
//! attaches the resolved identity to the request for handlers downstream.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::auth::cookies::ACCESS_COOKIE_NAME;
use crate::errors::ApiError;
use crate::state::AppState;

/// Identity attached to the request once the access token checks out.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    let token = jar
        .get(ACCESS_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .or(bearer)
        .ok_or_else(|| ApiError::unauthorized("unauthorized request"))?;

    let claims = state.auth.verify_access_token(&token).map_err(|err| {
        tracing::warn!("access token rejected: {}", err);
        ApiError::unauthorized("invalid access token")
    })?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await
        .map_err(|err| ApiError::internal(err.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("invalid access token"))?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        username: user.username,
        email: user.email,
    });
    Ok(next.run(request).await)
}
