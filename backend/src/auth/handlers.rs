//! Handler functions for authentication-related API endpoints.
//!
//! These functions translate HTTP requests (multipart forms, JSON bodies,
//! cookies) into `auth::service` calls and serialize the results into the
//! response envelope. Both session tokens are mirrored between cookies and
//! the body so cookie-less clients can still drive the flow.

use axum::body::Bytes;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;

use crate::auth::cookies::{removal_cookie, token_cookie, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
use crate::auth::middleware::AuthenticatedUser;
use crate::auth::models::{LoginRequest, LoginResponse, RefreshRequest, RegisterInput, TokenPair, UserView};
use crate::errors::{ApiError, ApiResponse};
use crate::services::StagedFile;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<ApiResponse<UserView>, ApiError> {
    let input = collect_register_input(&state, &mut multipart).await?;
    let created = state.auth.register(input).await?;
    Ok(ApiResponse::new(
        StatusCode::CREATED,
        created,
        "user registered successfully",
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), ApiError> {
    let (user, tokens) = state.auth.login(request).await?;
    let jar = jar
        .add(token_cookie(ACCESS_COOKIE_NAME, tokens.access_token.clone()))
        .add(token_cookie(REFRESH_COOKIE_NAME, tokens.refresh_token.clone()));
    let body = LoginResponse {
        user,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };
    Ok((
        jar,
        ApiResponse::new(StatusCode::OK, body, "user logged in successfully"),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<(CookieJar, ApiResponse<serde_json::Value>), ApiError> {
    state.auth.logout(user.user_id).await?;
    let jar = jar
        .remove(removal_cookie(ACCESS_COOKIE_NAME))
        .remove(removal_cookie(REFRESH_COOKIE_NAME));
    Ok((
        jar,
        ApiResponse::new(
            StatusCode::OK,
            serde_json::json!({}),
            "user logged out successfully",
        ),
    ))
}

/// The refresh token may arrive as a cookie or in the JSON body; the
/// cookie wins when both are present.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, ApiResponse<TokenPair>), ApiError> {
    let from_body = |bytes: &Bytes| -> Option<String> {
        if bytes.is_empty() {
            return None;
        }
        serde_json::from_slice::<RefreshRequest>(bytes)
            .ok()
            .and_then(|request| request.refresh_token)
    };
    let incoming = jar
        .get(REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| from_body(&body))
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ApiError::unauthorized("unauthorized request"))?;

    let tokens = state.auth.refresh_access_token(&incoming).await?;
    let jar = jar
        .add(token_cookie(ACCESS_COOKIE_NAME, tokens.access_token.clone()))
        .add(token_cookie(REFRESH_COOKIE_NAME, tokens.refresh_token.clone()));
    Ok((
        jar,
        ApiResponse::new(StatusCode::OK, tokens, "access token refreshed successfully"),
    ))
}

async fn collect_register_input(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<RegisterInput, ApiError> {
    let mut username = String::new();
    let mut email = String::new();
    let mut full_name = String::new();
    let mut password = String::new();
    let mut avatar: Option<StagedFile> = None;
    let mut cover_image: Option<StagedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, format!("malformed multipart payload: {}", err)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "username" => username = read_text(field).await?,
            "email" => email = read_text(field).await?,
            "fullName" => full_name = read_text(field).await?,
            "password" => password = read_text(field).await?,
            // First file wins for either slot.
            "avatar" => {
                if avatar.is_none() {
                    avatar = Some(stage_file(state, field).await?);
                }
            }
            "coverImage" => {
                if cover_image.is_none() {
                    cover_image = Some(stage_file(state, field).await?);
                }
            }
            _ => {}
        }
    }

    Ok(RegisterInput {
        username,
        email,
        full_name,
        password,
        avatar,
        cover_image,
    })
}

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, format!("malformed multipart payload: {}", err)))
}

async fn stage_file(state: &AppState, field: Field<'_>) -> Result<StagedFile, ApiError> {
    let original_name = field.file_name().unwrap_or("upload").to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, format!("malformed multipart payload: {}", err)))?;
    state
        .media
        .stash(&original_name, &bytes)
        .await
        .map_err(|err| ApiError::internal(err.to_string()))
}
