//! Handler functions for user profile and management API endpoints.
//!
//! These functions process requests for user data on behalf of an already
//! authenticated caller; the auth guard has resolved the identity before
//! they run.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::auth::middleware::AuthenticatedUser;
use crate::auth::models::{UpdateAccountRequest, UserView};
use crate::errors::{ApiError, ApiResponse};
use crate::services::StagedFile;
use crate::state::AppState;

pub async fn current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ApiResponse<UserView>, ApiError> {
    let view = state.auth.current_user(user.user_id).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        view,
        "current user fetched successfully",
    ))
}

pub async fn update_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<ApiResponse<UserView>, ApiError> {
    let view = state.auth.update_account(user.user_id, request).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        view,
        "account details updated successfully",
    ))
}

pub async fn update_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> Result<ApiResponse<UserView>, ApiError> {
    let mut staged: Option<StagedFile> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, format!("malformed multipart payload: {}", err)))?
    {
        if field.name() == Some("avatar") && staged.is_none() {
            let original_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, format!("malformed multipart payload: {}", err)))?;
            staged = Some(
                state
                    .media
                    .stash(&original_name, &bytes)
                    .await
                    .map_err(|err| ApiError::internal(err.to_string()))?,
            );
        }
    }
    let staged =
        staged.ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "avatar file is required"))?;

    let view = state.auth.update_avatar(user.user_id, &staged).await?;
    Ok(ApiResponse::new(StatusCode::OK, view, "avatar updated successfully"))
}
