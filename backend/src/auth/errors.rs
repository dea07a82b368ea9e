//! Custom error types specific to authentication failures.
//!
//! This module defines the errors that can occur during the registration,
//! login, logout and refresh flows, and their mapping onto HTTP status
//! codes.

use axum::http::StatusCode;
use thiserror::Error;

use crate::database::queries::RepositoryError;
use crate::errors::ApiError;
use crate::services::MediaError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or empty required input.
    #[error("{0}")]
    Validation(String),
    /// Another user already owns the requested identity.
    #[error("{0}")]
    Conflict(String),
    /// Unknown identity, bad credentials, or an unusable token.
    #[error("{0}")]
    Unauthorized(String),
    #[error("media upload failed: {0}")]
    Upload(#[from] MediaError),
    #[error("credential store failure: {0}")]
    Repository(#[from] RepositoryError),
    #[error("something went wrong while generating session tokens")]
    TokenGeneration(#[source] jsonwebtoken::errors::Error),
    #[error("something went wrong while hashing the password")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Upload(_)
            | AuthError::Repository(_)
            | AuthError::TokenGeneration(_)
            | AuthError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::new(err.status(), err.to_string())
    }
}
