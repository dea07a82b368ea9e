//! Data structures for authentication-related entities.
//!
//! This module defines the wire-facing request and response types, the JWT
//! claims, and the sanitized user view used for data transfer within the
//! authentication flow. Wire naming is camelCase to match the platform's
//! existing clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::UserRecord;
use crate::services::StagedFile;
use crate::utils::non_empty;

/// Claims carried by access tokens.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccessClaims {
    /// User id.
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// Claims carried by refresh tokens.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefreshClaims {
    /// User id.
    pub sub: Uuid,
    /// Unique token id, so consecutive issues never collide even within
    /// the same second.
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Sanitized user view, safe for client responses.
///
/// Deliberately has no secret or refresh-token field; sanitization is a
/// matter of type, not of filtering.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserView {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
            email: record.email.clone(),
            full_name: record.full_name.clone(),
            avatar: record.avatar.clone(),
            cover_image: record.cover_image.clone(),
            created_at: record.created_at,
        }
    }
}

/// Registration input after multipart decoding.
#[derive(Debug)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub avatar: Option<StagedFile>,
    pub cover_image: Option<StagedFile>,
}

impl RegisterInput {
    /// Wire names of required text fields that are empty after trimming.
    pub fn violations(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if non_empty(&self.username).is_none() {
            missing.push("username");
        }
        if non_empty(&self.email).is_none() {
            missing.push("email");
        }
        if non_empty(&self.full_name).is_none() {
            missing.push("fullName");
        }
        if non_empty(&self.password).is_none() {
            missing.push("password");
        }
        missing
    }
}

/// Login body; either identifier works, email wins when both are given.
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn identifier(&self) -> Option<&str> {
        self.email
            .as_deref()
            .and_then(non_empty)
            .or_else(|| self.username.as_deref().and_then(non_empty))
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserView,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
}
