//! Rust structs that represent stored document mappings.
//!
//! These models define the structure of data as it is stored in and
//! retrieved from the database. They are internal representations and are
//! never serialized to API clients; responses go through the sanitized
//! view types in `auth::models`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user document in the `users` collection.
///
/// `refresh_token` mirrors the most recently issued refresh token; at most
/// one value is active per user and it is overwritten on login/refresh and
/// unset on logout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id", with = "bson::serde_helpers::uuid_1_as_binary")]
    pub id: Uuid,
    /// Unique, stored lower-cased and trimmed.
    pub username: String,
    /// Unique.
    pub email: String,
    pub full_name: String,
    /// Blob-store URL, present from creation onward.
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}
