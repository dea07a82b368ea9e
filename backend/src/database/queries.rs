//! Database query functions (Data Access Objects).
//!
//! This module centralizes all direct user-store operations behind the
//! `UserRepository` trait, abstracting the query logic from higher-level
//! services and API handlers. Two implementations exist: the MongoDB one
//! used in production and an in-memory one for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::UserRecord;

const USERS_COLLECTION: &str = "users";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database operation failed: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("user not found")]
    NotFound,
}

/// Persistence seam for user records.
///
/// Refresh-token writes are single-document updates: concurrent writers for
/// the same user cannot interleave below this level, and the last writer's
/// token is the one that counts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, record: UserRecord) -> Result<UserRecord, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError>;
    /// First record whose email matches `email` or whose username matches
    /// `username`. Serves both the registration uniqueness check and the
    /// login identifier lookup.
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;
    /// Overwrite (or with `None`, unset) the stored refresh token.
    async fn set_refresh_token(
        &self,
        id: Uuid,
        refresh_token: Option<&str>,
    ) -> Result<(), RepositoryError>;
    async fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<UserRecord, RepositoryError>;
    async fn set_avatar(&self, id: Uuid, avatar_url: &str) -> Result<UserRecord, RepositoryError>;
}

pub struct MongoUserRepository {
    collection: Collection<UserRecord>,
}

impl MongoUserRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(USERS_COLLECTION),
        }
    }

    fn id_filter(id: Uuid) -> Document {
        doc! {"_id": mongodb::bson::Uuid::from_uuid_1(id)}
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, record: UserRecord) -> Result<UserRecord, RepositoryError> {
        self.collection.insert_one(&record).await?;
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self.collection.find_one(Self::id_filter(id)).await?)
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let filter = doc! {"$or": [{"email": email}, {"username": username}]};
        Ok(self.collection.find_one(filter).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self.collection.find_one(doc! {"email": email}).await?)
    }

    async fn set_refresh_token(
        &self,
        id: Uuid,
        refresh_token: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let now = mongodb::bson::DateTime::from_chrono(Utc::now());
        let update = match refresh_token {
            Some(token) => doc! {
                "$set": {"refreshToken": token, "updatedAt": now},
            },
            None => doc! {
                "$unset": {"refreshToken": ""},
                "$set": {"updatedAt": now},
            },
        };
        let result = self.collection.update_one(Self::id_filter(id), update).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<UserRecord, RepositoryError> {
        let mut changes = doc! {"updatedAt": mongodb::bson::DateTime::from_chrono(Utc::now())};
        if let Some(full_name) = full_name {
            changes.insert("fullName", full_name);
        }
        if let Some(email) = email {
            changes.insert("email", email);
        }
        self.collection
            .find_one_and_update(Self::id_filter(id), doc! {"$set": changes})
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn set_avatar(&self, id: Uuid, avatar_url: &str) -> Result<UserRecord, RepositoryError> {
        let update = doc! {"$set": {
            "avatar": avatar_url,
            "updatedAt": mongodb::bson::DateTime::from_chrono(Utc::now()),
        }};
        self.collection
            .find_one_and_update(Self::id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

/// In-memory repository used by tests and credential-store-less setups.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, record: UserRecord) -> Result<UserRecord, RepositoryError> {
        self.users.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email || user.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn set_refresh_token(
        &self,
        id: Uuid,
        refresh_token: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.refresh_token = refresh_token.map(str::to_string);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<UserRecord, RepositoryError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if let Some(full_name) = full_name {
            user.full_name = full_name.to_string();
        }
        if let Some(email) = email {
            user.email = email.to_string();
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_avatar(&self, id: Uuid, avatar_url: &str) -> Result<UserRecord, RepositoryError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.avatar = avatar_url.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str, email: &str) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Test User".to_string(),
            avatar: "memory://media/0/avatar.png".to_string(),
            cover_image: None,
            password_hash: "$2b$12$not-a-real-hash".to_string(),
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_and_find_roundtrip() {
        let repo = MemoryUserRepository::new();
        let stored = repo.insert(record("mo", "mo@x.com")).await.unwrap();

        assert_eq!(repo.find_by_id(stored.id).await.unwrap(), Some(stored.clone()));
        assert!(repo
            .find_by_email_or_username("mo@x.com", "nobody")
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .find_by_email_or_username("other@x.com", "mo")
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .find_by_email_or_username("other@x.com", "nobody")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn refresh_token_last_write_wins() {
        let repo = MemoryUserRepository::new();
        let stored = repo.insert(record("mo", "mo@x.com")).await.unwrap();

        repo.set_refresh_token(stored.id, Some("first")).await.unwrap();
        repo.set_refresh_token(stored.id, Some("second")).await.unwrap();
        let user = repo.find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(user.refresh_token.as_deref(), Some("second"));

        repo.set_refresh_token(stored.id, None).await.unwrap();
        let user = repo.find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(user.refresh_token, None);
    }

    #[tokio::test]
    async fn updates_against_unknown_users_report_not_found() {
        let repo = MemoryUserRepository::new();
        let missing = Uuid::new_v4();

        assert!(matches!(
            repo.set_refresh_token(missing, Some("token")).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.update_profile(missing, Some("New Name"), None).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn profile_updates_change_only_given_fields() {
        let repo = MemoryUserRepository::new();
        let stored = repo.insert(record("mo", "mo@x.com")).await.unwrap();

        let updated = repo
            .update_profile(stored.id, Some("Mo Salah"), None)
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Mo Salah");
        assert_eq!(updated.email, "mo@x.com");

        let updated = repo.set_avatar(stored.id, "memory://media/9/new.png").await.unwrap();
        assert_eq!(updated.avatar, "memory://media/9/new.png");
    }
}
