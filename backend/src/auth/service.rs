//! Core business logic for the authentication system.
//!
//! This service handles user creation, password hashing, session
//! management, token issuance, and validation. It orchestrates the
//! credential store, the media manager, and the token issuer on behalf of
//! the HTTP handlers.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::errors::AuthError;
use crate::auth::models::{
    AccessClaims, LoginRequest, RegisterInput, TokenPair, UpdateAccountRequest, UserView,
};
use crate::auth::tokens::TokenIssuer;
use crate::database::models::UserRecord;
use crate::database::queries::UserRepository;
use crate::services::{MediaManager, StagedFile};
use crate::utils::non_empty_owned;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    media: Arc<MediaManager>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, media: Arc<MediaManager>, tokens: TokenIssuer) -> Self {
        Self { users, media, tokens }
    }

    /// Register a new user.
    ///
    /// The record is only inserted once the avatar upload has produced a
    /// URL, so no user ever exists without one.
    pub async fn register(&self, input: RegisterInput) -> Result<UserView, AuthError> {
        let violations = input.violations();
        if !violations.is_empty() {
            return Err(AuthError::Validation(format!(
                "required fields missing or empty: {}",
                violations.join(", ")
            )));
        }

        let username = input.username.trim().to_lowercase();
        let email = input.email.trim().to_string();

        if self
            .users
            .find_by_email_or_username(&email, &username)
            .await?
            .is_some()
        {
            tracing::warn!(username = %username, "registration rejected, identity already taken");
            return Err(AuthError::Conflict(
                "user with this email or username already exists".to_string(),
            ));
        }

        let avatar_file = input
            .avatar
            .as_ref()
            .ok_or_else(|| AuthError::Validation("avatar file is required".to_string()))?;
        let avatar = self.media.upload_staged(avatar_file).await?;
        let cover_image = match &input.cover_image {
            Some(file) => Some(self.media.upload_staged(file).await?.url),
            None => None,
        };

        let password_hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)?;
        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username,
            email,
            full_name: input.full_name.trim().to_string(),
            avatar: avatar.url,
            cover_image,
            password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.users.insert(record).await?;
        tracing::info!(user_id = %created.id, username = %created.username, "user registered");
        Ok(UserView::from(&created))
    }

    /// Authenticate and open a session.
    ///
    /// Persisting the new refresh token overwrites whatever was stored
    /// before, which invalidates any previously issued refresh token.
    pub async fn login(&self, request: LoginRequest) -> Result<(UserView, TokenPair), AuthError> {
        let identifier = request
            .identifier()
            .ok_or_else(|| AuthError::Validation("email or username is required".to_string()))?
            .to_string();
        let password = request
            .password
            .as_deref()
            .filter(|password| !password.trim().is_empty())
            .ok_or_else(|| AuthError::Validation("password is required".to_string()))?;

        let user = self
            .users
            .find_by_email_or_username(&identifier, &identifier.to_lowercase())
            .await?
            .ok_or_else(|| {
                tracing::warn!(identifier = %identifier, "login rejected, no matching user");
                AuthError::Unauthorized("invalid email or password".to_string())
            })?;

        if !bcrypt::verify(password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "login rejected, bad credentials");
            return Err(AuthError::Unauthorized("invalid user credentials".to_string()));
        }

        let pair = self.issue_token_pair(&user).await?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok((UserView::from(&user), pair))
    }

    /// Close the session by clearing the stored refresh token.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.users.set_refresh_token(user_id, None).await?;
        tracing::info!(user_id = %user_id, "user logged out, refresh token cleared");
        Ok(())
    }

    /// Exchange a refresh token for a fresh pair.
    ///
    /// The incoming token must both verify and exactly match the stored
    /// value; a mismatch means it was already rotated away or the user
    /// logged out, and the attempt is treated as replay. A rejection does
    /// not touch the stored token.
    pub async fn refresh_access_token(&self, incoming: &str) -> Result<TokenPair, AuthError> {
        let claims = self.tokens.verify_refresh_token(incoming).map_err(|err| {
            tracing::warn!("refresh token failed verification: {}", err);
            AuthError::Unauthorized("invalid refresh token".to_string())
        })?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("invalid refresh token".to_string()))?;

        if user.refresh_token.as_deref() != Some(incoming) {
            tracing::warn!(user_id = %user.id, "refresh token replayed or superseded");
            return Err(AuthError::Unauthorized(
                "refresh token is expired or already used".to_string(),
            ));
        }

        self.issue_token_pair(&user).await
    }

    /// Sanitized view of an authenticated user.
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserView, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("user no longer exists".to_string()))?;
        Ok(UserView::from(&user))
    }

    /// Update full name and/or email on the account.
    pub async fn update_account(
        &self,
        user_id: Uuid,
        request: UpdateAccountRequest,
    ) -> Result<UserView, AuthError> {
        let full_name = non_empty_owned(request.full_name.as_deref());
        let email = non_empty_owned(request.email.as_deref());
        if full_name.is_none() && email.is_none() {
            return Err(AuthError::Validation(
                "at least one of fullName or email is required".to_string(),
            ));
        }

        if let Some(email) = &email {
            if let Some(owner) = self.users.find_by_email(email).await? {
                if owner.id != user_id {
                    return Err(AuthError::Conflict(
                        "email is already in use by another account".to_string(),
                    ));
                }
            }
        }

        let updated = self
            .users
            .update_profile(user_id, full_name.as_deref(), email.as_deref())
            .await?;
        tracing::info!(user_id = %user_id, "account details updated");
        Ok(UserView::from(&updated))
    }

    /// Replace the avatar with a freshly uploaded file.
    pub async fn update_avatar(
        &self,
        user_id: Uuid,
        file: &StagedFile,
    ) -> Result<UserView, AuthError> {
        let media = self.media.upload_staged(file).await?;
        let updated = self.users.set_avatar(user_id, &media.url).await?;
        tracing::info!(user_id = %user_id, "avatar updated");
        Ok(UserView::from(&updated))
    }

    /// Verify an access token for request guards.
    pub fn verify_access_token(
        &self,
        token: &str,
    ) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        self.tokens.verify_access_token(token)
    }

    /// Issue a pair and persist the refresh half. Once the write lands,
    /// the previous refresh token stops matching and is dead for good.
    async fn issue_token_pair(&self, user: &UserRecord) -> Result<TokenPair, AuthError> {
        let access_token = self.tokens.issue_access_token(user).map_err(|err| {
            tracing::error!(user_id = %user.id, "access token generation failed: {}", err);
            AuthError::TokenGeneration(err)
        })?;
        let refresh_token = self.tokens.issue_refresh_token(user.id).map_err(|err| {
            tracing::error!(user_id = %user.id, "refresh token generation failed: {}", err);
            AuthError::TokenGeneration(err)
        })?;

        self.users
            .set_refresh_token(user.id, Some(&refresh_token))
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::database::queries::MemoryUserRepository;
    use vidtube_adapters::MemoryBlobStore;

    struct Harness {
        service: AuthService,
        users: Arc<MemoryUserRepository>,
        store: Arc<MemoryBlobStore>,
        media: Arc<MediaManager>,
    }

    fn harness() -> Harness {
        let users = Arc::new(MemoryUserRepository::new());
        let store = Arc::new(MemoryBlobStore::new());
        let temp_dir = std::env::temp_dir().join(format!("vidtube-auth-test-{}", Uuid::new_v4()));
        let media = Arc::new(MediaManager::new(store.clone(), temp_dir));
        let tokens = TokenIssuer::new(&TokenConfig {
            access_secret: "access-test-secret".to_string(),
            refresh_secret: "refresh-test-secret".to_string(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 86_400,
        });
        Harness {
            service: AuthService::new(users.clone(), media.clone(), tokens),
            users,
            store,
            media,
        }
    }

    async fn staged(harness: &Harness, name: &str) -> StagedFile {
        harness.media.stash(name, b"file bytes").await.unwrap()
    }

    async fn register_input(harness: &Harness, username: &str, email: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Mo".to_string(),
            password: "secret1".to_string(),
            avatar: Some(staged(harness, "avatar.png").await),
            cover_image: None,
        }
    }

    #[tokio::test]
    async fn register_returns_sanitized_view_with_lowercased_username() {
        let harness = harness();
        let input = register_input(&harness, "  MoSalah ", "mo@x.com").await;

        let view = harness.service.register(input).await.unwrap();
        assert_eq!(view.username, "mosalah");
        assert_eq!(view.email, "mo@x.com");
        assert!(harness.store.contains(&view.avatar).await);

        let value = serde_json::to_value(&view).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("passwordHash"));
        assert!(!object.contains_key("refreshToken"));
    }

    #[tokio::test]
    async fn register_hashes_the_password() {
        let harness = harness();
        let input = register_input(&harness, "mo", "mo@x.com").await;

        let view = harness.service.register(input).await.unwrap();
        let record = harness.users.find_by_id(view.id).await.unwrap().unwrap();
        assert_ne!(record.password_hash, "secret1");
        assert!(bcrypt::verify("secret1", &record.password_hash).unwrap());
    }

    #[tokio::test]
    async fn register_rejects_empty_required_fields() {
        let harness = harness();
        let mut input = register_input(&harness, "mo", "mo@x.com").await;
        input.full_name = "   ".to_string();

        let err = harness.service.register(input).await.unwrap_err();
        match err {
            AuthError::Validation(message) => assert!(message.contains("fullName")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email_and_duplicate_username() {
        let harness = harness();
        let input = register_input(&harness, "mo", "mo@x.com").await;
        harness.service.register(input).await.unwrap();

        let same_email = register_input(&harness, "different", "mo@x.com").await;
        assert!(matches!(
            harness.service.register(same_email).await,
            Err(AuthError::Conflict(_))
        ));

        let same_username = register_input(&harness, "mo", "other@x.com").await;
        assert!(matches!(
            harness.service.register(same_username).await,
            Err(AuthError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn register_requires_an_avatar_file() {
        let harness = harness();
        let mut input = register_input(&harness, "mo", "mo@x.com").await;
        input.avatar = None;

        let err = harness.service.register(input).await.unwrap_err();
        match err {
            AuthError::Validation(message) => assert!(message.contains("avatar")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_avatar_upload_leaves_no_user_behind() {
        let harness = harness();
        harness.store.fail_uploads(true);
        let input = register_input(&harness, "mo", "mo@x.com").await;

        let err = harness.service.register(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Upload(_)));
        assert!(harness
            .users
            .find_by_email_or_username("mo@x.com", "mo")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn login_persists_the_issued_refresh_token() {
        let harness = harness();
        let input = register_input(&harness, "mo", "mo@x.com").await;
        let view = harness.service.register(input).await.unwrap();

        let (user, pair) = harness
            .service
            .login(LoginRequest {
                email: Some("mo@x.com".to_string()),
                username: None,
                password: Some("secret1".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(user.id, view.id);

        let record = harness.users.find_by_id(view.id).await.unwrap().unwrap();
        assert_eq!(record.refresh_token.as_deref(), Some(pair.refresh_token.as_str()));
    }

    #[tokio::test]
    async fn login_accepts_the_username_as_identifier() {
        let harness = harness();
        let input = register_input(&harness, "Mo", "mo@x.com").await;
        harness.service.register(input).await.unwrap();

        let result = harness
            .service
            .login(LoginRequest {
                email: None,
                username: Some("Mo".to_string()),
                password: Some("secret1".to_string()),
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn login_validates_each_field_independently() {
        let harness = harness();

        let err = harness
            .service
            .login(LoginRequest {
                email: None,
                username: None,
                password: Some("secret1".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let err = harness
            .service
            .login(LoginRequest {
                email: Some("mo@x.com".to_string()),
                username: None,
                password: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized_and_rotates_nothing() {
        let harness = harness();
        let input = register_input(&harness, "mo", "mo@x.com").await;
        let view = harness.service.register(input).await.unwrap();

        let err = harness
            .service
            .login(LoginRequest {
                email: Some("mo@x.com".to_string()),
                username: None,
                password: Some("wrong-password".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));

        let record = harness.users.find_by_id(view.id).await.unwrap().unwrap();
        assert_eq!(record.refresh_token, None);
    }

    #[tokio::test]
    async fn unknown_identifier_is_unauthorized() {
        let harness = harness();
        let err = harness
            .service
            .login(LoginRequest {
                email: Some("ghost@x.com".to_string()),
                username: None,
                password: Some("secret1".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn refresh_rotates_and_rejects_the_superseded_token() {
        let harness = harness();
        let input = register_input(&harness, "mo", "mo@x.com").await;
        harness.service.register(input).await.unwrap();

        let (_, pair) = harness
            .service
            .login(LoginRequest {
                email: Some("mo@x.com".to_string()),
                username: None,
                password: Some("secret1".to_string()),
            })
            .await
            .unwrap();

        let rotated = harness
            .service
            .refresh_access_token(&pair.refresh_token)
            .await
            .unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        let err = harness
            .service
            .refresh_access_token(&pair.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));

        // The rotated token is still the live one.
        assert!(harness
            .service
            .refresh_access_token(&rotated.refresh_token)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn logout_invalidates_the_outstanding_refresh_token() {
        let harness = harness();
        let input = register_input(&harness, "mo", "mo@x.com").await;
        let view = harness.service.register(input).await.unwrap();

        let (_, pair) = harness
            .service
            .login(LoginRequest {
                email: Some("mo@x.com".to_string()),
                username: None,
                password: Some("secret1".to_string()),
            })
            .await
            .unwrap();

        harness.service.logout(view.id).await.unwrap();

        let err = harness
            .service
            .refresh_access_token(&pair.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn second_login_invalidates_the_first_refresh_token() {
        let harness = harness();
        let input = register_input(&harness, "mo", "mo@x.com").await;
        harness.service.register(input).await.unwrap();

        let login_request = || LoginRequest {
            email: Some("mo@x.com".to_string()),
            username: None,
            password: Some("secret1".to_string()),
        };
        let (_, first) = harness.service.login(login_request()).await.unwrap();
        let (_, second) = harness.service.login(login_request()).await.unwrap();

        assert!(matches!(
            harness.service.refresh_access_token(&first.refresh_token).await,
            Err(AuthError::Unauthorized(_))
        ));
        assert!(harness
            .service
            .refresh_access_token(&second.refresh_token)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn garbage_refresh_token_is_unauthorized() {
        let harness = harness();
        let err = harness
            .service
            .refresh_access_token("definitely.not.a.jwt")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn update_account_rejects_an_email_owned_by_someone_else() {
        let harness = harness();
        let first = register_input(&harness, "mo", "mo@x.com").await;
        let first = harness.service.register(first).await.unwrap();
        let second = register_input(&harness, "sara", "sara@x.com").await;
        harness.service.register(second).await.unwrap();

        let err = harness
            .service
            .update_account(
                first.id,
                UpdateAccountRequest {
                    full_name: None,
                    email: Some("sara@x.com".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));

        // Re-submitting your own email is not a conflict.
        let view = harness
            .service
            .update_account(
                first.id,
                UpdateAccountRequest {
                    full_name: Some("Mo Salah".to_string()),
                    email: Some("mo@x.com".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(view.full_name, "Mo Salah");
    }

    #[tokio::test]
    async fn update_account_requires_at_least_one_field() {
        let harness = harness();
        let input = register_input(&harness, "mo", "mo@x.com").await;
        let view = harness.service.register(input).await.unwrap();

        let err = harness
            .service
            .update_account(
                view.id,
                UpdateAccountRequest {
                    full_name: None,
                    email: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn update_avatar_replaces_the_stored_url() {
        let harness = harness();
        let input = register_input(&harness, "mo", "mo@x.com").await;
        let view = harness.service.register(input).await.unwrap();

        let replacement = staged(&harness, "new-avatar.png").await;
        let updated = harness
            .service
            .update_avatar(view.id, &replacement)
            .await
            .unwrap();
        assert_ne!(updated.avatar, view.avatar);
        assert!(harness.store.contains(&updated.avatar).await);
    }

    /// The end-to-end script from the design discussion: register, login,
    /// refresh once, then replay the original refresh token.
    #[tokio::test]
    async fn register_login_refresh_replay_scenario() {
        let harness = harness();
        let input = RegisterInput {
            username: "mo".to_string(),
            email: "mo@x.com".to_string(),
            full_name: "Mo".to_string(),
            password: "secret1".to_string(),
            avatar: Some(staged(&harness, "fileA.png").await),
            cover_image: None,
        };

        let created = harness.service.register(input).await.unwrap();
        let body = serde_json::to_value(&created).unwrap();
        assert!(!body.as_object().unwrap().contains_key("password"));

        let (_, pair) = harness
            .service
            .login(LoginRequest {
                email: Some("mo@x.com".to_string()),
                username: None,
                password: Some("secret1".to_string()),
            })
            .await
            .unwrap();
        assert!(!pair.access_token.is_empty());

        let rotated = harness
            .service
            .refresh_access_token(&pair.refresh_token)
            .await
            .unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        let replay = harness
            .service
            .refresh_access_token(&pair.refresh_token)
            .await
            .unwrap_err();
        assert_eq!(replay.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
