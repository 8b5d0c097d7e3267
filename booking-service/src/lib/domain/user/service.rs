use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::AccessDetails;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::SessionStore;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for account and credential operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Session tracking is optional: without a store, tokens stay valid until
/// they expire.
pub struct UserService<UR, SS>
where
    UR: UserRepository,
    SS: SessionStore,
{
    repository: Arc<UR>,
    sessions: Option<Arc<SS>>,
    authenticator: Arc<Authenticator>,
    storage_timeout: Duration,
    // Verified against when the email is unknown, so both outcomes cost one hash.
    dummy_hash: Option<String>,
}

impl<UR, SS> UserService<UR, SS>
where
    UR: UserRepository,
    SS: SessionStore,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `sessions` - Token id store, `None` to disable revocation
    /// * `authenticator` - Password hashing and token issuance
    /// * `storage_timeout` - Upper bound for each storage call
    pub fn new(
        repository: Arc<UR>,
        sessions: Option<Arc<SS>>,
        authenticator: Arc<Authenticator>,
        storage_timeout: Duration,
    ) -> Self {
        let dummy_hash = authenticator
            .hash_password("unknown-account-placeholder")
            .inspect_err(|e| tracing::warn!(error = %e, "Could not prepare placeholder hash"))
            .ok();

        Self {
            repository,
            sessions,
            authenticator,
            storage_timeout,
            dummy_hash,
        }
    }

    async fn with_timeout<T, F>(&self, operation: F) -> Result<T, UserError>
    where
        F: Future<Output = Result<T, UserError>>,
    {
        tokio::time::timeout(self.storage_timeout, operation)
            .await
            .map_err(|_| UserError::StorageTimeout)?
    }

    // Hashing is CPU bound. It runs on the blocking pool and finishes even if
    // the request that started it is dropped.
    async fn hash_password(&self, password: Password) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(UserError::from)
    }

    async fn verify_password(&self, password: Password, stored_hash: String) -> Result<(), UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || {
            authenticator.verify_password(password.expose(), &stored_hash)
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => UserError::PasswordMismatch,
            AuthenticationError::PasswordError(err) => UserError::Password(err),
            AuthenticationError::JwtError(err) => UserError::Token(err),
        })
    }

    async fn record_issuance(&self, session: &AuthenticatedSession) -> Result<(), UserError> {
        let Some(sessions) = &self.sessions else {
            return Ok(());
        };
        let tokens = &session.tokens;
        let user_id = session.user.id;

        self.with_timeout(async {
            sessions
                .save_token_meta(tokens.access_uuid, user_id, ttl_until(tokens.access_expires_at))
                .await?;
            sessions
                .save_token_meta(
                    tokens.refresh_uuid,
                    user_id,
                    ttl_until(tokens.refresh_expires_at),
                )
                .await?;
            Ok::<(), UserError>(())
        })
        .await
    }
}

fn ttl_until(expires_at: i64) -> Duration {
    let remaining = expires_at - Utc::now().timestamp();
    Duration::from_secs(u64::try_from(remaining).unwrap_or(0))
}

#[async_trait]
impl<UR, SS> UserServicePort for UserService<UR, SS>
where
    UR: UserRepository,
    SS: SessionStore,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        let password_hash = self.hash_password(command.password).await?;

        let new_user = NewUser {
            email: command.email,
            password_hash,
            account_type: command.account_type,
            first_name: command.first_name,
            last_name: command.last_name,
            business_id: command.business_id,
            created_at: Utc::now(),
        };

        let user = self.with_timeout(self.repository.create(new_user)).await?;

        tracing::info!(
            user_id = %user.id,
            account_type = %user.account_type,
            "User registered"
        );

        Ok(user)
    }

    async fn authenticate(
        &self,
        email: &EmailAddress,
        password: Password,
    ) -> Result<AuthenticatedSession, UserError> {
        let Some(user) = self
            .with_timeout(self.repository.find_by_email(email))
            .await?
        else {
            if let Some(dummy_hash) = &self.dummy_hash {
                let _ = self.verify_password(password, dummy_hash.clone()).await;
            }
            return Err(UserError::NotFoundByEmail(email.to_string()));
        };

        if let Err(e) = self
            .verify_password(password, user.password_hash.clone())
            .await
        {
            if matches!(e, UserError::PasswordMismatch) {
                tracing::debug!(user_id = %user.id, "Password mismatch");
            }
            return Err(e);
        }

        let tokens = self
            .authenticator
            .issuer()
            .issue_token_pair(user.id.0, user.account_type.as_str())?;

        let session = AuthenticatedSession { user, tokens };
        self.record_issuance(&session).await?;

        tracing::info!(
            user_id = %session.user.id,
            access_uuid = %session.tokens.access_uuid,
            "User authenticated"
        );

        Ok(session)
    }

    async fn verify_session(&self, details: &AccessDetails) -> Result<(), UserError> {
        let Some(sessions) = &self.sessions else {
            return Ok(());
        };

        let owner = self
            .with_timeout(async {
                Ok::<_, UserError>(sessions.lookup_token_meta(details.access_uuid).await?)
            })
            .await?;

        match owner {
            Some(owner) if owner.0 == details.user_id => Ok(()),
            _ => Err(UserError::SessionRevoked),
        }
    }

    async fn logout(&self, details: &AccessDetails) -> Result<(), UserError> {
        let Some(sessions) = &self.sessions else {
            tracing::debug!(
                user_id = details.user_id,
                "Session tracking disabled, token stays valid until expiry"
            );
            return Ok(());
        };

        self.with_timeout(async {
            Ok::<_, UserError>(sessions.delete_token_meta(details.access_uuid).await?)
        })
        .await?;
        tracing::info!(
            user_id = details.user_id,
            access_uuid = %details.access_uuid,
            "Session revoked"
        );
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.with_timeout(self.repository.find_by_id(id))
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.with_timeout(self.repository.list_all()).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.with_timeout(self.repository.delete(id)).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
