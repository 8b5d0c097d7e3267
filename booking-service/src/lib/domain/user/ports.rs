use std::time::Duration;

use async_trait::async_trait;
use auth::AccessDetails;
use uuid::Uuid;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::SessionStoreError;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// The password is hashed before the record reaches storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Password` - Hashing failed
    /// * `StorageTimeout` - Storage did not answer in time
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Verify credentials and issue a token pair.
    ///
    /// # Errors
    /// * `NotFoundByEmail` - No account with this email
    /// * `PasswordMismatch` - Wrong password
    /// * `Password` - Stored hash unusable
    /// * `Token` - Token signing failed
    /// * `SessionStore` - Issued tokens could not be recorded
    /// * `StorageTimeout` - Storage did not answer in time
    async fn authenticate(
        &self,
        email: &EmailAddress,
        password: Password,
    ) -> Result<AuthenticatedSession, UserError>;

    /// Confirm that a validated access token has not been revoked.
    ///
    /// Always succeeds when session tracking is disabled.
    ///
    /// # Errors
    /// * `SessionRevoked` - Token id unknown to the session store
    /// * `SessionStore` - Session store failed
    async fn verify_session(&self, details: &AccessDetails) -> Result<(), UserError>;

    /// Revoke the access token described by `details`.
    ///
    /// # Errors
    /// * `SessionStore` - Session store failed
    async fn logout(&self, details: &AccessDetails) -> Result<(), UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve every registered user.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Delete existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage, assigning its id.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Retrieve all users from storage.
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}

/// Server-side record of issued token ids, enabling revocation.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Remember that `token_uuid` was issued to `user_id` for `ttl`.
    async fn save_token_meta(
        &self,
        token_uuid: Uuid,
        user_id: UserId,
        ttl: Duration,
    ) -> Result<(), SessionStoreError>;

    /// Look up the owner of a live token id.
    ///
    /// # Returns
    /// None once the entry expired or was deleted
    async fn lookup_token_meta(&self, token_uuid: Uuid) -> Result<Option<UserId>, SessionStoreError>;

    /// Forget a token id.
    ///
    /// # Returns
    /// Whether an entry was removed
    async fn delete_token_meta(&self, token_uuid: Uuid) -> Result<bool, SessionStoreError>;
}
