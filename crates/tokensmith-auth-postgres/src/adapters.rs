//! Arc-owning storage adapters.
//!
//! These adapters wrap the lifetime-based storage types and own an
//! `Arc<PgPool>`, allowing them to be injected as `Arc<dyn Trait>` into
//! the auth services. Storage errors cross the boundary as
//! `AuthError::Storage`.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use tokensmith_auth::identity::IdentityProvider;
use tokensmith_auth::secret;
use tokensmith_auth::storage::{
    AccessTokenStorage as AccessTokenStorageTrait,
    AuthorizationCodeStorage as AuthorizationCodeStorageTrait,
    ClientStorage as ClientStorageTrait, RefreshTokenStorage as RefreshTokenStorageTrait,
};
use tokensmith_auth::types::{AccessToken, AuthorizationCode, Client, RefreshToken, User};
use tokensmith_auth::{AuthError, AuthResult};

use crate::PgPool;
use crate::client::ClientStorage;
use crate::code::CodeStorage;
use crate::token::{AccessTokenStorage, RefreshTokenStorage};
use crate::user::UserStorage;

// =============================================================================
// Client Storage
// =============================================================================

/// Arc-owning PostgreSQL client storage adapter.
#[derive(Clone)]
pub struct PostgresClientStorage {
    pool: Arc<PgPool>,
}

impl PostgresClientStorage {
    /// Create a new Arc-owning client storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStorageTrait for PostgresClientStorage {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        let storage = ClientStorage::new(&self.pool);
        storage
            .find_by_client_id(client_id)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn create(&self, client: &Client) -> AuthResult<Client> {
        client
            .validate()
            .map_err(|e| AuthError::invalid_request(e.to_string()))?;

        let storage = ClientStorage::new(&self.pool);
        storage
            .create(client)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn verify_secret(&self, client_id: &str, candidate: &str) -> AuthResult<bool> {
        let storage = ClientStorage::new(&self.pool);
        let client = storage
            .find_by_client_id(client_id)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))?;

        match client {
            Some(client) => secret::verify_secret(candidate, &client.secret_hash)
                .map_err(|e| AuthError::storage(format!("Secret verification failed: {e}"))),
            None => Ok(false),
        }
    }
}

// =============================================================================
// Authorization Code Storage
// =============================================================================

/// Arc-owning PostgreSQL authorization code storage adapter.
#[derive(Clone)]
pub struct PostgresCodeStorage {
    pool: Arc<PgPool>,
}

impl PostgresCodeStorage {
    /// Create a new Arc-owning code storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorizationCodeStorageTrait for PostgresCodeStorage {
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()> {
        let storage = CodeStorage::new(&self.pool);
        storage
            .create(code)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        let storage = CodeStorage::new(&self.pool);
        storage
            .consume(code)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn delete(&self, code: &str) -> AuthResult<bool> {
        let storage = CodeStorage::new(&self.pool);
        storage
            .delete(code)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let storage = CodeStorage::new(&self.pool);
        storage
            .delete_expired()
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }
}

// =============================================================================
// Access Token Storage
// =============================================================================

/// Arc-owning PostgreSQL access token storage adapter.
#[derive(Clone)]
pub struct PostgresAccessTokenStorage {
    pool: Arc<PgPool>,
}

impl PostgresAccessTokenStorage {
    /// Create a new Arc-owning access token storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessTokenStorageTrait for PostgresAccessTokenStorage {
    async fn upsert(&self, token: &AccessToken) -> AuthResult<()> {
        let storage = AccessTokenStorage::new(&self.pool);
        storage
            .upsert(token)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<AccessToken>> {
        let storage = AccessTokenStorage::new(&self.pool);
        storage
            .find_by_hash(token_hash)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn delete_by_hash(&self, token_hash: &str) -> AuthResult<bool> {
        let storage = AccessTokenStorage::new(&self.pool);
        storage
            .delete_by_hash(token_hash)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn delete_for_owner(&self, client_id: &str, user_id: Uuid) -> AuthResult<u64> {
        let storage = AccessTokenStorage::new(&self.pool);
        storage
            .delete_for_owner(client_id, user_id)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let storage = AccessTokenStorage::new(&self.pool);
        storage
            .delete_expired()
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }
}

// =============================================================================
// Refresh Token Storage
// =============================================================================

/// Arc-owning PostgreSQL refresh token storage adapter.
#[derive(Clone)]
pub struct PostgresRefreshTokenStorage {
    pool: Arc<PgPool>,
}

impl PostgresRefreshTokenStorage {
    /// Create a new Arc-owning refresh token storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStorageTrait for PostgresRefreshTokenStorage {
    async fn upsert(&self, token: &RefreshToken) -> AuthResult<()> {
        let storage = RefreshTokenStorage::new(&self.pool);
        storage
            .upsert(token)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        let storage = RefreshTokenStorage::new(&self.pool);
        storage
            .find_by_hash(token_hash)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn delete_by_hash(&self, token_hash: &str) -> AuthResult<bool> {
        let storage = RefreshTokenStorage::new(&self.pool);
        storage
            .delete_by_hash(token_hash)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn delete_for_owner(&self, client_id: &str, user_id: Uuid) -> AuthResult<u64> {
        let storage = RefreshTokenStorage::new(&self.pool);
        storage
            .delete_for_owner(client_id, user_id)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let storage = RefreshTokenStorage::new(&self.pool);
        storage
            .delete_expired()
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }
}

// =============================================================================
// Identity Provider
// =============================================================================

/// Arc-owning PostgreSQL identity provider.
///
/// Verifies resource-owner credentials against the `users` table with
/// Argon2 password hashes.
#[derive(Clone)]
pub struct PostgresIdentityProvider {
    pool: Arc<PgPool>,
}

impl PostgresIdentityProvider {
    /// Create a new Arc-owning identity provider.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for PostgresIdentityProvider {
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<User> {
        let storage = UserStorage::new(&self.pool);
        let row = storage
            .find_by_email(username)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))?;

        // Unknown user, inactive account and wrong password share one message
        let Some(row) = row else {
            return Err(AuthError::unauthenticated("Invalid username or password"));
        };

        if !row.active {
            return Err(AuthError::unauthenticated("Invalid username or password"));
        }

        let matches = secret::verify_secret(password, &row.password_hash)
            .map_err(|e| AuthError::storage(format!("Password verification failed: {e}")))?;
        if !matches {
            return Err(AuthError::unauthenticated("Invalid username or password"));
        }

        row.into_user().map_err(|e| AuthError::storage(e.to_string()))
    }

    async fn find_user(&self, user_id: Uuid) -> AuthResult<Option<User>> {
        let storage = UserStorage::new(&self.pool);
        let row = storage
            .find_by_id(user_id)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))?;

        match row {
            Some(row) => {
                let user = row
                    .into_user()
                    .map_err(|e| AuthError::storage(e.to_string()))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }
}
