//! Access and refresh token storage traits.
//!
//! Both traits share the same shape: tokens are keyed by the SHA-256 hash
//! of their opaque value, writes are upserts on that key, and revocation
//! is deletion. Lookups never check expiry; expiry classification belongs
//! to the token ledger and its callers.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::{AccessToken, RefreshToken};

/// Storage trait for access tokens.
#[async_trait]
pub trait AccessTokenStorage: Send + Sync {
    /// Persists a token row, keyed by `token_hash`.
    ///
    /// Writing the same hash twice replaces the row (idempotent on
    /// unchanged content, last-write-wins otherwise). A fresh token value
    /// always creates a new row since its hash differs.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn upsert(&self, token: &AccessToken) -> AuthResult<()>;

    /// Finds a token row by the hash of its value.
    ///
    /// Returns rows regardless of expiry; callers compare `expires_at`
    /// themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<AccessToken>>;

    /// Deletes the row for the given hash if present.
    ///
    /// Returns whether a row existed. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_by_hash(&self, token_hash: &str) -> AuthResult<bool>;

    /// Deletes all rows issued to the given client/user pair.
    ///
    /// Used by the single-session policy to evict prior sessions.
    ///
    /// # Returns
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_for_owner(&self, client_id: &str, user_id: Uuid) -> AuthResult<u64>;

    /// Deletes expired rows.
    ///
    /// # Returns
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn delete_expired(&self) -> AuthResult<u64>;
}

/// Storage trait for refresh tokens.
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Persists a token row, keyed by `token_hash`.
    ///
    /// Same upsert semantics as [`AccessTokenStorage::upsert`].
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn upsert(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Finds a token row by the hash of its value.
    ///
    /// Returns rows regardless of expiry; callers compare `expires_at`
    /// themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Deletes the row for the given hash if present.
    ///
    /// Returns whether a row existed. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_by_hash(&self, token_hash: &str) -> AuthResult<bool>;

    /// Deletes all rows issued to the given client/user pair.
    ///
    /// # Returns
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_for_owner(&self, client_id: &str, user_id: Uuid) -> AuthResult<u64>;

    /// Deletes rows whose expiry has passed.
    ///
    /// Rows without an expiry are never deleted here.
    ///
    /// # Returns
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn delete_expired(&self) -> AuthResult<u64>;
}
