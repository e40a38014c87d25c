//! Authorization code storage trait.
//!
//! This module defines the storage interface for single-use authorization
//! codes minted during the OAuth 2.0 authorization code flow.
//!
//! # Implementation Notes
//!
//! Implementations should:
//!
//! - Support efficient lookup by code value
//! - Ensure atomicity for consume operations (prevent replay attacks)
//! - Clean up expired codes periodically
//!
//! # Security Considerations
//!
//! - Never log authorization code values
//! - Ensure consume is atomic to prevent race conditions

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AuthorizationCode;

/// Storage trait for authorization codes.
///
/// Codes are created when an authorization request is validated and
/// removed when exchanged for tokens. Exactly zero or one live row exists
/// per code value.
#[async_trait]
pub trait AuthorizationCodeStorage: Send + Sync {
    /// Persists a new authorization code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code cannot be stored (e.g., duplicate
    /// value, storage unavailable).
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()>;

    /// Atomically removes and returns the code row.
    ///
    /// Returns `None` when no row exists for the value. The returned row
    /// may already be past its expiry; classifying that case is the
    /// caller's job. Either way the row is gone afterwards.
    ///
    /// # Atomicity
    ///
    /// The read and the delete must execute as one indivisible operation
    /// so that two concurrent exchanges of the same code race to exactly
    /// one winner. A common approach:
    ///
    /// ```sql
    /// DELETE FROM oauth_authorization_code
    /// WHERE code = $1
    /// RETURNING ...
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Deletes the code row if present.
    ///
    /// Returns whether a row existed. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, code: &str) -> AuthResult<bool>;

    /// Deletes expired codes.
    ///
    /// Should be called periodically to prevent storage growth; lazy
    /// expiry at consume time remains authoritative.
    ///
    /// # Returns
    ///
    /// Returns the number of codes deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn delete_expired(&self) -> AuthResult<u64>;
}
