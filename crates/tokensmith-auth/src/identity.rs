//! Identity collaborator contract.
//!
//! User records and credential checks are owned by an external identity
//! system; the grant model only consumes this trait. The password grant
//! delegates credential verification here, and the authorization endpoint
//! uses it to resolve owner-bound and bearer-authenticated users.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::User;

/// Contract for the external identity collaborator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify resource-owner credentials.
    ///
    /// Returns the authenticated [`User`] on success.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`](crate::AuthError::Unauthenticated)
    /// when the credentials are rejected or the account is inactive, and a
    /// storage error if the lookup itself fails.
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<User>;

    /// Look up a user by id.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    async fn find_user(&self, user_id: Uuid) -> AuthResult<Option<User>>;
}
