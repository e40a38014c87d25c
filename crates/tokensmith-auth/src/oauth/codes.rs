//! Authorization code ledger.
//!
//! Issues, consumes, and revokes single-use authorization codes against an
//! [`AuthorizationCodeStorage`] backend. The consume path is the
//! enforcement point for OAuth 2.0's single-use requirement: the storage
//! removes the row atomically, so two concurrent exchanges of the same
//! code race to exactly one winner.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::AuthorizationCodeStorage;
use crate::types::{AuthorizationCode, Client};

/// Ledger of live authorization codes.
pub struct CodeLedger {
    storage: Arc<dyn AuthorizationCodeStorage>,
    code_lifetime: Duration,
}

impl CodeLedger {
    /// Creates a new code ledger.
    ///
    /// `code_lifetime` is applied to every issued code.
    #[must_use]
    pub fn new(storage: Arc<dyn AuthorizationCodeStorage>, code_lifetime: Duration) -> Self {
        Self {
            storage,
            code_lifetime,
        }
    }

    /// Issues a new single-use authorization code.
    ///
    /// The code value is cryptographically random and unguessable; the
    /// expiry is `now + code_lifetime`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if `redirect_uri` is not registered for
    /// the client, and a storage error if persistence fails.
    pub async fn issue(
        &self,
        client: &Client,
        user_id: Option<Uuid>,
        redirect_uri: &str,
        scope: Option<String>,
    ) -> AuthResult<AuthorizationCode> {
        if !client.is_redirect_uri_allowed(redirect_uri) {
            return Err(AuthError::invalid_request(
                "redirect_uri is not registered for this client",
            ));
        }

        let now = OffsetDateTime::now_utc();
        let code = AuthorizationCode {
            code: AuthorizationCode::generate_code(),
            client_id: client.client_id.clone(),
            user_id,
            redirect_uri: redirect_uri.to_string(),
            scope,
            created_at: now,
            expires_at: now + self.code_lifetime,
        };

        self.storage.create(&code).await?;

        debug!(
            client_id = %client.client_id,
            user_id = ?user_id,
            "Authorization code issued"
        );

        Ok(code)
    }

    /// Consumes an authorization code.
    ///
    /// The row is removed atomically before any further checking, so the
    /// code is spent even when this call goes on to fail. When two callers
    /// race on the same code, exactly one receives the row and the other
    /// observes `CodeNotFound`.
    ///
    /// # Errors
    ///
    /// - `CodeNotFound` if no live row exists for the value
    /// - `CodeExpired` if the row existed but its expiry has passed (the
    ///   stale row is gone either way)
    /// - a storage error if the operation fails
    pub async fn consume(&self, code: &str) -> AuthResult<AuthorizationCode> {
        let row = self
            .storage
            .consume(code)
            .await?
            .ok_or(AuthError::CodeNotFound)?;

        if row.is_expired() {
            debug!(client_id = %row.client_id, "Expired authorization code presented");
            return Err(AuthError::CodeExpired);
        }

        debug!(client_id = %row.client_id, "Authorization code consumed");
        Ok(row)
    }

    /// Revokes an authorization code.
    ///
    /// Idempotent; returns whether a row existed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the operation fails.
    pub async fn revoke(&self, code: &str) -> AuthResult<bool> {
        self.storage.delete(code).await
    }
}
