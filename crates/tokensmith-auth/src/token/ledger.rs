//! Token ledger.
//!
//! Issues, looks up, and revokes access and refresh tokens against their
//! storage backends. Only the SHA-256 hash of a token is ever persisted;
//! the plaintext exists once, in the issuance return value, and is gone
//! after the response is sent.
//!
//! # Pair Issuance
//!
//! `issue_pair` is the primary-issuance entry point used by the code
//! exchange and password flows. It applies the configured session policy
//! and guarantees no partial persistence: if the refresh token cannot be
//! stored after the access token was, the access token is revoked before
//! the error surfaces.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::AuthResult;
use crate::config::{AuthConfig, SessionPolicy};
use crate::storage::{AccessTokenStorage, RefreshTokenStorage};
use crate::types::{AccessToken, Client, RefreshToken, generate_token, hash_token};

/// A freshly issued access/refresh token pair.
///
/// `access_token` and `refresh_token` are the plaintext values handed to
/// the client; `access` and `refresh` are the persisted records.
#[derive(Debug)]
pub struct TokenPair {
    /// Plaintext access token.
    pub access_token: String,

    /// Persisted access token record.
    pub access: AccessToken,

    /// Plaintext refresh token.
    pub refresh_token: String,

    /// Persisted refresh token record.
    pub refresh: RefreshToken,
}

/// Ledger of live access and refresh tokens.
pub struct TokenLedger {
    access_tokens: Arc<dyn AccessTokenStorage>,
    refresh_tokens: Arc<dyn RefreshTokenStorage>,
    config: AuthConfig,
}

impl TokenLedger {
    /// Creates a new token ledger.
    #[must_use]
    pub fn new(
        access_tokens: Arc<dyn AccessTokenStorage>,
        refresh_tokens: Arc<dyn RefreshTokenStorage>,
        config: AuthConfig,
    ) -> Self {
        Self {
            access_tokens,
            refresh_tokens,
            config,
        }
    }

    /// Issues and persists a new access token.
    ///
    /// Returns the plaintext alongside the stored record; the plaintext is
    /// not recoverable afterwards.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persistence fails.
    pub async fn issue_access_token(
        &self,
        client: &Client,
        user_id: Option<Uuid>,
        scope: Option<String>,
    ) -> AuthResult<(String, AccessToken)> {
        let plaintext = generate_token();
        let now = OffsetDateTime::now_utc();
        let token = AccessToken {
            id: Uuid::new_v4(),
            token_hash: hash_token(&plaintext),
            client_id: client.client_id.clone(),
            user_id,
            scope,
            created_at: now,
            expires_at: now + self.config.access_token_lifetime,
        };

        self.access_tokens.upsert(&token).await?;

        debug!(
            token_id = %token.id,
            client_id = %client.client_id,
            user_id = ?user_id,
            "Access token issued"
        );

        Ok((plaintext, token))
    }

    /// Issues and persists a new refresh token.
    ///
    /// The expiry follows `refresh_token_lifetime`; when that is unset the
    /// token never expires.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persistence fails.
    pub async fn issue_refresh_token(
        &self,
        client: &Client,
        user_id: Option<Uuid>,
        scope: Option<String>,
    ) -> AuthResult<(String, RefreshToken)> {
        let plaintext = generate_token();
        let now = OffsetDateTime::now_utc();
        let token = RefreshToken {
            id: Uuid::new_v4(),
            token_hash: hash_token(&plaintext),
            client_id: client.client_id.clone(),
            user_id,
            scope,
            created_at: now,
            expires_at: self.config.refresh_token_lifetime.map(|l| now + l),
        };

        self.refresh_tokens.upsert(&token).await?;

        debug!(
            token_id = %token.id,
            client_id = %client.client_id,
            user_id = ?user_id,
            "Refresh token issued"
        );

        Ok((plaintext, token))
    }

    /// Issues an access/refresh pair for a primary grant (code exchange or
    /// password).
    ///
    /// Under `SessionPolicy::Single`, existing tokens for a user-bound
    /// `(client, user)` identity are evicted first, so at most one session
    /// per client and user survives. Client-only identities are never
    /// evicted.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persistence fails. If the refresh token
    /// cannot be stored, the already-persisted access token is revoked
    /// before the error is returned.
    pub async fn issue_pair(
        &self,
        client: &Client,
        user_id: Option<Uuid>,
        scope: Option<String>,
    ) -> AuthResult<TokenPair> {
        if self.config.session_policy == SessionPolicy::Single
            && let Some(user_id) = user_id
        {
            let evicted_access = self
                .access_tokens
                .delete_for_owner(&client.client_id, user_id)
                .await?;
            let evicted_refresh = self
                .refresh_tokens
                .delete_for_owner(&client.client_id, user_id)
                .await?;
            if evicted_access + evicted_refresh > 0 {
                debug!(
                    client_id = %client.client_id,
                    user_id = %user_id,
                    evicted_access,
                    evicted_refresh,
                    "Evicted existing session tokens"
                );
            }
        }

        let (access_token, access) = self
            .issue_access_token(client, user_id, scope.clone())
            .await?;

        let (refresh_token, refresh) = match self
            .issue_refresh_token(client, user_id, scope)
            .await
        {
            Ok(pair) => pair,
            Err(e) => {
                warn!(
                    client_id = %client.client_id,
                    access_token_id = %access.id,
                    "Refresh token persistence failed; revoking access token"
                );
                if let Err(revoke_err) =
                    self.access_tokens.delete_by_hash(&access.token_hash).await
                {
                    error!(
                        access_token_id = %access.id,
                        error = %revoke_err,
                        "Failed to revoke access token after refresh persistence failure"
                    );
                }
                return Err(e);
            }
        };

        Ok(TokenPair {
            access_token,
            access,
            refresh_token,
            refresh,
        })
    }

    /// Looks up an access token by its plaintext value.
    ///
    /// Does not check expiry; callers compare `expires_at` themselves.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails.
    pub async fn lookup_access_token(&self, token: &str) -> AuthResult<Option<AccessToken>> {
        self.access_tokens.find_by_hash(&hash_token(token)).await
    }

    /// Looks up a refresh token by its plaintext value.
    ///
    /// Does not check expiry; callers compare `expires_at` themselves.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails.
    pub async fn lookup_refresh_token(&self, token: &str) -> AuthResult<Option<RefreshToken>> {
        self.refresh_tokens.find_by_hash(&hash_token(token)).await
    }

    /// Revokes an access token by its plaintext value.
    ///
    /// Idempotent; returns whether a row existed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the operation fails.
    pub async fn revoke_access_token(&self, token: &str) -> AuthResult<bool> {
        self.access_tokens.delete_by_hash(&hash_token(token)).await
    }

    /// Revokes a refresh token by its plaintext value.
    ///
    /// Idempotent; returns whether a row existed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the operation fails.
    pub async fn revoke_refresh_token(&self, token: &str) -> AuthResult<bool> {
        self.refresh_tokens.delete_by_hash(&hash_token(token)).await
    }
}
