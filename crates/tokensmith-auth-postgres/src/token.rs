//! Access and refresh token storage.
//!
//! Both tables are keyed by `token_hash` with an upsert on that key.
//! Lookups return rows regardless of expiry; the token ledger classifies
//! expired rows itself.

use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use tokensmith_auth::types::{AccessToken, RefreshToken};

use crate::{PgPool, StorageResult};

/// Database tuple shared by both token tables; only the expiry column's
/// nullability differs.
type AccessTokenTuple = (
    Uuid,
    String,
    String,
    Option<Uuid>,
    Option<String>,
    OffsetDateTime,
    OffsetDateTime,
);

type RefreshTokenTuple = (
    Uuid,
    String,
    String,
    Option<Uuid>,
    Option<String>,
    OffsetDateTime,
    Option<OffsetDateTime>,
);

fn access_token_from_tuple(row: AccessTokenTuple) -> AccessToken {
    AccessToken {
        id: row.0,
        token_hash: row.1,
        client_id: row.2,
        user_id: row.3,
        scope: row.4,
        created_at: row.5,
        expires_at: row.6,
    }
}

fn refresh_token_from_tuple(row: RefreshTokenTuple) -> RefreshToken {
    RefreshToken {
        id: row.0,
        token_hash: row.1,
        client_id: row.2,
        user_id: row.3,
        scope: row.4,
        created_at: row.5,
        expires_at: row.6,
    }
}

// =============================================================================
// Access Token Storage
// =============================================================================

/// Access token storage operations.
pub struct AccessTokenStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> AccessTokenStorage<'a> {
    /// Create a new access token storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a token row keyed by `token_hash`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert(&self, token: &AccessToken) -> StorageResult<()> {
        query(
            r#"
            INSERT INTO oauth_access_token (id, token_hash, client_id, user_id,
                                            scope, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (token_hash) DO UPDATE
            SET client_id = EXCLUDED.client_id,
                user_id = EXCLUDED.user_id,
                scope = EXCLUDED.scope,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(token.id)
        .bind(&token.token_hash)
        .bind(&token.client_id)
        .bind(token.user_id)
        .bind(token.scope.as_deref())
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Find a token row by the hash of its value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_hash(&self, token_hash: &str) -> StorageResult<Option<AccessToken>> {
        let row: Option<AccessTokenTuple> = query_as(
            r#"
            SELECT id, token_hash, client_id, user_id, scope, created_at, expires_at
            FROM oauth_access_token
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(access_token_from_tuple))
    }

    /// Delete the row for the given hash if present.
    ///
    /// Returns whether a row existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete_by_hash(&self, token_hash: &str) -> StorageResult<bool> {
        let result = query(
            r#"
            DELETE FROM oauth_access_token
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all rows issued to the given client/user pair.
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete_for_owner(&self, client_id: &str, user_id: Uuid) -> StorageResult<u64> {
        let result = query(
            r#"
            DELETE FROM oauth_access_token
            WHERE client_id = $1
              AND user_id = $2
            "#,
        )
        .bind(client_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete expired rows.
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete_expired(&self) -> StorageResult<u64> {
        let result = query(
            r#"
            DELETE FROM oauth_access_token
            WHERE expires_at < NOW()
            "#,
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Refresh Token Storage
// =============================================================================

/// Refresh token storage operations.
pub struct RefreshTokenStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> RefreshTokenStorage<'a> {
    /// Create a new refresh token storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a token row keyed by `token_hash`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert(&self, token: &RefreshToken) -> StorageResult<()> {
        query(
            r#"
            INSERT INTO oauth_refresh_token (id, token_hash, client_id, user_id,
                                             scope, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (token_hash) DO UPDATE
            SET client_id = EXCLUDED.client_id,
                user_id = EXCLUDED.user_id,
                scope = EXCLUDED.scope,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(token.id)
        .bind(&token.token_hash)
        .bind(&token.client_id)
        .bind(token.user_id)
        .bind(token.scope.as_deref())
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Find a token row by the hash of its value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_hash(&self, token_hash: &str) -> StorageResult<Option<RefreshToken>> {
        let row: Option<RefreshTokenTuple> = query_as(
            r#"
            SELECT id, token_hash, client_id, user_id, scope, created_at, expires_at
            FROM oauth_refresh_token
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(refresh_token_from_tuple))
    }

    /// Delete the row for the given hash if present.
    ///
    /// Returns whether a row existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete_by_hash(&self, token_hash: &str) -> StorageResult<bool> {
        let result = query(
            r#"
            DELETE FROM oauth_refresh_token
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all rows issued to the given client/user pair.
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete_for_owner(&self, client_id: &str, user_id: Uuid) -> StorageResult<u64> {
        let result = query(
            r#"
            DELETE FROM oauth_refresh_token
            WHERE client_id = $1
              AND user_id = $2
            "#,
        )
        .bind(client_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete rows whose expiry has passed.
    ///
    /// Rows without an expiry are never deleted here.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete_expired(&self) -> StorageResult<u64> {
        let result = query(
            r#"
            DELETE FROM oauth_refresh_token
            WHERE expires_at IS NOT NULL
              AND expires_at < NOW()
            "#,
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
