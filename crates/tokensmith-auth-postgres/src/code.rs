//! Authorization code storage.
//!
//! Codes live in the `oauth_authorization_code` table. The consume
//! operation is a single `DELETE ... RETURNING` statement so that two
//! concurrent exchanges of the same code race to exactly one winner.

use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use tokensmith_auth::types::AuthorizationCode;

use crate::{PgPool, StorageError, StorageResult};

/// Database tuple for a code row.
type CodeTuple = (
    String,
    String,
    Option<Uuid>,
    String,
    Option<String>,
    OffsetDateTime,
    OffsetDateTime,
);

fn code_from_tuple(row: CodeTuple) -> AuthorizationCode {
    AuthorizationCode {
        code: row.0,
        client_id: row.1,
        user_id: row.2,
        redirect_uri: row.3,
        scope: row.4,
        created_at: row.5,
        expires_at: row.6,
    }
}

/// Authorization code storage operations.
pub struct CodeStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> CodeStorage<'a> {
    /// Create a new code storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new authorization code.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a row with the same code value
    /// already exists, or an error if the insert fails.
    pub async fn create(&self, code: &AuthorizationCode) -> StorageResult<()> {
        query(
            r#"
            INSERT INTO oauth_authorization_code (code, client_id, user_id,
                                                  redirect_uri, scope,
                                                  created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&code.code)
        .bind(&code.client_id)
        .bind(code.user_id)
        .bind(&code.redirect_uri)
        .bind(code.scope.as_deref())
        .bind(code.created_at)
        .bind(code.expires_at)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx_core::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StorageError::conflict("Authorization code value already exists");
            }
            StorageError::from(e)
        })?;

        Ok(())
    }

    /// Atomically remove and return the code row.
    ///
    /// The delete and the read are one statement; a second concurrent
    /// consume of the same value gets `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn consume(&self, code: &str) -> StorageResult<Option<AuthorizationCode>> {
        let row: Option<CodeTuple> = query_as(
            r#"
            DELETE FROM oauth_authorization_code
            WHERE code = $1
            RETURNING code, client_id, user_id, redirect_uri, scope,
                      created_at, expires_at
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(code_from_tuple))
    }

    /// Delete the code row if present.
    ///
    /// Returns whether a row existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete(&self, code: &str) -> StorageResult<bool> {
        let result = query(
            r#"
            DELETE FROM oauth_authorization_code
            WHERE code = $1
            "#,
        )
        .bind(code)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete expired codes.
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete_expired(&self) -> StorageResult<u64> {
        let result = query(
            r#"
            DELETE FROM oauth_authorization_code
            WHERE expires_at < NOW()
            "#,
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
