//! PostgreSQL storage backend for Tokensmith Auth
//!
//! Provides persistent storage for:
//!
//! - OAuth clients
//! - Authorization codes (single-use, consumed atomically)
//! - Access and refresh tokens (keyed by SHA-256 hash)
//! - Users (resource owners for the password grant and owner-bound clients)
//!
//! Rows use typed columns; the list-valued client fields (redirect URIs,
//! scopes, grant types) are JSONB. Schema setup runs through embedded
//! migrations.
//!
//! # Example
//!
//! ```ignore
//! use tokensmith_auth_postgres::PostgresAuthStorage;
//!
//! let storage = PostgresAuthStorage::connect("postgres://localhost/tokensmith").await?;
//! storage.run_migrations().await?;
//!
//! let clients = storage.client_storage();
//! let client = clients.find_by_client_id("my-app").await?;
//! ```

pub mod adapters;
pub mod client;
pub mod code;
pub mod migrations;
pub mod token;
pub mod user;

use std::sync::Arc;

use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use adapters::{
    PostgresAccessTokenStorage, PostgresClientStorage, PostgresCodeStorage,
    PostgresIdentityProvider, PostgresRefreshTokenStorage,
};
pub use client::ClientStorage;
pub use code::CodeStorage;
pub use token::{AccessTokenStorage, RefreshTokenStorage};
pub use user::{UserRow, UserStorage};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during auth storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// Resource already exists (conflict).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Schema migration failed.
    #[error("Migration error: {0}")]
    Migration(String),
}

impl StorageError {
    /// Create a `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Returns `true` if this is a `Conflict` error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns `true` if this is a database error.
    #[must_use]
    pub fn is_database_error(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// Returns `true` if this is a client error (4xx equivalent).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::InvalidInput(_))
    }

    /// Returns `true` if this is a server error (5xx equivalent).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Serialization(_) | Self::Migration(_)
        )
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// PostgreSQL Auth Storage
// =============================================================================

/// PostgreSQL storage backend for authorization-server data.
///
/// Holds a connection pool and hands out the Arc-owning adapters that
/// implement the `tokensmith-auth` storage and identity traits.
#[derive(Debug, Clone)]
pub struct PostgresAuthStorage {
    pool: Arc<PgPool>,
}

impl PostgresAuthStorage {
    /// Create new storage with an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create new storage by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        use sqlx_core::pool::PoolOptions;
        let pool = PoolOptions::<Postgres>::new().connect(database_url).await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a reference to the Arc-wrapped pool.
    #[must_use]
    pub fn pool_arc(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails to execute.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        migrations::run(&self.pool).await
    }

    // -------------------------------------------------------------------------
    // Adapter Accessors
    // -------------------------------------------------------------------------

    /// Client storage implementing `tokensmith_auth::storage::ClientStorage`.
    #[must_use]
    pub fn client_storage(&self) -> PostgresClientStorage {
        PostgresClientStorage::new(self.pool_arc())
    }

    /// Code storage implementing
    /// `tokensmith_auth::storage::AuthorizationCodeStorage`.
    #[must_use]
    pub fn code_storage(&self) -> PostgresCodeStorage {
        PostgresCodeStorage::new(self.pool_arc())
    }

    /// Access token storage implementing
    /// `tokensmith_auth::storage::AccessTokenStorage`.
    #[must_use]
    pub fn access_token_storage(&self) -> PostgresAccessTokenStorage {
        PostgresAccessTokenStorage::new(self.pool_arc())
    }

    /// Refresh token storage implementing
    /// `tokensmith_auth::storage::RefreshTokenStorage`.
    #[must_use]
    pub fn refresh_token_storage(&self) -> PostgresRefreshTokenStorage {
        PostgresRefreshTokenStorage::new(self.pool_arc())
    }

    /// Identity provider implementing `tokensmith_auth::IdentityProvider`.
    #[must_use]
    pub fn identity_provider(&self) -> PostgresIdentityProvider {
        PostgresIdentityProvider::new(self.pool_arc())
    }
}

// =============================================================================
// Tests
// =============================================================================
