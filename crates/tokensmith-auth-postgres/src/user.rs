//! User storage.
//!
//! Users live in the `users` table. The row type carries the Argon2
//! password hash, which never leaves this crate; the public [`User`]
//! domain type excludes it.

use sqlx_core::query_as::query_as;
use uuid::Uuid;

use tokensmith_auth::types::{User, UserRole};

use crate::{PgPool, StorageError, StorageResult};

/// Database tuple for a user row.
type UserTuple = (Uuid, String, String, String, String, String, bool);

/// User record from the database, including the credential hash.
#[derive(Debug, Clone)]
pub struct UserRow {
    /// User UUID.
    pub id: Uuid,
    /// Email address; doubles as the login username.
    pub email: String,
    /// Argon2 password hash (PHC string format).
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Role name as stored.
    pub role: String,
    /// Whether this account may authenticate.
    pub active: bool,
}

impl UserRow {
    fn from_tuple(row: UserTuple) -> Self {
        Self {
            id: row.0,
            email: row.1,
            password_hash: row.2,
            first_name: row.3,
            last_name: row.4,
            role: row.5,
            active: row.6,
        }
    }

    /// Converts the row into the domain type, dropping the credential hash.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidInput` if the stored role name is
    /// not a known role.
    pub fn into_user(self) -> StorageResult<User> {
        let role = match self.role.as_str() {
            "admin" => UserRole::Admin,
            "user" => UserRole::User,
            other => {
                return Err(StorageError::invalid_input(format!(
                    "Unknown role '{other}' for user {}",
                    self.id
                )));
            }
        };

        Ok(User {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role,
            active: self.active,
        })
    }
}

/// User storage operations.
pub struct UserStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> UserStorage<'a> {
    /// Create a new user storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> StorageResult<Option<UserRow>> {
        let row: Option<UserTuple> = query_as(
            r#"
            SELECT id, email, password_hash, first_name, last_name, role, active
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(UserRow::from_tuple))
    }

    /// Find a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<UserRow>> {
        let row: Option<UserTuple> = query_as(
            r#"
            SELECT id, email, password_hash, first_name, last_name, role, active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(UserRow::from_tuple))
    }
}
