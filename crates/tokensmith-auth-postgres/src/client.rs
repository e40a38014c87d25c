//! OAuth client storage.
//!
//! Clients live in the `oauth_client` table with typed columns; the
//! list-valued fields (redirect URIs, allowed scopes, grant types) are
//! JSONB arrays deserialized into the domain types on read.

use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use tokensmith_auth::types::Client;

use crate::{PgPool, StorageError, StorageResult};

/// Database tuple for a client row.
type ClientTuple = (
    String,
    String,
    String,
    serde_json::Value,
    serde_json::Value,
    serde_json::Value,
    Option<Uuid>,
    bool,
    OffsetDateTime,
);

/// Maps a database tuple onto the domain type.
fn client_from_tuple(row: ClientTuple) -> StorageResult<Client> {
    Ok(Client {
        client_id: row.0,
        secret_hash: row.1,
        name: row.2,
        redirect_uris: serde_json::from_value(row.3)?,
        allowed_scopes: serde_json::from_value(row.4)?,
        grant_types: serde_json::from_value(row.5)?,
        owner_user_id: row.6,
        active: row.7,
        created_at: row.8,
    })
}

/// Client storage operations.
pub struct ClientStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> ClientStorage<'a> {
    /// Create a new client storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a client by its OAuth client_id.
    ///
    /// Returns `None` if the client doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_client_id(&self, client_id: &str) -> StorageResult<Option<Client>> {
        let row: Option<ClientTuple> = query_as(
            r#"
            SELECT client_id, secret_hash, name, redirect_uris, allowed_scopes,
                   grant_types, owner_user_id, active, created_at
            FROM oauth_client
            WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(client_from_tuple).transpose()
    }

    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a client with the same
    /// client_id already exists, or an error if the insert fails.
    pub async fn create(&self, client: &Client) -> StorageResult<Client> {
        let row: ClientTuple = query_as(
            r#"
            INSERT INTO oauth_client (client_id, secret_hash, name, redirect_uris,
                                      allowed_scopes, grant_types, owner_user_id,
                                      active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING client_id, secret_hash, name, redirect_uris, allowed_scopes,
                      grant_types, owner_user_id, active, created_at
            "#,
        )
        .bind(&client.client_id)
        .bind(&client.secret_hash)
        .bind(&client.name)
        .bind(serde_json::to_value(&client.redirect_uris)?)
        .bind(serde_json::to_value(&client.allowed_scopes)?)
        .bind(serde_json::to_value(&client.grant_types)?)
        .bind(client.owner_user_id)
        .bind(client.active)
        .bind(client.created_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx_core::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StorageError::conflict(format!(
                    "Client with client_id '{}' already exists",
                    client.client_id
                ));
            }
            StorageError::from(e)
        })?;

        client_from_tuple(row)
    }
}
