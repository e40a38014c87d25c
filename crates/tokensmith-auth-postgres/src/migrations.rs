//! Database migration management.
//!
//! Migrations are embedded in the binary at compile time using
//! `include_str!()`, so schema setup needs no CLI or filesystem access.
//! Applied versions are tracked in the `_sqlx_migrations` table.

use std::borrow::Cow;

use sqlx_core::migrate::{Migration, MigrationType};
use tracing::info;

use crate::{PgPool, StorageError};

/// Macro to define embedded migrations at compile time.
///
/// Add new migrations here in chronological order. Each migration is a
/// tuple of (version, description, sql_path).
macro_rules! embedded_migrations {
    () => {
        &[(
            20260801000001i64,
            "auth_schema",
            include_str!("../migrations/20260801000001_auth_schema.sql"),
        )]
    };
}

/// Builds a vector of Migration structs from embedded migration data.
fn build_migrations() -> Vec<Migration> {
    embedded_migrations!()
        .iter()
        .map(|(version, description, sql)| Migration {
            version: *version,
            description: Cow::Borrowed(description),
            migration_type: MigrationType::Simple,
            sql: Cow::Borrowed(sql),
            checksum: Cow::Borrowed(&[]),
            no_tx: false,
        })
        .collect()
}

/// Runs all pending database migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to execute.
pub async fn run(pool: &PgPool) -> Result<(), StorageError> {
    let migrations = build_migrations();
    info!(count = migrations.len(), "Running database migrations");

    let migrator = sqlx_core::migrate::Migrator {
        migrations: Cow::Owned(migrations),
        ignore_missing: false,
        locking: true,
        no_tx: false,
    };

    migrator
        .run(pool)
        .await
        .map_err(|e| StorageError::Migration(format!("Migration failed: {e}")))?;

    info!("Database migrations completed");

    Ok(())
}
