//! Database module for dbdrive.
//!
//! This module provides SQLite connectivity through a sqlx pool and
//! per-relation migration management.

mod relation;
mod schema;

pub use relation::{Relation, MAX_RELATION_LENGTH};
pub use schema::MIGRATIONS;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::{DriveError, Result};

/// Database wrapper owning the connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a database at the specified path.
    ///
    /// If the database file doesn't exist, it will be created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening database at {:?}", path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DriveError::Store(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Ok(Self { pool })
    }

    /// Open an in-memory database for testing.
    ///
    /// The pool is pinned to a single long-lived connection so the database
    /// survives for as long as the pool does.
    pub async fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory database");
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Get the schema version of a relation (0 if never migrated).
    pub async fn schema_version(&self, relation: &Relation) -> Result<i64> {
        if !self.table_exists("drive_schema_version").await? {
            return Ok(0);
        }

        let version: (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version), 0) FROM drive_schema_version WHERE relation = ?",
        )
        .bind(relation.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(version.0)
    }

    /// Apply pending migrations to a relation.
    pub async fn migrate(&self, relation: &Relation) -> Result<()> {
        let current_version = self.schema_version(relation).await?;

        if current_version as usize >= MIGRATIONS.len() {
            debug!(
                "Relation {} is up to date (version {})",
                relation, current_version
            );
            return Ok(());
        }

        info!(
            "Migrating relation {} from version {} to {}",
            relation,
            current_version,
            MIGRATIONS.len()
        );

        sqlx::query(schema::SCHEMA_VERSION_TABLE)
            .execute(&self.pool)
            .await?;

        for (i, migration) in MIGRATIONS.iter().enumerate().skip(current_version as usize) {
            let version = (i + 1) as i64;
            info!("Applying migration v{} to {}", version, relation);

            let sql = schema::render(migration, relation.as_str());
            let mut tx = self.pool.begin().await?;

            sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(&sql)).await?;
            sqlx::query("INSERT INTO drive_schema_version (relation, version) VALUES (?, ?)")
                .bind(relation.as_str())
                .bind(version)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            debug!("Migration v{} applied successfully", version);
        }

        Ok(())
    }

    /// Check if a table exists.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let exists: (i64,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
        )
        .bind(table_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0 != 0)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}
