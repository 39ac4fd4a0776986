// ABOUTME: SQLite persistence for tokens, registrants, and the waitlist
// ABOUTME: Owns the injected connection pool, schema migrations, and query deadlines
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! The pool is constructed explicitly from [`DatabaseConfig`] and handed to the
//! components that need it; there is no process-wide connection state. Every
//! statement runs under the configured query deadline, and pooled connections
//! are returned on every exit path by RAII.
//!
//! Query functions that must participate in a caller's transaction are generic
//! over the sqlx executor, so the same statement runs against the pool or a
//! transaction-held connection.

mod registrants;
mod tokens;
/// Transaction guard and retry helpers
pub mod transactions;
mod waitlist;

pub(crate) use registrants::register_free_token;
pub(crate) use tokens::{insert_token, link_previous, mark_opted_out};

use crate::config::DatabaseConfig;
use crate::errors::DatabaseError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Database manager for token, registrant, and waitlist storage
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    query_timeout: Duration,
    max_connections: u32,
}

impl Database {
    /// Connect, size the pool, and run migrations
    ///
    /// In-memory databases are bound to a single long-lived connection, since
    /// every `SQLite` memory connection is its own separate database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let is_memory = config.url.is_memory();

        if let crate::config::DatabaseUrl::SQLite { path } = &config.url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| DatabaseError::ConnectionError {
                        context: format!("cannot create {}: {e}", parent.display()),
                    })?;
            }
        }

        let mut options = SqliteConnectOptions::from_str(&config.url.to_connection_string())?
            .create_if_missing(true)
            .busy_timeout(config.pool.busy_timeout())
            .foreign_keys(true);
        if !is_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let max_connections = if is_memory {
            1
        } else {
            config.pool.max_connections.max(1)
        };

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(config.pool.acquire_timeout());
        if is_memory {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;

        let db = Self {
            pool,
            query_timeout: config.pool.query_timeout(),
            max_connections,
        };

        db.migrate().await?;

        info!(
            database = %config.url,
            pool.max_connections = max_connections,
            "Database ready"
        );

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Upper bound of concurrently running statements
    #[must_use]
    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        self.migrate_users().await?;
        self.migrate_waitlist().await?;
        debug!("Database migrations applied");
        Ok(())
    }

    /// Await `future` under the query deadline
    pub(crate) async fn timed<T, F>(&self, operation: &'static str, future: F) -> Result<T, DatabaseError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, future).await {
            Ok(result) => result.map_err(DatabaseError::from),
            Err(_) => Err(DatabaseError::Timeout {
                operation,
                timeout_ms: u64::try_from(self.query_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Run a schema statement, mapping failures to migration errors
async fn run_migration(pool: &SqlitePool, statement: &str) -> Result<(), DatabaseError> {
    sqlx::query(statement)
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::MigrationError {
            context: e.to_string(),
        })?;
    Ok(())
}
