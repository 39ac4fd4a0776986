// ABOUTME: Database configuration types for SQLite connections
// ABOUTME: Handles connection pool sizing, acquire/query timeouts, and busy handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::environment::{env_parse_or, env_var_or};
use crate::constants::{database, env_config};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::time::Duration;

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Path to `SQLite` database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for non-`SQLite` connection strings
    pub fn parse_url(s: &str) -> AppResult<Self> {
        if let Some(path_str) = s.strip_prefix("sqlite:") {
            let path_str = path_str.strip_prefix("//").unwrap_or(path_str);
            if path_str == ":memory:" || path_str.is_empty() {
                Ok(Self::Memory)
            } else {
                Ok(Self::SQLite {
                    path: PathBuf::from(path_str),
                })
            }
        } else if s.contains("://") {
            Err(AppError::config(format!(
                "Unsupported database URL '{s}': only sqlite: URLs are supported"
            )))
        } else {
            // Fallback: treat as SQLite file path
            Ok(Self::SQLite {
                path: PathBuf::from(s),
            })
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".into(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from(
                database::DEFAULT_URL
                    .strip_prefix("sqlite:")
                    .unwrap_or(database::DEFAULT_URL),
            ),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Connection pool configuration
///
/// The pool size bounds the number of persistence operations in flight,
/// including the fan-out of token batch inserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
    /// Per-query timeout in seconds
    pub query_timeout_secs: u64,
    /// How long `SQLite` waits on a locked database before failing, in milliseconds
    pub busy_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: database::DEFAULT_POOL_SIZE,
            acquire_timeout_secs: database::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            query_timeout_secs: database::DEFAULT_QUERY_TIMEOUT_SECS,
            busy_timeout_ms: database::DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl PoolConfig {
    /// Load pool configuration from environment (or defaults)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but not a valid number, or the pool size is zero
    pub fn from_env() -> AppResult<Self> {
        let max_connections =
            env_parse_or(env_config::DB_POOL_SIZE, database::DEFAULT_POOL_SIZE)?;
        if max_connections == 0 {
            return Err(AppError::config(format!(
                "{} must be at least 1",
                env_config::DB_POOL_SIZE
            )));
        }

        Ok(Self {
            max_connections,
            acquire_timeout_secs: env_parse_or(
                env_config::DB_ACQUIRE_TIMEOUT_SECS,
                database::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            query_timeout_secs: env_parse_or(
                env_config::DB_QUERY_TIMEOUT_SECS,
                database::DEFAULT_QUERY_TIMEOUT_SECS,
            )?,
            busy_timeout_ms: env_parse_or(
                env_config::DB_BUSY_TIMEOUT_MS,
                database::DEFAULT_BUSY_TIMEOUT_MS,
            )?,
        })
    }

    /// Connection acquire timeout
    #[must_use]
    pub const fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Per-query timeout
    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// `SQLite` busy timeout
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Database connection and management configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
    /// Connection pool configuration
    pub pool: PoolConfig,
}

impl DatabaseConfig {
    /// Load database configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if database environment variables are invalid
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            url: DatabaseUrl::parse_url(&env_var_or(
                env_config::DATABASE_URL,
                database::DEFAULT_URL,
            ))?,
            pool: PoolConfig::from_env()?,
        })
    }

    /// In-memory configuration with default pool settings
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: DatabaseUrl::Memory,
            pool: PoolConfig::default(),
        }
    }
}
