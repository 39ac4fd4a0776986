// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Loads event year, batch limits, notification and export settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration
//!
//! Configuration is read once at startup and never mutated afterwards.

use super::database::DatabaseConfig;
use crate::constants::{env_config, export, notifications, tokens};
use crate::errors::{AppError, AppResult};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Environment type for logging and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Live deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Event cycle configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Year every token operation is scoped to
    pub current_year: i32,
    /// Maximum number of tokens one batch may request
    pub token_batch_limit: usize,
    /// K in the K·count candidate ceiling of token generation
    pub token_retry_factor: usize,
}

impl EventConfig {
    /// Configuration for `year` with default limits
    #[must_use]
    pub const fn for_year(year: i32) -> Self {
        Self {
            current_year: year,
            token_batch_limit: tokens::DEFAULT_BATCH_LIMIT,
            token_retry_factor: tokens::DEFAULT_RETRY_FACTOR,
        }
    }

    /// Load event configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but not a valid number, or a limit is zero
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            current_year: env_parse_or(env_config::EVENT_YEAR, Utc::now().year())?,
            token_batch_limit: env_parse_or(
                env_config::TOKEN_BATCH_LIMIT,
                tokens::DEFAULT_BATCH_LIMIT,
            )?,
            token_retry_factor: env_parse_or(
                env_config::TOKEN_RETRY_FACTOR,
                tokens::DEFAULT_RETRY_FACTOR,
            )?,
        };
        if config.token_batch_limit == 0 || config.token_retry_factor == 0 {
            return Err(AppError::config(format!(
                "{} and {} must be at least 1",
                env_config::TOKEN_BATCH_LIMIT,
                env_config::TOKEN_RETRY_FACTOR
            )));
        }
        Ok(config)
    }
}

/// Notification dispatch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Webhook receiving notification requests; notifications are only logged when unset
    pub webhook_url: Option<String>,
    /// Deadline for one notification request, in seconds
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: notifications::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl NotificationConfig {
    /// Load notification configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a valid number
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            webhook_url: env::var(env_config::NOTIFY_WEBHOOK_URL)
                .ok()
                .filter(|url| !url.trim().is_empty()),
            timeout_secs: env_parse_or(
                env_config::NOTIFY_TIMEOUT_SECS,
                notifications::DEFAULT_TIMEOUT_SECS,
            )?,
        })
    }

    /// Request deadline
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Snapshot export configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory snapshots are written to
    pub directory: PathBuf,
    /// File name prefix
    pub prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: env::temp_dir(),
            prefix: export::DEFAULT_PREFIX.to_owned(),
        }
    }
}

impl ExportConfig {
    /// Load export configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            directory: env::var(env_config::EXPORT_DIR)
                .map_or_else(|_| env::temp_dir(), PathBuf::from),
            prefix: env_var_or(env_config::EXPORT_PREFIX, export::DEFAULT_PREFIX),
        }
    }
}

/// Complete process configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Event cycle settings
    pub event: EventConfig,
    /// Persistence settings
    pub database: DatabaseConfig,
    /// Notification settings
    pub notifications: NotificationConfig,
    /// Export settings
    pub export: ExportConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any variable holds an invalid value
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            environment: Environment::from_str_or_default(&env_var_or(
                env_config::ENVIRONMENT,
                "development",
            )),
            event: EventConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            notifications: NotificationConfig::from_env()?,
            export: ExportConfig::from_env(),
        })
    }

    /// One-line configuration summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "environment={} year={} batch_limit={} database={} pool_size={} notifications={} export_dir={}",
            self.environment,
            self.event.current_year,
            self.event.token_batch_limit,
            self.database.url,
            self.database.pool.max_connections,
            if self.notifications.webhook_url.is_some() {
                "webhook"
            } else {
                "log"
            },
            self.export.directory.display(),
        )
    }
}

/// Read an environment variable or fall back to `default`
pub(crate) fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
pub(crate) fn env_parse_or<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {key} value '{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("PROD"),
            Environment::Production
        );
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(
            Environment::from_str_or_default("anything"),
            Environment::Development
        );
    }

    #[test]
    fn test_event_defaults() {
        let event = EventConfig::for_year(2024);
        assert_eq!(event.current_year, 2024);
        assert_eq!(event.token_batch_limit, tokens::DEFAULT_BATCH_LIMIT);
        assert_eq!(event.token_retry_factor, tokens::DEFAULT_RETRY_FACTOR);
    }
}
