// ABOUTME: Unified error handling with standard error codes and application errors
// ABOUTME: Bridges domain errors (database, registration) into a single AppError type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! This module provides a centralized error handling system for the registration
//! backend. Domain errors (`DatabaseError`, `RegistrationError`) are precise and
//! typed; `AppError` is what outer surfaces (configuration, CLI, services) return.

/// Persistence error types
pub mod database;
/// Token lifecycle error types
pub mod registration;

pub use database::DatabaseError;
pub use registration::RegistrationError;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Token lifecycle (1000-1999)
    /// Token precondition failed (unknown, used, or opted out)
    #[serde(rename = "INVALID_TOKEN")]
    InvalidToken = 1000,
    /// Token generation gave up after its retry ceiling
    #[serde(rename = "TOKEN_GENERATION_EXHAUSTED")]
    TokenGenerationExhausted = 1001,

    // Validation (3000-3999)
    /// Malformed input
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// Numeric input outside accepted range
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3003,

    // Resource Management (4000-4999)
    /// Requested record does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,

    // Configuration (6000-6999)
    /// Configuration value could not be parsed
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Persistence layer failure
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// Filesystem failure
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9002,
    /// Serialization failure
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// HTTP status a request layer should translate this code to
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidToken | Self::InvalidInput | Self::ValueOutOfRange => 400,
            Self::ResourceNotFound => 404,
            Self::TokenGenerationExhausted => 503,
            Self::ConfigInvalid
            | Self::InternalError
            | Self::DatabaseError
            | Self::StorageError
            | Self::SerializationError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidToken => "The provided token is not valid for this operation",
            Self::TokenGenerationExhausted => "No unique token could be generated",
            Self::InvalidInput => "The provided input is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration value invalid
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Filesystem error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        Self::database(error.to_string()).with_source(error)
    }
}

impl From<RegistrationError> for AppError {
    fn from(error: RegistrationError) -> Self {
        let code = match &error {
            RegistrationError::InvalidToken { .. } => ErrorCode::InvalidToken,
            RegistrationError::ExhaustedRetries { .. } => ErrorCode::TokenGenerationExhausted,
            RegistrationError::BatchTooLarge { .. } => ErrorCode::ValueOutOfRange,
            RegistrationError::Persistence(_) => ErrorCode::DatabaseError,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::storage(error.to_string()).with_source(error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::InvalidToken.http_status(), 400);
        assert_eq!(ErrorCode::ResourceNotFound.http_status(), 404);
        assert_eq!(ErrorCode::TokenGenerationExhausted.http_status(), 503);
        assert_eq!(ErrorCode::DatabaseError.http_status(), 500);
    }

    #[test]
    fn test_registration_error_maps_to_code() {
        let error: AppError = RegistrationError::InvalidToken {
            token: "abcd1234".into(),
        }
        .into();
        assert_eq!(error.code, ErrorCode::InvalidToken);
        assert!(error.message.contains("abcd1234"));

        let error: AppError = RegistrationError::ExhaustedRetries {
            requested: 3,
            attempts: 30,
        }
        .into();
        assert_eq!(error.code, ErrorCode::TokenGenerationExhausted);
    }

    #[test]
    fn test_persistence_error_keeps_source() {
        let error: AppError = RegistrationError::Persistence(DatabaseError::QueryError {
            context: "disk I/O error".into(),
        })
        .into();
        assert_eq!(error.code, ErrorCode::DatabaseError);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::InvalidToken).unwrap();
        assert_eq!(json, "\"INVALID_TOKEN\"");
    }
}
