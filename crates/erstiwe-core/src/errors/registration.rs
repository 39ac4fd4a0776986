// ABOUTME: Error types for token generation, registration, and opt-out transitions
// ABOUTME: Typed preconditions failures plus wrapped persistence errors

use super::database::DatabaseError;

/// Errors of the token lifecycle and waitlist promotion
///
/// Collisions between generated tokens are resolved internally by regeneration
/// and never surface here. An opt-out either completes all of its steps or none,
/// so there is no partial-failure variant.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// The token does not exist for the year or is in the wrong state
    #[error("Invalid token '{token}'")]
    InvalidToken {
        /// Token value as submitted
        token: String,
    },

    /// Generation hit its candidate ceiling before producing enough unique tokens
    #[error("Could not generate {requested} unique tokens within {attempts} attempts")]
    ExhaustedRetries {
        /// Number of tokens asked for
        requested: usize,
        /// Candidates drawn before giving up
        attempts: usize,
    },

    /// A batch request exceeded the configured limit
    #[error("Requested {requested} tokens, at most {limit} per batch")]
    BatchTooLarge {
        /// Number of tokens asked for
        requested: usize,
        /// Configured batch limit
        limit: usize,
    },

    /// Underlying storage failure, passed through unchanged
    #[error(transparent)]
    Persistence(#[from] DatabaseError),
}

impl RegistrationError {
    /// Build an `InvalidToken` error
    pub fn invalid_token(token: impl Into<String>) -> Self {
        Self::InvalidToken {
            token: token.into(),
        }
    }

    /// Whether the failed unit of work may be retried as a whole
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Persistence(e) if e.is_transient())
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for RegistrationError {
    fn from(error: sqlx::Error) -> Self {
        Self::Persistence(DatabaseError::from(error))
    }
}
