// ABOUTME: Structured error types for database operations
// ABOUTME: Wraps sqlx failures with context and models query and acquire timeouts

/// Errors raised by the persistence layer
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The pool could not hand out a connection
    #[error("Database connection failed: {context}")]
    ConnectionError {
        /// What went wrong while connecting
        context: String,
    },

    /// A statement failed
    #[error("Database query failed: {context}")]
    QueryError {
        /// Underlying driver message
        context: String,
    },

    /// Schema setup failed
    #[error("Database migration failed: {context}")]
    MigrationError {
        /// Underlying driver message
        context: String,
    },

    /// An operation exceeded its deadline
    #[error("Database operation '{operation}' timed out after {timeout_ms}ms")]
    Timeout {
        /// Name of the operation that timed out
        operation: &'static str,
        /// Configured deadline
        timeout_ms: u64,
    },
}

impl DatabaseError {
    /// Whether a retry of the whole unit of work may succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::ConnectionError { .. } => true,
            Self::QueryError { context } => {
                let lower = context.to_lowercase();
                lower.contains("database is locked") || lower.contains("busy")
            }
            Self::MigrationError { .. } => false,
        }
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => Self::ConnectionError {
                context: "timed out acquiring a pooled connection".to_owned(),
            },
            sqlx::Error::PoolClosed => Self::ConnectionError {
                context: "connection pool is closed".to_owned(),
            },
            other => Self::QueryError {
                context: other.to_string(),
            },
        }
    }
}
