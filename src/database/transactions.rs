// ABOUTME: Transaction management with RAII guards and retry on locked databases
// ABOUTME: Rolls back on drop unless committed; retries transient failures with backoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Transaction management with RAII guards and retry patterns
//!
//! A multi-step state transition runs inside one [`TransactionGuard`]. If any
//! step returns early with an error, the guard is dropped and the transaction
//! rolls back, so no partial state becomes visible.
//!
//! ```text
//! retry_transaction(|| async {
//!     let mut guard = TransactionGuard::new(pool.begin().await?);
//!     mark_opted_out(guard.executor()?, token, year, None).await?;
//!     insert_token(guard.executor()?, year, &pair).await?;
//!     guard.commit().await
//! }, TRANSACTION_RETRIES).await
//! ```

use std::future::Future;
use std::time::Duration;

use sqlx::{Database as SqlxDatabase, Transaction};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::errors::{DatabaseError, RegistrationError};

/// Retry a unit of work that failed on a locked database or timeout
///
/// Precondition failures such as [`RegistrationError::InvalidToken`] are
/// returned immediately. Backoff doubles from 20ms.
///
/// # Errors
///
/// Returns the last error once `max_retries` attempts have failed, or the
/// first non-transient error
pub async fn retry_transaction<F, Fut, T>(mut f: F, max_retries: u32) -> Result<T, RegistrationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RegistrationError>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if !is_retryable_error(&e) {
                    debug!(attempts, error = %e, "Transaction failed with non-retryable error");
                    return Err(e);
                }
                if attempts >= max_retries {
                    error!(
                        attempts,
                        max_retries,
                        error = %e,
                        "Transaction failed after max retries"
                    );
                    return Err(e);
                }

                let backoff_ms = 10 * (1_u64 << attempts);
                warn!(
                    attempt = attempts,
                    max_retries,
                    backoff_ms,
                    error = %e,
                    "Transaction failed with retryable error, retrying after backoff"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

fn is_retryable_error(error: &RegistrationError) -> bool {
    error.is_transient()
}

/// RAII guard for database transactions ensuring rollback on drop
pub struct TransactionGuard<'c, DB: SqlxDatabase> {
    transaction: Option<Transaction<'c, DB>>,
    committed: bool,
}

impl<'c, DB: SqlxDatabase> TransactionGuard<'c, DB> {
    /// Wrap a transaction obtained from `pool.begin()`
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>) -> Self {
        debug!("TransactionGuard created - transaction will auto-rollback if not committed");
        Self {
            transaction: Some(transaction),
            committed: false,
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails
    pub async fn commit(mut self) -> Result<(), DatabaseError> {
        let tx = self.transaction.take().ok_or_else(consumed)?;
        tx.commit().await.map_err(|e| DatabaseError::QueryError {
            context: format!("Transaction commit failed: {e}"),
        })?;
        self.committed = true;
        debug!("TransactionGuard committed successfully");
        Ok(())
    }

    /// Roll back explicitly and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails
    pub async fn rollback(mut self) -> Result<(), DatabaseError> {
        let tx = self.transaction.take().ok_or_else(consumed)?;
        tx.rollback().await.map_err(|e| DatabaseError::QueryError {
            context: format!("Transaction rollback failed: {e}"),
        })?;
        debug!("TransactionGuard rolled back explicitly");
        Ok(())
    }

    /// Check if the transaction has been committed
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        self.committed
    }

    /// Connection to execute statements on inside the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already committed or rolled back
    pub fn executor(&mut self) -> Result<&mut <DB as SqlxDatabase>::Connection, DatabaseError> {
        self.transaction.as_deref_mut().ok_or_else(consumed)
    }
}

impl<DB: SqlxDatabase> Drop for TransactionGuard<'_, DB> {
    fn drop(&mut self) {
        if self.transaction.is_some() && !self.committed {
            warn!("TransactionGuard dropped without commit - transaction will be rolled back");
        }
    }
}

fn consumed() -> DatabaseError {
    DatabaseError::QueryError {
        context: "Transaction already consumed".to_owned(),
    }
}

/// `SQLite` transaction guard
pub type SqliteTransactionGuard<'c> = TransactionGuard<'c, sqlx::Sqlite>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_stops_on_invalid_token() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_transaction(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(RegistrationError::invalid_token("abc")) }
            },
            3,
        )
        .await;

        assert!(matches!(result, Err(RegistrationError::InvalidToken { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_locked_database() {
        let calls = AtomicU32::new(0);
        let result = retry_transaction(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err(RegistrationError::Persistence(DatabaseError::QueryError {
                            context: "database is locked".into(),
                        }))
                    } else {
                        Ok(attempt)
                    }
                }
            },
            3,
        )
        .await;

        assert_eq!(result.ok(), Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_transaction(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(RegistrationError::Persistence(DatabaseError::Timeout {
                        operation: "opt_out",
                        timeout_ms: 1,
                    }))
                }
            },
            2,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    async fn waitlist_rows(db: &crate::database::Database) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM waitlist")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn insert_row(guard: &mut SqliteTransactionGuard<'_>, email: &str) {
        sqlx::query("INSERT INTO waitlist (email, year, created_at) VALUES ($1, 2024, $2)")
            .bind(email)
            .bind(chrono::Utc::now())
            .execute(guard.executor().unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_guard_commit_rollback_and_drop() {
        let db = crate::database::Database::new(&crate::config::DatabaseConfig::in_memory())
            .await
            .unwrap();

        {
            let mut guard = TransactionGuard::new(db.pool().begin().await.unwrap());
            insert_row(&mut guard, "dropped@example.org").await;
            assert!(!guard.is_committed());
        }
        assert_eq!(waitlist_rows(&db).await, 0);

        let mut guard = TransactionGuard::new(db.pool().begin().await.unwrap());
        insert_row(&mut guard, "rolled-back@example.org").await;
        guard.rollback().await.unwrap();
        assert_eq!(waitlist_rows(&db).await, 0);

        let mut guard = TransactionGuard::new(db.pool().begin().await.unwrap());
        insert_row(&mut guard, "kept@example.org").await;
        guard.commit().await.unwrap();
        assert_eq!(waitlist_rows(&db).await, 1);
    }
}
