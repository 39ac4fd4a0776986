// ABOUTME: Read-only token predicates evaluated against current persisted state
// ABOUTME: Used as preconditions of registration and opt-out; never cached
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::Database;
use crate::errors::DatabaseError;

/// Year-scoped token checks
///
/// Every call hits the database. A cached answer could let two requests
/// both see a token as free.
#[derive(Clone)]
pub struct TokenValidator {
    db: Database,
    year: i32,
}

impl TokenValidator {
    /// Validator for tokens of `year`
    #[must_use]
    pub const fn new(db: Database, year: i32) -> Self {
        Self { db, year }
    }

    /// True iff `token` exists for the year and is still free
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails
    pub async fn is_valid_free_token(&self, token: &str) -> Result<bool, DatabaseError> {
        Ok(self
            .db
            .get_token(token, self.year)
            .await?
            .is_some_and(|found| found.state.accepts_registration()))
    }

    /// True iff the exact `(token, email)` pair exists for the year, in any state
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails
    pub async fn is_valid_token_email_pair(
        &self,
        token: &str,
        email: &str,
    ) -> Result<bool, DatabaseError> {
        self.db.is_token_email_pair(token, email, self.year).await
    }
}
