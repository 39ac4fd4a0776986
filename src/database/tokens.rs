// ABOUTME: Token table schema and token lifecycle queries
// ABOUTME: Insert-if-absent, guarded state transitions, predecessor links, and lookups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{run_migration, Database};
use crate::constants::database::LOOKUP_CHUNK_SIZE;
use crate::errors::DatabaseError;
use crate::models::{Token, TokenPair, TokenState};
use chrono::Utc;
use sqlx::{Executor, QueryBuilder, Sqlite};
use std::collections::HashSet;

#[derive(sqlx::FromRow)]
struct TokenRow {
    token: String,
    email_token: String,
    year: i32,
    state: String,
    prev_token: Option<String>,
}

impl TryFrom<TokenRow> for Token {
    type Error = DatabaseError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        let state = row
            .state
            .parse::<TokenState>()
            .map_err(|e| DatabaseError::QueryError {
                context: e.to_string(),
            })?;
        Ok(Self {
            token: row.token,
            email_token: row.email_token,
            year: row.year,
            state,
            previous_token: row.prev_token,
        })
    }
}

/// Insert a free token unless `(token, year)` is already taken
///
/// Returns `false` on collision; the caller regenerates.
pub(crate) async fn insert_token<'e, E>(
    executor: E,
    year: i32,
    pair: &TokenPair,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r"
        INSERT INTO users (token, email_token, year, state, created_at)
        VALUES ($1, $2, $3, 'free', $4)
        ON CONFLICT(token, year) DO NOTHING
        ",
    )
    .bind(&pair.register)
    .bind(&pair.email)
    .bind(year)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Flip a free or registered token to `opted_out`
///
/// With `email`, only the registrant holding that pair may opt out. Returns
/// `false` when no row matched, i.e. the token is unknown for the year,
/// already opted out, or paired with a different email.
pub(crate) async fn mark_opted_out<'e, E>(
    executor: E,
    token: &str,
    year: i32,
    email: Option<&str>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = match email {
        Some(email) => {
            sqlx::query(
                r"
                UPDATE users SET state = 'opted_out'
                WHERE token = $1 AND year = $2 AND email = $3
                  AND state IN ('free', 'registered')
                ",
            )
            .bind(token)
            .bind(year)
            .bind(email)
            .execute(executor)
            .await?
        }
        None => {
            sqlx::query(
                r"
                UPDATE users SET state = 'opted_out'
                WHERE token = $1 AND year = $2 AND state IN ('free', 'registered')
                ",
            )
            .bind(token)
            .bind(year)
            .execute(executor)
            .await?
        }
    };

    Ok(result.rows_affected() == 1)
}

/// Record `predecessor` as the token `successor` replaces
pub(crate) async fn link_previous<'e, E>(
    executor: E,
    successor: &str,
    predecessor: &str,
    year: i32,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE users SET prev_token = $1 WHERE token = $2 AND year = $3")
        .bind(predecessor)
        .bind(successor)
        .bind(year)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() == 1)
}

impl Database {
    /// Create the users table holding tokens and registrant data
    pub(super) async fn migrate_users(&self) -> Result<(), DatabaseError> {
        run_migration(
            &self.pool,
            r"
            CREATE TABLE IF NOT EXISTS users (
                token TEXT NOT NULL,
                email_token TEXT NOT NULL,
                year INTEGER NOT NULL,
                state TEXT NOT NULL DEFAULT 'free'
                    CHECK (state IN ('free', 'registered', 'opted_out')),
                prev_token TEXT,
                email TEXT,
                firstname TEXT,
                lastname TEXT,
                gender TEXT,
                address TEXT,
                phone TEXT,
                birthday TEXT,
                study TEXT,
                food TEXT,
                info TEXT,
                created_at TEXT NOT NULL,
                registered_at TEXT,
                PRIMARY KEY (token, year)
            )
            ",
        )
        .await?;

        run_migration(
            &self.pool,
            "CREATE INDEX IF NOT EXISTS idx_users_year_state ON users(year, state)",
        )
        .await?;

        run_migration(
            &self.pool,
            "CREATE INDEX IF NOT EXISTS idx_users_email_year ON users(email, year)",
        )
        .await
    }

    /// Insert a free token for `year`
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails for a reason other than a collision
    pub async fn insert_token(&self, year: i32, pair: &TokenPair) -> Result<bool, DatabaseError> {
        self.timed("insert_token", insert_token(&self.pool, year, pair))
            .await
    }

    /// Which of `candidates` already exist for `year`
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails
    pub async fn existing_tokens(
        &self,
        year: i32,
        candidates: &[String],
    ) -> Result<HashSet<String>, DatabaseError> {
        let mut existing = HashSet::new();

        for chunk in candidates.chunks(LOOKUP_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<Sqlite>::new("SELECT token FROM users WHERE year = ");
            builder.push_bind(year);
            builder.push(" AND token IN (");
            let mut separated = builder.separated(", ");
            for candidate in chunk {
                separated.push_bind(candidate.clone());
            }
            separated.push_unseparated(")");

            let found: Vec<String> = self
                .timed(
                    "existing_tokens",
                    builder.build_query_scalar::<String>().fetch_all(&self.pool),
                )
                .await?;
            existing.extend(found);
        }

        Ok(existing)
    }

    /// Fetch a token record
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row holds an unknown state
    pub async fn get_token(&self, token: &str, year: i32) -> Result<Option<Token>, DatabaseError> {
        let row: Option<TokenRow> = self
            .timed(
                "get_token",
                sqlx::query_as(
                    r"
                    SELECT token, email_token, year, state, prev_token
                    FROM users WHERE token = $1 AND year = $2
                    ",
                )
                .bind(token)
                .bind(year)
                .fetch_optional(&self.pool),
            )
            .await?;

        row.map(Token::try_from).transpose()
    }

    /// Whether `(token, email)` exists for `year`, in any state
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn is_token_email_pair(
        &self,
        token: &str,
        email: &str,
        year: i32,
    ) -> Result<bool, DatabaseError> {
        let count: i64 = self
            .timed(
                "is_token_email_pair",
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM users WHERE token = $1 AND email = $2 AND year = $3",
                )
                .bind(token)
                .bind(email)
                .bind(year)
                .fetch_one(&self.pool),
            )
            .await?;

        Ok(count > 0)
    }
}
