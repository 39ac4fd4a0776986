// ABOUTME: Waitlist table, its registration trigger, and queue queries
// ABOUTME: Entries are unique per (email, year) and ordered by time of joining
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{run_migration, Database};
use crate::errors::DatabaseError;
use crate::models::WaitlistEntry;
use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
struct WaitlistRow {
    email: String,
    year: i32,
    created_at: DateTime<Utc>,
    offered_token: Option<String>,
}

impl From<WaitlistRow> for WaitlistEntry {
    fn from(row: WaitlistRow) -> Self {
        Self {
            email: row.email,
            year: row.year,
            created_at: row.created_at,
            offered_token: row.offered_token,
        }
    }
}

impl Database {
    /// Create the waitlist table and the trigger that clears entries on registration
    pub(super) async fn migrate_waitlist(&self) -> Result<(), DatabaseError> {
        run_migration(
            &self.pool,
            r"
            CREATE TABLE IF NOT EXISTS waitlist (
                email TEXT NOT NULL COLLATE NOCASE,
                year INTEGER NOT NULL,
                offered_token TEXT,
                created_at TEXT NOT NULL,
                PRIMARY KEY (email, year)
            )
            ",
        )
        .await?;

        run_migration(
            &self.pool,
            "CREATE INDEX IF NOT EXISTS idx_waitlist_year_created ON waitlist(year, created_at)",
        )
        .await?;

        // Registration completing for an email removes its waitlist entry
        run_migration(
            &self.pool,
            r"
            CREATE TRIGGER IF NOT EXISTS trg_waitlist_remove_registered
            AFTER UPDATE OF state ON users
            FOR EACH ROW
            WHEN NEW.state = 'registered' AND NEW.email IS NOT NULL
            BEGIN
                DELETE FROM waitlist WHERE email = NEW.email AND year = NEW.year;
            END
            ",
        )
        .await
    }

    /// Queue `email` for `year`
    ///
    /// Joining again keeps the original position. Returns `None` when the
    /// email already holds a registration for the year.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert or lookup fails
    pub async fn join_waitlist(
        &self,
        email: &str,
        year: i32,
    ) -> Result<Option<WaitlistEntry>, DatabaseError> {
        self.timed(
            "join_waitlist",
            sqlx::query(
                r"
                INSERT INTO waitlist (email, year, created_at)
                SELECT $1, $2, $3
                WHERE NOT EXISTS (
                    SELECT 1 FROM users
                    WHERE email = $1 COLLATE NOCASE AND year = $2 AND state = 'registered'
                )
                ON CONFLICT(email, year) DO NOTHING
                ",
            )
            .bind(email)
            .bind(year)
            .bind(Utc::now())
            .execute(&self.pool),
        )
        .await?;

        let row: Option<WaitlistRow> = self
            .timed(
                "join_waitlist",
                sqlx::query_as(
                    r"
                    SELECT email, year, created_at, offered_token
                    FROM waitlist WHERE email = $1 AND year = $2
                    ",
                )
                .bind(email)
                .bind(year)
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(WaitlistEntry::from))
    }

    /// Waitlist of `year`, longest-waiting first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_waitlist(&self, year: i32) -> Result<Vec<WaitlistEntry>, DatabaseError> {
        let rows: Vec<WaitlistRow> = self
            .timed(
                "list_waitlist",
                sqlx::query_as(
                    r"
                    SELECT email, year, created_at, offered_token
                    FROM waitlist WHERE year = $1
                    ORDER BY created_at, rowid
                    ",
                )
                .bind(year)
                .fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.into_iter().map(WaitlistEntry::from).collect())
    }

    /// Longest-waiting entry of `year` that has not been offered a token yet
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn next_waitlist_entry(
        &self,
        year: i32,
    ) -> Result<Option<WaitlistEntry>, DatabaseError> {
        let row: Option<WaitlistRow> = self
            .timed(
                "next_waitlist_entry",
                sqlx::query_as(
                    r"
                    SELECT email, year, created_at, offered_token
                    FROM waitlist WHERE year = $1 AND offered_token IS NULL
                    ORDER BY created_at, rowid
                    LIMIT 1
                    ",
                )
                .bind(year)
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(WaitlistEntry::from))
    }

    /// Offer `token` to the longest-waiting unoffered entry of `year`
    ///
    /// Selection and marking happen in one statement, so concurrent
    /// promotions always claim distinct entrants. Returns `None` when every
    /// entry already holds an offer.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn claim_waitlist_offer(
        &self,
        year: i32,
        token: &str,
    ) -> Result<Option<WaitlistEntry>, DatabaseError> {
        let row: Option<WaitlistRow> = self
            .timed(
                "claim_waitlist_offer",
                sqlx::query_as(
                    r"
                    UPDATE waitlist SET offered_token = $1
                    WHERE offered_token IS NULL
                      AND rowid = (
                        SELECT rowid FROM waitlist
                        WHERE year = $2 AND offered_token IS NULL
                        ORDER BY created_at, rowid
                        LIMIT 1
                      )
                    RETURNING email, year, created_at, offered_token
                    ",
                )
                .bind(token)
                .bind(year)
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(WaitlistEntry::from))
    }

    /// Withdraw an offer of `token` to `email`, putting the entry back in line
    ///
    /// Only clears the offer if it still names `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn release_waitlist_offer(
        &self,
        email: &str,
        year: i32,
        token: &str,
    ) -> Result<bool, DatabaseError> {
        let result = self
            .timed(
                "release_waitlist_offer",
                sqlx::query(
                    r"
                    UPDATE waitlist SET offered_token = NULL
                    WHERE email = $1 AND year = $2 AND offered_token = $3
                    ",
                )
                .bind(email)
                .bind(year)
                .bind(token)
                .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
