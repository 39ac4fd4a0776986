// ABOUTME: Registrant persistence attached to token rows
// ABOUTME: Conditional free-to-registered update plus year-scoped reporting queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Database;
use crate::errors::DatabaseError;
use crate::models::Registrant;
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite};

const REGISTRANT_COLUMNS: &str = r"
    token, year, email, firstname, lastname, gender, address, phone,
    birthday, study, food, info, prev_token, registered_at
";

#[derive(sqlx::FromRow)]
struct RegistrantRow {
    token: String,
    year: i32,
    email: Option<String>,
    firstname: Option<String>,
    lastname: Option<String>,
    gender: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    birthday: Option<String>,
    study: Option<String>,
    food: Option<String>,
    info: Option<String>,
    prev_token: Option<String>,
    registered_at: Option<DateTime<Utc>>,
}

impl From<RegistrantRow> for Registrant {
    fn from(row: RegistrantRow) -> Self {
        Self {
            token: row.token,
            year: row.year,
            email: row.email.unwrap_or_default(),
            first_name: row.firstname.unwrap_or_default(),
            last_name: row.lastname.unwrap_or_default(),
            gender: row.gender.unwrap_or_default(),
            address: row.address.unwrap_or_default(),
            phone: row.phone.unwrap_or_default(),
            birthday: row.birthday.unwrap_or_default(),
            study: row.study.unwrap_or_default(),
            food: row.food.unwrap_or_default(),
            comment: row.info.unwrap_or_default(),
            previous_token: row.prev_token,
            registered_at: row.registered_at,
        }
    }
}

/// Attach `registrant` to its token if the token is still free
///
/// The state guard makes the transition at-most-once: of two concurrent
/// registrations against one token exactly one matches. Returns `None` when
/// nothing matched, otherwise the token's predecessor (if it was issued as a
/// replacement). The waitlist row for the email is removed by trigger.
pub(crate) async fn register_free_token<'e, E>(
    executor: E,
    registrant: &Registrant,
) -> Result<Option<Option<String>>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, Option<String>>(
        r"
        UPDATE users SET
            state = 'registered',
            email = $1, firstname = $2, lastname = $3, gender = $4,
            address = $5, phone = $6, birthday = $7, study = $8,
            food = $9, info = $10, registered_at = $11
        WHERE token = $12 AND year = $13 AND state = 'free'
        RETURNING prev_token
        ",
    )
    .bind(&registrant.email)
    .bind(&registrant.first_name)
    .bind(&registrant.last_name)
    .bind(&registrant.gender)
    .bind(&registrant.address)
    .bind(&registrant.phone)
    .bind(&registrant.birthday)
    .bind(&registrant.study)
    .bind(&registrant.food)
    .bind(&registrant.comment)
    .bind(registrant.registered_at.unwrap_or_else(Utc::now))
    .bind(&registrant.token)
    .bind(registrant.year)
    .fetch_optional(executor)
    .await
}

impl Database {
    /// Registered participants of `year`, in registration order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_registrants(&self, year: i32) -> Result<Vec<Registrant>, DatabaseError> {
        let query = format!(
            "SELECT {REGISTRANT_COLUMNS} FROM users
             WHERE year = $1 AND state = 'registered'
             ORDER BY registered_at, rowid"
        );
        let rows: Vec<RegistrantRow> = self
            .timed(
                "list_registrants",
                sqlx::query_as(&query).bind(year).fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.into_iter().map(Registrant::from).collect())
    }

    /// Registered participants of `year` whose token replaced an opted-out one
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_successors(&self, year: i32) -> Result<Vec<Registrant>, DatabaseError> {
        let query = format!(
            "SELECT {REGISTRANT_COLUMNS} FROM users
             WHERE year = $1 AND state = 'registered' AND prev_token IS NOT NULL
             ORDER BY registered_at, rowid"
        );
        let rows: Vec<RegistrantRow> = self
            .timed(
                "list_successors",
                sqlx::query_as(&query).bind(year).fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.into_iter().map(Registrant::from).collect())
    }

    /// Number of registered participants of `year`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_registrants(&self, year: i32) -> Result<u64, DatabaseError> {
        let count: i64 = self
            .timed(
                "count_registrants",
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM users WHERE year = $1 AND state = 'registered'",
                )
                .bind(year)
                .fetch_one(&self.pool),
            )
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Registrant data stored on `token`, whatever its current state
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_registrant(
        &self,
        token: &str,
        year: i32,
    ) -> Result<Option<Registrant>, DatabaseError> {
        let query = format!(
            "SELECT {REGISTRANT_COLUMNS} FROM users
             WHERE token = $1 AND year = $2 AND email IS NOT NULL"
        );
        let row: Option<RegistrantRow> = self
            .timed(
                "get_registrant",
                sqlx::query_as(&query)
                    .bind(token)
                    .bind(year)
                    .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(Registrant::from))
    }
}
