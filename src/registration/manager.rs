// ABOUTME: Token lifecycle and waitlist promotion state machine
// ABOUTME: Batch token creation, guarded registration, and transactional opt-out with successor minting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{TokenGenerator, TokenValidator};
use crate::config::EventConfig;
use crate::constants::{database::TRANSACTION_RETRIES, field_limits, tokens::MAX_COLLISION_ROUNDS};
use crate::database::{
    insert_token, link_previous, mark_opted_out, register_free_token,
    transactions::{retry_transaction, TransactionGuard},
    Database,
};
use crate::errors::{DatabaseError, RegistrationError};
use crate::logging::AppLogger;
use crate::models::{
    truncate_chars, Registrant, RegistrationPayload, Token, TokenPair, TokenState, WaitlistEntry,
};
use chrono::Utc;
use futures_util::{stream, StreamExt, TryStreamExt};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Token and waitlist manager for one event year
///
/// Holds no mutable state of its own; the injected [`Database`] is the only
/// shared resource.
#[derive(Clone)]
pub struct TokenManager {
    db: Database,
    generator: TokenGenerator,
    validator: TokenValidator,
    event: EventConfig,
}

impl TokenManager {
    /// Manager for the configured current year
    #[must_use]
    pub fn new(db: Database, event: &EventConfig) -> Self {
        Self {
            generator: TokenGenerator::new(event.token_retry_factor),
            validator: TokenValidator::new(db.clone(), event.current_year),
            db,
            event: event.clone(),
        }
    }

    /// Replace the token generator
    #[must_use]
    pub fn with_generator(mut self, generator: TokenGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Year all lifecycle operations are scoped to
    #[must_use]
    pub const fn current_year(&self) -> i32 {
        self.event.current_year
    }

    /// Token predicates for the current year
    #[must_use]
    pub const fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Generate and persist `count` free tokens for the current year
    ///
    /// Candidates already present in the database are regenerated before
    /// insertion. Inserts fan out with at most one statement per pooled
    /// connection in flight. A storage failure midway leaves the tokens
    /// inserted so far in place; they are valid free tokens.
    ///
    /// # Errors
    ///
    /// Returns `BatchTooLarge` above the configured limit, `ExhaustedRetries`
    /// when collisions cannot be resolved, or the underlying storage error
    #[instrument(skip(self), fields(year = self.event.current_year))]
    pub async fn create_tokens(&self, count: usize) -> Result<Vec<Token>, RegistrationError> {
        if count > self.event.token_batch_limit {
            return Err(RegistrationError::BatchTooLarge {
                requested: count,
                limit: self.event.token_batch_limit,
            });
        }

        let year = self.event.current_year;
        let concurrency = usize::try_from(self.db.max_connections())
            .unwrap_or(1)
            .max(1);
        let mut pending = self.generator.generate(count)?;
        let mut created: Vec<TokenPair> = Vec::with_capacity(count);
        let mut known_taken = HashSet::new();
        let mut collisions = 0;
        let mut round = 0;

        while !pending.is_empty() {
            if round == MAX_COLLISION_ROUNDS {
                return Err(RegistrationError::ExhaustedRetries {
                    requested: count,
                    attempts: round,
                });
            }
            round += 1;

            let registers: Vec<String> = pending.iter().map(|p| p.register.clone()).collect();
            let taken = self.db.existing_tokens(year, &registers).await?;
            if !taken.is_empty() {
                debug!(round, collisions = taken.len(), "Replacing colliding tokens");
                known_taken.extend(taken);
                collisions += self.generator.replace_collisions(&mut pending, &known_taken)?;
                continue;
            }

            let db = &self.db;
            let outcomes: Vec<(TokenPair, bool)> = stream::iter(pending.drain(..))
                .map(|pair| async move {
                    let inserted = db.insert_token(year, &pair).await?;
                    Ok::<_, DatabaseError>((pair, inserted))
                })
                .buffered(concurrency)
                .try_collect()
                .await?;

            for (pair, inserted) in outcomes {
                if inserted {
                    created.push(pair);
                } else {
                    collisions += 1;
                    pending.push(pair);
                }
            }
        }

        AppLogger::log_token_batch(year, count, created.len(), collisions);

        Ok(created
            .into_iter()
            .map(|pair| Token {
                token: pair.register,
                email_token: pair.email,
                year,
                state: TokenState::Free,
                previous_token: None,
            })
            .collect())
    }

    /// Register against a free token of the current year
    ///
    /// Field lengths are clipped to their storage bounds. Completing the
    /// registration removes the email's waitlist entry for the year.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` if the token is not free, including when a
    /// concurrent request consumed it first
    #[instrument(skip(self, payload), fields(year = self.event.current_year, token = %payload.token))]
    pub async fn register(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<Registrant, RegistrationError> {
        let year = self.event.current_year;

        if !self.validator.is_valid_free_token(&payload.token).await? {
            AppLogger::log_invalid_token("register", year, &payload.token);
            return Err(RegistrationError::invalid_token(&payload.token));
        }

        let mut registrant = payload.to_registrant(year, Utc::now());
        let Some(previous) = self
            .db
            .timed("register", register_free_token(self.db.pool(), &registrant))
            .await?
        else {
            AppLogger::log_invalid_token("register", year, &payload.token);
            return Err(RegistrationError::invalid_token(&payload.token));
        };
        registrant.previous_token = previous;

        AppLogger::log_registration(year, &registrant.token, registrant.previous_token.is_some());
        Ok(registrant)
    }

    /// Opt out `token` and mint its successor
    ///
    /// The state flip, the mint, and the predecessor link run in one
    /// transaction on one connection: either all three are visible or none.
    /// With `email`, only the holder of that token/email pair may opt out.
    /// The email is clipped to its storage bound before comparing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` if the token is unknown for the year, already
    /// opted out, or not paired with `email`; `ExhaustedRetries` if no
    /// unique successor could be minted
    #[instrument(skip(self, email), fields(year = self.event.current_year))]
    pub async fn opt_out(&self, token: &str, email: Option<&str>) -> Result<Token, RegistrationError> {
        let year = self.event.current_year;
        // Compare against the email as it was stored on registration
        let email = email.map(|email| truncate_chars(email, field_limits::EMAIL));
        let email = email.as_deref();

        if let Some(email) = email {
            if !self.validator.is_valid_token_email_pair(token, email).await? {
                AppLogger::log_invalid_token("opt_out", year, token);
                return Err(RegistrationError::invalid_token(token));
            }
        }

        let successor = retry_transaction(
            || self.opt_out_once(token, email),
            TRANSACTION_RETRIES,
        )
        .await?;

        AppLogger::log_promotion(year, token, &successor.token);
        Ok(successor)
    }

    async fn opt_out_once(
        &self,
        token: &str,
        email: Option<&str>,
    ) -> Result<Token, RegistrationError> {
        let year = self.event.current_year;
        let mut guard = TransactionGuard::new(self.db.pool().begin().await?);

        let flipped = self
            .db
            .timed(
                "opt_out",
                mark_opted_out(guard.executor()?, token, year, email),
            )
            .await?;
        if !flipped {
            AppLogger::log_invalid_token("opt_out", year, token);
            return Err(RegistrationError::invalid_token(token));
        }

        let ceiling = self.generator.ceiling(1);
        let mut minted = None;
        for _ in 0..ceiling {
            let pair = self.generator.pair();
            if self
                .db
                .timed("opt_out", insert_token(guard.executor()?, year, &pair))
                .await?
            {
                minted = Some(pair);
                break;
            }
        }
        let pair = minted.ok_or(RegistrationError::ExhaustedRetries {
            requested: 1,
            attempts: ceiling,
        })?;

        self.db
            .timed(
                "opt_out",
                link_previous(guard.executor()?, &pair.register, token, year),
            )
            .await?;

        guard.commit().await?;

        Ok(Token {
            token: pair.register,
            email_token: pair.email,
            year,
            state: TokenState::Free,
            previous_token: Some(token.to_owned()),
        })
    }

    /// Put `email` on the current year's waitlist
    ///
    /// Returns the entry, keeping its original position on repeated joins,
    /// or `None` if the email is already registered for the year.
    ///
    /// # Errors
    ///
    /// Returns the underlying storage error
    pub async fn join_waitlist(
        &self,
        email: &str,
    ) -> Result<Option<WaitlistEntry>, RegistrationError> {
        let email = truncate_chars(email.trim(), field_limits::EMAIL);
        Ok(self
            .db
            .join_waitlist(&email, self.event.current_year)
            .await?)
    }

    /// Longest-waiting entry of the current year not yet offered a token
    ///
    /// # Errors
    ///
    /// Returns the underlying storage error
    pub async fn next_waitlist_entry(&self) -> Result<Option<WaitlistEntry>, RegistrationError> {
        Ok(self
            .db
            .next_waitlist_entry(self.event.current_year)
            .await?)
    }

    /// Claim the longest-waiting unoffered entry of the current year for `token`
    ///
    /// # Errors
    ///
    /// Returns the underlying storage error
    pub async fn claim_waitlist_offer(
        &self,
        token: &str,
    ) -> Result<Option<WaitlistEntry>, RegistrationError> {
        Ok(self
            .db
            .claim_waitlist_offer(self.event.current_year, token)
            .await?)
    }

    /// Withdraw an undelivered offer of `token` to `email`
    ///
    /// # Errors
    ///
    /// Returns the underlying storage error
    pub async fn release_waitlist_offer(
        &self,
        email: &str,
        token: &str,
    ) -> Result<bool, RegistrationError> {
        Ok(self
            .db
            .release_waitlist_offer(email, self.event.current_year, token)
            .await?)
    }

    /// Token record of the current year
    ///
    /// # Errors
    ///
    /// Returns the underlying storage error
    pub async fn token(&self, token: &str) -> Result<Option<Token>, RegistrationError> {
        Ok(self.db.get_token(token, self.event.current_year).await?)
    }

    /// Registrant data stored on a token of the current year, in any state
    ///
    /// # Errors
    ///
    /// Returns the underlying storage error
    pub async fn registrant(&self, token: &str) -> Result<Option<Registrant>, RegistrationError> {
        Ok(self
            .db
            .get_registrant(token, self.event.current_year)
            .await?)
    }

    /// Registered participants of `year` (default: current year)
    ///
    /// # Errors
    ///
    /// Returns the underlying storage error
    pub async fn registrants(&self, year: Option<i32>) -> Result<Vec<Registrant>, RegistrationError> {
        Ok(self.db.list_registrants(self.year_or_current(year)).await?)
    }

    /// Waitlist of `year` (default: current year), longest-waiting first
    ///
    /// # Errors
    ///
    /// Returns the underlying storage error
    pub async fn waitlist(&self, year: Option<i32>) -> Result<Vec<WaitlistEntry>, RegistrationError> {
        Ok(self.db.list_waitlist(self.year_or_current(year)).await?)
    }

    /// Number of registered participants of `year` (default: current year)
    ///
    /// # Errors
    ///
    /// Returns the underlying storage error
    pub async fn count_registrants(&self, year: Option<i32>) -> Result<u64, RegistrationError> {
        Ok(self.db.count_registrants(self.year_or_current(year)).await?)
    }

    /// Registrants of `year` (default: current year) holding a replacement token
    ///
    /// # Errors
    ///
    /// Returns the underlying storage error
    pub async fn successors(&self, year: Option<i32>) -> Result<Vec<Registrant>, RegistrationError> {
        Ok(self.db.list_successors(self.year_or_current(year)).await?)
    }

    fn year_or_current(&self, year: Option<i32>) -> i32 {
        year.unwrap_or(self.event.current_year)
    }
}
