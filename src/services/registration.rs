// ABOUTME: Registration service running lifecycle transitions and their follow-up notifications
// ABOUTME: Promotes the longest-waiting waitlist entrant after every successful opt-out
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::errors::RegistrationError;
use crate::logging::AppLogger;
use crate::models::{Registrant, RegistrationPayload, Token, WaitlistEntry};
use crate::notifications::{NotificationKind, Notifier};
use crate::registration::TokenManager;

/// Result of an opt-out as seen by the request layer
#[derive(Debug, Clone, Serialize)]
pub struct OptOutOutcome {
    /// Replacement token minted for the opted-out one
    pub successor: Token,
    /// Waitlist entrant the replacement was offered to
    pub offered_to: Option<WaitlistEntry>,
}

/// Lifecycle operations plus notifications
#[derive(Clone)]
pub struct RegistrationService {
    manager: TokenManager,
    notifier: Arc<dyn Notifier>,
}

impl RegistrationService {
    /// Compose a manager with a notification channel
    #[must_use]
    pub fn new(manager: TokenManager, notifier: Arc<dyn Notifier>) -> Self {
        Self { manager, notifier }
    }

    /// Underlying manager, for reporting queries
    #[must_use]
    pub const fn manager(&self) -> &TokenManager {
        &self.manager
    }

    /// Generate a batch of free tokens for the current year
    ///
    /// # Errors
    ///
    /// Propagates generation and storage errors
    pub async fn generate_tokens(&self, count: usize) -> Result<Vec<Token>, RegistrationError> {
        self.manager.create_tokens(count).await
    }

    /// Register, then confirm to the registrant
    ///
    /// When the token replaced an opted-out one whose holder had registered,
    /// the successor is also asked to settle the fee with the predecessor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` or a storage error; notification failures never surface
    pub async fn register(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<Registrant, RegistrationError> {
        let registrant = self.manager.register(payload).await?;

        if let Err(e) = self.notifier.registration_confirmed(&registrant).await {
            AppLogger::log_notification_failure(
                NotificationKind::RegistrationConfirmed.as_str(),
                &registrant.email,
                &e,
            );
        }

        if let Some(previous) = &registrant.previous_token {
            self.notify_money_transfer(&registrant, previous).await;
        }

        Ok(registrant)
    }

    async fn notify_money_transfer(&self, successor: &Registrant, previous: &str) {
        let predecessor = match self.manager.registrant(previous).await {
            Ok(Some(predecessor)) => predecessor,
            Ok(None) => {
                debug!(token.previous = %previous, "Predecessor never registered, no fee to settle");
                return;
            }
            Err(e) => {
                AppLogger::log_notification_failure(
                    NotificationKind::MoneyTransfer.as_str(),
                    &successor.email,
                    &e,
                );
                return;
            }
        };

        if let Err(e) = self.notifier.money_transfer(successor, &predecessor).await {
            AppLogger::log_notification_failure(
                NotificationKind::MoneyTransfer.as_str(),
                &successor.email,
                &e,
            );
        }
    }

    /// Opt out, then offer the successor token to the longest-waiting entrant
    ///
    /// The entrant is claimed before the notice goes out and released again
    /// if delivery fails, so a failed delivery leaves them first in line.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken`, `ExhaustedRetries`, or a storage error of the
    /// opt-out itself; promotion failures never surface
    pub async fn opt_out(
        &self,
        token: &str,
        email: Option<&str>,
    ) -> Result<OptOutOutcome, RegistrationError> {
        let successor = self.manager.opt_out(token, email).await?;
        let offered_to = self.promote(&successor).await;
        Ok(OptOutOutcome {
            successor,
            offered_to,
        })
    }

    async fn promote(&self, successor: &Token) -> Option<WaitlistEntry> {
        let kind = NotificationKind::SlotAvailable.as_str();
        let entry = match self.manager.claim_waitlist_offer(&successor.token).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                info!(token.successor = %successor.token, "Waitlist empty, successor token unassigned");
                return None;
            }
            Err(e) => {
                AppLogger::log_notification_failure(kind, "waitlist", &e);
                return None;
            }
        };

        if let Err(e) = self.notifier.slot_available(&entry, successor).await {
            AppLogger::log_notification_failure(kind, &entry.email, &e);
            if let Err(e) = self
                .manager
                .release_waitlist_offer(&entry.email, &successor.token)
                .await
            {
                AppLogger::log_notification_failure(kind, &entry.email, &e);
            }
            return None;
        }

        Some(entry)
    }

    /// Queue an email on the current year's waitlist
    ///
    /// # Errors
    ///
    /// Propagates storage errors
    pub async fn join_waitlist(
        &self,
        email: &str,
    ) -> Result<Option<WaitlistEntry>, RegistrationError> {
        self.manager.join_waitlist(email).await
    }
}
