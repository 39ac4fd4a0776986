// ABOUTME: Notification dispatch for registrants and waitlist entrants
// ABOUTME: Defines the notifier trait plus log-only and webhook implementations
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Notification dispatch
//!
//! Notifications follow a completed state transition. Their failures are
//! logged by the caller and never undo or fail the transition itself.

/// Structured-log notifier
pub mod log;
/// JSON webhook notifier
pub mod webhook;

pub use log::LogNotifier;
pub use webhook::WebhookNotifier;

use crate::config::NotificationConfig;
use crate::models::{Registrant, Token, WaitlistEntry};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Failure to hand a notification to its transport
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The request could not be sent or timed out
    #[error("Notification transport failed: {0}")]
    Transport(String),
    /// The receiver answered with a non-success status
    #[error("Notification rejected with HTTP status {status}")]
    Rejected {
        /// Response status code
        status: u16,
    },
}

/// Kind of notification, used as the event name on the wire and in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Registration completed
    RegistrationConfirmed,
    /// Successor and predecessor should settle the participation fee
    MoneyTransfer,
    /// A slot opened for a waitlist entrant
    SlotAvailable,
}

impl NotificationKind {
    /// Event name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegistrationConfirmed => "registration_confirmed",
            Self::MoneyTransfer => "money_transfer",
            Self::SlotAvailable => "slot_available",
        }
    }
}

/// Outbound notification channel (mailer or equivalent)
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Confirm a completed registration to the registrant
    async fn registration_confirmed(&self, registrant: &Registrant)
        -> Result<(), NotificationError>;

    /// Ask a successor to transfer the participation fee to their predecessor
    async fn money_transfer(
        &self,
        successor: &Registrant,
        predecessor: &Registrant,
    ) -> Result<(), NotificationError>;

    /// Offer `token` to a waitlist entrant
    async fn slot_available(
        &self,
        entry: &WaitlistEntry,
        token: &Token,
    ) -> Result<(), NotificationError>;
}

/// Notifier selected by configuration: webhook when a URL is set, log otherwise
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built
pub fn from_config(config: &NotificationConfig) -> Result<Arc<dyn Notifier>, NotificationError> {
    match &config.webhook_url {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(url.clone(), config.timeout())?)),
        None => Ok(Arc::new(LogNotifier)),
    }
}
