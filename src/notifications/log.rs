// ABOUTME: Notifier that records notifications as structured log events
// ABOUTME: Default channel when no webhook is configured
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{NotificationError, NotificationKind, Notifier};
use crate::models::{Registrant, Token, WaitlistEntry};
use async_trait::async_trait;
use tracing::info;

/// Writes every notification to the log and always succeeds
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn registration_confirmed(
        &self,
        registrant: &Registrant,
    ) -> Result<(), NotificationError> {
        info!(
            notification.kind = NotificationKind::RegistrationConfirmed.as_str(),
            notification.recipient = %registrant.email,
            token.value = %registrant.token,
            token.year = registrant.year,
            "Notification"
        );
        Ok(())
    }

    async fn money_transfer(
        &self,
        successor: &Registrant,
        predecessor: &Registrant,
    ) -> Result<(), NotificationError> {
        info!(
            notification.kind = NotificationKind::MoneyTransfer.as_str(),
            notification.recipient = %successor.email,
            notification.predecessor = %predecessor.email,
            token.value = %successor.token,
            token.previous = %predecessor.token,
            "Notification"
        );
        Ok(())
    }

    async fn slot_available(
        &self,
        entry: &WaitlistEntry,
        token: &Token,
    ) -> Result<(), NotificationError> {
        info!(
            notification.kind = NotificationKind::SlotAvailable.as_str(),
            notification.recipient = %entry.email,
            token.value = %token.token,
            token.year = token.year,
            "Notification"
        );
        Ok(())
    }
}
