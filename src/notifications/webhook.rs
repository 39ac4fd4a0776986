// ABOUTME: Notifier posting JSON notification requests to a configured webhook
// ABOUTME: A mail relay behind the webhook renders and delivers the messages
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{NotificationError, NotificationKind, Notifier};
use crate::models::{Registrant, Token, WaitlistEntry};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct WebhookRequest<'a> {
    event: NotificationKind,
    recipient: &'a str,
    data: Value,
}

/// Posts `{event, recipient, data}` to a webhook URL
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    http_client: Client,
}

impl WebhookNotifier {
    /// Create a notifier whose requests give up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(url: String, timeout: Duration) -> Result<Self, NotificationError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Transport(e.to_string()))?;
        Ok(Self { url, http_client })
    }

    async fn send(
        &self,
        event: NotificationKind,
        recipient: &str,
        data: Value,
    ) -> Result<(), NotificationError> {
        let response = self
            .http_client
            .post(&self.url)
            .json(&WebhookRequest {
                event,
                recipient,
                data,
            })
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(notification.kind = event.as_str(), "Webhook accepted notification");
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn registration_confirmed(
        &self,
        registrant: &Registrant,
    ) -> Result<(), NotificationError> {
        self.send(
            NotificationKind::RegistrationConfirmed,
            &registrant.email,
            json!({
                "first_name": registrant.first_name,
                "last_name": registrant.last_name,
                "token": registrant.token,
                "year": registrant.year,
            }),
        )
        .await
    }

    async fn money_transfer(
        &self,
        successor: &Registrant,
        predecessor: &Registrant,
    ) -> Result<(), NotificationError> {
        self.send(
            NotificationKind::MoneyTransfer,
            &successor.email,
            json!({
                "successor": {
                    "first_name": successor.first_name,
                    "last_name": successor.last_name,
                    "email": successor.email,
                    "token": successor.token,
                },
                "predecessor": {
                    "first_name": predecessor.first_name,
                    "last_name": predecessor.last_name,
                    "email": predecessor.email,
                    "token": predecessor.token,
                },
                "year": successor.year,
            }),
        )
        .await
    }

    async fn slot_available(
        &self,
        entry: &WaitlistEntry,
        token: &Token,
    ) -> Result<(), NotificationError> {
        self.send(
            NotificationKind::SlotAvailable,
            &entry.email,
            json!({
                "token": token.token,
                "email_token": token.email_token,
                "year": token.year,
            }),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_unreachable_webhook_is_transport_error() {
        let notifier =
            WebhookNotifier::new("http://127.0.0.1:9/notify".into(), Duration::from_millis(200))
                .unwrap();
        let entry = WaitlistEntry {
            email: "wait@example.org".into(),
            year: 2024,
            created_at: Utc::now(),
            offered_token: None,
        };
        let token = Token {
            token: "abcdefgh".into(),
            email_token: "12345678".into(),
            year: 2024,
            state: crate::models::TokenState::Free,
            previous_token: Some("zzzzzzzz".into()),
        };

        let result = notifier.slot_available(&entry, &token).await;
        assert!(matches!(result, Err(NotificationError::Transport(_))));
    }
}
