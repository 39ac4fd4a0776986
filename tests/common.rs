// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database, manager, payload, and notifier fixtures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `erstiwe_registration`

use anyhow::Result;
use async_trait::async_trait;
use erstiwe_registration::{
    config::{DatabaseConfig, DatabaseUrl, EventConfig, PoolConfig},
    database::Database,
    models::{Registrant, RegistrationPayload, Token, WaitlistEntry},
    notifications::{NotificationError, Notifier},
    registration::TokenManager,
};
use std::path::Path;
use std::sync::{Mutex, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Year used by fixtures
pub const TEST_YEAR: i32 = 2024;

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fresh in-memory database with schema applied
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new(&DatabaseConfig::in_memory()).await?)
}

/// File database under `dir`, allowing truly concurrent connections
pub async fn create_file_database(dir: &Path, pool_size: u32) -> Result<Database> {
    init_test_logging();
    let config = DatabaseConfig {
        url: DatabaseUrl::SQLite {
            path: dir.join("erstiwe-test.db"),
        },
        pool: PoolConfig {
            max_connections: pool_size,
            ..PoolConfig::default()
        },
    };
    Ok(Database::new(&config).await?)
}

/// Manager for [`TEST_YEAR`] over a fresh in-memory database
pub async fn create_test_manager() -> Result<(Database, TokenManager)> {
    let database = create_test_database().await?;
    let manager = TokenManager::new(database.clone(), &EventConfig::for_year(TEST_YEAR));
    Ok((database, manager))
}

/// Minimal valid registration payload
pub fn payload(token: &str, email: &str) -> RegistrationPayload {
    RegistrationPayload {
        token: token.to_owned(),
        email: email.to_owned(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        gender: "f".into(),
        address: "Hauptstr. 1".into(),
        post_code: "12345".into(),
        city: "Berlin".into(),
        mobile: "0151 1234567".into(),
        birthday: "2005-12-10".into(),
        study: "Informatik".into(),
        veggie_level: "vegetarian".into(),
        comment: String::new(),
    }
}

/// Unique email for tests sharing a database
pub fn unique_email() -> String {
    format!("{}@example.org", uuid::Uuid::new_v4().simple())
}

/// One notification seen by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Confirmed { email: String },
    MoneyTransfer { successor: String, predecessor: String },
    SlotAvailable { email: String, token: String },
}

/// Notifier that records calls and optionally fails every one of them
#[derive(Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    pub delay: Option<Duration>,
    pub sent: Mutex<Vec<Sent>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Holds every slot notice for `delay` before recording it
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, sent: Sent) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(sent);
        if self.fail {
            Err(NotificationError::Transport("mail relay down".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn registration_confirmed(
        &self,
        registrant: &Registrant,
    ) -> Result<(), NotificationError> {
        self.record(Sent::Confirmed {
            email: registrant.email.clone(),
        })
    }

    async fn money_transfer(
        &self,
        successor: &Registrant,
        predecessor: &Registrant,
    ) -> Result<(), NotificationError> {
        self.record(Sent::MoneyTransfer {
            successor: successor.email.clone(),
            predecessor: predecessor.email.clone(),
        })
    }

    async fn slot_available(
        &self,
        entry: &WaitlistEntry,
        token: &Token,
    ) -> Result<(), NotificationError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.record(Sent::SlotAvailable {
            email: entry.email.clone(),
            token: token.token.clone(),
        })
    }
}
