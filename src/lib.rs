// ABOUTME: Main library entry point for the erstiwe registration backend
// ABOUTME: Token lifecycle, waitlist promotion, persistence, notifications, and export
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Erstiwe Registration
//!
//! Registration backend for a yearly event. It issues per-year access
//! tokens, accepts registrations against free tokens, keeps a waitlist, and
//! when a registrant opts out mints a replacement token for the
//! longest-waiting entrant.
//!
//! ## Architecture
//!
//! - **registration**: token generator, validator, and the lifecycle manager
//! - **database**: `SQLite` persistence with guarded state updates and transactions
//! - **services**: lifecycle operations followed by notifications
//! - **notifications**: mailer abstraction (log and webhook channels)
//! - **export**: JSON snapshots per year
//!
//! ## Quick Start
//!
//! ```text
//! let config = ServerConfig::from_env()?;
//! let db = Database::new(&config.database).await?;
//! let manager = TokenManager::new(db, &config.event);
//! let tokens = manager.create_tokens(3).await?;
//! ```

/// Configuration management
pub mod config;

/// Application constants
pub mod constants;

/// `SQLite` persistence layer
pub mod database;

/// Unified error handling
pub mod errors;

/// Year snapshot export
pub mod export;

/// Structured logging setup
pub mod logging;

/// Domain models
pub mod models;

/// Notification dispatch
pub mod notifications;

/// Token lifecycle and waitlist promotion
pub mod registration;

/// Lifecycle operations with notifications
pub mod services;
