// ABOUTME: Configuration management module for centralized process settings
// ABOUTME: Environment-derived event, database, notification, and export configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration module
//!
//! - **Environment**: Process configuration from environment variables
//! - **Database**: `SQLite` location, pool size, and timeouts

/// Database configuration
pub mod database;
/// Environment and process configuration
pub mod environment;

pub use database::{DatabaseConfig, DatabaseUrl, PoolConfig};
pub use environment::{
    Environment, EventConfig, ExportConfig, NotificationConfig, ServerConfig,
};
