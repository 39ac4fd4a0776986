// ABOUTME: Core types and constants for the erstiwe registration backend
// ABOUTME: Foundation crate with error handling, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Erstiwe Core
//!
//! Foundation crate providing shared types and constants for the token and
//! waitlist manager. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and domain-specific errors
//! - **constants**: Field bounds, token alphabet, environment variable names and defaults
//! - **models**: Tokens, registrants, and waitlist entries

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Token, Registrant, `WaitlistEntry`)
pub mod models;
