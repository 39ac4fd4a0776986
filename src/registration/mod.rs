// ABOUTME: Token lifecycle core: generation, validation, registration, and opt-out promotion
// ABOUTME: Re-exports the generator, validator, and the year-scoped token manager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Token & Waitlist Manager
//!
//! Tokens move through `free -> registered -> opted_out` (or straight from
//! `free` to `opted_out`), each step at most once. Every transition is a
//! conditional update guarded by the expected current state, so concurrent
//! requests against one token cannot both succeed.
//!
//! Opting out mints a successor token linked to its predecessor. The caller
//! hands the successor to the longest-waiting waitlist entry.

/// Random token pair generation
pub mod generator;
/// Year-scoped state transitions
pub mod manager;
/// Read-only token predicates
pub mod validator;

pub use generator::TokenGenerator;
pub use manager::TokenManager;
pub use validator::TokenValidator;
