// ABOUTME: Core data models for tokens, registrants, and waitlist entries
// ABOUTME: Shared between persistence, the token manager, and notification dispatch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! A token grants exactly one registration attempt within one year. Registrant
//! data is attached to a token once registered; waitlist entries queue emails
//! for slots released by opt-outs.

mod registrant;
mod token;
mod waitlist;

pub use registrant::{truncate_chars, Registrant, RegistrationPayload};
pub use token::{Token, TokenPair, TokenState, UnknownTokenState};
pub use waitlist::WaitlistEntry;
