// ABOUTME: Domain service layer composing the token manager with notifications
// ABOUTME: Entry points reusable by any request layer or the admin CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services sit between a request layer and the token manager. They run the
//! state transition first and only then dispatch notifications, whose
//! failures are logged and swallowed.

/// Registration, opt-out, and waitlist flows with their notifications
pub mod registration;

pub use registration::{OptOutOutcome, RegistrationService};
