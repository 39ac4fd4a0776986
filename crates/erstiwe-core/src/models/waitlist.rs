// ABOUTME: Waitlist entry model keyed by email and year
// ABOUTME: Tracks queue position and the replacement token offered to the entrant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A person waiting for a slot, unique per `(email, year)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    /// Contact email
    pub email: String,
    /// Event year
    pub year: i32,
    /// When the entry joined the queue
    pub created_at: DateTime<Utc>,
    /// Replacement token already offered to this entrant
    pub offered_token: Option<String>,
}
