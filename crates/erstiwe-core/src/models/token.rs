// ABOUTME: Token model with its three-state registration lifecycle
// ABOUTME: Covers persisted token records and freshly generated token pairs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::token_states;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a token's registration use
///
/// Allowed transitions are `Free -> Registered`, `Free -> OptedOut` and
/// `Registered -> OptedOut`, each at most once. `OptedOut` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    /// Issued, not yet used
    Free,
    /// Used by a registrant
    Registered,
    /// Slot given back
    OptedOut,
}

impl TokenState {
    /// Database column representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => token_states::FREE,
            Self::Registered => token_states::REGISTERED,
            Self::OptedOut => token_states::OPTED_OUT,
        }
    }

    /// Whether a registration may still consume this token
    #[must_use]
    pub const fn accepts_registration(self) -> bool {
        matches!(self, Self::Free)
    }
}

impl fmt::Display for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state column held a value outside the known lifecycle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown token state '{0}'")]
pub struct UnknownTokenState(pub String);

impl FromStr for TokenState {
    type Err = UnknownTokenState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            token_states::FREE => Ok(Self::Free),
            token_states::REGISTERED => Ok(Self::Registered),
            token_states::OPTED_OUT => Ok(Self::OptedOut),
            other => Err(UnknownTokenState(other.to_owned())),
        }
    }
}

/// A freshly generated token before persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Registration token, unique within its year
    pub register: String,
    /// Secondary secret for the email channel; collisions tolerated
    pub email: String,
}

/// A persisted token record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token value
    pub token: String,
    /// Secondary email-channel secret
    pub email_token: String,
    /// Event year the token belongs to
    pub year: i32,
    /// Registration lifecycle state
    pub state: TokenState,
    /// Opted-out token this one replaced, if any
    pub previous_token: Option<String>,
}

impl Token {
    /// Whether this token was minted as a replacement for an opted-out one
    #[must_use]
    pub const fn is_successor(&self) -> bool {
        self.previous_token.is_some()
    }
}
