// ABOUTME: Domain models re-exported from erstiwe-core
// ABOUTME: Tokens, registrants, registration payloads, and waitlist entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use erstiwe_core::models::*;
