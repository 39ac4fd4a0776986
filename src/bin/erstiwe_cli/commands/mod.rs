// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Re-exports command modules for erstiwe-cli
// ABOUTME: Token, lifecycle, waitlist, and reporting commands

pub mod lifecycle;
pub mod reports;
pub mod tokens;
pub mod waitlist;
