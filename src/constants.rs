// ABOUTME: Application constants re-exported from erstiwe-core
// ABOUTME: Field bounds, token parameters, env var names, and defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use erstiwe_core::constants::*;
