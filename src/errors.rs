// ABOUTME: Unified error handling re-exported from erstiwe-core
// ABOUTME: Keeps crate::errors paths stable for application modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Error types re-exported from `erstiwe_core::errors`

pub use erstiwe_core::errors::*;
