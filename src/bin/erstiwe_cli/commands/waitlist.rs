// ABOUTME: Waitlist commands for erstiwe-cli
// ABOUTME: Adds entrants and lists the queue in waiting order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use erstiwe_registration::{
    errors::{AppError, AppResult},
    registration::TokenManager,
    services::RegistrationService,
};
use tracing::warn;

use crate::helpers::display::print_json;

type Result<T> = AppResult<T>;

/// Queue `email` for the event year
pub async fn add(service: &RegistrationService, email: &str) -> Result<()> {
    match service.join_waitlist(email).await? {
        Some(entry) => print_json(&entry),
        None => {
            warn!("{} is already registered, not added to the waitlist", email);
            Err(AppError::invalid_input(format!(
                "{email} is already registered"
            )))
        }
    }
}

/// Print the waitlist of `year`
pub async fn list(manager: &TokenManager, year: Option<i32>) -> Result<()> {
    print_json(&manager.waitlist(year).await?)
}
