// ABOUTME: Registration and opt-out commands for erstiwe-cli
// ABOUTME: Reads registration payloads from JSON files and reports promotions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;

use erstiwe_registration::{
    errors::{AppError, AppResult},
    models::RegistrationPayload,
    services::RegistrationService,
};

use crate::helpers::display::print_json;

type Result<T> = AppResult<T>;

/// Register using the payload stored in `path`
pub async fn register(service: &RegistrationService, path: &Path) -> Result<()> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::invalid_input(format!("Cannot read {}: {e}", path.display())))?;
    let payload: RegistrationPayload = serde_json::from_slice(&raw)?;

    let registrant = service.register(&payload).await?;
    print_json(&registrant)
}

/// Opt out `token` and offer the replacement to the waitlist
pub async fn opt_out(service: &RegistrationService, token: &str, email: Option<&str>) -> Result<()> {
    let outcome = service.opt_out(token, email).await?;
    print_json(&outcome)
}
