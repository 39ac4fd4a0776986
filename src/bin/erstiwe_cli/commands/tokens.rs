// ABOUTME: Token commands for erstiwe-cli
// ABOUTME: Generates batches of free tokens and shows single token records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use erstiwe_registration::{
    errors::{AppError, AppResult},
    registration::TokenManager,
    services::RegistrationService,
};
use tracing::info;

use crate::helpers::display::print_json;

type Result<T> = AppResult<T>;

/// Generate `count` free tokens for the event year
pub async fn generate(service: &RegistrationService, count: usize) -> Result<()> {
    info!(
        "Generating {} tokens for {}",
        count,
        service.manager().current_year()
    );
    let tokens = service.generate_tokens(count).await?;
    print_json(&tokens)
}

/// Show one token of the event year
pub async fn show(manager: &TokenManager, token: &str) -> Result<()> {
    let record = manager
        .token(token)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Token {token}")))?;
    print_json(&record)
}
