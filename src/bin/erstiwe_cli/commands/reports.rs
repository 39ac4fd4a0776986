// ABOUTME: Reporting and export commands for erstiwe-cli
// ABOUTME: Registrant and successor listings, counts, and JSON snapshot export
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use erstiwe_registration::{errors::AppResult, export::Exporter, registration::TokenManager};
use serde_json::json;

use crate::helpers::display::print_json;

type Result<T> = AppResult<T>;

/// Print registered participants of `year`
pub async fn registrants(manager: &TokenManager, year: Option<i32>) -> Result<()> {
    print_json(&manager.registrants(year).await?)
}

/// Print registrants of `year` holding a replacement token
pub async fn successors(manager: &TokenManager, year: Option<i32>) -> Result<()> {
    print_json(&manager.successors(year).await?)
}

/// Print the number of registered participants of `year`
pub async fn count(manager: &TokenManager, year: Option<i32>) -> Result<()> {
    let year = year.unwrap_or_else(|| manager.current_year());
    let count = manager.count_registrants(Some(year)).await?;
    print_json(&json!({ "year": year, "registrants": count }))
}

/// Write the snapshots of `year`
pub async fn export(exporter: &Exporter, manager: &TokenManager, year: Option<i32>) -> Result<()> {
    let year = year.unwrap_or_else(|| manager.current_year());
    let report = exporter.export_year(manager, year).await?;
    print_json(&report)
}
