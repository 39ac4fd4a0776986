// ABOUTME: Integration tests for year snapshot export
// ABOUTME: Verifies file naming and JSON contents of the three snapshots
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used)]

mod common;

use anyhow::Result;
use common::{create_test_manager, payload, TEST_YEAR};
use erstiwe_registration::{config::ExportConfig, export::Exporter};
use serde_json::Value;
use tempfile::TempDir;

#[tokio::test]
async fn test_export_writes_three_snapshots() -> Result<()> {
    let (_database, manager) = create_test_manager().await?;
    let tokens = manager.create_tokens(2).await?;
    manager
        .register(&payload(&tokens[0].token, "ada@example.org"))
        .await?;
    let successor = manager.opt_out(&tokens[1].token, None).await?;
    manager
        .register(&payload(&successor.token, "grace@example.org"))
        .await?;
    manager.join_waitlist("waiting@example.org").await?;

    let dir = TempDir::new()?;
    let exporter = Exporter::new(ExportConfig {
        directory: dir.path().join("out"),
        prefix: "erstiwe".into(),
    });

    let report = exporter.export_year(&manager, TEST_YEAR).await?;

    assert_eq!(report.counts, [2, 1, 1]);
    assert_eq!(
        report.attendees,
        dir.path().join("out").join("erstiwe2024-attendees.txt")
    );
    assert!(report.waiting_list.ends_with("erstiwe2024-waitinglist.txt"));
    assert!(report.successors.ends_with("erstiwe2024-successors.txt"));

    let attendees: Value = serde_json::from_slice(&tokio::fs::read(&report.attendees).await?)?;
    assert_eq!(attendees.as_array().unwrap().len(), 2);

    let successors: Value = serde_json::from_slice(&tokio::fs::read(&report.successors).await?)?;
    assert_eq!(successors[0]["email"], "grace@example.org");
    assert_eq!(successors[0]["previous_token"], tokens[1].token.as_str());

    let waiting: Value = serde_json::from_slice(&tokio::fs::read(&report.waiting_list).await?)?;
    assert_eq!(waiting[0]["email"], "waiting@example.org");
    Ok(())
}

#[tokio::test]
async fn test_export_of_empty_year() -> Result<()> {
    let (_database, manager) = create_test_manager().await?;
    let dir = TempDir::new()?;
    let exporter = Exporter::new(ExportConfig {
        directory: dir.path().to_path_buf(),
        prefix: "test-".into(),
    });

    let report = exporter.export_year(&manager, 1999).await?;

    assert_eq!(report.counts, [0, 0, 0]);
    assert_eq!(
        tokio::fs::read_to_string(dir.path().join("test-1999-attendees.txt")).await?,
        "[]"
    );
    Ok(())
}
