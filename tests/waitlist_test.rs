// ABOUTME: Integration tests for the waitlist queue
// ABOUTME: Covers ordering, idempotent joins, registered emails, and offer tracking
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used)]

mod common;

use anyhow::Result;
use common::{create_test_manager, payload, unique_email, TEST_YEAR};

#[tokio::test]
async fn test_waitlist_ordered_by_join_time() -> Result<()> {
    let (_database, manager) = create_test_manager().await?;
    let emails: Vec<String> = (0..4).map(|_| unique_email()).collect();
    for email in &emails {
        manager.join_waitlist(email).await?.unwrap();
    }

    let listed: Vec<String> = manager
        .waitlist(None)
        .await?
        .into_iter()
        .map(|e| e.email)
        .collect();

    assert_eq!(listed, emails);
    Ok(())
}

#[tokio::test]
async fn test_rejoin_keeps_position() -> Result<()> {
    let (_database, manager) = create_test_manager().await?;
    let first = manager.join_waitlist("first@example.org").await?.unwrap();
    manager.join_waitlist("second@example.org").await?;

    let again = manager.join_waitlist("FIRST@example.org").await?.unwrap();

    assert_eq!(again.created_at, first.created_at);
    let waitlist = manager.waitlist(None).await?;
    assert_eq!(waitlist.len(), 2);
    assert_eq!(waitlist[0].email, "first@example.org");
    Ok(())
}

#[tokio::test]
async fn test_registered_email_not_queued() -> Result<()> {
    let (_database, manager) = create_test_manager().await?;
    let token = manager.create_tokens(1).await?.remove(0);
    manager
        .register(&payload(&token.token, "done@example.org"))
        .await?;

    assert!(manager.join_waitlist("done@example.org").await?.is_none());
    assert!(manager.waitlist(None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_claim_offers_entrants_in_order() -> Result<()> {
    let (_database, manager) = create_test_manager().await?;
    manager.join_waitlist("a@example.org").await?;
    manager.join_waitlist("b@example.org").await?;

    let claimed = manager.claim_waitlist_offer("abcd1234").await?.unwrap();
    assert_eq!(claimed.email, "a@example.org");
    assert_eq!(claimed.offered_token.as_deref(), Some("abcd1234"));
    assert_eq!(
        manager.next_waitlist_entry().await?.unwrap().email,
        "b@example.org"
    );

    let claimed = manager.claim_waitlist_offer("efgh5678").await?.unwrap();
    assert_eq!(claimed.email, "b@example.org");
    assert!(manager.claim_waitlist_offer("ijkl9012").await?.is_none());

    let listed = manager.waitlist(None).await?;
    assert_eq!(listed[0].offered_token.as_deref(), Some("abcd1234"));
    assert_eq!(listed[1].offered_token.as_deref(), Some("efgh5678"));
    Ok(())
}

#[tokio::test]
async fn test_release_puts_entrant_back_first() -> Result<()> {
    let (_database, manager) = create_test_manager().await?;
    manager.join_waitlist("a@example.org").await?;
    manager.join_waitlist("b@example.org").await?;
    let claimed = manager.claim_waitlist_offer("abcd1234").await?.unwrap();

    // A release naming another token leaves the offer alone
    assert!(!manager
        .release_waitlist_offer(&claimed.email, "zzzz0000")
        .await?);
    assert!(manager
        .release_waitlist_offer(&claimed.email, "abcd1234")
        .await?);

    assert_eq!(
        manager.next_waitlist_entry().await?.unwrap().email,
        "a@example.org"
    );
    Ok(())
}

#[tokio::test]
async fn test_waitlist_scoped_by_year() -> Result<()> {
    let (database, manager) = create_test_manager().await?;
    database.join_waitlist("old@example.org", TEST_YEAR - 1).await?;
    manager.join_waitlist("new@example.org").await?;

    assert_eq!(manager.waitlist(None).await?.len(), 1);
    assert_eq!(manager.waitlist(Some(TEST_YEAR - 1)).await?[0].email, "old@example.org");
    assert_eq!(
        manager.next_waitlist_entry().await?.unwrap().email,
        "new@example.org"
    );
    Ok(())
}

#[tokio::test]
async fn test_long_email_truncated_on_join() -> Result<()> {
    let (_database, manager) = create_test_manager().await?;
    let email = format!("{}@example.org", "w".repeat(60));

    let entry = manager.join_waitlist(&email).await?.unwrap();

    assert_eq!(entry.email.chars().count(), 45);
    Ok(())
}
