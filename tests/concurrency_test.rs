// ABOUTME: Concurrency tests against a file-backed database with a real connection pool
// ABOUTME: Competing transitions on one token and competing waitlist promotions
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used)]

mod common;

use anyhow::Result;
use common::{create_file_database, payload, RecordingNotifier, Sent, TEST_YEAR};
use erstiwe_registration::{
    config::EventConfig, errors::RegistrationError, models::TokenState,
    registration::TokenManager, services::RegistrationService,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_at_most_one_wins() -> Result<()> {
    let dir = TempDir::new()?;
    let database = create_file_database(dir.path(), 4).await?;
    let manager = TokenManager::new(database.clone(), &EventConfig::for_year(TEST_YEAR));
    let token = manager.create_tokens(1).await?.remove(0);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let manager = manager.clone();
            let request = payload(&token.token, &format!("racer{i}@example.org"));
            tokio::spawn(async move { manager.register(&request).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => winners += 1,
            Err(RegistrationError::InvalidToken { .. }) => {}
            Err(other) => return Err(other.into()),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(manager.count_registrants(None).await?, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_register_racing_opt_out_never_both() -> Result<()> {
    let dir = TempDir::new()?;
    let database = create_file_database(dir.path(), 4).await?;
    let manager = TokenManager::new(database.clone(), &EventConfig::for_year(TEST_YEAR));
    let token = manager.create_tokens(1).await?.remove(0);

    let register = {
        let manager = manager.clone();
        let request = payload(&token.token, "racer@example.org");
        tokio::spawn(async move { manager.register(&request).await })
    };
    let opt_out = {
        let manager = manager.clone();
        let value = token.token.clone();
        tokio::spawn(async move { manager.opt_out(&value, None).await })
    };

    let registered = register.await?;
    let opted_out = opt_out.await?;

    let stored = database.get_token(&token.token, TEST_YEAR).await?.unwrap();
    assert!(opted_out.is_ok());
    assert_eq!(stored.state, TokenState::OptedOut);
    if registered.is_err() {
        assert!(matches!(
            registered,
            Err(RegistrationError::InvalidToken { .. })
        ));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_batches_stay_unique() -> Result<()> {
    let dir = TempDir::new()?;
    let database = create_file_database(dir.path(), 4).await?;
    let manager = TokenManager::new(database.clone(), &EventConfig::for_year(TEST_YEAR));

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.create_tokens(40).await })
        })
        .collect();

    let mut all = HashSet::new();
    for handle in handles {
        for token in handle.await?? {
            assert!(all.insert(token.token));
        }
    }
    assert_eq!(all.len(), 120);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_promotions_reach_distinct_entrants() -> Result<()> {
    let dir = TempDir::new()?;
    let database = create_file_database(dir.path(), 4).await?;
    let manager = TokenManager::new(database.clone(), &EventConfig::for_year(TEST_YEAR));
    let notifier = Arc::new(RecordingNotifier::slow(Duration::from_millis(200)));
    let service = RegistrationService::new(manager, notifier.clone());

    let tokens = service.generate_tokens(2).await?;
    service.join_waitlist("first@example.org").await?;
    service.join_waitlist("second@example.org").await?;

    let handles: Vec<_> = tokens
        .into_iter()
        .map(|token| {
            let service = service.clone();
            tokio::spawn(async move { service.opt_out(&token.token, None).await })
        })
        .collect();

    let mut offered = HashSet::new();
    for handle in handles {
        let outcome = handle.await??;
        let entry = outcome.offered_to.unwrap();
        assert_eq!(
            entry.offered_token.as_deref(),
            Some(outcome.successor.token.as_str())
        );
        offered.insert(entry.email);
    }
    assert_eq!(offered.len(), 2);

    let notified: HashSet<String> = notifier
        .sent()
        .into_iter()
        .filter_map(|sent| match sent {
            Sent::SlotAvailable { email, .. } => Some(email),
            _ => None,
        })
        .collect();
    assert_eq!(notified, offered);

    let waitlist = service.manager().waitlist(None).await?;
    assert!(waitlist.iter().all(|entry| entry.offered_token.is_some()));
    Ok(())
}
