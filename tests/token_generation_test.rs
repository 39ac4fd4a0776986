// ABOUTME: Integration tests for batch token generation and persistence
// ABOUTME: Covers uniqueness, batch limits, collision replacement, and exhaustion
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used)]

mod common;

use anyhow::Result;
use common::{create_test_database, create_test_manager, TEST_YEAR};
use erstiwe_registration::{
    config::EventConfig,
    errors::RegistrationError,
    models::TokenState,
    registration::{TokenGenerator, TokenManager},
};
use std::collections::HashSet;

#[tokio::test]
async fn test_batch_persisted_as_free_and_unique() -> Result<()> {
    let (database, manager) = create_test_manager().await?;

    let tokens = manager.create_tokens(50).await?;

    assert_eq!(tokens.len(), 50);
    let distinct: HashSet<_> = tokens.iter().map(|t| t.token.as_str()).collect();
    assert_eq!(distinct.len(), 50);

    for token in &tokens {
        let stored = database.get_token(&token.token, TEST_YEAR).await?.unwrap();
        assert_eq!(stored.state, TokenState::Free);
        assert_eq!(stored.email_token, token.email_token);
        assert!(stored.previous_token.is_none());
    }
    Ok(())
}

#[tokio::test]
async fn test_batch_limit_enforced() -> Result<()> {
    let database = create_test_database().await?;
    let event = EventConfig {
        token_batch_limit: 5,
        ..EventConfig::for_year(TEST_YEAR)
    };
    let manager = TokenManager::new(database.clone(), &event);

    let result = manager.create_tokens(6).await;

    assert!(matches!(
        result,
        Err(RegistrationError::BatchTooLarge {
            requested: 6,
            limit: 5
        })
    ));
    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(database.pool())
        .await?;
    assert_eq!(stored, 0);
    Ok(())
}

#[tokio::test]
async fn test_collisions_with_existing_tokens_are_regenerated() -> Result<()> {
    let (database, manager) = create_test_manager().await?;
    let manager = manager.with_generator(TokenGenerator::with_alphabet(b"abcdef", 1, 50));

    let first = manager.create_tokens(3).await?;
    let second = manager.create_tokens(3).await?;

    let all: HashSet<_> = first.iter().chain(&second).map(|t| t.token.clone()).collect();
    assert_eq!(all.len(), 6);

    let candidates: Vec<String> = "abcdef".chars().map(String::from).collect();
    assert_eq!(database.existing_tokens(TEST_YEAR, &candidates).await?.len(), 6);
    Ok(())
}

#[tokio::test]
async fn test_exhausted_token_space_fails() -> Result<()> {
    let (_database, manager) = create_test_manager().await?;
    let manager = manager.with_generator(TokenGenerator::with_alphabet(b"ab", 1, 10));

    manager.create_tokens(2).await?;
    let result = manager.create_tokens(1).await;

    assert!(matches!(
        result,
        Err(RegistrationError::ExhaustedRetries { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_same_value_allowed_in_different_years() -> Result<()> {
    let database = create_test_database().await?;
    let generator = TokenGenerator::with_alphabet(b"a", 1, 10);
    let this_year = TokenManager::new(database.clone(), &EventConfig::for_year(TEST_YEAR))
        .with_generator(generator.clone());
    let next_year = TokenManager::new(database.clone(), &EventConfig::for_year(TEST_YEAR + 1))
        .with_generator(generator);

    let a = this_year.create_tokens(1).await?;
    let b = next_year.create_tokens(1).await?;

    assert_eq!(a[0].token, "a");
    assert_eq!(b[0].token, "a");
    assert_eq!(b[0].year, TEST_YEAR + 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_batch_is_noop() -> Result<()> {
    let (_database, manager) = create_test_manager().await?;
    assert!(manager.create_tokens(0).await?.is_empty());
    Ok(())
}
