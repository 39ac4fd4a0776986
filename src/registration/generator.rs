// ABOUTME: Random token pair generation with batch uniqueness and a bounded retry ceiling
// ABOUTME: Draws base-36 register and email tokens and replaces collisions on demand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::tokens;
use crate::errors::RegistrationError;
use crate::models::TokenPair;
use rand::Rng;
use std::collections::HashSet;

/// Generator of register/email token pairs
///
/// Register values are unique within one batch. Email tokens are drawn
/// independently and may collide. Every call draws at most
/// `retry_factor * count` register candidates before failing with
/// [`RegistrationError::ExhaustedRetries`].
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    alphabet: &'static [u8],
    length: usize,
    retry_factor: usize,
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new(tokens::DEFAULT_RETRY_FACTOR)
    }
}

impl TokenGenerator {
    /// Base-36 generator with the standard token length
    #[must_use]
    pub fn new(retry_factor: usize) -> Self {
        Self {
            alphabet: tokens::ALPHABET,
            length: tokens::LENGTH,
            retry_factor: retry_factor.max(1),
        }
    }

    /// Generator over a custom alphabet and length
    ///
    /// A tiny token space makes collisions and exhaustion reproducible.
    /// An empty alphabet falls back to the base-36 one.
    #[must_use]
    pub fn with_alphabet(alphabet: &'static [u8], length: usize, retry_factor: usize) -> Self {
        Self {
            alphabet: if alphabet.is_empty() {
                tokens::ALPHABET
            } else {
                alphabet
            },
            length: length.max(1),
            retry_factor: retry_factor.max(1),
        }
    }

    /// Candidate ceiling for producing `count` tokens
    #[must_use]
    pub const fn ceiling(&self, count: usize) -> usize {
        self.retry_factor.saturating_mul(count)
    }

    fn draw(&self, rng: &mut impl Rng) -> String {
        (0..self.length)
            .map(|_| char::from(self.alphabet[rng.gen_range(0..self.alphabet.len())]))
            .collect()
    }

    /// One random pair, with no uniqueness guarantee
    #[must_use]
    pub fn pair(&self) -> TokenPair {
        let mut rng = rand::thread_rng();
        TokenPair {
            register: self.draw(&mut rng),
            email: self.draw(&mut rng),
        }
    }

    /// Generate `count` pairs with pairwise-distinct register values
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::ExhaustedRetries`] if the ceiling is hit
    pub fn generate(&self, count: usize) -> Result<Vec<TokenPair>, RegistrationError> {
        let ceiling = self.ceiling(count);
        let mut rng = rand::thread_rng();
        let mut seen = HashSet::with_capacity(count);
        let mut batch = Vec::with_capacity(count);
        let mut attempts = 0;

        while batch.len() < count {
            if attempts == ceiling {
                return Err(RegistrationError::ExhaustedRetries {
                    requested: count,
                    attempts,
                });
            }
            attempts += 1;

            let register = self.draw(&mut rng);
            if seen.insert(register.clone()) {
                batch.push(TokenPair {
                    register,
                    email: self.draw(&mut rng),
                });
            }
        }

        Ok(batch)
    }

    /// Regenerate every entry of `batch` whose register value is in `taken`
    ///
    /// Replacements avoid `taken` and the rest of the batch. Returns the
    /// number of entries replaced.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::ExhaustedRetries`] if the ceiling is hit
    pub fn replace_collisions(
        &self,
        batch: &mut [TokenPair],
        taken: &HashSet<String>,
    ) -> Result<usize, RegistrationError> {
        let colliding: Vec<usize> = batch
            .iter()
            .enumerate()
            .filter(|(_, pair)| taken.contains(&pair.register))
            .map(|(index, _)| index)
            .collect();
        if colliding.is_empty() {
            return Ok(0);
        }

        let mut in_use: HashSet<String> = batch.iter().map(|p| p.register.clone()).collect();
        in_use.extend(taken.iter().cloned());

        let ceiling = self.ceiling(colliding.len());
        let mut rng = rand::thread_rng();
        let mut attempts = 0;

        for &index in &colliding {
            loop {
                if attempts == ceiling {
                    return Err(RegistrationError::ExhaustedRetries {
                        requested: colliding.len(),
                        attempts,
                    });
                }
                attempts += 1;

                let register = self.draw(&mut rng);
                if in_use.insert(register.clone()) {
                    batch[index] = TokenPair {
                        register,
                        email: self.draw(&mut rng),
                    };
                    break;
                }
            }
        }

        Ok(colliding.len())
    }
}
