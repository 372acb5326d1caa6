//! Account number generators
//!
//! Two implementations of [`AccountNumberGenerator`]:
//!
//! - `RandomAccountNumberGenerator`: `B` followed by 11 random digits, used in production
//! - `SequentialAccountNumberGenerator`: `B00000000001`, `B00000000002`, ... for
//!   reproducible reports
//!
//! Neither checks uniqueness. The store's unique index on account numbers
//! rejects a collision with `AccountNumberConflict`.

use crate::core::traits::AccountNumberGenerator;
use crate::types::account_number::ACCOUNT_NUMBER_LENGTH;
use crate::types::AccountNumber;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

const DIGITS: usize = ACCOUNT_NUMBER_LENGTH - 1;

/// Generates account numbers from a non-cryptographic thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomAccountNumberGenerator;

impl RandomAccountNumberGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl AccountNumberGenerator for RandomAccountNumberGenerator {
    fn generate(&self) -> AccountNumber {
        let mut rng = rand::rng();
        let digits: String = (0..DIGITS)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect();

        AccountNumber::from_digits(&digits)
    }
}

/// Generates consecutive account numbers starting at `B00000000001`
#[derive(Debug)]
pub struct SequentialAccountNumberGenerator {
    next: AtomicU64,
}

impl SequentialAccountNumberGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start the sequence at `first` instead of 1
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialAccountNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountNumberGenerator for SequentialAccountNumberGenerator {
    fn generate(&self) -> AccountNumber {
        // Wraps within 11 digits; the store rejects any resulting duplicate
        let value = self.next.fetch_add(1, Ordering::Relaxed) % 100_000_000_000;
        let digits = format!("{:0width$}", value, width = DIGITS);

        AccountNumber::from_digits(&digits)
    }
}
