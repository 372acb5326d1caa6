//! Account number type
//!
//! Account numbers are 12 characters long: the fixed prefix `B` followed by
//! 11 decimal digits. They are assigned once when an account is opened and
//! never change afterwards.

use super::error::LedgerError;
use std::fmt;
use std::str::FromStr;

/// Fixed leading character of every account number
pub const ACCOUNT_NUMBER_PREFIX: char = 'B';

/// Total length of an account number, prefix included
pub const ACCOUNT_NUMBER_LENGTH: usize = 12;

/// A validated 12-character account number
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Parse and validate an account number
    ///
    /// The input must be exactly [`ACCOUNT_NUMBER_LENGTH`] characters: the
    /// prefix `B` followed by ASCII digits. Whitespace is not stripped; input
    /// layers trim their fields before calling this.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAccountNumberFormat` carrying the rejected input.
    pub fn parse(value: &str) -> Result<Self, LedgerError> {
        let mut chars = value.chars();

        let well_formed = value.len() == ACCOUNT_NUMBER_LENGTH
            && chars.next() == Some(ACCOUNT_NUMBER_PREFIX)
            && chars.all(|c| c.is_ascii_digit());

        if well_formed {
            Ok(AccountNumber(value.to_string()))
        } else {
            Err(LedgerError::invalid_account_number(value))
        }
    }

    /// Build an account number from its 11 digits
    ///
    /// Used by generators, which only ever produce 11 ASCII digits.
    pub(crate) fn from_digits(digits: &str) -> Self {
        debug_assert!(
            digits.len() == ACCOUNT_NUMBER_LENGTH - 1 && digits.chars().all(|c| c.is_ascii_digit())
        );
        AccountNumber(format!("{}{}", ACCOUNT_NUMBER_PREFIX, digits))
    }

    /// The account number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountNumber {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
