//! Account-related types for the retail ledger
//!
//! This module defines the Account entity. Balances are only ever changed
//! through the `AccountLedger` operations, and every change is committed
//! together with a transaction record.

use super::account_number::AccountNumber;
use super::customer::CustomerId;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Account identifier
pub type AccountId = Uuid;

/// A customer's bank account
///
/// Holds the balance state of a single account. The owning customer and the
/// account number are fixed at creation; `balance` and `version` change with
/// every committed credit or debit.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Account identity
    pub id: AccountId,

    /// Owning customer (required, immutable)
    pub customer_id: CustomerId,

    /// 12-character account number, unique across all accounts
    pub number: AccountNumber,

    /// Current balance, never negative after a completed operation
    pub balance: Decimal,

    /// Optimistic concurrency token
    ///
    /// Incremented by the store on every committed update. A unit of work that
    /// read the account at an older version is rejected with
    /// `LedgerError::ConcurrentModification`.
    pub version: u64,
}

impl Account {
    /// Create a new account with a zero balance at version 0
    ///
    /// # Arguments
    ///
    /// * `customer_id` - The owning customer
    /// * `number` - The account number assigned at opening
    pub fn new(customer_id: CustomerId, number: AccountNumber) -> Self {
        Account {
            id: Uuid::now_v7(),
            customer_id,
            number,
            balance: Decimal::ZERO,
            version: 0,
        }
    }
}
