//! Core traits for storage and account number generation
//!
//! This module defines the seams between the ledger engine and its
//! collaborators. The engine depends only on these traits, so the in-memory
//! store used by the CLI and tests can be swapped for a relational backend.

use crate::core::unit_of_work::UnitOfWork;
use crate::types::{
    Account, AccountId, AccountNumber, Customer, CustomerId, LedgerError, Transaction,
};

/// Storage collaborator for the ledger
///
/// Reads return committed state only. All writes go through [`LedgerStore::commit`],
/// which applies a whole [`UnitOfWork`] atomically or not at all.
///
/// Implementations must be safe to share between concurrently running request
/// handlers.
pub trait LedgerStore: Send + Sync {
    /// Find a customer by id
    fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>, LedgerError>;

    /// Find an account by id
    fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError>;

    /// Find the first account matching a predicate
    fn find_account_where(
        &self,
        predicate: &dyn Fn(&Account) -> bool,
    ) -> Result<Option<Account>, LedgerError>;

    /// Find all transactions matching a predicate
    ///
    /// Results are ordered by `(created_at, id)` ascending.
    fn find_transactions_where(
        &self,
        predicate: &dyn Fn(&Transaction) -> bool,
    ) -> Result<Vec<Transaction>, LedgerError>;

    /// List every customer
    fn list_customers(&self) -> Result<Vec<Customer>, LedgerError>;

    /// List every account
    fn list_accounts(&self) -> Result<Vec<Account>, LedgerError>;

    /// Apply a unit of work atomically
    ///
    /// # Errors
    ///
    /// - `ConcurrentModification` if an updated account changed since it was read
    /// - `StorageUnavailable` if the store cannot complete the commit
    /// - Constraint violations (`AccountNumberConflict`, `CustomerAlreadyHasAccount`,
    ///   `DuplicateRecord`, missing parents)
    ///
    /// On any error nothing from the unit is applied.
    fn commit(&self, unit: UnitOfWork) -> Result<(), LedgerError>;

    /// Find an account by its account number
    fn find_account_by_number(
        &self,
        number: &AccountNumber,
    ) -> Result<Option<Account>, LedgerError> {
        self.find_account_where(&|account: &Account| &account.number == number)
    }

    /// Find the account owned by a customer
    fn find_account_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Account>, LedgerError> {
        self.find_account_where(&|account: &Account| account.customer_id == customer_id)
    }

    /// All transactions owned by an account, oldest first
    fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.find_transactions_where(&|txn: &Transaction| txn.account_id == account_id)
    }
}

/// Source of account numbers for newly opened accounts
///
/// Generators never check uniqueness; a collision surfaces from the store as
/// `LedgerError::AccountNumberConflict`.
pub trait AccountNumberGenerator: Send + Sync {
    /// Produce the next account number
    fn generate(&self) -> AccountNumber;
}
