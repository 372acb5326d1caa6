//! Thread-safe in-memory ledger store
//!
//! This module provides the `InMemoryLedgerStore`, an implementation of the
//! `LedgerStore` collaborator backed by concurrent maps.
//!
//! # Design
//!
//! Each entity kind lives in its own `DashMap`, which gives fine-grained
//! interior mutability so the store can be shared behind an `Arc` by many
//! request handlers at once.
//!
//! Atomicity across entities comes from a single commit gate (`RwLock<()>`):
//!
//! - every read holds the gate in shared mode
//! - every commit holds it exclusively while it validates and applies a unit
//!
//! A reader therefore never observes half of a unit of work, for example a
//! transfer source debited without the destination credited.
//!
//! # Commit Protocol
//!
//! 1. Validate every write against committed state plus the writes queued earlier
//!    in the same unit (version checks, uniqueness, parent existence)
//! 2. Only if every write validates, apply them all
//!
//! Validation never mutates, so a rejected unit leaves no trace.

use crate::core::traits::LedgerStore;
use crate::core::unit_of_work::{UnitOfWork, WriteOp};
use crate::types::{
    Account, AccountId, AccountNumber, Customer, CustomerId, LedgerError, Transaction,
    TransactionId,
};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Thread-safe in-memory implementation of [`LedgerStore`]
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    /// Customers by id
    customers: DashMap<CustomerId, Customer>,

    /// Accounts by id
    accounts: DashMap<AccountId, Account>,

    /// Unique index on account numbers
    account_numbers: DashMap<AccountNumber, AccountId>,

    /// Append-only transaction log
    transactions: DashMap<TransactionId, Transaction>,

    /// Shared for reads, exclusive for commits
    commit_gate: RwLock<()>,
}

/// Writes queued earlier in the unit being validated
#[derive(Default)]
struct PendingState {
    customers: HashSet<CustomerId>,
    deleted_customers: HashSet<CustomerId>,
    accounts: HashSet<AccountId>,
    account_owners: HashSet<CustomerId>,
    account_numbers: HashSet<AccountNumber>,
    versions: HashMap<AccountId, u64>,
    transactions: HashSet<TransactionId>,
}

impl InMemoryLedgerStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of every account balance, read as one consistent snapshot
    pub fn total_balance(&self) -> Result<Decimal, LedgerError> {
        let _gate = self.read_gate()?;
        Ok(self
            .accounts
            .iter()
            .map(|entry| entry.value().balance)
            .sum())
    }

    /// Number of transaction records in the log
    pub fn transaction_count(&self) -> Result<usize, LedgerError> {
        let _gate = self.read_gate()?;
        Ok(self.transactions.len())
    }

    fn read_gate(&self) -> Result<RwLockReadGuard<'_, ()>, LedgerError> {
        self.commit_gate
            .read()
            .map_err(|_| LedgerError::storage_unavailable("commit gate poisoned"))
    }

    fn write_gate(&self) -> Result<RwLockWriteGuard<'_, ()>, LedgerError> {
        self.commit_gate
            .write()
            .map_err(|_| LedgerError::storage_unavailable("commit gate poisoned"))
    }

    fn customer_exists(&self, id: CustomerId, pending: &PendingState) -> bool {
        !pending.deleted_customers.contains(&id)
            && (self.customers.contains_key(&id) || pending.customers.contains(&id))
    }

    fn customer_has_account(&self, id: CustomerId, pending: &PendingState) -> bool {
        pending.account_owners.contains(&id)
            || self
                .accounts
                .iter()
                .any(|entry| entry.value().customer_id == id)
    }

    /// Check every write of the unit without mutating anything
    fn validate(&self, unit: &UnitOfWork) -> Result<(), LedgerError> {
        let mut pending = PendingState::default();

        for op in unit.ops() {
            match op {
                WriteOp::InsertCustomer(customer) => {
                    if self.customers.contains_key(&customer.id)
                        || !pending.customers.insert(customer.id)
                    {
                        return Err(LedgerError::duplicate_record("customer", customer.id));
                    }
                }
                WriteOp::UpdateCustomer(customer) => {
                    if !self.customer_exists(customer.id, &pending) {
                        return Err(LedgerError::CustomerNotFound {
                            customer: customer.id,
                        });
                    }
                }
                WriteOp::DeleteCustomer(id) => {
                    if !self.customer_exists(*id, &pending) {
                        return Err(LedgerError::CustomerNotFound { customer: *id });
                    }
                    pending.deleted_customers.insert(*id);
                }
                WriteOp::InsertAccount(account) => {
                    if self.accounts.contains_key(&account.id)
                        || pending.accounts.contains(&account.id)
                    {
                        return Err(LedgerError::duplicate_record("account", account.id));
                    }
                    if !self.customer_exists(account.customer_id, &pending) {
                        return Err(LedgerError::CustomerNotFound {
                            customer: account.customer_id,
                        });
                    }
                    if self.customer_has_account(account.customer_id, &pending) {
                        return Err(LedgerError::CustomerAlreadyHasAccount {
                            customer: account.customer_id,
                        });
                    }
                    if self.account_numbers.contains_key(&account.number)
                        || pending.account_numbers.contains(&account.number)
                    {
                        return Err(LedgerError::AccountNumberConflict {
                            account_number: account.number.to_string(),
                        });
                    }
                    pending.accounts.insert(account.id);
                    pending.account_owners.insert(account.customer_id);
                    pending.account_numbers.insert(account.number.clone());
                    pending.versions.insert(account.id, account.version);
                }
                WriteOp::UpdateAccount {
                    account,
                    expected_version,
                } => {
                    let current = match pending.versions.get(&account.id) {
                        Some(version) => *version,
                        None => self
                            .accounts
                            .get(&account.id)
                            .map(|entry| entry.value().version)
                            .ok_or(LedgerError::AccountNotFound {
                                account: account.id,
                            })?,
                    };
                    if current != *expected_version {
                        debug!(
                            account = %account.id,
                            expected = expected_version,
                            current,
                            "Version conflict"
                        );
                        return Err(LedgerError::ConcurrentModification {
                            account: account.id,
                        });
                    }
                    pending.versions.insert(account.id, account.version);
                }
                WriteOp::InsertTransaction(transaction) => {
                    if self.transactions.contains_key(&transaction.id)
                        || !pending.transactions.insert(transaction.id)
                    {
                        return Err(LedgerError::duplicate_record(
                            "transaction",
                            transaction.id,
                        ));
                    }
                    if !self.accounts.contains_key(&transaction.account_id)
                        && !pending.accounts.contains(&transaction.account_id)
                    {
                        return Err(LedgerError::AccountNotFound {
                            account: transaction.account_id,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Apply a validated unit; infallible
    fn apply(&self, unit: UnitOfWork) {
        for op in unit.into_ops() {
            match op {
                WriteOp::InsertCustomer(customer) => {
                    self.customers.insert(customer.id, customer);
                }
                WriteOp::UpdateCustomer(customer) => {
                    // Join time is immutable
                    if let Some(mut row) = self.customers.get_mut(&customer.id) {
                        row.name = customer.name;
                        row.email = customer.email;
                        row.phone = customer.phone;
                    }
                }
                WriteOp::DeleteCustomer(id) => {
                    self.customers.remove(&id);

                    let owned: Vec<(AccountId, AccountNumber)> = self
                        .accounts
                        .iter()
                        .filter(|entry| entry.value().customer_id == id)
                        .map(|entry| (entry.value().id, entry.value().number.clone()))
                        .collect();

                    for (account_id, number) in owned {
                        self.accounts.remove(&account_id);
                        self.account_numbers.remove(&number);
                        self.transactions
                            .retain(|_, txn| txn.account_id != account_id);
                    }
                }
                WriteOp::InsertAccount(account) => {
                    self.account_numbers
                        .insert(account.number.clone(), account.id);
                    self.accounts.insert(account.id, account);
                }
                WriteOp::UpdateAccount { account, .. } => {
                    // Owner and number are immutable: only balance state is copied
                    if let Some(mut row) = self.accounts.get_mut(&account.id) {
                        row.balance = account.balance;
                        row.version = account.version;
                    }
                }
                WriteOp::InsertTransaction(transaction) => {
                    self.transactions.insert(transaction.id, transaction);
                }
            }
        }
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>, LedgerError> {
        let _gate = self.read_gate()?;
        Ok(self.customers.get(&id).map(|entry| entry.value().clone()))
    }

    fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        let _gate = self.read_gate()?;
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    fn find_account_where(
        &self,
        predicate: &dyn Fn(&Account) -> bool,
    ) -> Result<Option<Account>, LedgerError> {
        let _gate = self.read_gate()?;
        Ok(self
            .accounts
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .min_by_key(|account| account.id))
    }

    fn find_transactions_where(
        &self,
        predicate: &dyn Fn(&Transaction) -> bool,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let _gate = self.read_gate()?;
        let mut matches: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by_key(|txn| (txn.created_at, txn.id));
        Ok(matches)
    }

    fn list_customers(&self) -> Result<Vec<Customer>, LedgerError> {
        let _gate = self.read_gate()?;
        let mut customers: Vec<Customer> = self
            .customers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        customers.sort_by_key(|customer| (customer.joined_at, customer.id));
        Ok(customers)
    }

    fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let _gate = self.read_gate()?;
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(accounts)
    }

    fn commit(&self, unit: UnitOfWork) -> Result<(), LedgerError> {
        let _gate = self.write_gate()?;
        self.validate(&unit)?;

        let writes = unit.len();
        self.apply(unit);
        debug!(writes, "Committed unit of work");

        Ok(())
    }

    fn find_account_by_number(
        &self,
        number: &AccountNumber,
    ) -> Result<Option<Account>, LedgerError> {
        let _gate = self.read_gate()?;
        Ok(self
            .account_numbers
            .get(number)
            .and_then(|id| self.accounts.get(id.value()).map(|entry| entry.value().clone())))
    }
}
