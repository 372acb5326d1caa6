//! Unit of work
//!
//! A `UnitOfWork` is the ordered set of writes that must commit or roll back
//! together: the balance updates of every touched account plus the transaction
//! records that explain them.

use crate::types::{Account, AccountId, Customer, CustomerId, Transaction};

/// A single write inside a unit of work
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert a newly registered customer
    InsertCustomer(Customer),

    /// Replace a customer's contact details; identity and join time are kept
    UpdateCustomer(Customer),

    /// Delete a customer, cascading to its account and that account's transactions
    DeleteCustomer(CustomerId),

    /// Insert a newly opened account
    InsertAccount(Account),

    /// Replace an account's state if it is still at `expected_version`
    ///
    /// `account.version` already holds the version the row will have after commit.
    UpdateAccount {
        account: Account,
        expected_version: u64,
    },

    /// Append an immutable transaction record
    InsertTransaction(Transaction),
}

/// Ordered set of writes applied atomically by a `LedgerStore`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOfWork {
    ops: Vec<WriteOp>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_customer(&mut self, customer: Customer) {
        self.ops.push(WriteOp::InsertCustomer(customer));
    }

    pub fn update_customer(&mut self, customer: Customer) {
        self.ops.push(WriteOp::UpdateCustomer(customer));
    }

    pub fn delete_customer(&mut self, customer_id: CustomerId) {
        self.ops.push(WriteOp::DeleteCustomer(customer_id));
    }

    pub fn insert_account(&mut self, account: Account) {
        self.ops.push(WriteOp::InsertAccount(account));
    }

    /// Queue an update of an account that was read at `account.version`
    ///
    /// The queued row carries the next version; the store rejects the whole unit
    /// if the stored row moved past the version that was read.
    pub fn update_account(&mut self, account: &Account) {
        let expected_version = account.version;
        let mut next = account.clone();
        next.version = expected_version + 1;
        self.ops.push(WriteOp::UpdateAccount {
            account: next,
            expected_version,
        });
    }

    pub fn insert_transaction(&mut self, transaction: Transaction) {
        self.ops.push(WriteOp::InsertTransaction(transaction));
    }

    /// The queued writes, in order
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Ids of every account this unit updates
    pub fn updated_accounts(&self) -> Vec<AccountId> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                WriteOp::UpdateAccount { account, .. } => Some(account.id),
                _ => None,
            })
            .collect()
    }
}
