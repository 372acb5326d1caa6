//! Retail Ledger Library
//! # Overview
//!
//! This library provides the ledger engine of a small retail bank: customers
//! hold at most one account, and accounts support deposits, withdrawals and
//! transfers recorded in an append-only transaction log.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Customer, Account, Transaction, errors)
//! - [`core`] - Ledger engine:
//!   - [`core::store`] - Thread-safe in-memory storage with atomic commits
//!   - [`core::coordinator`] - Atomic deposits, withdrawals and transfers with retry
//!   - [`core::reconciler`] - Counterparty labels for transaction history
//!   - [`core::bank`] - Façade used by presentation layers
//! - [`io`] - Operation script parsing and CSV reports
//! - [`strategy`] - Sequential and concurrent script replay
//! - [`cli`] - CLI arguments parsing
//! - [`telemetry`] - Tracing initialization
//!
//! # Guarantees
//!
//! - Every balance is non-negative after every completed operation
//! - Every balance equals the sum of its account's transaction records
//! - Both legs of a transfer, and both balance updates, commit together or not at all
//! - Concurrent writers to the same account are serialised by optimistic version checks
//!
//! # Example
//!
//! ```
//! use retail_ledger::core::{Bank, LedgerConfig};
//! use retail_ledger::types::NewCustomer;
//! use rust_decimal::Decimal;
//!
//! let bank = Bank::in_memory(LedgerConfig::default());
//! let alice = bank
//!     .register_customer(NewCustomer::new("Alice", "alice@example.com", None))
//!     .unwrap();
//! let bob = bank
//!     .register_customer(NewCustomer::new("Bob", "bob@example.com", None))
//!     .unwrap();
//! let a = bank.open_account(alice.id, Decimal::new(100_00, 2)).unwrap().account;
//! let b = bank.open_account(bob.id, Decimal::new(10_00, 2)).unwrap().account;
//!
//! bank.transfer(a.id, b.number.as_str(), Decimal::new(50_00, 2)).unwrap();
//!
//! assert_eq!(bank.account(b.id).unwrap().balance, Decimal::new(60_00, 2));
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod telemetry;
pub mod types;

pub use core::{Bank, InMemoryLedgerStore, LedgerConfig, LedgerStore, TransferCoordinator};
pub use io::{write_accounts_report, write_history_report};
pub use types::{
    Account, AccountId, AccountNumber, Customer, CustomerId, LedgerError, NewCustomer,
    SessionError, Transaction, TransactionId, TransactionType,
};
