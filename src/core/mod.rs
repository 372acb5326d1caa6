//! Core business logic module
//!
//! This module contains the ledger engine components:
//! - `traits` - Storage and account-number seams
//! - `unit_of_work` - Ordered write sets committed atomically
//! - `store` - Thread-safe in-memory storage collaborator
//! - `account_number` - Random and sequential account number generators
//! - `ledger` - Balance rules for a single account
//! - `recorder` - Immutable transaction records
//! - `coordinator` - Atomic deposits, withdrawals, transfers and openings
//! - `reconciler` - Counterparty labels for transaction history
//! - `bank` - Façade wiring the components together
//! - `config` - Engine tunables

pub mod account_number;
pub mod bank;
pub mod config;
pub mod coordinator;
pub mod ledger;
pub mod reconciler;
pub mod recorder;
pub mod store;
pub mod traits;
pub mod unit_of_work;

pub use account_number::{RandomAccountNumberGenerator, SequentialAccountNumberGenerator};
pub use bank::{BalanceMismatch, Bank, CustomerStatement};
pub use config::LedgerConfig;
pub use coordinator::{validate_transfer_form, OpenedAccount, TransferCoordinator, TransferReceipt};
pub use ledger::{balance_from_history, validate_amount, AccountLedger, MINIMUM_OPENING_BALANCE};
pub use reconciler::{Counterparty, HistoryEntry, TransactionHistoryReconciler};
pub use recorder::{TransactionRecorder, TransferLegs};
pub use store::InMemoryLedgerStore;
pub use traits::{AccountNumberGenerator, LedgerStore};
pub use unit_of_work::{UnitOfWork, WriteOp};
