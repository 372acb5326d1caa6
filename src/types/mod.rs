//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account entity and identifiers
//! - `account_number`: Validated 12-character account numbers
//! - `customer`: Customer entity and registration rules
//! - `transaction`: Transaction records and identifiers
//! - `operation`: Operation script records for the CLI driver
//! - `error`: Error types for the ledger engine

pub mod account;
pub mod account_number;
pub mod customer;
pub mod error;
pub mod operation;
pub mod transaction;

pub use account::{Account, AccountId};
pub use account_number::AccountNumber;
pub use customer::{Customer, CustomerId, NewCustomer};
pub use error::{LedgerError, SessionError};
pub use operation::{CustomerKey, OperationKind, OperationRecord, TransferTarget};
pub use transaction::{Transaction, TransactionId, TransactionType, TransferGroupId};
