//! Error types for the retail ledger
//!
//! This module defines every error the ledger engine can report to its callers.
//! Each variant maps to exactly one human-readable message through `Display`,
//! so presentation layers never need to format errors themselves.
//!
//! # Error Categories
//!
//! - **Validation Errors**: Bad amounts, malformed account numbers, invalid customer fields
//! - **Business Rule Errors**: Insufficient funds, self transfers, minimum opening balance
//! - **Lookup Errors**: Missing source/destination accounts, customers or accounts
//! - **Concurrency Errors**: Optimistic version conflicts that survived every retry
//! - **Storage Errors**: Durable-commit infrastructure failures and constraint violations

use super::account::AccountId;
use super::customer::CustomerId;
use super::operation::CustomerKey;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger engine
///
/// All expected business-rule violations are returned as values of this type.
/// No panics cross the core boundary for insufficient funds, bad formats or
/// missing records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Amount is zero, negative, or has more than two decimal places
    #[error("Invalid amount {amount}: must be positive with at most two decimal places")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Initial balance is below the minimum required to open an account
    #[error("Initial balance {amount} is below the minimum opening balance of {minimum}")]
    BelowMinimumOpeningBalance {
        /// The requested opening balance
        amount: Decimal,
        /// The minimum opening balance policy
        minimum: Decimal,
    },

    /// Debit would take the balance below zero
    #[error("Insufficient funds in account {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Account being debited
        account: AccountId,
        /// Balance at the time of the check
        available: Decimal,
        /// Requested debit amount
        requested: Decimal,
    },

    /// Account number is not `B` followed by 11 digits
    #[error("Invalid account number '{value}': expected 'B' followed by 11 digits")]
    InvalidAccountNumberFormat {
        /// The rejected input
        value: String,
    },

    /// Transfer source account does not exist
    #[error("Source account {account} not found")]
    SourceAccountNotFound {
        /// Requested source account id
        account: AccountId,
    },

    /// No account carries the transfer destination number
    #[error("Destination account {account_number} not found")]
    DestinationAccountNotFound {
        /// Requested destination account number
        account_number: String,
    },

    /// Transfer source and destination are the same account
    #[error("Cannot transfer from account {account_number} to itself")]
    SelfTransferNotAllowed {
        /// Account number of the account on both sides
        account_number: String,
    },

    /// Account was modified by another writer between read and commit
    ///
    /// Retried internally by the coordinator; only surfaced once retries are exhausted.
    #[error("Account {account} was modified concurrently, please retry")]
    ConcurrentModification {
        /// Account whose version check failed
        account: AccountId,
    },

    /// Durable storage could not complete the unit of work
    ///
    /// Fatal to the operation. Nothing from the unit of work was applied.
    #[error("Storage unavailable: {reason}")]
    StorageUnavailable {
        /// Description of the infrastructure failure
        reason: String,
    },

    /// Account does not exist (deposit, withdrawal and lookups)
    #[error("Account {account} not found")]
    AccountNotFound {
        /// Requested account id
        account: AccountId,
    },

    /// Customer does not exist
    #[error("Customer {customer} not found")]
    CustomerNotFound {
        /// Requested customer id
        customer: CustomerId,
    },

    /// Customer already owns an account
    #[error("Customer {customer} already has an account")]
    CustomerAlreadyHasAccount {
        /// Customer id
        customer: CustomerId,
    },

    /// Generated account number collided with an existing account
    #[error("Account number {account_number} is already in use")]
    AccountNumberConflict {
        /// The colliding account number
        account_number: String,
    },

    /// A customer registration field failed validation
    #[error("Invalid {field}: {reason}")]
    InvalidCustomerField {
        /// Name of the rejected field
        field: String,
        /// Why the field was rejected
        reason: String,
    },

    /// Balance arithmetic would overflow
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account id
        account: AccountId,
    },

    /// Insert of a record whose identity already exists
    #[error("Duplicate {entity} record {id}")]
    DuplicateRecord {
        /// Entity kind (customer, account, transaction)
        entity: String,
        /// Conflicting identity
        id: String,
    },
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account,
            available,
            requested,
        }
    }

    /// Create an InvalidAccountNumberFormat error
    pub fn invalid_account_number(value: &str) -> Self {
        LedgerError::InvalidAccountNumberFormat {
            value: value.to_string(),
        }
    }

    /// Create a DestinationAccountNotFound error
    pub fn destination_not_found(account_number: &str) -> Self {
        LedgerError::DestinationAccountNotFound {
            account_number: account_number.to_string(),
        }
    }

    /// Create a SelfTransferNotAllowed error
    pub fn self_transfer(account_number: &str) -> Self {
        LedgerError::SelfTransferNotAllowed {
            account_number: account_number.to_string(),
        }
    }

    /// Create a StorageUnavailable error
    pub fn storage_unavailable(reason: impl Into<String>) -> Self {
        LedgerError::StorageUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an InvalidCustomerField error
    pub fn invalid_customer_field(field: &str, reason: &str) -> Self {
        LedgerError::InvalidCustomerField {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Create a DuplicateRecord error
    pub fn duplicate_record(entity: &str, id: impl ToString) -> Self {
        LedgerError::DuplicateRecord {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Whether the whole unit of work may succeed if re-read and retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::ConcurrentModification { .. })
    }

    /// Whether this is an expected, caller-facing rule violation rather than
    /// an infrastructure or concurrency failure
    pub fn is_business_rule(&self) -> bool {
        !matches!(
            self,
            LedgerError::ConcurrentModification { .. }
                | LedgerError::StorageUnavailable { .. }
                | LedgerError::DuplicateRecord { .. }
        )
    }
}

/// Errors raised while replaying an operation script
///
/// Wraps engine errors and adds the failures that only exist at the script
/// level, where customers are referenced by numeric keys.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The engine rejected the operation
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// No customer was registered under this key
    #[error("Unknown customer key {0}")]
    UnknownCustomer(CustomerKey),

    /// A customer is already registered under this key
    #[error("Customer key {0} is already registered")]
    DuplicateCustomer(CustomerKey),

    /// The customer has not opened an account yet
    #[error("Customer key {0} has no account")]
    NoAccount(CustomerKey),

    /// A field the operation needs was not supplied
    #[error("{operation} for customer key {customer} requires {field}")]
    MissingField {
        /// Operation name as written in the script
        operation: String,
        /// Customer key of the row
        customer: CustomerKey,
        /// Name of the missing column
        field: String,
    },
}

impl SessionError {
    /// Create a MissingField error
    pub fn missing_field(operation: &str, customer: CustomerKey, field: &str) -> Self {
        SessionError::MissingField {
            operation: operation.to_string(),
            customer,
            field: field.to_string(),
        }
    }
}
