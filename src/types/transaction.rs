//! Transaction-related types for the retail ledger
//!
//! This module defines the immutable transaction records that make up each
//! account's append-only history.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// Transaction identifier
pub type TransactionId = Uuid;

/// Identifier shared by the two legs of one transfer
pub type TransferGroupId = Uuid;

/// Kinds of money movement recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Funds credited to the owning account
    Deposit,

    /// Funds debited from the owning account
    Withdrawal,

    /// One leg of a transfer between two accounts
    ///
    /// The debit leg carries `destination_account_id`; the credit leg does not.
    Transfer,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Transfer => "transfer",
        };
        f.write_str(name)
    }
}

/// An immutable transaction record
///
/// Records are created by the `TransactionRecorder` and never updated or
/// deleted by normal operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Transaction identity
    pub id: TransactionId,

    /// Owning account
    pub account_id: AccountId,

    /// Kind of movement
    pub tx_type: TransactionType,

    /// Strictly positive amount with at most two decimal places
    pub amount: Decimal,

    /// Time the record was created
    pub created_at: DateTime<Utc>,

    /// Receiving account, present only on the debit leg of a transfer
    pub destination_account_id: Option<AccountId>,

    /// Transfer group shared by both legs of a transfer
    ///
    /// Absent on deposits and withdrawals, and on transfer legs recorded
    /// before groups existed. Those legs are paired heuristically.
    pub transfer_group: Option<TransferGroupId>,
}

impl Transaction {
    /// Whether this is the outgoing leg of a transfer
    pub fn is_debit_leg(&self) -> bool {
        self.tx_type == TransactionType::Transfer && self.destination_account_id.is_some()
    }

    /// Whether this is the incoming leg of a transfer
    pub fn is_credit_leg(&self) -> bool {
        self.tx_type == TransactionType::Transfer && self.destination_account_id.is_none()
    }

    /// Signed effect of this record on the owning account's balance
    pub fn signed_amount(&self) -> Decimal {
        match self.tx_type {
            TransactionType::Deposit => self.amount,
            TransactionType::Withdrawal => -self.amount,
            TransactionType::Transfer if self.is_debit_leg() => -self.amount,
            TransactionType::Transfer => self.amount,
        }
    }
}
