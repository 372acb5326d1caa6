//! Transaction recorder
//!
//! Builds immutable transaction records and queues their inserts on a unit of
//! work. A record becomes durable only when that unit commits.
//!
//! Timestamps are assigned here, never by callers. Each recorder hands out
//! strictly increasing timestamps, so records it produces have a total order
//! even when the wall clock stalls or steps backwards.

use crate::core::unit_of_work::UnitOfWork;
use crate::types::{AccountId, Transaction, TransactionType, TransferGroupId};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Mutex;
use uuid::Uuid;

/// Both legs of a recorded transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferLegs {
    /// Outgoing leg on the source account; carries the destination id
    pub debit: Transaction,

    /// Incoming leg on the destination account
    pub credit: Transaction,
}

/// Appends transaction records to units of work
#[derive(Debug, Default)]
pub struct TransactionRecorder {
    last_timestamp: Mutex<Option<DateTime<Utc>>>,
}

impl TransactionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single transaction
    ///
    /// # Arguments
    ///
    /// * `unit` - Unit of work the insert is queued on
    /// * `account_id` - Owning account
    /// * `tx_type` - Deposit, Withdrawal or Transfer
    /// * `amount` - Positive amount; the sign comes from the type and direction
    /// * `destination_account_id` - Set only on the debit leg of a transfer
    ///
    /// # Returns
    ///
    /// The record as it will be stored
    pub fn record(
        &self,
        unit: &mut UnitOfWork,
        account_id: AccountId,
        tx_type: TransactionType,
        amount: Decimal,
        destination_account_id: Option<AccountId>,
    ) -> Transaction {
        self.append(unit, account_id, tx_type, amount, destination_account_id, None)
    }

    /// Record both legs of a transfer under one fresh transfer group
    ///
    /// The debit leg is recorded first, so it never sorts after its credit leg.
    pub fn record_transfer(
        &self,
        unit: &mut UnitOfWork,
        source_id: AccountId,
        destination_id: AccountId,
        amount: Decimal,
    ) -> TransferLegs {
        let group: TransferGroupId = Uuid::now_v7();

        let debit = self.append(
            unit,
            source_id,
            TransactionType::Transfer,
            amount,
            Some(destination_id),
            Some(group),
        );
        let credit = self.append(
            unit,
            destination_id,
            TransactionType::Transfer,
            amount,
            None,
            Some(group),
        );

        TransferLegs { debit, credit }
    }

    fn append(
        &self,
        unit: &mut UnitOfWork,
        account_id: AccountId,
        tx_type: TransactionType,
        amount: Decimal,
        destination_account_id: Option<AccountId>,
        transfer_group: Option<TransferGroupId>,
    ) -> Transaction {
        let transaction = Transaction {
            id: Uuid::now_v7(),
            account_id,
            tx_type,
            amount,
            created_at: self.next_timestamp(),
            destination_account_id,
            transfer_group,
        };
        unit.insert_transaction(transaction.clone());
        transaction
    }

    /// Current time, bumped past the previous timestamp if needed
    fn next_timestamp(&self) -> DateTime<Utc> {
        // A panicking holder cannot leave the Option half-written
        let mut last = self
            .last_timestamp
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = Utc::now();
        let next = match *last {
            Some(previous) if now <= previous => previous + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}
