//! Money movement orchestration
//!
//! The `TransferCoordinator` turns a request into one unit of work:
//!
//! ```text
//! read accounts ─► AccountLedger (credit/debit) ─► TransactionRecorder ─► LedgerStore::commit
//!       ▲                                                                        │
//!       └──────────────── ConcurrentModification: re-read and retry ◄────────────┘
//! ```
//!
//! Balance updates and the records that explain them always travel in the same
//! unit, so they commit together or not at all. A version conflict discards the
//! whole unit and the request is replayed from fresh reads, up to
//! `max_retries` times.

use crate::core::config::LedgerConfig;
use crate::core::ledger::{validate_amount, AccountLedger};
use crate::core::recorder::TransactionRecorder;
use crate::core::traits::{AccountNumberGenerator, LedgerStore};
use crate::core::unit_of_work::UnitOfWork;
use crate::types::{
    Account, AccountId, AccountNumber, CustomerId, LedgerError, Transaction, TransactionType,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of a completed transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    /// Outgoing leg recorded on the source account
    pub debit_leg: Transaction,

    /// Incoming leg recorded on the destination account
    pub credit_leg: Transaction,
}

/// A freshly opened account and its opening deposit
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedAccount {
    pub account: Account,
    pub opening_deposit: Transaction,
}

/// Check the input-only rules of a transfer request
///
/// Unlike [`TransferCoordinator::transfer`], which stops at the first
/// violation, this reports every problem at once so a form can flag each
/// field. An empty vector means the request is well formed.
pub fn validate_transfer_form(amount: Decimal, destination_number: &str) -> Vec<LedgerError> {
    let mut errors = Vec::new();
    if let Err(error) = validate_amount(amount) {
        errors.push(error);
    }
    if let Err(error) = AccountNumber::parse(destination_number) {
        errors.push(error);
    }
    errors
}

/// Runs deposits, withdrawals, transfers and account openings as atomic units
pub struct TransferCoordinator {
    store: Arc<dyn LedgerStore>,
    recorder: TransactionRecorder,
    max_retries: u32,
}

impl TransferCoordinator {
    /// Create a coordinator over a shared store
    ///
    /// # Arguments
    ///
    /// * `store` - Storage collaborator shared with other handlers
    /// * `config` - Retry policy
    pub fn new(store: Arc<dyn LedgerStore>, config: &LedgerConfig) -> Self {
        Self {
            store,
            recorder: TransactionRecorder::new(),
            max_retries: config.max_retries,
        }
    }

    /// Move funds from one account to another
    ///
    /// Validation order, first violation wins:
    ///
    /// 1. `InvalidAmount`
    /// 2. `InvalidAccountNumberFormat`
    /// 3. `SourceAccountNotFound`
    /// 4. `DestinationAccountNotFound`
    /// 5. `SelfTransferNotAllowed`
    /// 6. `InsufficientFunds`
    ///
    /// Both balance updates and both legs commit as one unit.
    ///
    /// # Arguments
    ///
    /// * `source_id` - Account being debited
    /// * `destination_number` - Account number of the account being credited
    /// * `amount` - Amount to move
    ///
    /// # Returns
    ///
    /// * `Ok(TransferReceipt)` - Both legs as recorded
    /// * `Err(LedgerError)` - Nothing was changed
    pub fn transfer(
        &self,
        source_id: AccountId,
        destination_number: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        validate_amount(amount)?;
        let destination_number = AccountNumber::parse(destination_number)?;

        let receipt = self.with_retries("transfer", || {
            self.try_transfer(source_id, &destination_number, amount)
        })?;

        debug!(
            source = %source_id,
            destination = %destination_number,
            %amount,
            "Transfer committed"
        );
        Ok(receipt)
    }

    /// Credit an account and record a Deposit
    pub fn deposit(&self, account_id: AccountId, amount: Decimal) -> Result<Transaction, LedgerError> {
        validate_amount(amount)?;

        let transaction = self.with_retries("deposit", || {
            let mut ledger = AccountLedger::load(self.load_account(account_id)?);
            ledger.credit(amount)?;
            self.commit_single(ledger.account(), TransactionType::Deposit, amount)
        })?;

        debug!(account = %account_id, %amount, "Deposit committed");
        Ok(transaction)
    }

    /// Debit an account and record a Withdrawal
    pub fn withdraw(&self, account_id: AccountId, amount: Decimal) -> Result<Transaction, LedgerError> {
        validate_amount(amount)?;

        let transaction = self.with_retries("withdraw", || {
            let mut ledger = AccountLedger::load(self.load_account(account_id)?);
            ledger.debit(amount)?;
            self.commit_single(ledger.account(), TransactionType::Withdrawal, amount)
        })?;

        debug!(account = %account_id, %amount, "Withdrawal committed");
        Ok(transaction)
    }

    /// Open the single account of a customer with an opening deposit
    ///
    /// The account insert and the opening Deposit record commit together, so
    /// the new balance is fully explained by the account's history.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount`, `BelowMinimumOpeningBalance`
    /// - `CustomerNotFound`, `CustomerAlreadyHasAccount`
    /// - `AccountNumberConflict` if the generated number is taken
    pub fn open_account(
        &self,
        customer_id: CustomerId,
        initial_balance: Decimal,
        generator: &dyn AccountNumberGenerator,
    ) -> Result<OpenedAccount, LedgerError> {
        if self.store.find_customer(customer_id)?.is_none() {
            return Err(LedgerError::CustomerNotFound {
                customer: customer_id,
            });
        }
        if self.store.find_account_for_customer(customer_id)?.is_some() {
            return Err(LedgerError::CustomerAlreadyHasAccount {
                customer: customer_id,
            });
        }

        let account = AccountLedger::open(customer_id, initial_balance, generator)?.into_account();

        let mut unit = UnitOfWork::new();
        unit.insert_account(account.clone());
        let opening_deposit = self.recorder.record(
            &mut unit,
            account.id,
            TransactionType::Deposit,
            initial_balance,
            None,
        );
        self.store.commit(unit)?;

        Ok(OpenedAccount {
            account,
            opening_deposit,
        })
    }

    fn try_transfer(
        &self,
        source_id: AccountId,
        destination_number: &AccountNumber,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        let source = self
            .store
            .find_account(source_id)?
            .ok_or(LedgerError::SourceAccountNotFound { account: source_id })?;
        let destination = self
            .store
            .find_account_by_number(destination_number)?
            .ok_or_else(|| LedgerError::destination_not_found(destination_number.as_str()))?;

        if source.id == destination.id {
            return Err(LedgerError::self_transfer(destination_number.as_str()));
        }

        let mut source_ledger = AccountLedger::load(source);
        let mut destination_ledger = AccountLedger::load(destination);
        source_ledger.debit(amount)?;
        destination_ledger.credit(amount)?;

        let mut unit = UnitOfWork::new();
        unit.update_account(source_ledger.account());
        unit.update_account(destination_ledger.account());
        let legs = self.recorder.record_transfer(
            &mut unit,
            source_ledger.account().id,
            destination_ledger.account().id,
            amount,
        );
        self.store.commit(unit)?;

        Ok(TransferReceipt {
            debit_leg: legs.debit,
            credit_leg: legs.credit,
        })
    }

    fn load_account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.store
            .find_account(account_id)?
            .ok_or(LedgerError::AccountNotFound {
                account: account_id,
            })
    }

    /// Commit one account update with its single record
    fn commit_single(
        &self,
        account: &Account,
        tx_type: TransactionType,
        amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        let mut unit = UnitOfWork::new();
        unit.update_account(account);
        let transaction = self
            .recorder
            .record(&mut unit, account.id, tx_type, amount, None);
        self.store.commit(unit)?;
        Ok(transaction)
    }

    /// Run `attempt` until it succeeds, fails for a non-retryable reason, or
    /// has conflicted `max_retries` extra times
    fn with_retries<T>(
        &self,
        operation: &str,
        mut attempt: impl FnMut() -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut retries = 0;
        loop {
            match attempt() {
                Err(error) if error.is_retryable() => {
                    if retries >= self.max_retries {
                        warn!(operation, retries, %error, "Giving up after version conflicts");
                        return Err(error);
                    }
                    retries += 1;
                    debug!(operation, retries, %error, "Version conflict, retrying");
                    std::thread::yield_now();
                }
                outcome => return outcome,
            }
        }
    }
}
