//! Account balance rules
//!
//! `AccountLedger` wraps the snapshot of one account read from the store and
//! applies credits and debits to it with the balance invariants enforced:
//!
//! - every amount is strictly positive with at most two decimal places
//! - a debit never takes the balance below zero
//! - an account is opened with at least [`MINIMUM_OPENING_BALANCE`]
//!
//! The ledger only mutates the in-memory snapshot. The snapshot's `version`
//! travels with it, so the store can reject the commit if another writer got
//! there first.

use crate::core::traits::AccountNumberGenerator;
use crate::types::{Account, AccountId, CustomerId, LedgerError, Transaction};
use rust_decimal::Decimal;

/// Smallest initial balance accepted when opening an account
pub const MINIMUM_OPENING_BALANCE: Decimal = Decimal::from_parts(1000, 0, 0, false, 2);

/// Number of decimal places money amounts may carry
pub const MONEY_SCALE: u32 = 2;

/// Validate a money amount
///
/// # Errors
///
/// Returns `InvalidAmount` if the amount is zero, negative, or has more than
/// two significant decimal places (`10.500` is accepted, `10.005` is not).
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO || amount.normalize().scale() > MONEY_SCALE {
        return Err(LedgerError::invalid_amount(amount));
    }
    Ok(())
}

/// Recompute an account's balance from its transaction records
///
/// Credits (deposits, incoming transfer legs) add; debits (withdrawals,
/// outgoing transfer legs) subtract. Records owned by other accounts are
/// ignored.
pub fn balance_from_history(account_id: AccountId, transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|txn| txn.account_id == account_id)
        .map(Transaction::signed_amount)
        .sum()
}

/// Balance state of a single account
#[derive(Debug, Clone, PartialEq)]
pub struct AccountLedger {
    account: Account,
}

impl AccountLedger {
    /// Wrap an account snapshot read from the store
    pub fn load(account: Account) -> Self {
        Self { account }
    }

    /// Open a new account for a customer
    ///
    /// Checks the minimum opening balance first, so zero and negative
    /// balances report `BelowMinimumOpeningBalance`. Then checks the scale
    /// and assigns the account number exactly once from `generator`.
    ///
    /// # Arguments
    ///
    /// * `customer_id` - Owner of the new account
    /// * `initial_balance` - Opening deposit
    /// * `generator` - Source of the account number
    ///
    /// # Returns
    ///
    /// * `Ok(AccountLedger)` - Ledger over the unsaved account at version 0
    /// * `Err(LedgerError)` - `InvalidAmount` or `BelowMinimumOpeningBalance`
    pub fn open(
        customer_id: CustomerId,
        initial_balance: Decimal,
        generator: &dyn AccountNumberGenerator,
    ) -> Result<Self, LedgerError> {
        if initial_balance < MINIMUM_OPENING_BALANCE {
            return Err(LedgerError::BelowMinimumOpeningBalance {
                amount: initial_balance,
                minimum: MINIMUM_OPENING_BALANCE,
            });
        }
        validate_amount(initial_balance)?;

        let mut account = Account::new(customer_id, generator.generate());
        account.balance = initial_balance;
        Ok(Self { account })
    }

    /// Add funds
    ///
    /// # Errors
    ///
    /// `InvalidAmount` for a bad amount, `ArithmeticOverflow` if the balance
    /// cannot hold the result.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        validate_amount(amount)?;

        self.account.balance = self
            .account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("credit", self.account.id))?;
        Ok(())
    }

    /// Remove funds
    ///
    /// The sufficiency check and the subtraction read the same snapshot.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` for a bad amount, `InsufficientFunds` if the amount
    /// exceeds the balance.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        validate_amount(amount)?;
        self.ensure_funds(amount)?;

        self.account.balance = self
            .account
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("debit", self.account.id))?;
        Ok(())
    }

    /// Check the balance covers `amount` without mutating
    pub fn ensure_funds(&self, amount: Decimal) -> Result<(), LedgerError> {
        if amount > self.account.balance {
            return Err(LedgerError::insufficient_funds(
                self.account.id,
                self.account.balance,
                amount,
            ));
        }
        Ok(())
    }

    pub fn balance(&self) -> Decimal {
        self.account.balance
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn into_account(self) -> Account {
        self.account
    }
}
