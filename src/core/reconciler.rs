//! Transfer counterparty reconstruction
//!
//! A transfer is stored as two unrelated-looking rows: the debit leg on the
//! source account (which names its destination) and the credit leg on the
//! destination account (which names nothing). For reporting, the
//! `TransactionHistoryReconciler` labels every record of an account with its
//! counterparty:
//!
//! | Record                  | Label                 |
//! |-------------------------|-----------------------|
//! | Debit leg               | `To: {destination}`   |
//! | Credit leg, paired      | `From: {source}`      |
//! | Credit leg, unpaired    | `-`                   |
//! | Deposit / Withdrawal    | `-`                   |
//!
//! # Pairing
//!
//! Credit legs recorded by this engine share a transfer group id with their
//! debit leg and are joined on it exactly. Legs without a group (or whose
//! partner is gone) fall back to a heuristic: a debit leg towards this
//! account, for the same amount, within the match window. Among several
//! candidates the earliest `(created_at, id)` wins and an ambiguity warning is
//! logged; concurrent identical transfers inside the window can be mispaired.

use crate::core::config::LedgerConfig;
use crate::types::{AccountId, AccountNumber, Transaction, TransactionType};
use chrono::Duration;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Counterparty of a transaction as shown in history reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Counterparty {
    /// Outgoing transfer to this account
    To(AccountNumber),

    /// Incoming transfer from this account
    From(AccountNumber),

    /// Not a transfer, or the other leg could not be found
    Unknown,
}

impl fmt::Display for Counterparty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counterparty::To(number) => write!(f, "To: {}", number),
            Counterparty::From(number) => write!(f, "From: {}", number),
            Counterparty::Unknown => f.write_str("-"),
        }
    }
}

/// A transaction with its reconstructed counterparty
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub transaction: Transaction,
    pub counterparty: Counterparty,
}

/// Labels transfer legs with their counterparty account number
#[derive(Debug, Clone)]
pub struct TransactionHistoryReconciler {
    window: Duration,
}

impl Default for TransactionHistoryReconciler {
    fn default() -> Self {
        Self::from_config(&LedgerConfig::default())
    }
}

impl TransactionHistoryReconciler {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.match_window)
    }

    /// Annotate the records of one account
    ///
    /// # Arguments
    ///
    /// * `account_transactions` - Records to label, in display order
    /// * `all_transactions` - Every record that may hold a partner leg
    /// * `numbers` - Account number of every account that may appear as a counterparty
    ///
    /// # Returns
    ///
    /// One entry per input record, in the same order
    pub fn annotate(
        &self,
        account_transactions: &[Transaction],
        all_transactions: &[Transaction],
        numbers: &HashMap<AccountId, AccountNumber>,
    ) -> Vec<HistoryEntry> {
        account_transactions
            .iter()
            .map(|txn| HistoryEntry {
                transaction: txn.clone(),
                counterparty: self.counterparty(txn, all_transactions, numbers),
            })
            .collect()
    }

    /// Counterparty of a single record
    pub fn counterparty(
        &self,
        transaction: &Transaction,
        all_transactions: &[Transaction],
        numbers: &HashMap<AccountId, AccountNumber>,
    ) -> Counterparty {
        if transaction.tx_type != TransactionType::Transfer {
            return Counterparty::Unknown;
        }

        if let Some(destination) = transaction.destination_account_id {
            return numbers
                .get(&destination)
                .cloned()
                .map_or(Counterparty::Unknown, Counterparty::To);
        }

        self.find_debit_leg(transaction, all_transactions)
            .and_then(|debit| numbers.get(&debit.account_id).cloned())
            .map_or(Counterparty::Unknown, Counterparty::From)
    }

    /// Find the debit leg that produced `credit`
    fn find_debit_leg<'a>(
        &self,
        credit: &Transaction,
        all_transactions: &'a [Transaction],
    ) -> Option<&'a Transaction> {
        let towards_this_account = |candidate: &&Transaction| {
            candidate.is_debit_leg() && candidate.destination_account_id == Some(credit.account_id)
        };

        if let Some(group) = credit.transfer_group {
            let joined = all_transactions
                .iter()
                .filter(towards_this_account)
                .find(|candidate| candidate.transfer_group == Some(group));
            if joined.is_some() {
                return joined;
            }
        }

        // A debit leg carrying some other group already has its own partner
        let mut candidates: Vec<&Transaction> = all_transactions
            .iter()
            .filter(towards_this_account)
            .filter(|candidate| {
                candidate.transfer_group.is_none()
                    || candidate.transfer_group == credit.transfer_group
            })
            .filter(|candidate| candidate.amount == credit.amount)
            .filter(|candidate| (candidate.created_at - credit.created_at).abs() <= self.window)
            .collect();

        candidates.sort_by_key(|candidate| (candidate.created_at, candidate.id));

        if candidates.len() > 1 {
            warn!(
                transaction = %credit.id,
                account = %credit.account_id,
                candidates = candidates.len(),
                "Ambiguous transfer pairing, using earliest candidate"
            );
        }

        candidates.first().copied()
    }
}
