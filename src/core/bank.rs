//! Banking façade
//!
//! `Bank` wires the storage collaborator, the account number generator, the
//! transfer coordinator and the history reconciler together behind one entry
//! point. Presentation layers talk to a `Bank`; they never touch the store.
//!
//! # Architecture
//!
//! ```text
//! Bank
//!     ├── Arc<dyn LedgerStore>             (shared storage collaborator)
//!     ├── Arc<dyn AccountNumberGenerator>  (new account numbers)
//!     ├── TransferCoordinator              (atomic money movements)
//!     └── TransactionHistoryReconciler     (counterparty labels)
//! ```
//!
//! `Bank` is `Send + Sync`; share it behind an `Arc` between request handlers.

use crate::core::account_number::RandomAccountNumberGenerator;
use crate::core::config::LedgerConfig;
use crate::core::coordinator::{OpenedAccount, TransferCoordinator, TransferReceipt};
use crate::core::ledger::balance_from_history;
use crate::core::reconciler::{HistoryEntry, TransactionHistoryReconciler};
use crate::core::store::InMemoryLedgerStore;
use crate::core::traits::{AccountNumberGenerator, LedgerStore};
use crate::core::unit_of_work::UnitOfWork;
use crate::types::{
    Account, AccountId, AccountNumber, Customer, CustomerId, LedgerError, NewCustomer, Transaction,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// A customer with their account and its annotated history
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerStatement {
    pub customer: Customer,

    /// `None` until the customer opens an account
    pub account: Option<Account>,

    /// Records of the account, oldest first
    pub history: Vec<HistoryEntry>,
}

/// An account whose balance disagrees with its transaction records
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceMismatch {
    pub account_id: AccountId,
    pub account_number: AccountNumber,
    pub balance: Decimal,
    pub from_history: Decimal,
}

/// Entry point of the ledger engine
pub struct Bank {
    store: Arc<dyn LedgerStore>,
    generator: Arc<dyn AccountNumberGenerator>,
    coordinator: TransferCoordinator,
    reconciler: TransactionHistoryReconciler,
}

impl Bank {
    /// Create a bank over the given collaborators
    ///
    /// # Arguments
    ///
    /// * `store` - Storage collaborator
    /// * `generator` - Account number source
    /// * `config` - Retry and matching policy
    pub fn new(
        store: Arc<dyn LedgerStore>,
        generator: Arc<dyn AccountNumberGenerator>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            coordinator: TransferCoordinator::new(Arc::clone(&store), &config),
            reconciler: TransactionHistoryReconciler::from_config(&config),
            store,
            generator,
        }
    }

    /// In-memory bank with random account numbers
    pub fn in_memory(config: LedgerConfig) -> Self {
        Self::new(
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(RandomAccountNumberGenerator::new()),
            config,
        )
    }

    /// Validate and store a new customer
    pub fn register_customer(&self, new_customer: NewCustomer) -> Result<Customer, LedgerError> {
        let customer = new_customer.into_customer(Utc::now())?;

        let mut unit = UnitOfWork::new();
        unit.insert_customer(customer.clone());
        self.store.commit(unit)?;

        info!(customer = %customer.id, "Customer registered");
        Ok(customer)
    }

    /// Open the customer's account with an opening deposit
    pub fn open_account(
        &self,
        customer_id: CustomerId,
        initial_balance: Decimal,
    ) -> Result<OpenedAccount, LedgerError> {
        let opened =
            self.coordinator
                .open_account(customer_id, initial_balance, self.generator.as_ref())?;

        info!(
            customer = %customer_id,
            account_number = %opened.account.number,
            "Account opened"
        );
        Ok(opened)
    }

    pub fn deposit(&self, account_id: AccountId, amount: Decimal) -> Result<Transaction, LedgerError> {
        self.coordinator.deposit(account_id, amount)
    }

    pub fn withdraw(&self, account_id: AccountId, amount: Decimal) -> Result<Transaction, LedgerError> {
        self.coordinator.withdraw(account_id, amount)
    }

    /// Transfer to an account identified by its number
    pub fn transfer(
        &self,
        source_id: AccountId,
        destination_number: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        self.coordinator
            .transfer(source_id, destination_number, amount)
    }

    pub fn customer(&self, customer_id: CustomerId) -> Result<Customer, LedgerError> {
        self.store
            .find_customer(customer_id)?
            .ok_or(LedgerError::CustomerNotFound {
                customer: customer_id,
            })
    }

    pub fn account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.store
            .find_account(account_id)?
            .ok_or(LedgerError::AccountNotFound {
                account: account_id,
            })
    }

    /// Look up an account by number; `Ok(None)` if no account carries it
    pub fn account_by_number(&self, number: &str) -> Result<Option<Account>, LedgerError> {
        let number = AccountNumber::parse(number)?;
        self.store.find_account_by_number(&number)
    }

    pub fn account_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Account>, LedgerError> {
        self.store.find_account_for_customer(customer_id)
    }

    /// Every account, ordered by account number
    pub fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        self.store.list_accounts()
    }

    /// Every customer, ordered by join time
    pub fn customers(&self) -> Result<Vec<Customer>, LedgerError> {
        self.store.list_customers()
    }

    /// Records of an account, oldest first, labelled with their counterparty
    pub fn account_history(&self, account_id: AccountId) -> Result<Vec<HistoryEntry>, LedgerError> {
        let own = self.store.transactions_for_account(account_id)?;

        // Only debit legs towards this account can be partners of its credit legs
        let incoming = self.store.find_transactions_where(&|txn: &Transaction| {
            txn.is_debit_leg() && txn.destination_account_id == Some(account_id)
        })?;

        let numbers: HashMap<AccountId, AccountNumber> = self
            .store
            .list_accounts()?
            .into_iter()
            .map(|account| (account.id, account.number))
            .collect();

        Ok(self.reconciler.annotate(&own, &incoming, &numbers))
    }

    /// Customer details with their account and annotated history
    pub fn customer_statement(
        &self,
        customer_id: CustomerId,
    ) -> Result<CustomerStatement, LedgerError> {
        let customer = self.customer(customer_id)?;
        let account = self.account_for_customer(customer_id)?;
        let history = match &account {
            Some(account) => self.account_history(account.id)?,
            None => Vec::new(),
        };

        Ok(CustomerStatement {
            customer,
            account,
            history,
        })
    }

    /// Edit a customer's contact details
    ///
    /// The form goes through the registration rules; id and join time are kept.
    ///
    /// # Errors
    ///
    /// `CustomerNotFound` for an unknown id, `InvalidCustomerField` for a
    /// rejected field.
    pub fn update_customer(
        &self,
        customer_id: CustomerId,
        form: NewCustomer,
    ) -> Result<Customer, LedgerError> {
        let current = self.customer(customer_id)?;
        let updated = form.apply_to(&current)?;

        let mut unit = UnitOfWork::new();
        unit.update_customer(updated.clone());
        self.store.commit(unit)?;

        info!(customer = %customer_id, "Customer updated");
        Ok(updated)
    }

    /// Delete a customer together with their account and its records
    pub fn remove_customer(&self, customer_id: CustomerId) -> Result<(), LedgerError> {
        let mut unit = UnitOfWork::new();
        unit.delete_customer(customer_id);
        self.store.commit(unit)?;

        info!(customer = %customer_id, "Customer removed");
        Ok(())
    }

    /// Compare every account balance with the sum of its records
    ///
    /// # Returns
    ///
    /// The accounts that disagree; empty when the ledger is consistent
    pub fn audit_balances(&self) -> Result<Vec<BalanceMismatch>, LedgerError> {
        let mut mismatches = Vec::new();

        for account in self.store.list_accounts()? {
            let records = self.store.transactions_for_account(account.id)?;
            let from_history = balance_from_history(account.id, &records);

            if from_history != account.balance {
                warn!(
                    account_number = %account.number,
                    balance = %account.balance,
                    %from_history,
                    "Balance does not match transaction history"
                );
                mismatches.push(BalanceMismatch {
                    account_id: account.id,
                    account_number: account.number,
                    balance: account.balance,
                    from_history,
                });
            }
        }

        Ok(mismatches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account_number::SequentialAccountNumberGenerator;
    use crate::core::reconciler::Counterparty;
    use crate::types::TransactionType;
    use rust_decimal_macros::dec;

    fn bank() -> Bank {
        Bank::new(
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(SequentialAccountNumberGenerator::new()),
            LedgerConfig::default(),
        )
    }

    fn customer_with_account(bank: &Bank, name: &str, balance: Decimal) -> (Customer, Account) {
        let email = format!("{}@example.com", name.to_lowercase());
        let customer = bank
            .register_customer(NewCustomer::new(name, email, None))
            .unwrap();
        let account = bank.open_account(customer.id, balance).unwrap().account;
        (customer, account)
    }

    #[test]
    fn test_register_rejects_invalid_customer() {
        let bank = bank();

        let result = bank.register_customer(NewCustomer::new("", "x@example.com", None));

        assert!(matches!(
            result,
            Err(LedgerError::InvalidCustomerField { .. })
        ));
        assert!(bank.customers().unwrap().is_empty());
    }

    #[test]
    fn test_update_customer_keeps_identity() {
        let bank = bank();
        let (customer, account) = customer_with_account(&bank, "Ada", dec!(20.00));

        let updated = bank
            .update_customer(
                customer.id,
                NewCustomer::new(" Ada King ", "ada@lovelace.org", Some("020 7946 0958".into())),
            )
            .unwrap();

        assert_eq!(updated.id, customer.id);
        assert_eq!(updated.joined_at, customer.joined_at);
        assert_eq!(updated.name, "Ada King");
        assert_eq!(bank.customer(customer.id).unwrap(), updated);
        assert_eq!(bank.account_for_customer(customer.id).unwrap(), Some(account));
    }

    #[test]
    fn test_update_customer_rejects_invalid_field() {
        let bank = bank();
        let (customer, _) = customer_with_account(&bank, "Ada", dec!(20.00));

        let result = bank.update_customer(
            customer.id,
            NewCustomer::new("Ada", "ada@example.com", Some("call me".into())),
        );

        assert_eq!(
            result,
            Err(LedgerError::invalid_customer_field(
                "phone",
                "invalid phone number format"
            ))
        );
        assert_eq!(bank.customer(customer.id).unwrap(), customer);
    }

    #[test]
    fn test_update_unknown_customer() {
        let bank = bank();
        let missing = uuid::Uuid::now_v7();

        assert_eq!(
            bank.update_customer(missing, NewCustomer::new("Ada", "ada@example.com", None)),
            Err(LedgerError::CustomerNotFound { customer: missing })
        );
    }

    #[test]
    fn test_statement_shows_round_trip_pairing() {
        let bank = bank();
        let (alice, a) = customer_with_account(&bank, "Alice", dec!(100.00));
        let (bob, b) = customer_with_account(&bank, "Bob", dec!(10.00));

        bank.transfer(a.id, b.number.as_str(), dec!(50.00)).unwrap();

        let alice_statement = bank.customer_statement(alice.id).unwrap();
        let labels: Vec<String> = alice_statement
            .history
            .iter()
            .map(|entry| entry.counterparty.to_string())
            .collect();
        assert_eq!(labels, vec!["-", "To: B00000000002"]);
        assert_eq!(alice_statement.account.unwrap().balance, dec!(50.00));

        let bob_statement = bank.customer_statement(bob.id).unwrap();
        let last = bob_statement.history.last().unwrap();
        assert_eq!(last.transaction.tx_type, TransactionType::Transfer);
        assert_eq!(
            last.counterparty,
            Counterparty::From(AccountNumber::parse("B00000000001").unwrap())
        );
    }

    #[test]
    fn test_statement_without_account() {
        let bank = bank();
        let customer = bank
            .register_customer(NewCustomer::new("Solo", "solo@example.com", None))
            .unwrap();

        let statement = bank.customer_statement(customer.id).unwrap();

        assert_eq!(statement.account, None);
        assert!(statement.history.is_empty());
    }

    #[test]
    fn test_lookup_by_number() {
        let bank = bank();
        let (_, a) = customer_with_account(&bank, "Alice", dec!(10.00));

        assert_eq!(
            bank.account_by_number("B00000000001").unwrap().map(|acc| acc.id),
            Some(a.id)
        );
        assert_eq!(bank.account_by_number("B00000000002").unwrap(), None);
        assert!(bank.account_by_number("nope").is_err());
    }

    #[test]
    fn test_audit_consistent_after_operations() {
        let bank = bank();
        let (_, a) = customer_with_account(&bank, "Alice", dec!(100.00));
        let (_, b) = customer_with_account(&bank, "Bob", dec!(10.00));

        bank.deposit(a.id, dec!(5.00)).unwrap();
        bank.withdraw(b.id, dec!(2.50)).unwrap();
        bank.transfer(a.id, "B00000000002", dec!(30.00)).unwrap();
        let _ = bank.withdraw(b.id, dec!(1000.00));

        assert!(bank.audit_balances().unwrap().is_empty());
        assert_eq!(bank.account(a.id).unwrap().balance, dec!(75.00));
        assert_eq!(bank.account(b.id).unwrap().balance, dec!(37.50));
    }

    #[test]
    fn test_remove_customer_cascades() {
        let bank = bank();
        let (alice, a) = customer_with_account(&bank, "Alice", dec!(10.00));

        bank.remove_customer(alice.id).unwrap();

        assert_eq!(
            bank.customer(alice.id),
            Err(LedgerError::CustomerNotFound { customer: alice.id })
        );
        assert_eq!(
            bank.account(a.id),
            Err(LedgerError::AccountNotFound { account: a.id })
        );
        assert!(bank.accounts().unwrap().is_empty());
    }

    #[test]
    fn test_remove_unknown_customer() {
        let bank = bank();
        let missing = uuid::Uuid::now_v7();

        assert_eq!(
            bank.remove_customer(missing),
            Err(LedgerError::CustomerNotFound { customer: missing })
        );
    }
}
