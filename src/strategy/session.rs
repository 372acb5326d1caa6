//! Operation script session
//!
//! Scripts refer to customers through small numeric keys. An
//! `OperationSession` maps those keys to the ids the engine assigns and
//! translates each [`OperationRecord`] into the matching [`Bank`] call.
//!
//! The session is `Send + Sync`: the key maps are `DashMap`s and the bank is
//! shared behind an `Arc`, so partitions of a script can be replayed from
//! several tasks at once.

use crate::core::Bank;
use crate::io::csv_format::{AccountReportRow, HistoryReportRow};
use crate::types::{
    AccountId, AccountNumber, CustomerId, CustomerKey, NewCustomer, OperationKind, OperationRecord,
    SessionError, TransferTarget,
};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Replays operation records against a bank
pub struct OperationSession {
    bank: Arc<Bank>,
    customers: DashMap<CustomerKey, CustomerId>,
    accounts: DashMap<CustomerKey, (AccountId, AccountNumber)>,
}

impl OperationSession {
    pub fn new(bank: Arc<Bank>) -> Self {
        Self {
            bank,
            customers: DashMap::new(),
            accounts: DashMap::new(),
        }
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    /// Apply one operation
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the engine accepted the operation
    /// * `Err(SessionError)` if the key is unknown or the engine rejected it;
    ///   nothing was changed
    pub fn apply(&self, record: &OperationRecord) -> Result<(), SessionError> {
        match record.kind {
            OperationKind::Register => self.register(record),
            OperationKind::Open => {
                let customer_id = self.customer_id(record.customer)?;
                let amount = Self::amount(record, "open")?;
                let opened = self.bank.open_account(customer_id, amount)?;
                self.accounts
                    .insert(record.customer, (opened.account.id, opened.account.number));
                Ok(())
            }
            OperationKind::Deposit => {
                let account_id = self.account_id(record.customer)?;
                let amount = Self::amount(record, "deposit")?;
                self.bank.deposit(account_id, amount)?;
                Ok(())
            }
            OperationKind::Withdraw => {
                let account_id = self.account_id(record.customer)?;
                let amount = Self::amount(record, "withdraw")?;
                self.bank.withdraw(account_id, amount)?;
                Ok(())
            }
            OperationKind::Transfer => {
                let account_id = self.account_id(record.customer)?;
                let amount = Self::amount(record, "transfer")?;
                let destination = self.destination_number(record)?;
                self.bank.transfer(account_id, &destination, amount)?;
                Ok(())
            }
        }
    }

    /// Accounts report rows, one per registered customer
    pub fn accounts_report(&self) -> Result<Vec<AccountReportRow>, SessionError> {
        let mut rows = Vec::new();

        for (key, customer_id) in self.sorted_customers() {
            let customer = self.bank.customer(customer_id)?;
            let account = self.bank.account_for_customer(customer_id)?;
            rows.push(AccountReportRow {
                customer: key,
                name: customer.name,
                balance: account.as_ref().map(|account| account.balance),
                account_number: account.map(|account| account.number),
            });
        }

        Ok(rows)
    }

    /// History report rows, grouped by customer key, oldest record first
    pub fn history_report(&self) -> Result<Vec<HistoryReportRow>, SessionError> {
        let mut rows = Vec::new();

        for (key, customer_id) in self.sorted_customers() {
            let Some(account) = self.bank.account_for_customer(customer_id)? else {
                continue;
            };

            for entry in self.bank.account_history(account.id)? {
                rows.push(HistoryReportRow {
                    customer: key,
                    account_number: account.number.clone(),
                    tx_type: entry.transaction.tx_type,
                    amount: entry.transaction.amount,
                    details: entry.counterparty.to_string(),
                });
            }
        }

        Ok(rows)
    }

    fn register(&self, record: &OperationRecord) -> Result<(), SessionError> {
        if self.customers.contains_key(&record.customer) {
            return Err(SessionError::DuplicateCustomer(record.customer));
        }

        let new_customer = NewCustomer::new(
            record.name.clone().unwrap_or_default(),
            record.email.clone().unwrap_or_default(),
            record.phone.clone(),
        );
        let customer = self.bank.register_customer(new_customer)?;
        self.customers.insert(record.customer, customer.id);
        Ok(())
    }

    fn customer_id(&self, key: CustomerKey) -> Result<CustomerId, SessionError> {
        self.customers
            .get(&key)
            .map(|entry| *entry.value())
            .ok_or(SessionError::UnknownCustomer(key))
    }

    fn account_id(&self, key: CustomerKey) -> Result<AccountId, SessionError> {
        self.customer_id(key)?;
        self.accounts
            .get(&key)
            .map(|entry| entry.value().0)
            .ok_or(SessionError::NoAccount(key))
    }

    /// Resolve the transfer target to the account number handed to the engine
    fn destination_number(&self, record: &OperationRecord) -> Result<String, SessionError> {
        match &record.target {
            Some(TransferTarget::Customer(key)) => {
                self.customer_id(*key)?;
                self.accounts
                    .get(key)
                    .map(|entry| entry.value().1.to_string())
                    .ok_or(SessionError::NoAccount(*key))
            }
            Some(TransferTarget::AccountNumber(raw)) => Ok(raw.clone()),
            None => Err(SessionError::missing_field("transfer", record.customer, "target")),
        }
    }

    fn amount(record: &OperationRecord, operation: &str) -> Result<Decimal, SessionError> {
        record
            .amount
            .ok_or_else(|| SessionError::missing_field(operation, record.customer, "amount"))
    }

    fn sorted_customers(&self) -> Vec<(CustomerKey, CustomerId)> {
        let mut customers: Vec<_> = self
            .customers
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        customers.sort_by_key(|(key, _)| *key);
        customers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InMemoryLedgerStore, LedgerConfig, SequentialAccountNumberGenerator};
    use crate::types::LedgerError;
    use rust_decimal_macros::dec;

    fn session() -> OperationSession {
        let bank = Bank::new(
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(SequentialAccountNumberGenerator::new()),
            LedgerConfig::default(),
        );
        OperationSession::new(Arc::new(bank))
    }

    fn op(kind: OperationKind, customer: CustomerKey, amount: Option<Decimal>) -> OperationRecord {
        OperationRecord {
            kind,
            customer,
            amount,
            target: None,
            name: None,
            email: None,
            phone: None,
        }
    }

    fn register(customer: CustomerKey, name: &str) -> OperationRecord {
        OperationRecord {
            name: Some(name.to_string()),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            ..op(OperationKind::Register, customer, None)
        }
    }

    fn transfer(customer: CustomerKey, amount: Decimal, target: TransferTarget) -> OperationRecord {
        OperationRecord {
            target: Some(target),
            ..op(OperationKind::Transfer, customer, Some(amount))
        }
    }

    fn two_customers() -> OperationSession {
        let session = session();
        session.apply(&register(1, "Alice")).unwrap();
        session.apply(&register(2, "Bob")).unwrap();
        session
            .apply(&op(OperationKind::Open, 1, Some(dec!(100.00))))
            .unwrap();
        session
            .apply(&op(OperationKind::Open, 2, Some(dec!(10.00))))
            .unwrap();
        session
    }

    #[test]
    fn test_script_replay_and_reports() {
        let session = two_customers();
        session
            .apply(&transfer(1, dec!(50.00), TransferTarget::Customer(2)))
            .unwrap();
        session
            .apply(&op(OperationKind::Withdraw, 2, Some(dec!(5.00))))
            .unwrap();

        let accounts = session.accounts_report().unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].name, "Alice");
        assert_eq!(accounts[0].balance, Some(dec!(50.00)));
        assert_eq!(accounts[1].balance, Some(dec!(55.00)));

        let history = session.history_report().unwrap();
        let details: Vec<_> = history
            .iter()
            .map(|row| (row.customer, row.details.as_str()))
            .collect();
        assert_eq!(
            details,
            vec![
                (1, "-"),
                (1, "To: B00000000002"),
                (2, "-"),
                (2, "From: B00000000001"),
                (2, "-"),
            ]
        );
    }

    #[test]
    fn test_transfer_to_raw_account_number() {
        let session = two_customers();
        session
            .apply(&transfer(
                2,
                dec!(10.00),
                TransferTarget::AccountNumber("B00000000001".to_string()),
            ))
            .unwrap();

        let accounts = session.accounts_report().unwrap();
        assert_eq!(accounts[0].balance, Some(dec!(110.00)));
        assert_eq!(accounts[1].balance, Some(dec!(0.00)));
    }

    #[test]
    fn test_engine_errors_pass_through() {
        let session = two_customers();

        let result = session.apply(&transfer(
            1,
            dec!(1.00),
            TransferTarget::AccountNumber("B123".to_string()),
        ));

        assert_eq!(
            result,
            Err(SessionError::Ledger(LedgerError::invalid_account_number(
                "B123"
            )))
        );
    }

    #[test]
    fn test_unknown_and_accountless_customers() {
        let session = session();
        session.apply(&register(1, "Alice")).unwrap();

        assert_eq!(
            session.apply(&op(OperationKind::Deposit, 9, Some(dec!(1)))),
            Err(SessionError::UnknownCustomer(9))
        );
        assert_eq!(
            session.apply(&op(OperationKind::Deposit, 1, Some(dec!(1)))),
            Err(SessionError::NoAccount(1))
        );

        let accounts = session.accounts_report().unwrap();
        assert_eq!(accounts[0].account_number, None);
        assert!(session.history_report().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let session = session();
        session.apply(&register(1, "Alice")).unwrap();

        assert_eq!(
            session.apply(&register(1, "Again")),
            Err(SessionError::DuplicateCustomer(1))
        );
    }

    #[test]
    fn test_failed_registration_leaves_key_free() {
        let session = session();
        let invalid = OperationRecord {
            email: Some("not-an-email".to_string()),
            ..register(1, "Alice")
        };

        assert!(matches!(
            session.apply(&invalid),
            Err(SessionError::Ledger(LedgerError::InvalidCustomerField { .. }))
        ));
        assert!(session.apply(&register(1, "Alice")).is_ok());
    }
}
