//! CSV format handling for operation scripts and reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - OperationCsvRecord structure for deserialization
//! - Conversion from CSV records to domain types
//! - Accounts and history report serialization
//!
//! All functions are pure (no I/O beyond the given writer) for easy testing.

use crate::types::{
    AccountNumber, CustomerKey, OperationKind, OperationRecord, TransactionType, TransferTarget,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the operation script format with columns:
/// op, customer, amount, target, name, email, phone.
/// Every column after `customer` is optional; which ones are required
/// depends on the operation.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct OperationCsvRecord {
    pub op: String,
    pub customer: CustomerKey,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One line of the accounts report
#[derive(Debug, Clone, PartialEq)]
pub struct AccountReportRow {
    pub customer: CustomerKey,
    pub name: String,

    /// `None` for customers without an account
    pub account_number: Option<AccountNumber>,
    pub balance: Option<Decimal>,
}

/// One line of the history report
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryReportRow {
    pub customer: CustomerKey,
    pub account_number: AccountNumber,
    pub tx_type: TransactionType,
    pub amount: Decimal,

    /// Counterparty label (`To: ...`, `From: ...` or `-`)
    pub details: String,
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Convert an OperationCsvRecord to an OperationRecord
///
/// This function:
/// - Parses the operation name (case-insensitive)
/// - Parses the amount string into a Decimal (if present)
/// - Requires an amount for open/deposit/withdraw/transfer
/// - Requires a target for transfer; a numeric target is a customer key,
///   anything else is passed on as a raw account number
///
/// Registration fields are passed through unvalidated; the engine owns
/// customer validation.
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
///
/// # Returns
///
/// Result containing either:
/// - Ok(OperationRecord) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: OperationCsvRecord) -> Result<OperationRecord, String> {
    let kind = match csv_record.op.trim().to_lowercase().as_str() {
        "register" => OperationKind::Register,
        "open" => OperationKind::Open,
        "deposit" => OperationKind::Deposit,
        "withdraw" | "withdrawal" => OperationKind::Withdraw,
        "transfer" => OperationKind::Transfer,
        _ => {
            return Err(format!(
                "Invalid operation: '{}' for customer {}",
                csv_record.op, csv_record.customer
            ))
        }
    };

    let amount = match non_empty(csv_record.amount) {
        Some(amount_str) => match Decimal::from_str(&amount_str) {
            Ok(decimal) => Some(decimal),
            Err(_) => {
                return Err(format!(
                    "Invalid amount '{}' for customer {}",
                    amount_str, csv_record.customer
                ))
            }
        },
        None => None,
    };

    if kind != OperationKind::Register && amount.is_none() {
        return Err(format!(
            "{:?} for customer {} requires an amount",
            kind, csv_record.customer
        ));
    }

    let target = match non_empty(csv_record.target) {
        Some(raw) => Some(match raw.parse::<CustomerKey>() {
            Ok(key) => TransferTarget::Customer(key),
            Err(_) => TransferTarget::AccountNumber(raw),
        }),
        None => None,
    };

    if kind == OperationKind::Transfer && target.is_none() {
        return Err(format!(
            "Transfer for customer {} requires a target",
            csv_record.customer
        ));
    }

    Ok(OperationRecord {
        kind,
        customer: csv_record.customer,
        amount,
        target,
        name: non_empty(csv_record.name),
        email: non_empty(csv_record.email),
        phone: non_empty(csv_record.phone),
    })
}

/// Write the accounts report
///
/// Writes rows in CSV format with columns: customer, name, account_number, balance.
/// Rows are sorted by customer key for deterministic output; balances use two
/// decimal places.
///
/// # Arguments
///
/// * `rows` - Report rows, in any order
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_report(rows: &[AccountReportRow], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["customer", "name", "account_number", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_rows = rows.to_vec();
    sorted_rows.sort_by_key(|row| row.customer);

    for row in sorted_rows {
        writer
            .write_record(&[
                row.customer.to_string(),
                row.name,
                row.account_number
                    .map(|number| number.to_string())
                    .unwrap_or_default(),
                row.balance
                    .map(|balance| format!("{:.2}", balance))
                    .unwrap_or_default(),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write the transaction history report
///
/// Writes rows in CSV format with columns: customer, account_number, type,
/// amount, details. Rows are written in the order given.
pub fn write_history_report(rows: &[HistoryReportRow], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["customer", "account_number", "type", "amount", "details"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for row in rows {
        writer
            .write_record(&[
                row.customer.to_string(),
                row.account_number.to_string(),
                row.tx_type.to_string(),
                format!("{:.2}", row.amount),
                row.details.clone(),
            ])
            .map_err(|e| format!("Failed to write history record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
