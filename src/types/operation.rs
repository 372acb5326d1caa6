//! Operation script records
//!
//! The command-line driver replays a CSV script of banking operations. Each row
//! is converted into an [`OperationRecord`] before it reaches the engine.

use rust_decimal::Decimal;

/// Script-local customer reference
///
/// Customers and accounts get opaque ids when they are created; scripts refer to
/// them through these small numeric keys instead.
pub type CustomerKey = u32;

/// Operations supported by the operation script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Register a new customer under a script key
    Register,

    /// Open the customer's account with an initial balance
    Open,

    /// Credit funds to the customer's account
    Deposit,

    /// Debit funds from the customer's account
    Withdraw,

    /// Move funds from the customer's account to another account
    Transfer,
}

impl OperationKind {
    /// Whether this operation creates customers or accounts
    ///
    /// Setup operations are replayed in script order, never concurrently.
    pub fn is_setup(&self) -> bool {
        matches!(self, OperationKind::Register | OperationKind::Open)
    }
}

/// Transfer destination as written in the script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferTarget {
    /// Another script customer, resolved to their account number at replay time
    Customer(CustomerKey),

    /// A raw account number, passed to the engine unvalidated
    AccountNumber(String),
}

/// A single validated row of an operation script
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    /// The operation to perform
    pub kind: OperationKind,

    /// The customer performing the operation
    pub customer: CustomerKey,

    /// Amount for open/deposit/withdraw/transfer
    pub amount: Option<Decimal>,

    /// Destination for transfers
    pub target: Option<TransferTarget>,

    /// Registration name
    pub name: Option<String>,

    /// Registration email
    pub email: Option<String>,

    /// Registration phone
    pub phone: Option<String>,
}
