//! Customer types and registration rules
//!
//! Customers are created on registration; the ledger never changes them,
//! though their contact details can be edited through the same form rules.
//! A customer owns zero or one account. Form fields are checked with
//! `validator` after trimming.

use super::error::LedgerError;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Customer identifier
pub type CustomerId = Uuid;

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// Order in which rejected fields are reported
const FIELDS: [&str; 3] = ["name", "email", "phone"];

/// A registered bank customer
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    /// Customer identity
    pub id: CustomerId,

    /// Full name
    pub name: String,

    /// Contact email address
    pub email: String,

    /// Optional phone number
    pub phone: Option<String>,

    /// Registration timestamp (UTC)
    pub joined_at: DateTime<Utc>,
}

/// Registration and profile form data
#[derive(Debug, Clone, PartialEq, Default, Validate)]
pub struct NewCustomer {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(
        length(min = 1, max = 100, message = "must be between 1 and 100 characters"),
        email(message = "invalid email address format"),
        custom(function = "validate_email_domain")
    )]
    pub email: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

impl NewCustomer {
    /// Create form data from its fields
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: Option<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone,
        }
    }

    /// Validate the form and build the customer entity
    ///
    /// Names and emails are trimmed; an empty phone is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidCustomerField` for the first rejected field,
    /// checked in the order name, email, phone.
    pub fn into_customer(self, joined_at: DateTime<Utc>) -> Result<Customer, LedgerError> {
        let form = self.normalized()?;

        Ok(Customer {
            id: Uuid::now_v7(),
            name: form.name,
            email: form.email,
            phone: form.phone,
            joined_at,
        })
    }

    /// Apply the form to an existing customer
    ///
    /// Identity and join time are kept; the contact fields are replaced after
    /// the same validation as [`NewCustomer::into_customer`].
    pub fn apply_to(self, customer: &Customer) -> Result<Customer, LedgerError> {
        let form = self.normalized()?;

        Ok(Customer {
            id: customer.id,
            name: form.name,
            email: form.email,
            phone: form.phone,
            joined_at: customer.joined_at,
        })
    }

    /// Trimmed copy of the form, validated
    fn normalized(self) -> Result<Self, LedgerError> {
        let form = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        };

        form.validate().map_err(first_rejected_field)?;
        Ok(form)
    }
}

fn first_rejected_field(errors: ValidationErrors) -> LedgerError {
    let field_errors = errors.field_errors();

    for field in FIELDS {
        if let Some(error) = field_errors.get(field).and_then(|errors| errors.first()) {
            let reason = error
                .message
                .clone()
                .unwrap_or_else(|| error.code.clone());
            return LedgerError::invalid_customer_field(field, &reason);
        }
    }

    LedgerError::invalid_customer_field("customer", &errors.to_string())
}

fn rejection(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Require a dotted domain (`local@domain.tld`)
fn validate_email_domain(email: &str) -> Result<(), ValidationError> {
    let has_suffix = email
        .rsplit_once('@')
        .map(|(_, domain)| {
            let labels: Vec<&str> = domain.split('.').collect();
            labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
        })
        .unwrap_or(false);

    if has_suffix {
        Ok(())
    } else {
        Err(rejection("email_domain", "invalid email address format"))
    }
}

/// Digits, spaces and `+ - ( ) .`, with 7 to 15 digits
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.'));
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();

    if allowed && (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        Ok(())
    } else {
        Err(rejection("phone", "invalid phone number format"))
    }
}
