//! # Operation Records
//!
//! The value types shared by the ledger, the preview and the thermal ticket.
//!
//! An [`OperationInput`] is what the operator fills in. Once the ledger
//! appends it, it becomes a [`ReceiptRecord`]: the same fields plus an id,
//! an [`OperationNumber`] and a creation timestamp. Records are read-only
//! from then on; every output channel only borrows them.
//!
//! ## Serialized Shape
//!
//! ```text
//! {
//!   "id": "6c1f…",
//!   "operationNumber": "216-000001",
//!   "createdAt": "2026-10-19T09:15:00-05:00",
//!   "branch": "MIRAFLORES",
//!   "operationType": "DEPOSIT",
//!   "currency": "SOL",
//!   "amount": "150.00",
//!   ...
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use uuid::Uuid;

use crate::error::ReciboError;

/// Branch code every operation number is prefixed with.
pub const BRANCH_CODE: &str = "216";

/// Minimum width of the zero-padded sequence part.
const SEQUENCE_WIDTH: usize = 6;

/// Minimum number of digits in an account number.
const MIN_ACCOUNT_DIGITS: usize = 10;

// ============================================================================
// OPERATION NUMBER
// ============================================================================

/// # Operation Number
///
/// Sequential, branch-prefixed identifier of a persisted operation, rendered
/// as `216-000042`. The same string appears in the store, the preview and on
/// the printed ticket.
///
/// ## Example
///
/// ```
/// use recibo::model::OperationNumber;
///
/// let number = OperationNumber::new(42);
/// assert_eq!(number.to_string(), "216-000042");
/// assert_eq!("216-000042".parse::<OperationNumber>().unwrap(), number);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationNumber(u64);

impl OperationNumber {
    pub fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    /// The counter value this number was issued from.
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OperationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:0width$}", BRANCH_CODE, self.0, width = SEQUENCE_WIDTH)
    }
}

impl FromStr for OperationNumber {
    type Err = ReciboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReciboError::Validation(format!("Invalid operation number '{}'", s));

        let digits = s
            .strip_prefix(BRANCH_CODE)
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(invalid)?;

        if digits.len() < SEQUENCE_WIDTH || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        digits.parse().map(Self).map_err(|_| invalid())
    }
}

impl Serialize for OperationNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OperationNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ============================================================================
// ENUMERATIONS
// ============================================================================

/// Kind of cash operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Deposit,
    Withdrawal,
    Transfer,
}

impl OperationType {
    /// Label printed on the ticket.
    pub fn label(&self) -> &'static str {
        match self {
            OperationType::Deposit => "DEPOSITO",
            OperationType::Withdrawal => "RETIRO",
            OperationType::Transfer => "TRANSFERENCIA",
        }
    }
}

/// Operation currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    Sol,
    Usd,
}

impl Currency {
    /// Symbol placed in front of amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Sol => "S/",
            Currency::Usd => "US$",
        }
    }
}

/// How the client paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Check,
    Transfer,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "EFECTIVO",
            PaymentMethod::Check => "CHEQUE",
            PaymentMethod::Transfer => "TRANSFERENCIA",
        }
    }
}

// ============================================================================
// INPUT AND RECORD
// ============================================================================

/// Operation data as captured from the operator, before it has an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationInput {
    pub branch: String,
    pub account_number: String,
    pub client_name: String,
    pub document_type: String,
    pub document_number: String,
    pub operation_type: OperationType,
    pub currency: Currency,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub cash_received: Decimal,
    #[serde(default)]
    pub deposit_amount: Decimal,
    #[serde(default)]
    pub tax_withheld: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OperationInput {
    /// Check the field constraints of an operation.
    ///
    /// Called by the CLI and HTTP surfaces before handing the input to the
    /// ledger, which assumes its input is already valid.
    pub fn validate(&self) -> Result<(), ReciboError> {
        require_text("branch", &self.branch)?;
        require_text("clientName", &self.client_name)?;
        require_text("documentType", &self.document_type)?;
        require_text("documentNumber", &self.document_number)?;
        if let Some(notes) = &self.notes {
            reject_control("notes", notes)?;
        }

        let account = self.account_number.trim();
        let digits = account.chars().filter(char::is_ascii_digit).count();
        if digits < MIN_ACCOUNT_DIGITS || account.chars().any(|c| !c.is_ascii_digit() && c != '-') {
            return Err(ReciboError::Validation(format!(
                "accountNumber must have at least {} digits",
                MIN_ACCOUNT_DIGITS
            )));
        }

        if self.amount < Decimal::new(1, 2) {
            return Err(ReciboError::Validation(
                "amount must be at least 0.01".to_string(),
            ));
        }

        for (field, value) in [
            ("amount", self.amount),
            ("cashReceived", self.cash_received),
            ("depositAmount", self.deposit_amount),
            ("taxWithheld", self.tax_withheld),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(ReciboError::Validation(format!(
                    "{} cannot be negative",
                    field
                )));
            }
            if value.normalize().scale() > 2 {
                return Err(ReciboError::Validation(format!(
                    "{} has more than 2 decimal places",
                    field
                )));
            }
        }

        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), ReciboError> {
    if value.trim().is_empty() {
        return Err(ReciboError::Validation(format!("{} is required", field)));
    }
    reject_control(field, value)
}

/// Text ends up on the ticket; control characters would be read as printer
/// commands.
fn reject_control(field: &str, value: &str) -> Result<(), ReciboError> {
    if value.chars().any(char::is_control) {
        return Err(ReciboError::Validation(format!(
            "{} contains control characters",
            field
        )));
    }
    Ok(())
}

/// # Receipt Record
///
/// A persisted operation. Only the ledger creates these; `id`,
/// `operation_number` and `created_at` are assigned once at append time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRecord {
    pub id: Uuid,
    pub operation_number: OperationNumber,
    pub created_at: DateTime<FixedOffset>,
    #[serde(flatten)]
    pub details: OperationInput,
}

// ============================================================================
// TESTS
// ============================================================================
