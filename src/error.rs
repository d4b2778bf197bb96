//! Custom error types for Trip Ledger
//!
//! Two layers: `ValidationError` covers bad user input and is shown to the
//! user as-is, while `LedgerError` is the crate-wide error that also carries
//! storage failures and internal inconsistencies.

use thiserror::Error;

use crate::models::Money;

/// Input rejected by the split engine, the forecast model, or a service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Expense amounts are never negative; refunds use `ExpenseKind::Refund`
    #[error("Amount cannot be negative: {amount}")]
    NegativeAmount { amount: Money },

    /// Amounts are capped at `Money::MAX`
    #[error("Amount {amount} is larger than the supported maximum of {}", Money::MAX)]
    AmountTooLarge { amount: Money },

    /// Nobody to split with (or forecast for)
    #[error("At least one traveler is required")]
    NoTravelers,

    /// Custom shares do not add up to the expense amount
    #[error("Custom shares total {actual} but the expense is {expected} (off by {delta})")]
    AmountMismatch {
        expected: Money,
        actual: Money,
        /// `expected - actual`
        delta: Money,
    },

    /// A custom share names someone who is not part of the split
    #[error("Traveler is not part of this split: {0}")]
    UnknownTraveler(String),

    /// The same traveler appears twice in a roster or share list
    #[error("Traveler listed more than once: {0}")]
    DuplicateTraveler(String),

    /// A single custom share is below zero
    #[error("Share for {traveler} cannot be negative: {share}")]
    NegativeShare { traveler: String, share: Money },

    /// Any other malformed input (empty names, inverted date ranges, ...)
    #[error("{0}")]
    Invalid(String),
}

impl ValidationError {
    /// The signed difference for an amount mismatch, if this is one
    pub fn delta(&self) -> Option<Money> {
        match self {
            Self::AmountMismatch { delta, .. } => Some(*delta),
            _ => None,
        }
    }
}

/// The main error type for Trip Ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// User input that failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Entity cannot be removed while other records point at it
    #[error("{entity_type} '{identifier}' is still referenced by {references} expense(s)")]
    InUse {
        entity_type: &'static str,
        identifier: String,
        references: usize,
    },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// A derived ledger invariant does not hold. Points at corrupted data
    /// or an engine bug, never at user input.
    #[error("Internal ledger inconsistency: {0}")]
    InternalInconsistency(String),
}

impl LedgerError {
    /// Create a "not found" error for trips
    pub fn trip_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Trip",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for travelers
    pub fn traveler_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Traveler",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for stops
    pub fn stop_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Stop",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Shorthand for free-form validation failures
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::Invalid(message.into()))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an internal inconsistency
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InternalInconsistency(_))
    }

    /// Message suitable for showing to a traveler.
    ///
    /// Internal inconsistencies are reduced to a generic prompt; the details
    /// go to the log where the error was raised.
    pub fn user_message(&self) -> String {
        match self {
            Self::InternalInconsistency(_) => "Ledger error, please reload.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Trip Ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = LedgerError::traveler_not_found("Ana");
        assert_eq!(err.to_string(), "Traveler not found: Ana");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_amount_mismatch_reports_delta() {
        let err = ValidationError::AmountMismatch {
            expected: Money::from_cents(1000),
            actual: Money::from_cents(800),
            delta: Money::from_cents(200),
        };
        assert_eq!(err.delta(), Some(Money::from_cents(200)));
        assert_eq!(
            err.to_string(),
            "Custom shares total $8.00 but the expense is $10.00 (off by $2.00)"
        );
    }

    #[test]
    fn test_validation_converts_into_ledger_error() {
        let err: LedgerError = ValidationError::NoTravelers.into();
        assert!(err.is_validation());
        assert_eq!(
            err.user_message(),
            "Validation error: At least one traveler is required"
        );
    }

    #[test]
    fn test_internal_inconsistency_hides_details() {
        let err = LedgerError::InternalInconsistency("net balances sum to 3".into());
        assert!(err.is_internal());
        assert_eq!(err.user_message(), "Ledger error, please reload.");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let ledger_err: LedgerError = io_err.into();
        assert!(matches!(ledger_err, LedgerError::Io(_)));
    }
}
