//! Error types for pricing and reserve operations.

use crate::enums::{Reserve, TransactionStatus};
use rust_decimal::Decimal;

/// Errors raised by the fee engine, settlement and reserve updater.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// An input violated the pricing contract.
    #[error("Invalid {field}: {reason}")]
    InvalidInput {
        /// Name of the offending input.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// A reserve update would drive a pool balance negative.
    #[error("Insufficient {reserve} liquidity: available {available}, required {required}")]
    InsufficientLiquidity {
        /// Reserve that would go negative.
        reserve: Reserve,
        /// Amount currently held in the reserve.
        available: Decimal,
        /// Amount the trade needs to take out of it.
        required: Decimal,
    },
}

impl PricingError {
    /// Creates an invalid input error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised by transaction lifecycle changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    /// The requested status change is not allowed.
    #[error("Cannot move transaction from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: TransactionStatus,
        /// Requested status.
        to: TransactionStatus,
    },
}

/// Returns `value` if it is strictly positive.
pub(crate) fn require_positive(value: Decimal, field: &'static str) -> Result<Decimal, PricingError> {
    if value <= Decimal::ZERO {
        return Err(PricingError::invalid(
            field,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(value)
}

/// Returns `value` if it is zero or positive.
pub(crate) fn require_non_negative(
    value: Decimal,
    field: &'static str,
) -> Result<Decimal, PricingError> {
    if value < Decimal::ZERO {
        return Err(PricingError::invalid(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(value)
}

/// Turns a checked arithmetic result into a pricing error on overflow.
pub fn checked(value: Option<Decimal>, field: &'static str) -> Result<Decimal, PricingError> {
    value.ok_or_else(|| PricingError::invalid(field, "arithmetic overflow"))
}
