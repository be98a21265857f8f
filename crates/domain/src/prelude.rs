//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use stablepool_domain::prelude::*;
//! ```

// Entities
pub use crate::entities::{
    LiquidityProvider, Pool, PoolSnapshot, ProviderId, Transaction, TransactionId,
};

// Enums
pub use crate::enums::{Reserve, TradeDirection, TransactionStatus};

// Errors
pub use crate::error::{PricingError, TransactionError};

// Fee engine
pub use crate::fees::{
    DEFAULT_BASE_FEE, DEFAULT_FEE_CAP, FeeBreakdown, FeeSchedule, MAX_FEE, compute_dynamic_fee,
};

// Formatting
pub use crate::format::{format_amount, format_currency};

// Reserves
pub use crate::reserves::apply_trade;

// Settlement
pub use crate::settlement::{Settlement, compute_trade_amount};

// Value objects
pub use crate::value_objects::{ExchangeRate, Percentage};
