//! Pricing core for P2P fiat/stablecoin liquidity pools.
//!
//! This crate holds the pure, synchronous part of the exchange:
//! - Dynamic fee computation from rate volatility and pool imbalance
//! - Trade settlement (local amount, fee, net amount)
//! - Reserve updates after a confirmed trade
//! - Pool, liquidity provider and transaction entities
//! - Display formatting for amounts
//!
//! Every operation takes an explicit snapshot and returns a new value; callers
//! that share pools across tasks must serialize reserve updates themselves.

/// Prelude module for convenient imports.
pub mod prelude;

/// Pool, liquidity provider and transaction entities.
pub mod entities;
/// Enumerations shared across the workspace.
pub mod enums;
/// Error types.
pub mod error;
/// Dynamic fee engine.
pub mod fees;
/// Amount formatting.
pub mod format;
/// Reserve updates.
pub mod reserves;
/// Trade settlement.
pub mod settlement;
/// Value objects.
pub mod value_objects;
