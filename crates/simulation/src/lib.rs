//! Orchestration around the pricing core.
//!
//! This crate provides the collaborators the pricing core leaves to its caller:
//! - Market data sources driving exchange rates
//! - Balance sources standing in for a user's wallet
//! - A trade desk that serializes reserve updates per pool
//! - Simulated trading sessions and demo fixtures

/// Prelude module for convenient imports.
pub mod prelude;

/// Trade desk.
pub mod desk;
/// Demo pools, providers and wallet.
pub mod fixtures;
/// Market data sources.
pub mod market;
/// Simulated trading sessions.
pub mod session;
/// Balance sources.
pub mod wallet;
