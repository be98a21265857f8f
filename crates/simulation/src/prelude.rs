//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use stablepool_simulation::prelude::*;
//! ```

// Desk
pub use crate::desk::{DeskConfig, DeskError, Quote, TradeDesk};

// Fixtures
pub use crate::fixtures::{demo_pools, demo_providers, demo_wallet};

// Market data
pub use crate::market::{FixedMarket, JitterMarket, MarketDataSource, MarketError, ScriptedMarket};

// Sessions
pub use crate::session::{SessionConfig, SessionSummary, run_session};

// Wallet
pub use crate::wallet::{BalanceSource, SimulatedWallet, WalletError};
