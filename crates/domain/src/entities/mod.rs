pub mod pool;
pub mod provider;
pub mod transaction;

// Re-export for easier access
pub use pool::{Pool, PoolSnapshot};
pub use provider::{LiquidityProvider, ProviderId};
pub use transaction::{Transaction, TransactionId};
