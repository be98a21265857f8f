//! User balance sources.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Errors raised by balance sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// The wallet is not connected.
    #[error("Wallet is not connected")]
    Disconnected,
    /// Not enough funds for a debit.
    #[error("Insufficient {currency} balance: available {available}, required {required}")]
    InsufficientBalance {
        /// Currency code.
        currency: String,
        /// Current balance.
        available: Decimal,
        /// Requested debit.
        required: Decimal,
    },
    /// Debit or credit of a non-positive amount.
    #[error("Invalid amount {0}")]
    InvalidAmount(Decimal),
    /// A credit would overflow the balance.
    #[error("{currency} balance overflow")]
    BalanceOverflow {
        /// Currency code.
        currency: String,
    },
}

/// Supplies and moves a user's holdings.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Whether the wallet is connected.
    fn is_connected(&self) -> bool;

    /// Current balance in `currency`; zero if the wallet holds none.
    async fn balance(&self, currency: &str) -> Decimal;

    /// Removes `amount` of `currency` from the wallet.
    async fn debit(&self, currency: &str, amount: Decimal) -> Result<(), WalletError>;

    /// Adds `amount` of `currency` to the wallet.
    async fn credit(&self, currency: &str, amount: Decimal) -> Result<(), WalletError>;
}

/// In-memory wallet keyed by currency code.
pub struct SimulatedWallet {
    /// Display address.
    pub address: String,
    balances: RwLock<HashMap<String, Decimal>>,
    connected: AtomicBool,
}

impl SimulatedWallet {
    /// Creates a disconnected, empty wallet.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            balances: RwLock::new(HashMap::new()),
            connected: AtomicBool::new(false),
        }
    }

    /// Seeds a balance.
    #[must_use]
    pub fn with_balance(mut self, currency: impl Into<String>, amount: Decimal) -> Self {
        self.balances.get_mut().insert(currency.into(), amount);
        self
    }

    /// Connects the wallet.
    pub fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
        info!(address = %self.address, "Wallet connected");
    }

    /// Disconnects the wallet.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        info!(address = %self.address, "Wallet disconnected");
    }

    /// Snapshot of all balances.
    pub async fn balances(&self) -> HashMap<String, Decimal> {
        self.balances.read().await.clone()
    }

    fn check_access(&self, amount: Decimal) -> Result<(), WalletError> {
        if !self.is_connected() {
            return Err(WalletError::Disconnected);
        }
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount(amount));
        }
        Ok(())
    }
}

#[async_trait]
impl BalanceSource for SimulatedWallet {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn balance(&self, currency: &str) -> Decimal {
        self.balances
            .read()
            .await
            .get(currency)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    async fn debit(&self, currency: &str, amount: Decimal) -> Result<(), WalletError> {
        self.check_access(amount)?;
        let mut balances = self.balances.write().await;
        let available = balances.get(currency).copied().unwrap_or(Decimal::ZERO);
        if amount > available {
            return Err(WalletError::InsufficientBalance {
                currency: currency.to_string(),
                available,
                required: amount,
            });
        }
        balances.insert(currency.to_string(), available - amount);
        debug!(currency, %amount, "Wallet debited");
        Ok(())
    }

    async fn credit(&self, currency: &str, amount: Decimal) -> Result<(), WalletError> {
        self.check_access(amount)?;
        let mut balances = self.balances.write().await;
        let current = balances.get(currency).copied().unwrap_or(Decimal::ZERO);
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| WalletError::BalanceOverflow {
                currency: currency.to_string(),
            })?;
        balances.insert(currency.to_string(), updated);
        debug!(currency, %amount, "Wallet credited");
        Ok(())
    }
}
