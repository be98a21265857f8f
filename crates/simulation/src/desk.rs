//! Trade desk: sequences the pricing core against shared pool state.
//!
//! The desk owns every pool behind a single `RwLock` and stamps each pool with
//! a version that increases on every reserve or rate change. A quote records the
//! version it was priced at; executing a quote whose pool has moved on fails
//! with `DeskError::StaleQuote` instead of applying against stale reserves.

use crate::market::{MarketDataSource, MarketError};
use crate::wallet::{BalanceSource, WalletError};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stablepool_domain::entities::{Pool, Transaction};
use stablepool_domain::enums::{TradeDirection, TransactionStatus};
use stablepool_domain::error::{PricingError, TransactionError, checked};
use stablepool_domain::fees::{FeeBreakdown, FeeSchedule};
use stablepool_domain::reserves::apply_trade;
use stablepool_domain::settlement::Settlement;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Errors raised by the trade desk.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeskError {
    /// No pool with this id is registered.
    #[error("Unknown pool: {0}")]
    UnknownPool(String),
    /// A pool with this id is already registered.
    #[error("Pool {0} is already registered")]
    DuplicatePool(String),
    /// The pool changed after the quote was priced.
    #[error("Quote for {pool_id} is stale: priced at version {quoted}, pool is at {current}")]
    StaleQuote {
        /// Pool the quote belongs to.
        pool_id: String,
        /// Version the quote was priced at.
        quoted: u64,
        /// Current pool version.
        current: u64,
    },
    /// The quote is older than the configured lifetime.
    #[error("Quote for {0} has expired")]
    QuoteExpired(String),
    /// Pricing core rejected the trade.
    #[error(transparent)]
    Pricing(#[from] PricingError),
    /// Wallet rejected the trade.
    #[error(transparent)]
    Wallet(#[from] WalletError),
    /// Market data source failed.
    #[error(transparent)]
    Market(#[from] MarketError),
    /// Transaction lifecycle violation.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// Configuration for the trade desk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Fee schedule used for every quote.
    pub schedule: FeeSchedule,
    /// How long a quote stays executable, in seconds.
    pub quote_ttl_secs: u64,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            schedule: FeeSchedule::default(),
            quote_ttl_secs: 60,
        }
    }
}

impl DeskConfig {
    /// Sets the fee schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: FeeSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Sets the quote lifetime.
    #[must_use]
    pub fn with_quote_ttl(mut self, seconds: u64) -> Self {
        self.quote_ttl_secs = seconds;
        self
    }
}

/// A priced trade that has not been executed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub pool_id: String,
    /// Pool version the quote was priced at.
    pub version: u64,
    pub direction: TradeDirection,
    pub quote_amount: Decimal,
    pub exchange_rate: Decimal,
    pub base_currency: String,
    pub quote_currency: String,
    pub fee: FeeBreakdown,
    pub settlement: Settlement,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct PoolEntry {
    pool: Pool,
    version: u64,
}

/// Shared pool state plus the transaction log.
pub struct TradeDesk {
    config: DeskConfig,
    pools: Arc<RwLock<HashMap<String, PoolEntry>>>,
    ledger: Arc<RwLock<Vec<Transaction>>>,
}

impl TradeDesk {
    /// Creates an empty desk.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::Pricing` if the fee schedule is invalid.
    pub fn new(config: DeskConfig) -> Result<Self, DeskError> {
        config.schedule.validate()?;
        Ok(Self {
            config,
            pools: Arc::new(RwLock::new(HashMap::new())),
            ledger: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// Registers a pool.
    pub async fn add_pool(&self, pool: Pool) -> Result<(), DeskError> {
        pool.snapshot.validate()?;
        let mut pools = self.pools.write().await;
        if pools.contains_key(&pool.id) {
            return Err(DeskError::DuplicatePool(pool.id));
        }
        info!(pool = %pool.id, pair = %pool.pair(), "Pool registered");
        pools.insert(pool.id.clone(), PoolEntry { pool, version: 0 });
        Ok(())
    }

    /// Returns a copy of a pool.
    pub async fn pool(&self, pool_id: &str) -> Option<Pool> {
        self.pools.read().await.get(pool_id).map(|e| e.pool.clone())
    }

    /// Returns the current version of a pool.
    pub async fn version(&self, pool_id: &str) -> Option<u64> {
        self.pools.read().await.get(pool_id).map(|e| e.version)
    }

    /// Returns copies of all pools, ordered by id.
    pub async fn pools(&self) -> Vec<Pool> {
        let mut pools: Vec<Pool> = self
            .pools
            .read()
            .await
            .values()
            .map(|e| e.pool.clone())
            .collect();
        pools.sort_by(|a, b| a.id.cmp(&b.id));
        pools
    }

    /// Returns the executed transactions in order.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.ledger.read().await.clone()
    }

    /// Current fee breakdown of a pool.
    pub async fn fee(&self, pool_id: &str) -> Result<FeeBreakdown, DeskError> {
        let pools = self.pools.read().await;
        let entry = pools
            .get(pool_id)
            .ok_or_else(|| DeskError::UnknownPool(pool_id.to_string()))?;
        Ok(entry.pool.fee_breakdown(&self.config.schedule)?)
    }

    /// Prices a trade against the pool's current snapshot.
    pub async fn quote(
        &self,
        pool_id: &str,
        quote_amount: Decimal,
        direction: TradeDirection,
    ) -> Result<Quote, DeskError> {
        let pools = self.pools.read().await;
        let entry = pools
            .get(pool_id)
            .ok_or_else(|| DeskError::UnknownPool(pool_id.to_string()))?;
        let pool = &entry.pool;

        let fee = pool.fee_breakdown(&self.config.schedule)?;
        let settlement = self.config.schedule.settle(
            quote_amount,
            pool.snapshot.exchange_rate,
            fee.total_fee,
            direction,
        )?;

        debug!(
            pool = %pool_id,
            version = entry.version,
            %direction,
            %quote_amount,
            fee = %fee.total_fee,
            net = %settlement.net_amount,
            "Quote priced"
        );

        Ok(Quote {
            pool_id: pool_id.to_string(),
            version: entry.version,
            direction,
            quote_amount,
            exchange_rate: pool.snapshot.exchange_rate,
            base_currency: pool.base_currency.clone(),
            quote_currency: pool.quote_currency.clone(),
            fee,
            settlement,
            issued_at: Utc::now(),
        })
    }

    /// Executes a quote: checks it is current, moves wallet funds and applies
    /// the trade to the pool reserves.
    ///
    /// # Errors
    ///
    /// Fails without touching the pool or the wallet if the quote is stale or
    /// expired, the wallet is disconnected or short of funds, or the pool
    /// lacks liquidity. If the wallet refuses the credit after the debit went
    /// through, the debit is reversed and the pool is left as it was.
    pub async fn execute(
        &self,
        quote: &Quote,
        wallet: &dyn BalanceSource,
    ) -> Result<Transaction, DeskError> {
        if !wallet.is_connected() {
            return Err(WalletError::Disconnected.into());
        }
        let ttl = i64::try_from(self.config.quote_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        if Utc::now() - quote.issued_at > ttl {
            return Err(DeskError::QuoteExpired(quote.pool_id.clone()));
        }

        let mut pools = self.pools.write().await;
        let entry = pools
            .get_mut(&quote.pool_id)
            .ok_or_else(|| DeskError::UnknownPool(quote.pool_id.clone()))?;

        if entry.version != quote.version {
            warn!(
                pool = %quote.pool_id,
                quoted = quote.version,
                current = entry.version,
                "Rejected stale quote"
            );
            return Err(DeskError::StaleQuote {
                pool_id: quote.pool_id.clone(),
                quoted: quote.version,
                current: entry.version,
            });
        }

        // What the user gives up and what they get back.
        let (pay_currency, pay_amount, receive_currency, receive_amount) = match quote.direction {
            TradeDirection::Sell => (
                &quote.quote_currency,
                quote.quote_amount,
                &quote.base_currency,
                quote.settlement.net_amount,
            ),
            TradeDirection::Buy => (
                &quote.base_currency,
                quote.settlement.net_amount,
                &quote.quote_currency,
                quote.quote_amount,
            ),
        };

        if receive_amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount(receive_amount).into());
        }

        let available = wallet.balance(pay_currency).await;
        if available < pay_amount {
            warn!(
                currency = %pay_currency,
                %available,
                required = %pay_amount,
                "Rejected trade for insufficient balance"
            );
            return Err(WalletError::InsufficientBalance {
                currency: pay_currency.clone(),
                available,
                required: pay_amount,
            }
            .into());
        }

        let next = apply_trade(
            &entry.pool.snapshot,
            quote.quote_amount,
            quote.settlement.local_amount,
            quote.direction,
        )
        .inspect_err(|e| warn!(pool = %quote.pool_id, error = %e, "Rejected trade"))?;
        let volume_24h = checked(
            entry.pool.volume_24h.checked_add(quote.settlement.local_amount),
            "volume_24h",
        )?;
        let fees_24h = checked(
            entry.pool.fees_24h.checked_add(quote.settlement.fee_amount),
            "fees_24h",
        )?;

        wallet.debit(pay_currency, pay_amount).await?;
        if let Err(e) = wallet.credit(receive_currency, receive_amount).await {
            warn!(currency = %receive_currency, error = %e, "Credit refused, reversing debit");
            if let Err(refund) = wallet.credit(pay_currency, pay_amount).await {
                error!(
                    currency = %pay_currency,
                    amount = %pay_amount,
                    error = %refund,
                    "Failed to reverse debit"
                );
            }
            return Err(e.into());
        }

        entry.pool.snapshot = next;
        entry.pool.volume_24h = volume_24h;
        entry.pool.fees_24h = fees_24h;
        entry.version += 1;

        let mut tx = Transaction::new(
            quote.pool_id.clone(),
            quote.direction,
            quote.quote_amount,
            quote.exchange_rate,
            quote.fee.total_fee,
            &quote.settlement,
        );
        tx.transition(TransactionStatus::Processing)?;
        tx.transition(TransactionStatus::Completed)?;

        info!(
            pool = %quote.pool_id,
            version = entry.version,
            direction = %quote.direction,
            quote_amount = %quote.quote_amount,
            net = %quote.settlement.net_amount,
            fee = %quote.settlement.fee_amount,
            "Trade executed"
        );

        self.ledger.write().await.push(tx.clone());
        Ok(tx)
    }

    /// Rolls every pool's rate forward using `market`.
    ///
    /// All rates are fetched before any pool is updated, so a failing source
    /// leaves every pool unchanged.
    pub async fn tick(&self, market: &dyn MarketDataSource) -> Result<(), DeskError> {
        let mut pools = self.pools.write().await;

        let mut next_rates = Vec::with_capacity(pools.len());
        for (id, entry) in pools.iter() {
            let rate = market
                .next_rate(id, entry.pool.snapshot.exchange_rate)
                .await?;
            next_rates.push((id.clone(), entry.pool.snapshot.with_rate(rate)?));
        }

        for (id, snapshot) in next_rates {
            if let Some(entry) = pools.get_mut(&id) {
                debug!(
                    pool = %id,
                    previous = %snapshot.previous_rate,
                    current = %snapshot.exchange_rate,
                    "Rate updated"
                );
                entry.pool.snapshot = snapshot;
                entry.version += 1;
            }
        }
        Ok(())
    }
}
