//! Market data sources that drive pool exchange rates.
//!
//! The desk never invents rates itself: every tick asks a `MarketDataSource`
//! for the next rate of each pool. Tests use `ScriptedMarket`, the demo uses
//! `JitterMarket`.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

/// Errors raised by market data sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    /// The source has no data for the pool.
    #[error("No market data for pool {0}")]
    UnknownPool(String),
    /// The source produced a rate the pricing core would reject.
    #[error("Invalid rate {rate} for pool {pool_id}")]
    InvalidRate {
        /// Pool the rate was produced for.
        pool_id: String,
        /// Offending rate.
        rate: Decimal,
    },
    /// The source was configured with unusable parameters.
    #[error("Invalid market configuration: {0}")]
    InvalidConfig(String),
}

/// Supplies the next exchange rate of a pool.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Returns the rate that follows `current_rate` for `pool_id`.
    async fn next_rate(&self, pool_id: &str, current_rate: Decimal) -> Result<Decimal, MarketError>;
}

/// Market whose rates never move.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedMarket;

#[async_trait]
impl MarketDataSource for FixedMarket {
    async fn next_rate(&self, _pool_id: &str, current_rate: Decimal) -> Result<Decimal, MarketError> {
        Ok(current_rate)
    }
}

/// Market replaying a fixed sequence of rates per pool.
///
/// Once a pool's sequence is exhausted its last rate repeats.
pub struct ScriptedMarket {
    rates: Mutex<HashMap<String, Vec<Decimal>>>,
}

impl ScriptedMarket {
    /// Creates an empty scripted market.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rates: Mutex::new(HashMap::new()),
        }
    }

    /// Adds the rate sequence for a pool.
    #[must_use]
    pub fn with_rates(mut self, pool_id: impl Into<String>, rates: Vec<Decimal>) -> Self {
        let mut sequence = rates;
        sequence.reverse();
        self.rates.get_mut().insert(pool_id.into(), sequence);
        self
    }
}

impl Default for ScriptedMarket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataSource for ScriptedMarket {
    async fn next_rate(&self, pool_id: &str, current_rate: Decimal) -> Result<Decimal, MarketError> {
        let mut rates = self.rates.lock().await;
        let sequence = rates
            .get_mut(pool_id)
            .ok_or_else(|| MarketError::UnknownPool(pool_id.to_string()))?;

        let next = match sequence.len() {
            0 => current_rate,
            1 => sequence[0],
            _ => sequence.pop().unwrap_or(current_rate),
        };

        if next <= Decimal::ZERO {
            return Err(MarketError::InvalidRate {
                pool_id: pool_id.to_string(),
                rate: next,
            });
        }
        Ok(next)
    }
}

/// Random-walk market: `rate * (1 + u * volatility)` with `u` uniform in `[-1, 1)`.
pub struct JitterMarket {
    /// Maximum relative move per tick (0.02 = 2%).
    pub volatility: f64,
    /// Simulated response time per request.
    pub latency: Duration,
    rng: Mutex<StdRng>,
}

impl JitterMarket {
    /// Default per-tick volatility of the dashboard feed.
    pub const DEFAULT_VOLATILITY: f64 = 0.02;

    /// Creates a seeded jitter market.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidConfig` unless `0 <= volatility < 1`.
    pub fn new(volatility: f64, seed: u64) -> Result<Self, MarketError> {
        if !(0.0..1.0).contains(&volatility) {
            return Err(MarketError::InvalidConfig(format!(
                "volatility must be in [0, 1), got {volatility}"
            )));
        }
        Ok(Self {
            volatility,
            latency: Duration::ZERO,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        })
    }

    /// Sets the simulated latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl MarketDataSource for JitterMarket {
    async fn next_rate(&self, pool_id: &str, current_rate: Decimal) -> Result<Decimal, MarketError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let u: f64 = self.rng.lock().await.random_range(-1.0..1.0);
        let factor = Decimal::from_f64(1.0 + u * self.volatility).unwrap_or(Decimal::ONE);
        let next = current_rate
            .checked_mul(factor)
            .map(|rate| rate.round_dp(6))
            .unwrap_or(Decimal::ZERO);

        if next <= Decimal::ZERO {
            return Err(MarketError::InvalidRate {
                pool_id: pool_id.to_string(),
                rate: next,
            });
        }
        Ok(next)
    }
}
