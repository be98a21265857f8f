//! Simulated trading sessions.
//!
//! A session alternates market ticks with a batch of random trades routed
//! through the `TradeDesk`, the way the demo dashboard refreshes rates on a
//! timer while users trade.

use crate::desk::{DeskError, TradeDesk};
use crate::market::MarketDataSource;
use crate::wallet::BalanceSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use stablepool_domain::entities::Transaction;
use stablepool_domain::enums::TradeDirection;
use stablepool_domain::error::{PricingError, checked};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Configuration for a simulated session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Number of market ticks.
    pub ticks: usize,
    /// Trades attempted after each tick.
    pub trades_per_tick: usize,
    /// Smallest trade in quote units.
    pub min_trade: Decimal,
    /// Largest trade in quote units.
    pub max_trade: Decimal,
    /// Probability that a trade is a sell.
    pub sell_probability: f64,
    /// Seed for trade generation.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ticks: 10,
            trades_per_tick: 3,
            min_trade: Decimal::TEN,
            max_trade: Decimal::new(500, 0),
            sell_probability: 0.5,
            seed: 42,
        }
    }
}

impl SessionConfig {
    /// Sets the number of ticks.
    #[must_use]
    pub fn with_ticks(mut self, ticks: usize) -> Self {
        self.ticks = ticks;
        self
    }

    /// Sets the number of trades per tick.
    #[must_use]
    pub fn with_trades_per_tick(mut self, trades: usize) -> Self {
        self.trades_per_tick = trades;
        self
    }

    /// Sets the trade size range.
    #[must_use]
    pub fn with_trade_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.min_trade = min;
        self.max_trade = max;
        self
    }

    /// Sets the sell probability.
    #[must_use]
    pub fn with_sell_probability(mut self, p: f64) -> Self {
        self.sell_probability = p;
        self
    }

    /// Sets the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks the trade range and sell probability.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.min_trade <= Decimal::ZERO {
            return Err(PricingError::invalid("min_trade", "must be positive"));
        }
        if self.max_trade < self.min_trade {
            return Err(PricingError::invalid("max_trade", "must not be below min_trade"));
        }
        // NaN fails the range check.
        if !(0.0..=1.0).contains(&self.sell_probability) {
            return Err(PricingError::invalid(
                "sell_probability",
                format!("must be in [0, 1], got {}", self.sell_probability),
            ));
        }
        Ok(())
    }
}

/// Outcome of a session.
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub ticks: usize,
    /// Executed transactions in order.
    pub transactions: Vec<Transaction>,
    /// Reasons for rejected trades.
    pub rejections: Vec<String>,
}

impl SessionSummary {
    /// Number of trades attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.transactions.len() + self.rejections.len()
    }

    /// Fraction of attempted trades that executed.
    #[must_use]
    pub fn success_rate(&self) -> Decimal {
        if self.attempted() == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.transactions.len()) / Decimal::from(self.attempted())
    }

    /// Fee revenue per pool in local currency.
    pub fn fees_by_pool(&self) -> Result<BTreeMap<String, Decimal>, PricingError> {
        let mut fees = BTreeMap::new();
        for tx in &self.transactions {
            let total = fees.entry(tx.pool_id.clone()).or_insert(Decimal::ZERO);
            *total = checked(total.checked_add(tx.fee_amount), "fees_by_pool")?;
        }
        Ok(fees)
    }
}

/// Runs a session against `desk`.
///
/// Trade-level failures (stale quote, insufficient balance or liquidity) are
/// recorded as rejections; market failures and an invalid `config` abort the
/// session.
pub async fn run_session(
    desk: &TradeDesk,
    market: &dyn MarketDataSource,
    wallet: &dyn BalanceSource,
    config: &SessionConfig,
) -> Result<SessionSummary, DeskError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut summary = SessionSummary::default();

    let pool_ids: Vec<String> = desk.pools().await.into_iter().map(|p| p.id).collect();
    if pool_ids.is_empty() {
        return Ok(summary);
    }

    let min = config.min_trade.to_f64().unwrap_or(1.0);
    let max = config.max_trade.to_f64().unwrap_or(min);

    for step in 0..config.ticks {
        desk.tick(market).await?;
        summary.ticks += 1;

        for _ in 0..config.trades_per_tick {
            let pool_id = &pool_ids[rng.random_range(0..pool_ids.len())];
            let raw = if max > min { rng.random_range(min..max) } else { min };
            let amount = Decimal::from_f64(raw).unwrap_or(Decimal::ONE).round_dp(2);
            let direction = if rng.random_bool(config.sell_probability) {
                TradeDirection::Sell
            } else {
                TradeDirection::Buy
            };

            let outcome = match desk.quote(pool_id, amount, direction).await {
                Ok(quote) => desk.execute(&quote, wallet).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(tx) => summary.transactions.push(tx),
                Err(DeskError::Market(e)) => return Err(DeskError::Market(e)),
                Err(e) => {
                    debug!(step, pool = %pool_id, error = %e, "Trade rejected");
                    summary.rejections.push(format!("{pool_id} {direction} {amount}: {e}"));
                }
            }
        }
    }

    info!(
        ticks = summary.ticks,
        executed = summary.transactions.len(),
        rejected = summary.rejections.len(),
        "Session finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::DeskConfig;
    use crate::fixtures::{demo_pools, demo_wallet};
    use crate::market::{FixedMarket, JitterMarket};
    use rust_decimal_macros::dec;

    async fn demo_desk() -> TradeDesk {
        let desk = TradeDesk::new(DeskConfig::default()).unwrap();
        for pool in demo_pools() {
            desk.add_pool(pool).await.unwrap();
        }
        desk
    }

    #[tokio::test]
    async fn test_session_counts() {
        let desk = demo_desk().await;
        let wallet = demo_wallet();
        let config = SessionConfig::default()
            .with_ticks(4)
            .with_trades_per_tick(5)
            .with_trade_range(dec!(1), dec!(20));

        let summary = run_session(&desk, &FixedMarket, &wallet, &config)
            .await
            .unwrap();

        assert_eq!(summary.ticks, 4);
        assert_eq!(summary.attempted(), 20);
        assert_eq!(desk.transactions().await.len(), summary.transactions.len());
    }

    #[tokio::test]
    async fn test_session_keeps_reserves_non_negative() {
        let desk = demo_desk().await;
        let wallet = demo_wallet();
        let market = JitterMarket::new(0.05, 3).unwrap();
        let config = SessionConfig::default().with_ticks(20).with_seed(11);

        run_session(&desk, &market, &wallet, &config).await.unwrap();

        for pool in desk.pools().await {
            assert!(pool.snapshot.base_amount >= Decimal::ZERO);
            assert!(pool.snapshot.quote_amount >= Decimal::ZERO);
        }
        for tx in desk.transactions().await {
            assert!(tx.fee_percent <= dec!(8));
        }
    }

    #[test]
    fn test_summary_stats() {
        let summary = SessionSummary {
            ticks: 1,
            transactions: Vec::new(),
            rejections: vec!["x".to_string()],
        };
        assert_eq!(summary.attempted(), 1);
        assert_eq!(summary.success_rate(), dec!(0));
        assert!(summary.fees_by_pool().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_aborts() {
        let desk = demo_desk().await;
        let wallet = demo_wallet();

        for config in [
            SessionConfig::default().with_sell_probability(f64::NAN),
            SessionConfig::default().with_sell_probability(1.5),
            SessionConfig::default().with_trade_range(dec!(50), dec!(10)),
            SessionConfig::default().with_trade_range(dec!(0), dec!(10)),
        ] {
            assert!(matches!(
                run_session(&desk, &FixedMarket, &wallet, &config).await,
                Err(DeskError::Pricing(PricingError::InvalidInput { .. }))
            ));
        }
        assert!(desk.transactions().await.is_empty());
    }

    #[test]
    fn test_fees_by_pool_overflow() {
        let tx = |fee| {
            let settlement = stablepool_domain::settlement::Settlement {
                local_amount: fee,
                fee_amount: fee,
                net_amount: fee,
            };
            Transaction::new("ngn-usdt", TradeDirection::Sell, dec!(1), dec!(1), dec!(1), &settlement)
        };
        let summary = SessionSummary {
            ticks: 1,
            transactions: vec![tx(dec!(2)), tx(dec!(3))],
            rejections: Vec::new(),
        };
        assert_eq!(summary.fees_by_pool().unwrap()["ngn-usdt"], dec!(5));

        let huge = SessionSummary {
            transactions: vec![tx(Decimal::MAX), tx(Decimal::MAX)],
            ..summary
        };
        assert!(huge.fees_by_pool().is_err());
    }
}
