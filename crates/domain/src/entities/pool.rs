use crate::error::{PricingError, checked, require_non_negative, require_positive};
use crate::fees::{FeeBreakdown, FeeSchedule};
use crate::value_objects::exchange_rate::ExchangeRate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reserves and rates of a pool at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Local currency reserve.
    pub base_amount: Decimal,
    /// Stable quote asset reserve.
    pub quote_amount: Decimal,
    /// Local units per quote unit.
    pub exchange_rate: Decimal,
    /// Rate at the previous tick.
    pub previous_rate: Decimal,
}

impl PoolSnapshot {
    pub fn new(
        base_amount: Decimal,
        quote_amount: Decimal,
        exchange_rate: Decimal,
        previous_rate: Decimal,
    ) -> Self {
        Self {
            base_amount,
            quote_amount,
            exchange_rate,
            previous_rate,
        }
    }

    /// Checks reserves are non-negative and both rates positive.
    pub fn validate(&self) -> Result<(), PricingError> {
        require_non_negative(self.base_amount, "base_amount")?;
        require_non_negative(self.quote_amount, "quote_amount")?;
        require_positive(self.exchange_rate, "exchange_rate")?;
        require_positive(self.previous_rate, "previous_rate")?;
        Ok(())
    }

    /// Rolls the rate forward: the current rate becomes the previous one.
    pub fn with_rate(&self, next_rate: Decimal) -> Result<Self, PricingError> {
        require_positive(next_rate, "next_rate")?;
        Ok(Self {
            previous_rate: self.exchange_rate,
            exchange_rate: next_rate,
            ..*self
        })
    }

    /// Signed percentage change between the previous and current rate.
    pub fn rate_change_pct(&self) -> Result<Decimal, PricingError> {
        let current = ExchangeRate::try_new(self.exchange_rate, "exchange_rate")?;
        let previous = ExchangeRate::try_new(self.previous_rate, "previous_rate")?;
        current.change_pct_from(&previous)
    }

    /// Pool value expressed in the quote asset.
    pub fn total_liquidity(&self) -> Result<Decimal, PricingError> {
        let rate = ExchangeRate::try_new(self.exchange_rate, "exchange_rate")?;
        let base_in_quote = rate.to_quote(self.base_amount)?;
        checked(self.quote_amount.checked_add(base_in_quote), "total_liquidity")
    }
}

/// A currency pool with its metadata and current reserves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    /// Local currency code, e.g. NGN.
    pub base_currency: String,
    /// Stable asset code, e.g. USDT.
    pub quote_currency: String,
    /// Ideal local currency reserve used for the pool health fee.
    pub target_base_amount: Decimal,
    pub snapshot: PoolSnapshot,
    /// Annual yield shown to liquidity providers, in percent.
    pub apy: Decimal,
    pub volume_24h: Decimal,
    pub fees_24h: Decimal,
}

impl Pool {
    /// Creates a pool whose target reserve is its opening base reserve.
    pub fn new(
        id: impl Into<String>,
        base_currency: impl Into<String>,
        quote_currency: impl Into<String>,
        snapshot: PoolSnapshot,
    ) -> Self {
        Self {
            id: id.into(),
            base_currency: base_currency.into(),
            quote_currency: quote_currency.into(),
            target_base_amount: snapshot.base_amount,
            snapshot,
            apy: Decimal::ZERO,
            volume_24h: Decimal::ZERO,
            fees_24h: Decimal::ZERO,
        }
    }

    /// Sets the target base reserve.
    #[must_use]
    pub fn with_target(mut self, target_base_amount: Decimal) -> Self {
        self.target_base_amount = target_base_amount;
        self
    }

    /// Sets the advertised APY.
    #[must_use]
    pub fn with_apy(mut self, apy: Decimal) -> Self {
        self.apy = apy;
        self
    }

    /// Sets the rolling 24h volume and fees.
    #[must_use]
    pub fn with_activity(mut self, volume_24h: Decimal, fees_24h: Decimal) -> Self {
        self.volume_24h = volume_24h;
        self.fees_24h = fees_24h;
        self
    }

    /// Trading pair label, e.g. `NGN/USDT`.
    pub fn pair(&self) -> String {
        format!("{}/{}", self.base_currency, self.quote_currency)
    }

    /// Prices the pool's current dynamic fee against its own target.
    pub fn fee_breakdown(&self, schedule: &FeeSchedule) -> Result<FeeBreakdown, PricingError> {
        schedule.compute(
            self.snapshot.exchange_rate,
            self.snapshot.previous_rate,
            self.snapshot.base_amount,
            self.target_base_amount,
        )
    }

    /// Share of the pool, in percent, that a contribution of `amount` quote
    /// units would represent against the current total liquidity.
    pub fn contribution_share(&self, amount: Decimal) -> Result<Decimal, PricingError> {
        require_positive(amount, "amount")?;
        let liquidity = require_positive(self.snapshot.total_liquidity()?, "total_liquidity")?;
        checked(
            amount
                .checked_div(liquidity)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED)),
            "contribution_share",
        )
    }

    /// Expected daily earnings on `amount` quote units at the pool's APY.
    pub fn estimated_daily_earnings(&self, amount: Decimal) -> Result<Decimal, PricingError> {
        require_positive(amount, "amount")?;
        checked(
            amount
                .checked_mul(self.apy)
                .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
                .and_then(|v| v.checked_div(DAYS_PER_YEAR)),
            "daily_earnings",
        )
    }
}

const DAYS_PER_YEAR: Decimal = Decimal::from_parts(365, 0, 0, false, 0);

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ngn_pool() -> Pool {
        Pool::new(
            "ngn-usdt",
            "NGN",
            "USDT",
            PoolSnapshot::new(dec!(5000000), dec!(50000), dec!(1150), dec!(1000)),
        )
    }

    #[test]
    fn test_snapshot_validation() {
        assert!(ngn_pool().snapshot.validate().is_ok());
        assert!(PoolSnapshot::new(dec!(-1), dec!(0), dec!(1), dec!(1)).validate().is_err());
        assert!(PoolSnapshot::new(dec!(1), dec!(1), dec!(1), dec!(0)).validate().is_err());
    }

    #[test]
    fn test_with_rate_rolls_previous() {
        let next = ngn_pool().snapshot.with_rate(dec!(1162.5)).unwrap();
        assert_eq!(next.previous_rate, dec!(1150));
        assert_eq!(next.exchange_rate, dec!(1162.5));
        assert_eq!(next.base_amount, dec!(5000000));
        assert!(ngn_pool().snapshot.with_rate(dec!(0)).is_err());
    }

    #[test]
    fn test_liquidity_and_change() {
        let pool = ngn_pool();
        assert_eq!(pool.snapshot.rate_change_pct().unwrap(), dec!(15));
        assert_eq!(pool.pair(), "NGN/USDT");

        let eur = PoolSnapshot::new(dec!(95000), dec!(100000), dec!(0.95), dec!(0.94));
        assert_eq!(eur.total_liquidity().unwrap(), dec!(200000));
    }

    #[test]
    fn test_fee_uses_own_target() {
        let pool = ngn_pool().with_target(dec!(4000000));
        let fee = pool.fee_breakdown(&FeeSchedule::default()).unwrap();

        assert_eq!(fee.pool_imbalance, dec!(25));
        assert_eq!(fee.pool_health_fee, dec!(1));
        assert_eq!(fee.total_fee, dec!(3.75));
    }

    #[test]
    fn test_empty_pool_has_no_target() {
        let pool = Pool::new(
            "zar-usdt",
            "ZAR",
            "USDT",
            PoolSnapshot::new(dec!(0), dec!(0), dec!(18.2), dec!(18.2)),
        );
        assert!(pool.fee_breakdown(&FeeSchedule::default()).is_err());
        assert!(pool.contribution_share(dec!(100)).is_err());
    }

    #[test]
    fn test_contribution_estimates() {
        let eur = Pool::new(
            "eur-usdt",
            "EUR",
            "USDT",
            PoolSnapshot::new(dec!(95000), dec!(100000), dec!(0.95), dec!(0.94)),
        )
        .with_apy(dec!(18.25));

        // 200,000 USDT of liquidity.
        assert_eq!(eur.contribution_share(dec!(5000)).unwrap(), dec!(2.5));
        assert_eq!(eur.estimated_daily_earnings(dec!(10000)).unwrap(), dec!(5));
        assert!(eur.contribution_share(dec!(0)).is_err());
        assert!(eur.estimated_daily_earnings(dec!(-1)).is_err());
    }
}
