use crate::entities::pool::Pool;
use crate::error::{PricingError, checked, require_non_negative, require_positive};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(pub Uuid);

/// A liquidity provider's stake in a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityProvider {
    pub id: ProviderId,
    /// Wallet address of the provider.
    pub address: String,
    pub pool_id: String,
    /// Asset the stake is denominated in, e.g. USDT.
    pub currency: String,
    pub total_invested: Decimal,
    /// Fees and incentives earned so far.
    pub total_earnings: Decimal,
    /// Share of the pool in percent.
    pub share_percentage: Decimal,
    pub joined_at: DateTime<Utc>,
}

impl LiquidityProvider {
    /// Creates a provider with no stake yet.
    pub fn new(
        address: impl Into<String>,
        pool_id: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: ProviderId(Uuid::new_v4()),
            address: address.into(),
            pool_id: pool_id.into(),
            currency: currency.into(),
            total_invested: Decimal::ZERO,
            total_earnings: Decimal::ZERO,
            share_percentage: Decimal::ZERO,
            joined_at: Utc::now(),
        }
    }

    /// Sets an existing stake.
    #[must_use]
    pub fn with_position(mut self, invested: Decimal, earnings: Decimal, share: Decimal) -> Self {
        self.total_invested = invested;
        self.total_earnings = earnings;
        self.share_percentage = share;
        self
    }

    /// Adds `amount` quote units to the stake in `pool`.
    ///
    /// The share grows by what `amount` represents against the pool's
    /// liquidity before the deposit. Returns that added share.
    pub fn contribute(&mut self, pool: &Pool, amount: Decimal) -> Result<Decimal, PricingError> {
        if pool.id != self.pool_id {
            return Err(PricingError::invalid(
                "pool_id",
                format!("provider is in {}, not {}", self.pool_id, pool.id),
            ));
        }
        let added = pool.contribution_share(amount)?;
        let invested = checked(self.total_invested.checked_add(amount), "total_invested")?;
        let share = checked(self.share_percentage.checked_add(added), "share_percentage")?;

        self.total_invested = invested;
        self.share_percentage = share;
        Ok(added)
    }

    /// Credits earned fees.
    pub fn record_earnings(&mut self, amount: Decimal) -> Result<(), PricingError> {
        require_non_negative(amount, "earnings")?;
        self.total_earnings = checked(self.total_earnings.checked_add(amount), "total_earnings")?;
        Ok(())
    }

    /// Invested amount plus earnings.
    pub fn total_value(&self) -> Result<Decimal, PricingError> {
        checked(
            self.total_invested.checked_add(self.total_earnings),
            "total_value",
        )
    }

    /// Earnings as a percentage of the amount invested.
    pub fn total_return_pct(&self) -> Result<Decimal, PricingError> {
        let invested = require_positive(self.total_invested, "total_invested")?;
        checked(
            self.total_earnings
                .checked_div(invested)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED)),
            "total_return",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::pool::PoolSnapshot;
    use rust_decimal_macros::dec;

    fn eur_pool() -> Pool {
        Pool::new(
            "eur-usdt",
            "EUR",
            "USDT",
            PoolSnapshot::new(dec!(95000), dec!(100000), dec!(0.95), dec!(0.94)),
        )
    }

    #[test]
    fn test_value_and_return() {
        let lp = LiquidityProvider::new("0x742d", "ngn-usdt", "USDT").with_position(
            dec!(25000),
            dec!(2847.5),
            dec!(23.5),
        );

        assert_eq!(lp.total_value().unwrap(), dec!(27847.5));
        assert_eq!(lp.total_return_pct().unwrap(), dec!(11.39));
    }

    #[test]
    fn test_no_return_without_stake() {
        let lp = LiquidityProvider::new("0x742d", "eur-usdt", "USDT");
        assert!(lp.total_return_pct().is_err());
        assert_eq!(lp.total_value().unwrap(), dec!(0));
    }

    #[test]
    fn test_contribute_grows_stake() {
        let mut lp = LiquidityProvider::new("0x8ba1", "eur-usdt", "USDT");
        let added = lp.contribute(&eur_pool(), dec!(5000)).unwrap();

        assert_eq!(added, dec!(2.5));
        assert_eq!(lp.total_invested, dec!(5000));
        assert_eq!(lp.share_percentage, dec!(2.5));

        lp.record_earnings(dec!(125)).unwrap();
        assert_eq!(lp.total_return_pct().unwrap(), dec!(2.5));
        assert!(lp.record_earnings(dec!(-1)).is_err());
    }

    #[test]
    fn test_contribute_rejects_other_pool_and_bad_amount() {
        let mut lp = LiquidityProvider::new("0x8ba1", "ngn-usdt", "USDT");
        assert!(lp.contribute(&eur_pool(), dec!(100)).is_err());

        let mut lp = LiquidityProvider::new("0x8ba1", "eur-usdt", "USDT");
        assert!(lp.contribute(&eur_pool(), dec!(0)).is_err());
        assert_eq!(lp.total_invested, dec!(0));
    }
}
