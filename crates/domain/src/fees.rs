//! Dynamic fee engine.
//!
//! The trading fee is built from three parts:
//! - a fixed base fee,
//! - a volatility component proportional to the rate change since the last tick,
//! - a pool health component stepped by how far the local reserve sits from its target.
//!
//! The sum is clamped to the schedule's cap.

use crate::error::{PricingError, checked, require_non_negative, require_positive};
use crate::value_objects::exchange_rate::ExchangeRate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Default base fee in percent.
pub const DEFAULT_BASE_FEE: Decimal = Decimal::TWO;
/// Default upper bound on the total fee in percent.
pub const DEFAULT_FEE_CAP: Decimal = Decimal::from_parts(8, 0, 0, false, 0);
/// No fee may exceed the traded amount.
pub const MAX_FEE: Decimal = Decimal::ONE_HUNDRED;

/// Parameters of the dynamic fee formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Fixed floor fee in percent.
    pub base_fee: Decimal,
    /// Maximum total fee in percent.
    pub fee_cap: Decimal,
    /// Rate change (in percent points) that adds one `volatility_increment`.
    pub volatility_step: Decimal,
    /// Fee added per `volatility_step` of rate change.
    pub volatility_increment: Decimal,
    /// Imbalance above which the moderate pool health fee applies.
    pub moderate_imbalance: Decimal,
    /// Fee charged for moderate imbalance.
    pub moderate_imbalance_fee: Decimal,
    /// Imbalance above which the severe pool health fee applies.
    pub severe_imbalance: Decimal,
    /// Fee charged for severe imbalance.
    pub severe_imbalance_fee: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            base_fee: DEFAULT_BASE_FEE,
            fee_cap: DEFAULT_FEE_CAP,
            volatility_step: Decimal::TEN,
            volatility_increment: Decimal::new(5, 1), // 0.5
            moderate_imbalance: Decimal::new(20, 0),
            moderate_imbalance_fee: Decimal::ONE,
            severe_imbalance: Decimal::new(40, 0),
            severe_imbalance_fee: Decimal::TWO,
        }
    }
}

impl FeeSchedule {
    /// Sets the base fee.
    #[must_use]
    pub fn with_base_fee(mut self, base_fee: Decimal) -> Self {
        self.base_fee = base_fee;
        self
    }

    /// Sets the fee cap.
    #[must_use]
    pub fn with_fee_cap(mut self, fee_cap: Decimal) -> Self {
        self.fee_cap = fee_cap;
        self
    }

    /// Sets the volatility step and the fee added per step.
    #[must_use]
    pub fn with_volatility(mut self, step: Decimal, increment: Decimal) -> Self {
        self.volatility_step = step;
        self.volatility_increment = increment;
        self
    }

    /// Sets both imbalance tiers.
    #[must_use]
    pub fn with_imbalance_tiers(
        mut self,
        moderate: Decimal,
        moderate_fee: Decimal,
        severe: Decimal,
        severe_fee: Decimal,
    ) -> Self {
        self.moderate_imbalance = moderate;
        self.moderate_imbalance_fee = moderate_fee;
        self.severe_imbalance = severe;
        self.severe_imbalance_fee = severe_fee;
        self
    }

    /// Checks that the schedule yields bounded, monotonic fees.
    pub fn validate(&self) -> Result<(), PricingError> {
        require_non_negative(self.base_fee, "base_fee")?;
        require_non_negative(self.fee_cap, "fee_cap")?;
        if self.base_fee > MAX_FEE {
            return Err(PricingError::invalid(
                "base_fee",
                format!("{} exceeds {MAX_FEE}%", self.base_fee),
            ));
        }
        if self.fee_cap > MAX_FEE {
            return Err(PricingError::invalid(
                "fee_cap",
                format!("{} exceeds {MAX_FEE}%", self.fee_cap),
            ));
        }
        require_positive(self.volatility_step, "volatility_step")?;
        require_non_negative(self.volatility_increment, "volatility_increment")?;
        require_non_negative(self.moderate_imbalance, "moderate_imbalance")?;
        require_non_negative(self.moderate_imbalance_fee, "moderate_imbalance_fee")?;
        if self.severe_imbalance < self.moderate_imbalance {
            return Err(PricingError::invalid(
                "severe_imbalance",
                "must not be below the moderate threshold",
            ));
        }
        if self.severe_imbalance_fee < self.moderate_imbalance_fee {
            return Err(PricingError::invalid(
                "severe_imbalance_fee",
                "must not be below the moderate fee",
            ));
        }
        Ok(())
    }

    /// Computes the fee breakdown for a pool.
    ///
    /// # Arguments
    ///
    /// * `current_rate` - Current local units per quote unit
    /// * `previous_rate` - Rate at the previous tick
    /// * `current_pool_amount` - Local-currency reserve
    /// * `target_pool_amount` - Ideal local-currency reserve
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidInput` for non-positive rates or target,
    /// a negative reserve, or an invalid schedule.
    pub fn compute(
        &self,
        current_rate: Decimal,
        previous_rate: Decimal,
        current_pool_amount: Decimal,
        target_pool_amount: Decimal,
    ) -> Result<FeeBreakdown, PricingError> {
        self.validate()?;
        let current = ExchangeRate::try_new(current_rate, "current_rate")?;
        let previous = ExchangeRate::try_new(previous_rate, "previous_rate")?;
        require_non_negative(current_pool_amount, "current_pool_amount")?;
        require_positive(target_pool_amount, "target_pool_amount")?;

        let rate_change_percentage = current.change_pct_from(&previous)?.abs();
        let volatility_fee = checked(
            rate_change_percentage
                .checked_div(self.volatility_step)
                .and_then(|steps| steps.checked_mul(self.volatility_increment)),
            "volatility_fee",
        )?;

        let deviation = (current_pool_amount - target_pool_amount).abs();
        let pool_imbalance = checked(
            deviation
                .checked_div(target_pool_amount)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED)),
            "pool_imbalance",
        )?;
        let pool_health_fee = self.pool_health_fee(pool_imbalance);

        let uncapped = checked(
            self.base_fee
                .checked_add(volatility_fee)
                .and_then(|sum| sum.checked_add(pool_health_fee)),
            "total_fee",
        )?;
        let total_fee = uncapped.min(self.fee_cap);

        trace!(
            %rate_change_percentage,
            %pool_imbalance,
            %uncapped,
            %total_fee,
            "Computed dynamic fee"
        );

        Ok(FeeBreakdown {
            base_fee: self.base_fee,
            volatility_fee,
            pool_health_fee,
            total_fee,
            rate_change_percentage,
            pool_imbalance,
        })
    }

    /// Stepped pool health fee for a given imbalance percentage.
    #[must_use]
    pub fn pool_health_fee(&self, pool_imbalance: Decimal) -> Decimal {
        if pool_imbalance > self.severe_imbalance {
            self.severe_imbalance_fee
        } else if pool_imbalance > self.moderate_imbalance {
            self.moderate_imbalance_fee
        } else {
            Decimal::ZERO
        }
    }
}

/// Components of a dynamic fee, all in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Fixed floor from the schedule.
    pub base_fee: Decimal,
    /// Component driven by the rate change.
    pub volatility_fee: Decimal,
    /// Stepped component driven by the reserve imbalance.
    pub pool_health_fee: Decimal,
    /// Sum of the three components, clamped to the cap.
    pub total_fee: Decimal,
    /// Absolute % change between current and previous rate.
    pub rate_change_percentage: Decimal,
    /// Absolute % deviation of the reserve from its target.
    pub pool_imbalance: Decimal,
}

impl FeeBreakdown {
    /// Sum of the components before the cap was applied.
    #[must_use]
    pub fn uncapped_total(&self) -> Decimal {
        self.base_fee
            .saturating_add(self.volatility_fee)
            .saturating_add(self.pool_health_fee)
    }

    /// Returns true if the cap reduced the total.
    #[must_use]
    pub fn is_capped(&self) -> bool {
        self.uncapped_total() > self.total_fee
    }
}

/// Computes the dynamic fee with the default schedule.
///
/// `base_fee` overrides the default 2% floor when given.
pub fn compute_dynamic_fee(
    current_rate: Decimal,
    previous_rate: Decimal,
    current_pool_amount: Decimal,
    target_pool_amount: Decimal,
    base_fee: Option<Decimal>,
) -> Result<FeeBreakdown, PricingError> {
    let schedule = FeeSchedule::default().with_base_fee(base_fee.unwrap_or(DEFAULT_BASE_FEE));
    schedule.compute(
        current_rate,
        previous_rate,
        current_pool_amount,
        target_pool_amount,
    )
}
