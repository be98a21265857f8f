use crate::error::{PricingError, checked};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A percentage expressed in percent points (2.75 means 2.75%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percentage(pub Decimal);

impl Percentage {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Checks that the percentage lies in `[0, cap]`.
    pub fn within(self, cap: Decimal, field: &'static str) -> Result<Self, PricingError> {
        if self.0 < Decimal::ZERO || self.0 > cap {
            return Err(PricingError::invalid(
                field,
                format!("{} is outside [0, {cap}]", self.0),
            ));
        }
        Ok(self)
    }

    /// Applies the percentage to an amount: `amount * pct / 100`.
    pub fn of(&self, amount: Decimal, field: &'static str) -> Result<Decimal, PricingError> {
        let scaled = checked(amount.checked_mul(self.0), field)?;
        checked(scaled.checked_div(Decimal::ONE_HUNDRED), field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_within_bounds() {
        assert!(Percentage::new(dec!(0)).within(dec!(8), "fee").is_ok());
        assert!(Percentage::new(dec!(8)).within(dec!(8), "fee").is_ok());
        assert!(Percentage::new(dec!(8.01)).within(dec!(8), "fee").is_err());
        assert!(Percentage::new(dec!(-0.5)).within(dec!(8), "fee").is_err());
    }

    #[test]
    fn test_of_amount() {
        let fee = Percentage::new(dec!(2.75));
        assert_eq!(fee.of(dec!(115000), "fee_amount").unwrap(), dec!(3162.5));
        assert!(Percentage::new(Decimal::MAX).of(Decimal::MAX, "fee_amount").is_err());
    }
}
