use crate::error::{PricingError, checked, require_positive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Local-currency units per one unit of the quote asset. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub value: Decimal,
}

impl ExchangeRate {
    /// Creates a rate, rejecting zero and negative values.
    pub fn try_new(value: Decimal, field: &'static str) -> Result<Self, PricingError> {
        Ok(Self {
            value: require_positive(value, field)?,
        })
    }

    /// Signed percentage change from `previous` to `self`.
    pub fn change_pct_from(&self, previous: &ExchangeRate) -> Result<Decimal, PricingError> {
        let delta = checked(self.value.checked_sub(previous.value), "rate_change")?;
        let ratio = checked(delta.checked_div(previous.value), "rate_change")?;
        checked(ratio.checked_mul(Decimal::ONE_HUNDRED), "rate_change")
    }

    /// Converts a quote-asset amount into local currency.
    pub fn to_local(&self, quote_amount: Decimal) -> Result<Decimal, PricingError> {
        checked(quote_amount.checked_mul(self.value), "local_amount")
    }

    /// Converts a local-currency amount into the quote asset.
    pub fn to_quote(&self, local_amount: Decimal) -> Result<Decimal, PricingError> {
        checked(local_amount.checked_div(self.value), "quote_amount")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rejects_non_positive() {
        assert!(ExchangeRate::try_new(dec!(0), "rate").is_err());
        assert!(ExchangeRate::try_new(dec!(-1150), "rate").is_err());
        assert!(ExchangeRate::try_new(dec!(0.95), "rate").is_ok());
    }

    #[test]
    fn test_change_pct() {
        let current = ExchangeRate::try_new(dec!(1150), "current").unwrap();
        let previous = ExchangeRate::try_new(dec!(1000), "previous").unwrap();
        assert_eq!(current.change_pct_from(&previous).unwrap(), dec!(15));
        assert_eq!(previous.change_pct_from(&current).unwrap().round_dp(4), dec!(-13.0435));
    }

    #[test]
    fn test_conversions() {
        let rate = ExchangeRate::try_new(dec!(12.5), "rate").unwrap();
        assert_eq!(rate.to_local(dec!(100)).unwrap(), dec!(1250));
        assert_eq!(rate.to_quote(dec!(1250)).unwrap(), dec!(100));
    }
}
