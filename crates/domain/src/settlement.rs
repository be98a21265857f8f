//! Trade settlement: local-currency amount, fee and net amount for a proposed trade.

use crate::enums::TradeDirection;
use crate::error::{PricingError, checked, require_positive};
use crate::fees::{DEFAULT_FEE_CAP, FeeSchedule, MAX_FEE};
use crate::value_objects::exchange_rate::ExchangeRate;
use crate::value_objects::percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Local-currency amounts resulting from a priced trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Quote amount converted at the current rate, before fee.
    pub local_amount: Decimal,
    /// Fee charged, in local currency.
    pub fee_amount: Decimal,
    /// What the user receives (sell) or pays (buy).
    pub net_amount: Decimal,
}

/// Settles a trade with the default fee cap.
///
/// # Arguments
///
/// * `quote_amount` - Amount of the quote asset traded
/// * `exchange_rate` - Local units per quote unit
/// * `fee_percent` - Fee in percent, within `[0, 8]`
/// * `direction` - `Sell` converts quote into local currency, `Buy` the reverse
///
/// # Errors
///
/// Returns `PricingError::InvalidInput` for a non-positive amount or rate, or
/// a fee outside the allowed range.
pub fn compute_trade_amount(
    quote_amount: Decimal,
    exchange_rate: Decimal,
    fee_percent: Decimal,
    direction: TradeDirection,
) -> Result<Settlement, PricingError> {
    settle_with_cap(
        quote_amount,
        exchange_rate,
        fee_percent,
        direction,
        DEFAULT_FEE_CAP,
    )
}

impl FeeSchedule {
    /// Settles a trade, bounding the fee by this schedule's cap.
    ///
    /// The fee is never allowed above 100%, whatever the cap, so a sell
    /// cannot settle to a negative net amount.
    pub fn settle(
        &self,
        quote_amount: Decimal,
        exchange_rate: Decimal,
        fee_percent: Decimal,
        direction: TradeDirection,
    ) -> Result<Settlement, PricingError> {
        settle_with_cap(quote_amount, exchange_rate, fee_percent, direction, self.fee_cap)
    }
}

fn settle_with_cap(
    quote_amount: Decimal,
    exchange_rate: Decimal,
    fee_percent: Decimal,
    direction: TradeDirection,
    fee_cap: Decimal,
) -> Result<Settlement, PricingError> {
    require_positive(quote_amount, "quote_amount")?;
    let rate = ExchangeRate::try_new(exchange_rate, "exchange_rate")?;
    let fee = Percentage::new(fee_percent).within(fee_cap.min(MAX_FEE), "fee_percent")?;

    let local_amount = rate.to_local(quote_amount)?;
    let fee_amount = fee.of(local_amount, "fee_amount")?;
    let net_amount = match direction {
        TradeDirection::Sell => local_amount - fee_amount,
        TradeDirection::Buy => checked(local_amount.checked_add(fee_amount), "net_amount")?,
    };

    Ok(Settlement {
        local_amount,
        fee_amount,
        net_amount,
    })
}
