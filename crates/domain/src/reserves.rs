//! Applies a completed trade to pool reserves.

use crate::entities::pool::PoolSnapshot;
use crate::enums::{Reserve, TradeDirection};
use crate::error::{PricingError, checked, require_positive};
use rust_decimal::Decimal;
use tracing::debug;

/// Returns the pool snapshot after a trade, leaving the input untouched.
///
/// A sell moves `quote_amount` into the pool and `local_amount` out of it;
/// a buy does the opposite. Fees never touch the reserves.
///
/// # Errors
///
/// Returns `PricingError::InvalidInput` for an invalid snapshot or a
/// non-positive trade amount, and `PricingError::InsufficientLiquidity` if
/// either reserve would go negative.
pub fn apply_trade(
    pool: &PoolSnapshot,
    quote_amount: Decimal,
    local_amount: Decimal,
    direction: TradeDirection,
) -> Result<PoolSnapshot, PricingError> {
    pool.validate()?;
    require_positive(quote_amount, "quote_amount")?;
    require_positive(local_amount, "local_amount")?;

    let (base_amount, quote_reserve) = match direction {
        TradeDirection::Sell => (
            withdraw(pool.base_amount, local_amount, Reserve::Base)?,
            checked(pool.quote_amount.checked_add(quote_amount), "quote_amount")?,
        ),
        TradeDirection::Buy => (
            checked(pool.base_amount.checked_add(local_amount), "base_amount")?,
            withdraw(pool.quote_amount, quote_amount, Reserve::Quote)?,
        ),
    };

    debug!(
        %direction,
        base_before = %pool.base_amount,
        base_after = %base_amount,
        quote_before = %pool.quote_amount,
        quote_after = %quote_reserve,
        "Applied trade to reserves"
    );

    Ok(PoolSnapshot {
        base_amount,
        quote_amount: quote_reserve,
        ..*pool
    })
}

fn withdraw(
    available: Decimal,
    required: Decimal,
    reserve: Reserve,
) -> Result<Decimal, PricingError> {
    if required > available {
        return Err(PricingError::InsufficientLiquidity {
            reserve,
            available,
            required,
        });
    }
    Ok(available - required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::compute_trade_amount;
    use rust_decimal_macros::dec;

    fn pool() -> PoolSnapshot {
        PoolSnapshot::new(dec!(5000000), dec!(50000), dec!(1150), dec!(1000))
    }

    #[test]
    fn test_sell_into_pool() {
        let next = apply_trade(&pool(), dec!(100), dec!(115000), TradeDirection::Sell).unwrap();

        assert_eq!(next.base_amount, dec!(4885000));
        assert_eq!(next.quote_amount, dec!(50100));
        assert_eq!(next.exchange_rate, dec!(1150));
        assert_eq!(next.previous_rate, dec!(1000));
    }

    #[test]
    fn test_buy_from_pool() {
        let next = apply_trade(&pool(), dec!(100), dec!(115000), TradeDirection::Buy).unwrap();

        assert_eq!(next.base_amount, dec!(5115000));
        assert_eq!(next.quote_amount, dec!(49900));
    }

    #[test]
    fn test_input_not_mutated() {
        let before = pool();
        let _ = apply_trade(&before, dec!(100), dec!(115000), TradeDirection::Sell).unwrap();
        assert_eq!(before, pool());
    }

    #[test]
    fn test_fee_free_round_trip() {
        let start = pool();
        let sell =
            compute_trade_amount(dec!(250), start.exchange_rate, dec!(0), TradeDirection::Sell)
                .unwrap();
        let mid = apply_trade(&start, dec!(250), sell.local_amount, TradeDirection::Sell).unwrap();
        let back = apply_trade(&mid, dec!(250), sell.local_amount, TradeDirection::Buy).unwrap();

        assert_eq!(back, start);
    }

    #[test]
    fn test_conserves_traded_amounts() {
        let start = pool();
        let next = apply_trade(&start, dec!(42.5), dec!(48875), TradeDirection::Sell).unwrap();

        assert_eq!(start.base_amount - next.base_amount, dec!(48875));
        assert_eq!(next.quote_amount - start.quote_amount, dec!(42.5));
    }

    #[test]
    fn test_insufficient_liquidity() {
        let result = apply_trade(&pool(), dec!(5000), dec!(5750000), TradeDirection::Sell);
        assert_eq!(
            result,
            Err(PricingError::InsufficientLiquidity {
                reserve: Reserve::Base,
                available: dec!(5000000),
                required: dec!(5750000),
            })
        );

        let result = apply_trade(&pool(), dec!(50000.01), dec!(1), TradeDirection::Buy);
        assert!(matches!(
            result,
            Err(PricingError::InsufficientLiquidity {
                reserve: Reserve::Quote,
                ..
            })
        ));
    }

    #[test]
    fn test_drain_to_zero_allowed() {
        let next = apply_trade(&pool(), dec!(50000), dec!(57500000), TradeDirection::Buy).unwrap();
        assert_eq!(next.quote_amount, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_invalid_trade() {
        assert!(apply_trade(&pool(), dec!(0), dec!(1), TradeDirection::Sell).is_err());
        assert!(apply_trade(&pool(), dec!(1), dec!(-1), TradeDirection::Buy).is_err());

        let broken = PoolSnapshot::new(dec!(-1), dec!(10), dec!(1), dec!(1));
        assert!(apply_trade(&broken, dec!(1), dec!(1), TradeDirection::Buy).is_err());
    }
}
