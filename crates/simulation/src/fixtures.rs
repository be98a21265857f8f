//! Demo pools, providers and wallet used by the CLI and integration tests.

use crate::wallet::SimulatedWallet;
use rust_decimal::Decimal;
use stablepool_domain::entities::{LiquidityProvider, Pool, PoolSnapshot};

fn pool(
    id: &str,
    base_currency: &str,
    snapshot: PoolSnapshot,
    apy: Decimal,
    volume_24h: Decimal,
    fees_24h: Decimal,
) -> Pool {
    Pool::new(id, base_currency, "USDT", snapshot)
        .with_apy(apy)
        .with_activity(volume_24h, fees_24h)
}

/// The four demo currency pools, targets set to their opening reserves.
pub fn demo_pools() -> Vec<Pool> {
    vec![
        pool(
            "ngn-usdt",
            "NGN",
            PoolSnapshot::new(
                Decimal::new(5_000_000, 0),
                Decimal::new(50_000, 0),
                Decimal::new(1150, 0),
                Decimal::new(1000, 0),
            ),
            Decimal::new(245, 1),
            Decimal::new(2_500_000, 0),
            Decimal::new(15_000, 0),
        ),
        pool(
            "ghs-usdt",
            "GHS",
            PoolSnapshot::new(
                Decimal::new(750_000, 0),
                Decimal::new(62_500, 0),
                Decimal::new(125, 1),
                Decimal::new(12, 0),
            ),
            Decimal::new(182, 1),
            Decimal::new(890_000, 0),
            Decimal::new(8_500, 0),
        ),
        pool(
            "kes-usdt",
            "KES",
            PoolSnapshot::new(
                Decimal::new(8_500_000, 0),
                Decimal::new(65_000, 0),
                Decimal::new(130, 0),
                Decimal::new(128, 0),
            ),
            Decimal::new(218, 1),
            Decimal::new(1_200_000, 0),
            Decimal::new(12_000, 0),
        ),
        pool(
            "eur-usdt",
            "EUR",
            PoolSnapshot::new(
                Decimal::new(95_000, 0),
                Decimal::new(100_000, 0),
                Decimal::new(95, 2),
                Decimal::new(94, 2),
            ),
            Decimal::new(125, 1),
            Decimal::new(5_200_000, 0),
            Decimal::new(25_000, 0),
        ),
    ]
}

/// Liquidity providers of the NGN/USDT pool.
pub fn demo_providers() -> Vec<LiquidityProvider> {
    [
        ("0x742d35cc6634c0532925a3b8d433c4c8d8c0c4c8", 25_000, 284_750, 235),
        ("0x8ba1f109551bd432803012645ac136ddd64dba72", 15_000, 165_420, 141),
        ("0x123def456789abc123def456789abc123def4567", 50_000, 523_480, 470),
    ]
    .into_iter()
    .map(|(address, invested, earnings, share)| {
        LiquidityProvider::new(address, "ngn-usdt", "USDT").with_position(
            Decimal::new(invested, 0),
            Decimal::new(earnings, 2),
            Decimal::new(share, 1),
        )
    })
    .collect()
}

/// A connected demo wallet holding the quote asset and every local currency.
pub fn demo_wallet() -> SimulatedWallet {
    let wallet = SimulatedWallet::new("0x0b62e7acbfa9")
        .with_balance("USDT", Decimal::new(150_050, 2))
        .with_balance("NGN", Decimal::new(250_000, 0))
        .with_balance("GHS", Decimal::new(8_500, 0))
        .with_balance("KES", Decimal::new(15_000, 0))
        .with_balance("EUR", Decimal::new(1_000, 0));
    wallet.connect();
    wallet
}
