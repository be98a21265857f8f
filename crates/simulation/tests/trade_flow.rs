use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stablepool_domain::prelude::*;
use stablepool_simulation::prelude::*;
use std::sync::Arc;

#[test]
fn test_core_pipeline_matches_desk_arithmetic() {
    let pool = PoolSnapshot::new(dec!(5000000), dec!(50000), dec!(1150), dec!(1000));

    let fee = compute_dynamic_fee(
        pool.exchange_rate,
        pool.previous_rate,
        pool.base_amount,
        dec!(5000000),
        None,
    )
    .unwrap();
    let settlement =
        compute_trade_amount(dec!(100), pool.exchange_rate, fee.total_fee, TradeDirection::Sell)
            .unwrap();
    let next = apply_trade(
        &pool,
        dec!(100),
        settlement.local_amount,
        TradeDirection::Sell,
    )
    .unwrap();

    assert_eq!(fee.total_fee, dec!(2.75));
    assert_eq!(settlement.net_amount, dec!(111837.5));
    assert_eq!(next.base_amount, dec!(4885000));
    assert_eq!(next.quote_amount, dec!(50100));
}

#[tokio::test]
async fn test_concurrent_trades_never_lose_updates() {
    let desk = Arc::new(TradeDesk::new(DeskConfig::default()).unwrap());
    for pool in demo_pools() {
        desk.add_pool(pool).await.unwrap();
    }
    let wallet = Arc::new(
        SimulatedWallet::new("0xload")
            .with_balance("USDT", dec!(100000))
            .with_balance("KES", dec!(10000000)),
    );
    wallet.connect();

    let initial = desk.pool("kes-usdt").await.unwrap().snapshot;

    let mut handles = Vec::new();
    for i in 0..32u32 {
        let desk = Arc::clone(&desk);
        let wallet = Arc::clone(&wallet);
        handles.push(tokio::spawn(async move {
            let direction = if i % 2 == 0 {
                TradeDirection::Sell
            } else {
                TradeDirection::Buy
            };
            let amount = Decimal::from(10 + i);
            let quote = desk.quote("kes-usdt", amount, direction).await?;
            desk.execute(&quote, wallet.as_ref()).await
        }));
    }

    let mut executed = Vec::new();
    let mut stale = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(tx) => executed.push(tx),
            Err(DeskError::StaleQuote { .. }) => stale += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert!(!executed.is_empty());
    assert_eq!(executed.len() + stale, 32);
    assert_eq!(
        desk.version("kes-usdt").await,
        Some(executed.len() as u64)
    );

    // Replaying the executed trades on the initial snapshot reproduces the pool.
    let mut replay = initial;
    for tx in &executed {
        let local = tx.quote_amount * tx.exchange_rate;
        replay = apply_trade(&replay, tx.quote_amount, local, tx.direction).unwrap();
    }
    let current = desk.pool("kes-usdt").await.unwrap().snapshot;
    assert_eq!(current.base_amount, replay.base_amount);
    assert_eq!(current.quote_amount, replay.quote_amount);
}

#[tokio::test]
async fn test_requote_after_stale() {
    let desk = TradeDesk::new(DeskConfig::default()).unwrap();
    for pool in demo_pools() {
        desk.add_pool(pool).await.unwrap();
    }
    let wallet = demo_wallet();

    let quote = desk
        .quote("ghs-usdt", dec!(50), TradeDirection::Sell)
        .await
        .unwrap();
    let market = ScriptedMarket::new()
        .with_rates("ngn-usdt", vec![dec!(1150)])
        .with_rates("ghs-usdt", vec![dec!(15)])
        .with_rates("kes-usdt", vec![dec!(130)])
        .with_rates("eur-usdt", vec![dec!(0.95)]);
    desk.tick(&market).await.unwrap();

    assert!(matches!(
        desk.execute(&quote, &wallet).await,
        Err(DeskError::StaleQuote { .. })
    ));

    // 12.5 -> 15 is a 20% move: 1% volatility fee on top of the 2% base.
    let fresh = desk
        .quote("ghs-usdt", dec!(50), TradeDirection::Sell)
        .await
        .unwrap();
    assert_eq!(fresh.fee.volatility_fee, dec!(1));
    assert_eq!(fresh.fee.total_fee, dec!(3));
    assert_eq!(fresh.settlement.local_amount, dec!(750));
    assert_eq!(fresh.settlement.net_amount, dec!(727.5));

    let tx = desk.execute(&fresh, &wallet).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(wallet.balance("GHS").await, dec!(9227.5));
}

#[tokio::test]
async fn test_failing_market_leaves_pools_untouched() {
    let desk = TradeDesk::new(DeskConfig::default()).unwrap();
    for pool in demo_pools() {
        desk.add_pool(pool).await.unwrap();
    }
    let before = desk.pools().await;

    let partial = ScriptedMarket::new().with_rates("ngn-usdt", vec![dec!(1200)]);
    assert!(matches!(
        desk.tick(&partial).await,
        Err(DeskError::Market(MarketError::UnknownPool(_)))
    ));
    assert_eq!(desk.pools().await, before);
}
