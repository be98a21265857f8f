//! Command Line Interface for the Stablepool pricing engine.
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use rust_decimal::Decimal;
use stablepool_domain::prelude::*;
use stablepool_simulation::prelude::*;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser)]
#[command(name = "stablepool")]
#[command(about = "Dynamic fee and settlement engine for P2P fiat/stablecoin pools", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Base fee in percent (overrides STABLEPOOL_BASE_FEE)
    #[arg(long, global = true)]
    base_fee: Option<Decimal>,

    /// Fee cap in percent (overrides STABLEPOOL_FEE_CAP)
    #[arg(long, global = true)]
    fee_cap: Option<Decimal>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the demo pools with their current fee
    Pools,
    /// Compute a dynamic fee breakdown
    Fee {
        /// Current exchange rate (local units per quote unit)
        #[arg(long)]
        current_rate: Decimal,

        /// Previous exchange rate
        #[arg(long)]
        previous_rate: Decimal,

        /// Local currency reserve
        #[arg(long)]
        pool_amount: Decimal,

        /// Target local currency reserve
        #[arg(long)]
        target_amount: Decimal,
    },
    /// Price a trade against a demo pool
    Quote {
        /// Pool id (e.g., ngn-usdt)
        #[arg(short, long, default_value = "ngn-usdt")]
        pool: String,

        /// Amount of the quote asset
        #[arg(short, long)]
        amount: Decimal,

        /// buy or sell
        #[arg(short, long, default_value = "sell")]
        direction: TradeDirection,
    },
    /// Estimate the pool share and earnings of a liquidity contribution
    Contribute {
        /// Pool id (e.g., ngn-usdt)
        #[arg(short, long, default_value = "ngn-usdt")]
        pool: String,

        /// Amount of the quote asset to contribute
        #[arg(short, long)]
        amount: Decimal,
    },
    /// Show the demo liquidity providers' positions
    Portfolio,
    /// Run a simulated trading session on the demo pools
    Simulate {
        /// Number of market ticks
        #[arg(short, long, default_value_t = 10)]
        ticks: usize,

        /// Trades attempted per tick
        #[arg(long, default_value_t = 3)]
        trades: usize,

        /// Max relative rate move per tick (overrides STABLEPOOL_VOLATILITY)
        #[arg(long)]
        volatility: Option<f64>,

        /// Smallest trade in quote units
        #[arg(long, default_value = "10")]
        min_trade: Decimal,

        /// Largest trade in quote units
        #[arg(long, default_value = "500")]
        max_trade: Decimal,

        /// RNG seed (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Simulated market data latency in milliseconds
        #[arg(long, default_value_t = 0)]
        latency_ms: u64,
    },
}

async fn demo_desk(schedule: FeeSchedule) -> Result<TradeDesk> {
    let desk = TradeDesk::new(DeskConfig::default().with_schedule(schedule))?;
    for pool in demo_pools() {
        desk.add_pool(pool).await?;
    }
    Ok(desk)
}

fn print_fee(fee: &FeeBreakdown) {
    println!("Rate change:      {:.4}%", fee.rate_change_percentage);
    println!("Pool imbalance:   {:.4}%", fee.pool_imbalance);
    println!("────────────────────────────────────");
    println!("Base fee:         {:.4}%", fee.base_fee);
    println!("Volatility fee:   {:.4}%", fee.volatility_fee);
    println!("Pool health fee:  {:.4}%", fee.pool_health_fee);
    println!(
        "Total fee:        {:.4}%{}",
        fee.total_fee,
        if fee.is_capped() { " (capped)" } else { "" }
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let schedule = config::load_schedule(cli.base_fee, cli.fee_cap)?;
    debug!(base_fee = %schedule.base_fee, fee_cap = %schedule.fee_cap, "Fee schedule loaded");

    match &cli.command {
        Commands::Pools => {
            let desk = demo_desk(schedule).await?;
            let pools = desk.pools().await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&pools)?);
                return Ok(());
            }

            println!(
                "{:<10} | {:<12} | {:<12} | {:<16} | {:<8} | {:<6}",
                "Pool", "Rate", "Change", "TVL", "Fee", "APY"
            );
            println!("{}", "-".repeat(78));
            for pool in pools {
                let fee = pool.fee_breakdown(&schedule)?;
                println!(
                    "{:<10} | {:<12} | {:<12} | {:<16} | {:<8} | {:<6}",
                    pool.pair(),
                    format_amount(pool.snapshot.exchange_rate),
                    format!("{:+.2}%", pool.snapshot.rate_change_pct()?),
                    format_currency(pool.snapshot.total_liquidity()?, &pool.quote_currency),
                    format!("{:.2}%", fee.total_fee),
                    format!("{:.1}%", pool.apy),
                );
            }
        }
        Commands::Fee {
            current_rate,
            previous_rate,
            pool_amount,
            target_amount,
        } => {
            let fee = schedule.compute(*current_rate, *previous_rate, *pool_amount, *target_amount)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&fee)?);
                return Ok(());
            }

            println!("\n📊 Dynamic Fee");
            println!("════════════════════════════════════");
            print_fee(&fee);
            println!("════════════════════════════════════");
        }
        Commands::Quote {
            pool,
            amount,
            direction,
        } => {
            let desk = demo_desk(schedule).await?;
            let quote = desk
                .quote(pool, *amount, *direction)
                .await
                .with_context(|| format!("failed to quote {direction} {amount} on {pool}"))?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
                return Ok(());
            }

            let local = &quote.base_currency;
            println!("\n💱 Quote: {} {} {}", direction, amount, quote.quote_currency);
            println!("════════════════════════════════════");
            println!("Rate:             1 {} = {} {}", quote.quote_currency, quote.exchange_rate, local);
            print_fee(&quote.fee);
            println!("────────────────────────────────────");
            println!("Amount:           {}", format_currency(quote.settlement.local_amount, local));
            println!("Fee:              {}", format_currency(quote.settlement.fee_amount, local));
            match direction {
                TradeDirection::Sell => println!(
                    "You receive:      {}",
                    format_currency(quote.settlement.net_amount, local)
                ),
                TradeDirection::Buy => println!(
                    "You pay:          {}",
                    format_currency(quote.settlement.net_amount, local)
                ),
            }
            println!("════════════════════════════════════");
        }
        Commands::Contribute { pool, amount } => {
            let desk = demo_desk(schedule).await?;
            let pool = desk
                .pool(pool)
                .await
                .with_context(|| format!("unknown pool {pool}"))?;
            let share = pool.contribution_share(*amount)?;
            let daily = pool.estimated_daily_earnings(*amount)?;

            if cli.json {
                let estimate = serde_json::json!({
                    "pool": pool.id,
                    "amount": amount,
                    "share_percentage": share,
                    "daily_earnings": daily,
                });
                println!("{}", serde_json::to_string_pretty(&estimate)?);
                return Ok(());
            }

            println!("\n💧 Contribution: {} {} to {}", amount, pool.quote_currency, pool.pair());
            println!("════════════════════════════════════");
            println!(
                "Pool liquidity:   {}",
                format_currency(pool.snapshot.total_liquidity()?, &pool.quote_currency)
            );
            println!("APY:              {:.1}%", pool.apy);
            println!("Pool share:       {:.4}%", share);
            println!(
                "Daily earnings:   {}",
                format_currency(daily, &pool.quote_currency)
            );
            println!("════════════════════════════════════");
        }
        Commands::Portfolio => {
            let providers = demo_providers();

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&providers)?);
                return Ok(());
            }

            println!(
                "{:<14} | {:<10} | {:<12} | {:<12} | {:<12} | {:<7}",
                "Provider", "Pool", "Invested", "Earnings", "Value", "Return"
            );
            println!("{}", "-".repeat(82));
            for lp in &providers {
                let short: String = lp.address.chars().take(10).collect();
                println!(
                    "{:<14} | {:<10} | {:<12} | {:<12} | {:<12} | {:<7}",
                    format!("{short}…"),
                    lp.pool_id,
                    format_currency(lp.total_invested, &lp.currency),
                    format_currency(lp.total_earnings, &lp.currency),
                    format_currency(lp.total_value()?, &lp.currency),
                    format!("{:+.1}%", lp.total_return_pct()?),
                );
            }
        }
        Commands::Simulate {
            ticks,
            trades,
            volatility,
            min_trade,
            max_trade,
            seed,
            latency_ms,
        } => {
            if min_trade > max_trade {
                bail!("--min-trade must not exceed --max-trade");
            }
            let volatility = config::load_volatility(*volatility, JitterMarket::DEFAULT_VOLATILITY)?;
            let seed = seed.unwrap_or_else(rand::random);

            println!("🚀 Running {} ticks with seed {}...", ticks, seed);
            let desk = demo_desk(schedule).await?;
            let wallet = demo_wallet();
            let market = JitterMarket::new(volatility, seed)?
                .with_latency(Duration::from_millis(*latency_ms));
            let session = SessionConfig::default()
                .with_ticks(*ticks)
                .with_trades_per_tick(*trades)
                .with_trade_range(*min_trade, *max_trade)
                .with_seed(seed);

            let summary = run_session(&desk, &market, &wallet, &session).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary.transactions)?);
                return Ok(());
            }

            println!(
                "\n{:<10} | {:<5} | {:<10} | {:<10} | {:<7} | {:<18}",
                "Pool", "Side", "Amount", "Rate", "Fee", "Net"
            );
            println!("{}", "-".repeat(72));
            for tx in &summary.transactions {
                println!(
                    "{:<10} | {:<5} | {:<10} | {:<10.4} | {:<7} | {:<18}",
                    tx.pool_id,
                    tx.direction,
                    format_amount(tx.quote_amount),
                    tx.exchange_rate,
                    format!("{:.2}%", tx.fee_percent),
                    format_amount(tx.net_amount),
                );
            }

            println!("\n📊 Session Results");
            println!("════════════════════════════════════");
            println!("Trades attempted: {}", summary.attempted());
            println!("Executed:         {}", summary.transactions.len());
            println!("Rejected:         {}", summary.rejections.len());
            println!(
                "Success rate:     {:.1}%",
                summary.success_rate() * Decimal::ONE_HUNDRED
            );
            for (pool_id, fees) in summary.fees_by_pool()? {
                println!("Fees {:<12} {}", pool_id, format_amount(fees));
            }
            println!("────────────────────────────────────");
            for pool in desk.pools().await {
                println!(
                    "{:<10} reserves: {} {} / {} {}",
                    pool.pair(),
                    format_amount(pool.snapshot.base_amount),
                    pool.base_currency,
                    format_amount(pool.snapshot.quote_amount),
                    pool.quote_currency,
                );
            }
            println!("────────────────────────────────────");
            let balances: BTreeMap<_, _> = wallet.balances().await.into_iter().collect();
            for (currency, amount) in balances {
                println!("Wallet {:<11} {}", currency, format_currency(amount, &currency));
            }
            println!("════════════════════════════════════");
        }
    }

    Ok(())
}
