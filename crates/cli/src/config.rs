//! Fee schedule configuration from the environment and command line flags.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use stablepool_domain::fees::FeeSchedule;
use std::env;
use std::str::FromStr;

/// Environment variable overriding the base fee.
pub const BASE_FEE_VAR: &str = "STABLEPOOL_BASE_FEE";
/// Environment variable overriding the fee cap.
pub const FEE_CAP_VAR: &str = "STABLEPOOL_FEE_CAP";
/// Environment variable overriding the market volatility.
pub const VOLATILITY_VAR: &str = "STABLEPOOL_VOLATILITY";

fn env_decimal(name: &str) -> Result<Option<Decimal>> {
    match env::var(name) {
        Ok(raw) => Decimal::from_str(raw.trim())
            .map(Some)
            .with_context(|| format!("{name} is not a decimal: {raw}")),
        Err(_) => Ok(None),
    }
}

/// Builds the fee schedule: defaults, then environment, then flags.
pub fn load_schedule(base_fee: Option<Decimal>, fee_cap: Option<Decimal>) -> Result<FeeSchedule> {
    let mut schedule = FeeSchedule::default();

    if let Some(value) = base_fee.or(env_decimal(BASE_FEE_VAR)?) {
        schedule = schedule.with_base_fee(value);
    }
    if let Some(value) = fee_cap.or(env_decimal(FEE_CAP_VAR)?) {
        schedule = schedule.with_fee_cap(value);
    }

    schedule.validate().context("invalid fee schedule")?;
    Ok(schedule)
}

/// Market volatility: flag, then environment, then `default`.
pub fn load_volatility(flag: Option<f64>, default: f64) -> Result<f64> {
    if let Some(value) = flag {
        return Ok(value);
    }
    match env::var(VOLATILITY_VAR) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("{VOLATILITY_VAR} is not a number: {raw}")),
        Err(_) => Ok(default),
    }
}
