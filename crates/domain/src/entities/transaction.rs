use crate::enums::{TradeDirection, TransactionStatus};
use crate::error::TransactionError;
use crate::settlement::Settlement;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub Uuid);

/// A trade between a user and a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub pool_id: String,
    pub direction: TradeDirection,
    /// Amount of the quote asset traded.
    pub quote_amount: Decimal,
    /// Rate the trade was priced at.
    pub exchange_rate: Decimal,
    /// Fee percentage applied.
    pub fee_percent: Decimal,
    /// Fee in local currency.
    pub fee_amount: Decimal,
    /// Local currency received (sell) or paid (buy).
    pub net_amount: Decimal,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Creates a pending transaction from a priced settlement.
    pub fn new(
        pool_id: impl Into<String>,
        direction: TradeDirection,
        quote_amount: Decimal,
        exchange_rate: Decimal,
        fee_percent: Decimal,
        settlement: &Settlement,
    ) -> Self {
        Self {
            id: TransactionId(Uuid::new_v4()),
            pool_id: pool_id.into(),
            direction,
            quote_amount,
            exchange_rate,
            fee_percent,
            fee_amount: settlement.fee_amount,
            net_amount: settlement.net_amount,
            status: TransactionStatus::Pending,
            timestamp: Utc::now(),
        }
    }

    /// Moves the transaction to `next` if the lifecycle allows it.
    pub fn transition(&mut self, next: TransactionStatus) -> Result<(), TransactionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransactionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
