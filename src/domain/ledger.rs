//! Ledger output rows: per-transaction entries and per-block aggregates.

use crate::domain::{Action, Decimal, Exchange, Product, Timestamp};
use serde::{Deserialize, Serialize};

/// Result of running one transaction through the lot accountant.
///
/// Buy rows carry `cost_basis` and their own per-unit cost. Sell rows carry
/// cost of goods sold, proceeds and gain/loss against the pooled average.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub exchange: Exchange,
    pub product: Product,
    /// Buy: own timestamp. Sell: timestamp of the most recent prior buy.
    pub date_acquired: Option<Timestamp>,
    pub action: Action,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub fee: Decimal,
    /// Buy: `quantity * unit_price + fee`. Sell: cost of goods sold.
    pub cost_basis: Decimal,
    /// Buy: `cost_basis / quantity`. Sell: the average frozen at block start.
    pub acb_per_unit: Decimal,
    /// Sell only.
    pub date_sold: Option<Timestamp>,
    /// Sell only.
    pub proceeds: Decimal,
    /// Sell only.
    pub gain_or_loss: Decimal,
    pub note: String,
}

/// Pooled position after a block closes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub held_quantity: Decimal,
    pub total_cost_basis: Decimal,
    pub average_cost_per_unit: Decimal,
    pub cumulative_gain_or_loss: Decimal,
}

/// One row of the ledger stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerRow {
    Entry(LedgerEntry),
    Aggregate(AggregateEntry),
}

impl LedgerRow {
    pub fn is_aggregate(&self) -> bool {
        matches!(self, LedgerRow::Aggregate(_))
    }

    pub fn as_entry(&self) -> Option<&LedgerEntry> {
        match self {
            LedgerRow::Entry(entry) => Some(entry),
            LedgerRow::Aggregate(_) => None,
        }
    }

    pub fn as_aggregate(&self) -> Option<&AggregateEntry> {
        match self {
            LedgerRow::Entry(_) => None,
            LedgerRow::Aggregate(aggregate) => Some(aggregate),
        }
    }
}
