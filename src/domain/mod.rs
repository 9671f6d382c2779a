//! Domain types and determinism layer for the average-cost-basis ledger.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: Exchange, Product, Timestamp, Action
//! - Transaction input records and ledger output rows
//! - Stable transaction ordering and deduplication helpers

pub mod decimal;
pub mod ledger;
pub mod ordering;
pub mod primitives;
pub mod transaction;

pub use decimal::{Decimal, CURRENCY_DP, QUANTITY_DP};
pub use ledger::{AggregateEntry, LedgerEntry, LedgerRow};
pub use ordering::{dedup_transactions, sort_transactions_deterministic, TransactionOrderingKey};
pub use primitives::{Action, ActionParseError, Exchange, Product, Timestamp};
pub use transaction::Transaction;
