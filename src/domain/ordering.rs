//! Stable transaction ordering and deduplication for deterministic processing.

use crate::domain::Transaction;
use std::collections::HashSet;

/// Stable ordering key for transactions.
///
/// Ordering: parsed instant -> raw timestamp -> transaction key.
/// Unparsable timestamps sort before parsable ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransactionOrderingKey {
    /// Milliseconds since the Unix epoch (primary sort).
    pub instant_ms: Option<i64>,
    /// Raw timestamp text (secondary sort).
    pub timestamp: String,
    /// Content digest (fallback sort).
    pub transaction_key: String,
}

impl TransactionOrderingKey {
    /// Create an ordering key from a Transaction.
    pub fn from_transaction(tx: &Transaction) -> Self {
        TransactionOrderingKey {
            instant_ms: tx.timestamp.instant().map(|dt| dt.timestamp_millis()),
            timestamp: tx.timestamp.as_str().to_string(),
            transaction_key: tx.transaction_key(),
        }
    }
}

/// Sort transactions deterministically.
pub fn sort_transactions_deterministic(transactions: &mut [Transaction]) {
    transactions.sort_by_cached_key(TransactionOrderingKey::from_transaction);
}

/// Drop every transaction whose key was already seen, keeping the first occurrence.
///
/// Returns the number of records removed.
pub fn dedup_transactions(transactions: &mut Vec<Transaction>) -> usize {
    let before = transactions.len();
    let mut seen = HashSet::new();
    transactions.retain(|tx| seen.insert(tx.transaction_key()));
    before - transactions.len()
}
