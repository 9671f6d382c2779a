//! Observation hooks for ledger construction.

use crate::domain::{Action, AggregateEntry, LedgerEntry, Timestamp};

/// Receives progress events while a ledger is built.
///
/// All methods default to no-ops so implementors pick what they need.
pub trait LedgerObserver {
    /// A transaction was priced. `index` is its position in the input.
    fn on_entry(&mut self, _index: usize, _entry: &LedgerEntry) {}

    /// A block closed and its aggregate row was emitted.
    fn on_block_closed(
        &mut self,
        _block_index: usize,
        _action: Action,
        _len: usize,
        _aggregate: &AggregateEntry,
    ) {
    }

    /// A timestamp precedes the one before it. Only raised when order validation is on.
    fn on_order_violation(&mut self, _index: usize, _previous: &Timestamp, _current: &Timestamp) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LedgerObserver for NoopObserver {}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LedgerObserver for TracingObserver {
    fn on_entry(&mut self, index: usize, entry: &LedgerEntry) {
        tracing::trace!(
            index,
            action = %entry.action,
            quantity = %entry.quantity,
            cost_basis = %entry.cost_basis,
            gain_or_loss = %entry.gain_or_loss,
            "priced transaction"
        );
    }

    fn on_block_closed(
        &mut self,
        block_index: usize,
        action: Action,
        len: usize,
        aggregate: &AggregateEntry,
    ) {
        tracing::debug!(
            block_index,
            action = %action,
            len,
            held = %aggregate.held_quantity,
            total_cost = %aggregate.total_cost_basis,
            acb = %aggregate.average_cost_per_unit,
            gain_or_loss = %aggregate.cumulative_gain_or_loss,
            "closed block"
        );
    }

    fn on_order_violation(&mut self, index: usize, previous: &Timestamp, current: &Timestamp) {
        tracing::warn!(
            index,
            previous = %previous,
            current = %current,
            "transaction timestamp precedes its predecessor"
        );
    }
}

impl<T: LedgerObserver + ?Sized> LedgerObserver for &mut T {
    fn on_entry(&mut self, index: usize, entry: &LedgerEntry) {
        (**self).on_entry(index, entry)
    }

    fn on_block_closed(
        &mut self,
        block_index: usize,
        action: Action,
        len: usize,
        aggregate: &AggregateEntry,
    ) {
        (**self).on_block_closed(block_index, action, len, aggregate)
    }

    fn on_order_violation(&mut self, index: usize, previous: &Timestamp, current: &Timestamp) {
        (**self).on_order_violation(index, previous, current)
    }
}
