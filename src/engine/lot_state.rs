//! Pooled position state and the per-block running totals.

use crate::domain::{Action, AggregateEntry, Decimal, LedgerEntry};

/// Pooled holdings for one traversal.
///
/// Starts zeroed and is only mutated when a block closes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LotState {
    /// Units currently held. Never negative: oversells are rejected upstream.
    pub held_quantity: Decimal,
    /// Cost basis of the units currently held.
    pub total_cost_basis: Decimal,
    /// Pooled average, refreshed only when a buy block closes.
    pub average_cost_per_unit: Decimal,
    pub cumulative_gain_or_loss: Decimal,
}

impl LotState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.held_quantity.is_zero()
    }

    /// Average to use for every sell in a block opening now.
    pub fn frozen_average(&self) -> Decimal {
        if self.is_flat() {
            Decimal::zero()
        } else {
            self.average_cost_per_unit
        }
    }

    /// Fold a completed block into the running totals and emit its aggregate row.
    ///
    /// Returns `None`, leaving the state untouched, if a total does not fit in a
    /// decimal.
    pub fn close_block(
        &mut self,
        action: Action,
        entries: &[LedgerEntry],
    ) -> Option<AggregateEntry> {
        let quantity = Decimal::checked_sum(entries.iter().map(|e| e.quantity))?;
        let cost = Decimal::checked_sum(entries.iter().map(|e| e.cost_basis))?;

        let mut next = self.clone();
        match action {
            Action::Buy => {
                next.held_quantity = self.held_quantity.checked_add(quantity)?;
                next.total_cost_basis = self.total_cost_basis.checked_add(cost)?;
                next.average_cost_per_unit =
                    next.total_cost_basis.div_or_zero(next.held_quantity)?;
            }
            Action::Sell => {
                let gain = Decimal::checked_sum(entries.iter().map(|e| e.gain_or_loss))?;
                next.held_quantity = self.held_quantity.checked_sub(quantity)?;
                next.total_cost_basis = self.total_cost_basis.checked_sub(cost)?;
                next.cumulative_gain_or_loss = self.cumulative_gain_or_loss.checked_add(gain)?;
                // An exhausted pool has no average; otherwise it carries over untouched.
                if next.is_flat() {
                    next.average_cost_per_unit = Decimal::zero();
                }
            }
        }

        *self = next;
        Some(self.snapshot())
    }

    pub fn snapshot(&self) -> AggregateEntry {
        AggregateEntry {
            held_quantity: self.held_quantity,
            total_cost_basis: self.total_cost_basis,
            average_cost_per_unit: self.average_cost_per_unit,
            cumulative_gain_or_loss: self.cumulative_gain_or_loss,
        }
    }
}
