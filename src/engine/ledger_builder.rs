use crate::domain::{Action, LedgerEntry, LedgerRow, Timestamp, Transaction};

use super::accountant::{account_buy, account_sell};
use super::blocks::{segment_blocks, Block};
use super::lot_state::LotState;
use super::observer::{LedgerObserver, NoopObserver};
use super::{LedgerError, OrderValidation};

/// Builds the ledger stream: every block's entries followed by its aggregate row.
///
/// Each call to [`LedgerBuilder::build`] starts from a zeroed [`LotState`], so
/// identical input always yields identical output.
pub struct LedgerBuilder<O: LedgerObserver = NoopObserver> {
    observer: O,
    order_validation: OrderValidation,
}

impl LedgerBuilder<NoopObserver> {
    pub fn new() -> Self {
        Self::with_observer(NoopObserver)
    }
}

impl Default for LedgerBuilder<NoopObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: LedgerObserver> LedgerBuilder<O> {
    pub fn with_observer(observer: O) -> Self {
        Self {
            observer,
            order_validation: OrderValidation::Off,
        }
    }

    pub fn order_validation(mut self, mode: OrderValidation) -> Self {
        self.order_validation = mode;
        self
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Build the full ledger for a sorted, deduplicated transaction stream.
    ///
    /// # Errors
    /// Fails on the first malformed record (checked before anything is priced),
    /// on a sell exceeding the units held, or on an amount out of decimal
    /// range. No partial ledger is returned.
    pub fn build(&mut self, transactions: &[Transaction]) -> Result<Vec<LedgerRow>, LedgerError> {
        validate_all(transactions)?;
        if self.order_validation == OrderValidation::Warn {
            self.check_order(transactions);
        }

        let blocks = segment_blocks(transactions);
        let mut rows = Vec::with_capacity(transactions.len() + blocks.len());
        let mut state = LotState::new();
        let mut last_acquired: Option<&Timestamp> = None;

        for (block_index, block) in blocks.iter().enumerate() {
            let entries: Vec<LedgerEntry> = match block.action {
                Action::Buy => {
                    if let Some(last) = block.transactions.last() {
                        last_acquired = Some(&last.timestamp);
                    }
                    block
                        .indexed()
                        .map(|(index, tx)| {
                            account_buy(tx).ok_or(LedgerError::Overflow { index })
                        })
                        .collect::<Result<_, _>>()?
                }
                Action::Sell => price_sell_block(block, &state, last_acquired)?,
            };

            for ((index, _), entry) in block.indexed().zip(&entries) {
                self.observer.on_entry(index, entry);
            }

            let aggregate = state
                .close_block(block.action, &entries)
                .ok_or(LedgerError::Overflow {
                    index: block.start + block.len() - 1,
                })?;
            self.observer
                .on_block_closed(block_index, block.action, block.len(), &aggregate);

            rows.extend(entries.into_iter().map(LedgerRow::Entry));
            rows.push(LedgerRow::Aggregate(aggregate));
        }

        Ok(rows)
    }

    fn check_order(&mut self, transactions: &[Transaction]) {
        for (index, pair) in transactions.windows(2).enumerate() {
            let (previous, current) = (&pair[0].timestamp, &pair[1].timestamp);
            let out_of_order = match (previous.instant(), current.instant()) {
                (Some(p), Some(c)) => c < p,
                _ => current < previous,
            };
            if out_of_order {
                self.observer
                    .on_order_violation(index + 1, previous, current);
            }
        }
    }
}

fn validate_all(transactions: &[Transaction]) -> Result<(), LedgerError> {
    for (index, tx) in transactions.iter().enumerate() {
        tx.validate()
            .map_err(|reason| LedgerError::MalformedInput { index, reason })?;
    }
    Ok(())
}

/// Price every sell in a block against the average frozen at block start.
fn price_sell_block(
    block: &Block<'_>,
    state: &LotState,
    date_acquired: Option<&Timestamp>,
) -> Result<Vec<LedgerEntry>, LedgerError> {
    let frozen_average = state.frozen_average();
    let mut available = state.held_quantity;
    let mut entries = Vec::with_capacity(block.len());

    for (index, tx) in block.indexed() {
        if tx.quantity > available {
            return Err(LedgerError::Oversell {
                index,
                requested: tx.quantity,
                available,
            });
        }
        available -= tx.quantity;
        entries.push(
            account_sell(tx, frozen_average, date_acquired)
                .ok_or(LedgerError::Overflow { index })?,
        );
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, Exchange, Product};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn tx(action: Action, qty: &str, price: &str, fee: &str, ts: &str) -> Transaction {
        Transaction::new(
            Exchange::new("coinbase".to_string()),
            Product::new("BTC-USD".to_string()),
            Timestamp::new(ts.to_string()),
            action,
            d(qty),
            d(price),
            d(fee),
            String::new(),
        )
    }

    #[derive(Default)]
    struct Recorder {
        entries: Vec<usize>,
        blocks: Vec<(usize, Action, usize)>,
        violations: Vec<usize>,
    }

    impl LedgerObserver for Recorder {
        fn on_entry(&mut self, index: usize, _entry: &LedgerEntry) {
            self.entries.push(index);
        }

        fn on_block_closed(
            &mut self,
            block_index: usize,
            action: Action,
            len: usize,
            _aggregate: &crate::domain::AggregateEntry,
        ) {
            self.blocks.push((block_index, action, len));
        }

        fn on_order_violation(&mut self, index: usize, _p: &Timestamp, _c: &Timestamp) {
            self.violations.push(index);
        }
    }

    #[test]
    fn test_empty_input_yields_empty_ledger() {
        let rows = LedgerBuilder::new().build(&[]).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_malformed_record_aborts_before_pricing() {
        let txs = vec![
            tx(Action::Buy, "1", "100", "0", "2021-01-01T00:00:00Z"),
            tx(Action::Buy, "0", "100", "0", "2021-01-02T00:00:00Z"),
        ];
        let mut builder = LedgerBuilder::with_observer(Recorder::default());
        let err = builder.build(&txs).unwrap_err();

        assert!(matches!(err, LedgerError::MalformedInput { index: 1, .. }));
        assert!(builder.observer().entries.is_empty());
    }

    #[test]
    fn test_oversell_is_rejected_cumulatively_within_block() {
        let txs = vec![
            tx(Action::Buy, "1", "100", "0", "2021-01-01T00:00:00Z"),
            tx(Action::Sell, "0.6", "100", "0", "2021-01-02T00:00:00Z"),
            tx(Action::Sell, "0.6", "100", "0", "2021-01-03T00:00:00Z"),
        ];
        let err = LedgerBuilder::new().build(&txs).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Oversell {
                index: 2,
                requested: d("0.6"),
                available: d("0.4"),
            }
        );
    }

    #[test]
    fn test_sell_without_holdings_is_oversell() {
        let txs = vec![tx(Action::Sell, "1", "100", "0", "2021-01-01T00:00:00Z")];
        let err = LedgerBuilder::new().build(&txs).unwrap_err();
        assert!(matches!(err, LedgerError::Oversell { index: 0, .. }));
    }

    #[test]
    fn test_observer_sees_every_entry_and_block() {
        let txs = vec![
            tx(Action::Buy, "1", "100", "1", "2021-01-01T00:00:00Z"),
            tx(Action::Buy, "1", "200", "1", "2021-01-02T00:00:00Z"),
            tx(Action::Sell, "1", "300", "2", "2021-01-03T00:00:00Z"),
        ];
        let mut builder = LedgerBuilder::with_observer(Recorder::default());
        builder.build(&txs).unwrap();

        let recorder = builder.into_observer();
        assert_eq!(recorder.entries, vec![0, 1, 2]);
        assert_eq!(
            recorder.blocks,
            vec![(0, Action::Buy, 2), (1, Action::Sell, 1)]
        );
        assert!(recorder.violations.is_empty());
    }

    #[test]
    fn test_order_violation_warns_without_halting() {
        let txs = vec![
            tx(Action::Buy, "1", "100", "0", "2021-01-02T00:00:00Z"),
            tx(Action::Buy, "1", "100", "0", "2021-01-01T00:00:00Z"),
        ];
        let mut builder = LedgerBuilder::with_observer(Recorder::default())
            .order_validation(OrderValidation::Warn);
        let rows = builder.build(&txs).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(builder.observer().violations, vec![1]);
    }

    #[test]
    fn test_order_validation_off_is_silent() {
        let txs = vec![
            tx(Action::Buy, "1", "100", "0", "2021-01-02T00:00:00Z"),
            tx(Action::Buy, "1", "100", "0", "2021-01-01T00:00:00Z"),
        ];
        let mut builder = LedgerBuilder::with_observer(Recorder::default());
        builder.build(&txs).unwrap();
        assert!(builder.observer().violations.is_empty());
    }
}
