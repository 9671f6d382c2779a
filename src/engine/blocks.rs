//! Segmentation of the transaction stream into same-action blocks.

use crate::domain::{Action, Transaction};

/// A maximal contiguous run of transactions sharing one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    pub action: Action,
    /// Index of the first transaction of this block in the input stream.
    pub start: usize,
    pub transactions: &'a [Transaction],
}

impl<'a> Block<'a> {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Iterate transactions paired with their index in the input stream.
    pub fn indexed(&self) -> impl Iterator<Item = (usize, &'a Transaction)> + 'a {
        let (start, transactions) = (self.start, self.transactions);
        transactions
            .iter()
            .enumerate()
            .map(move |(offset, tx)| (start + offset, tx))
    }
}

/// Split a sorted stream into blocks in a single pass.
///
/// A new block starts whenever the action changes. Empty input yields no blocks.
pub fn segment_blocks(transactions: &[Transaction]) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut start = 0;

    for i in 1..=transactions.len() {
        let boundary =
            i == transactions.len() || transactions[i].action != transactions[start].action;
        if boundary {
            blocks.push(Block {
                action: transactions[start].action,
                start,
                transactions: &transactions[start..i],
            });
            start = i;
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, Exchange, Product, Timestamp};

    fn tx(action: Action) -> Transaction {
        Transaction::new(
            Exchange::new("coinbase".to_string()),
            Product::new("BTC-USD".to_string()),
            Timestamp::new("2021-01-01T00:00:00Z".to_string()),
            action,
            Decimal::from_str_canonical("1").unwrap(),
            Decimal::from_str_canonical("100").unwrap(),
            Decimal::zero(),
            String::new(),
        )
    }

    #[test]
    fn test_empty_input_yields_no_blocks() {
        assert!(segment_blocks(&[]).is_empty());
    }

    #[test]
    fn test_uniform_input_yields_one_block() {
        let txs = vec![tx(Action::Buy), tx(Action::Buy), tx(Action::Buy)];
        let blocks = segment_blocks(&txs);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].action, Action::Buy);
        assert_eq!(blocks[0].len(), 3);
    }

    #[test]
    fn test_blocks_alternate_actions() {
        let txs = vec![
            tx(Action::Buy),
            tx(Action::Buy),
            tx(Action::Sell),
            tx(Action::Buy),
            tx(Action::Sell),
            tx(Action::Sell),
        ];
        let blocks = segment_blocks(&txs);

        let shape: Vec<_> = blocks.iter().map(|b| (b.action, b.start, b.len())).collect();
        assert_eq!(
            shape,
            vec![
                (Action::Buy, 0, 2),
                (Action::Sell, 2, 1),
                (Action::Buy, 3, 1),
                (Action::Sell, 4, 2),
            ]
        );

        for pair in blocks.windows(2) {
            assert_ne!(pair[0].action, pair[1].action);
        }
        let covered: usize = blocks.iter().map(|b| b.len()).sum();
        assert_eq!(covered, txs.len());
    }

    #[test]
    fn test_indexed_reports_stream_positions() {
        let txs = vec![tx(Action::Buy), tx(Action::Sell), tx(Action::Sell)];
        let blocks = segment_blocks(&txs);
        let indices: Vec<_> = blocks[1].indexed().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![1, 2]);
    }
}
