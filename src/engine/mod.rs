//! Pure computation engine for the average-cost-basis ledger.
//!
//! The engine walks a sorted transaction stream block by block. Sells are
//! priced against the pooled average frozen when their block opened, and the
//! pool is only re-averaged when a buy block closes.

use crate::domain::Decimal;
use thiserror::Error;

pub mod accountant;
pub mod blocks;
pub mod ledger_builder;
pub mod lot_state;
pub mod observer;

pub use accountant::{account_buy, account_sell};
pub use blocks::{segment_blocks, Block};
pub use ledger_builder::LedgerBuilder;
pub use lot_state::LotState;
pub use observer::{LedgerObserver, NoopObserver, TracingObserver};

/// Fatal conditions that abort a ledger build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("malformed transaction at index {index}: {reason}")]
    MalformedInput { index: usize, reason: String },
    #[error("oversell at index {index}: selling {requested} with only {available} held")]
    Oversell {
        index: usize,
        requested: Decimal,
        available: Decimal,
    },
    #[error("amount out of decimal range at index {index}")]
    Overflow { index: usize },
}

/// Whether to check that timestamps never decrease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderValidation {
    /// Trust the input ordering.
    #[default]
    Off,
    /// Report regressions to the observer and keep going.
    Warn,
}
