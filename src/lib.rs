pub mod compile;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ir;
pub mod report;

pub use compile::{CompileSummary, Compiler};
pub use config::Config;
pub use domain::{
    Action, AggregateEntry, Decimal, Exchange, LedgerEntry, LedgerRow, Product, Timestamp,
    Transaction,
};
pub use engine::{LedgerBuilder, LedgerError, LedgerObserver, OrderValidation};
pub use error::AppError;
