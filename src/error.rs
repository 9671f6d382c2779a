use crate::config::ConfigError;
use crate::engine::LedgerError;
use crate::ir::IrError;
use crate::report::ReportError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Input error: {0}")]
    Input(#[from] IrError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
