//! Compile pipeline turning a directory of IR tables into a GL report.
//!
//! This module provides:
//! - Loading, asset filtering and ordering of IR transactions
//! - Ledger construction with `tracing` observation
//! - Rendering in the configured output format and writing it to disk

use crate::config::{Config, OutputFormat};
use crate::domain::{LedgerRow, Transaction};
use crate::engine::{LedgerBuilder, LedgerError, OrderValidation, TracingObserver};
use crate::error::AppError;
use crate::ir::{filter_asset, read_ir_directory};
use crate::report::{ledger_digest, write_gl_csv, write_gl_json, ReportError};
use std::path::{Path, PathBuf};

/// Outcome of one compile run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileSummary {
    /// Transactions fed to the ledger after asset filtering.
    pub transactions: usize,
    /// Number of same-action blocks, equal to the number of aggregate rows.
    pub blocks: usize,
    /// Total ledger rows written.
    pub rows: usize,
    /// SHA-256 of the CSV rendering.
    pub digest: String,
    pub output_path: PathBuf,
}

/// Stateless driver for the ledger pipeline.
pub struct Compiler;

impl Compiler {
    /// Build the ledger for an already sorted, deduplicated stream.
    pub fn compile(
        transactions: &[Transaction],
        order_validation: OrderValidation,
    ) -> Result<Vec<LedgerRow>, LedgerError> {
        LedgerBuilder::with_observer(TracingObserver)
            .order_validation(order_validation)
            .build(transactions)
    }

    /// Render ledger rows in the requested format.
    pub fn render(rows: &[LedgerRow], format: OutputFormat) -> Result<Vec<u8>, ReportError> {
        match format {
            OutputFormat::Csv => write_gl_csv(rows),
            OutputFormat::Json => write_gl_json(rows),
        }
    }

    /// Run the whole pipeline described by `config`.
    ///
    /// # Errors
    /// Any unreadable input, malformed record, oversell or write failure aborts
    /// the run before the output file is touched.
    pub fn run(config: &Config) -> Result<CompileSummary, AppError> {
        let transactions = read_ir_directory(&config.ir_directory)?;
        let transactions = filter_asset(transactions, &config.asset);
        tracing::info!(
            asset = %config.asset,
            transactions = transactions.len(),
            "compiling ledger"
        );

        let rows = Self::compile(&transactions, config.order_validation)?;
        let rendered = Self::render(&rows, config.output_format)?;
        let digest = ledger_digest(&rows)?;

        write_output(&config.output_path, &rendered)?;

        let summary = CompileSummary {
            transactions: transactions.len(),
            blocks: rows.iter().filter(|r| r.is_aggregate()).count(),
            rows: rows.len(),
            digest,
            output_path: config.output_path.clone(),
        };
        tracing::info!(
            rows = summary.rows,
            blocks = summary.blocks,
            digest = %summary.digest,
            path = %summary.output_path.display(),
            "wrote ledger"
        );
        Ok(summary)
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let write_err = |source| AppError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, bytes).map_err(write_err)
}
