//! Intermediary representation (IR) tables: the normalized transaction CSV
//! produced by the exchange importers.

use crate::domain::{
    dedup_transactions, sort_transactions_deterministic, Action, Decimal, Exchange, Product,
    Timestamp, Transaction, QUANTITY_DP,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fixed IR column header.
pub const IR_HEADER: [&str; 8] = [
    "Exchange",
    "Product",
    "Datetime",
    "Transaction Type",
    "Order Size",
    "Market Price",
    "Order Fee",
    "Order Note",
];

#[derive(Debug, Error)]
pub enum IrError {
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(String),
    #[error("malformed IR record on line {line}: {reason}")]
    Malformed { line: u64, reason: String },
}

#[derive(Debug, Deserialize)]
struct IrRecord {
    #[serde(rename = "Exchange")]
    exchange: String,
    #[serde(rename = "Product")]
    product: String,
    #[serde(rename = "Datetime")]
    datetime: String,
    #[serde(rename = "Transaction Type")]
    transaction_type: String,
    #[serde(rename = "Order Size")]
    order_size: String,
    #[serde(rename = "Market Price")]
    market_price: String,
    #[serde(rename = "Order Fee")]
    order_fee: String,
    #[serde(rename = "Order Note", default)]
    order_note: String,
}

impl IrRecord {
    fn into_transaction(self, line: u64) -> Result<Transaction, IrError> {
        let malformed = |reason: String| IrError::Malformed { line, reason };
        let number = |field: &str, raw: &str| {
            Decimal::from_str_canonical(raw)
                .map_err(|e| malformed(format!("invalid {}: {:?} ({})", field, raw, e)))
        };

        let action = self
            .transaction_type
            .parse::<Action>()
            .map_err(|e| malformed(e.to_string()))?;

        Ok(Transaction::new(
            Exchange::new(self.exchange.trim().to_string()),
            Product::new(self.product.trim().to_string()),
            Timestamp::new(self.datetime.trim().to_string()),
            action,
            number("order size", &self.order_size)?,
            number("market price", &self.market_price)?,
            number("order fee", &self.order_fee)?,
            self.order_note,
        ))
    }
}

/// Parse an IR table. Rows keep their file order.
///
/// Padding around every field but `Order Note` is ignored.
pub fn parse_ir_csv(csv_bytes: &[u8]) -> Result<Vec<Transaction>, IrError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(csv_bytes);

    let headers = reader
        .headers()
        .map_err(|e| IrError::Csv(e.to_string()))?
        .clone();

    let mut transactions = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IrError::Csv(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: IrRecord = record
            .deserialize(Some(&headers))
            .map_err(|e| IrError::Malformed {
                line,
                reason: e.to_string(),
            })?;
        transactions.push(row.into_transaction(line)?);
    }

    Ok(transactions)
}

/// Render transactions as an IR table. Numbers carry eight decimal places.
pub fn write_ir_csv(transactions: &[Transaction]) -> Result<Vec<u8>, IrError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(IR_HEADER)
        .map_err(|e| IrError::Csv(e.to_string()))?;

    for tx in transactions {
        writer
            .write_record([
                tx.exchange.as_str(),
                tx.product.as_str(),
                tx.timestamp.as_str(),
                tx.action.to_string().as_str(),
                tx.quantity.to_fixed(QUANTITY_DP).as_str(),
                tx.unit_price.to_fixed(QUANTITY_DP).as_str(),
                tx.fee.to_fixed(QUANTITY_DP).as_str(),
                tx.note.as_str(),
            ])
            .map_err(|e| IrError::Csv(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| IrError::Csv(e.to_string()))
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> IrError {
    let path = path.to_path_buf();
    move |source| IrError::Io { path, source }
}

/// Read every `*.csv` file in a directory into one sorted, deduplicated stream.
///
/// Files are visited in name order so the result does not depend on the
/// filesystem's directory ordering.
pub fn read_ir_directory(dir: &Path) -> Result<Vec<Transaction>, IrError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            paths.push(path);
        }
    }
    paths.sort();

    let mut transactions = Vec::new();
    for path in &paths {
        let bytes = std::fs::read(path).map_err(io_error(path))?;
        let parsed = parse_ir_csv(&bytes)?;
        tracing::debug!(path = %path.display(), records = parsed.len(), "read IR file");
        transactions.extend(parsed);
    }

    let duplicates = dedup_transactions(&mut transactions);
    if duplicates > 0 {
        tracing::info!(duplicates, "dropped duplicate IR records");
    }
    sort_transactions_deterministic(&mut transactions);

    tracing::info!(
        dir = %dir.display(),
        files = paths.len(),
        transactions = transactions.len(),
        "loaded IR transactions"
    );
    Ok(transactions)
}

/// Keep only transactions whose product trades the given base asset.
pub fn filter_asset(transactions: Vec<Transaction>, asset: &str) -> Vec<Transaction> {
    let asset = asset.trim().to_ascii_uppercase();
    transactions
        .into_iter()
        .filter(|tx| tx.product.base_asset() == asset)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Exchange,Product,Datetime,Transaction Type,Order Size,Market Price,Order Fee,Order Note
coinbase,BTC-USD,2021-01-01T00:00:00Z,Buy,1.00000000,100.00000000,1.00000000,first
kraken,ETH-USD,2021-01-02T00:00:00Z,Sell,2.5,3000,0,
";

    #[test]
    fn test_parse_ir_csv() {
        let txs = parse_ir_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].exchange.as_str(), "coinbase");
        assert_eq!(txs[0].action, Action::Buy);
        assert_eq!(txs[0].quantity, Decimal::from_str_canonical("1").unwrap());
        assert_eq!(txs[0].note, "first");
        assert_eq!(txs[1].action, Action::Sell);
        assert_eq!(txs[1].unit_price, Decimal::from_str_canonical("3000").unwrap());
        assert_eq!(txs[1].note, "");
    }

    #[test]
    fn test_parse_rejects_unknown_action() {
        let csv = "\
Exchange,Product,Datetime,Transaction Type,Order Size,Market Price,Order Fee,Order Note
coinbase,BTC-USD,2021-01-01T00:00:00Z,Send,1,100,0,
";
        match parse_ir_csv(csv.as_bytes()) {
            Err(IrError::Malformed { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("Send"));
            }
            other => panic!("Expected Malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unparsable_number() {
        let csv = "\
Exchange,Product,Datetime,Transaction Type,Order Size,Market Price,Order Fee,Order Note
coinbase,BTC-USD,2021-01-01T00:00:00Z,Buy,1,abc,0,
";
        match parse_ir_csv(csv.as_bytes()) {
            Err(IrError::Malformed { reason, .. }) => assert!(reason.contains("market price")),
            other => panic!("Expected Malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_ir_csv_uses_eight_places() {
        let txs = parse_ir_csv(SAMPLE.as_bytes()).unwrap();
        let out = String::from_utf8(write_ir_csv(&txs).unwrap()).unwrap();
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines[0], IR_HEADER.join(","));
        assert_eq!(
            lines[2],
            "kraken,ETH-USD,2021-01-02T00:00:00Z,Sell,2.50000000,3000.00000000,0.00000000,"
        );
        assert_eq!(parse_ir_csv(out.as_bytes()).unwrap(), txs);
    }

    #[test]
    fn test_padding_is_ignored_except_in_note() {
        let csv = concat!(
            "Exchange , Product,Datetime,Transaction Type,Order Size,Market Price,Order Fee,Order Note\n",
            " coinbase , BTC-USD ,2021-01-01T00:00:00Z , buy , 1 , 100 , 0 ,  keep my spaces  \n",
        );
        let txs = parse_ir_csv(csv.as_bytes()).unwrap();
        assert_eq!(txs[0].exchange.as_str(), "coinbase");
        assert_eq!(txs[0].product.as_str(), "BTC-USD");
        assert_eq!(txs[0].timestamp.as_str(), "2021-01-01T00:00:00Z");
        assert_eq!(txs[0].action, Action::Buy);
        assert_eq!(txs[0].quantity, Decimal::from_str_canonical("1").unwrap());
        assert_eq!(txs[0].note, "  keep my spaces  ");

        let written = write_ir_csv(&txs).unwrap();
        assert_eq!(parse_ir_csv(&written).unwrap(), txs);
    }

    #[test]
    fn test_filter_asset() {
        let txs = parse_ir_csv(SAMPLE.as_bytes()).unwrap();
        let btc = filter_asset(txs.clone(), "btc");
        assert_eq!(btc.len(), 1);
        assert_eq!(btc[0].product.as_str(), "BTC-USD");
        assert!(filter_asset(txs, "LTC").is_empty());
    }
}
