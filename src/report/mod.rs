//! Gains-and-losses (GL) report rows and their CSV / JSON renderings.
//!
//! Order sizes are rendered with eight decimal places and every currency
//! column with two, so a parsed report re-serializes byte for byte.

use crate::domain::{Decimal, LedgerRow, CURRENCY_DP, QUANTITY_DP};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Fixed GL column header.
pub const GL_HEADER: [&str; 13] = [
    "Additional Description",
    "Description",
    "Date Acquired",
    "Transaction Type",
    "Order Size",
    "Market Price",
    "Exchange Fee",
    "Cost or Other Basis",
    "ACB per Share",
    "Date Sold",
    "Sales Proceeds",
    "Gain or Loss",
    "Order Note",
];

/// Marker in `additional_description` for aggregate rows.
pub const TOTAL_MARKER: &str = "total";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("csv error: {0}")]
    Csv(String),
    #[error("malformed GL record on line {line}: {reason}")]
    Malformed { line: u64, reason: String },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One flat GL report row, rounded to report precision.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportRow {
    pub additional_description: String,
    pub description: String,
    pub date_acquired: String,
    pub transaction_type: String,
    pub order_size: Decimal,
    pub market_price: Decimal,
    pub exchange_fee: Decimal,
    pub cost_or_other_basis: Decimal,
    pub acb_per_share: Decimal,
    pub date_sold: String,
    pub sales_proceeds: Decimal,
    pub gain_or_loss: Decimal,
    pub order_note: String,
}

impl ReportRow {
    pub fn is_total(&self) -> bool {
        self.additional_description == TOTAL_MARKER && self.transaction_type.is_empty()
    }

    fn to_record(&self) -> [String; 13] {
        [
            self.additional_description.clone(),
            self.description.clone(),
            self.date_acquired.clone(),
            self.transaction_type.clone(),
            self.order_size.to_fixed(QUANTITY_DP),
            self.market_price.to_fixed(CURRENCY_DP),
            self.exchange_fee.to_fixed(CURRENCY_DP),
            self.cost_or_other_basis.to_fixed(CURRENCY_DP),
            self.acb_per_share.to_fixed(CURRENCY_DP),
            self.date_sold.clone(),
            self.sales_proceeds.to_fixed(CURRENCY_DP),
            self.gain_or_loss.to_fixed(CURRENCY_DP),
            self.order_note.clone(),
        ]
    }

    fn to_json(&self) -> serde_json::Value {
        let r = self.to_record();
        serde_json::json!({
            "additionalDescription": r[0],
            "description": r[1],
            "dateAcquired": r[2],
            "transactionType": r[3],
            "orderSize": r[4],
            "marketPrice": r[5],
            "exchangeFee": r[6],
            "costOrOtherBasis": r[7],
            "acbPerShare": r[8],
            "dateSold": r[9],
            "salesProceeds": r[10],
            "gainOrLoss": r[11],
            "orderNote": r[12],
        })
    }
}

impl From<&LedgerRow> for ReportRow {
    fn from(row: &LedgerRow) -> Self {
        let currency = |d: Decimal| d.round_dp(CURRENCY_DP);
        match row {
            LedgerRow::Entry(entry) => ReportRow {
                additional_description: entry.exchange.to_string(),
                description: entry.product.to_string(),
                date_acquired: entry
                    .date_acquired
                    .as_ref()
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
                transaction_type: entry.action.to_string(),
                order_size: entry.quantity.round_dp(QUANTITY_DP),
                market_price: currency(entry.unit_price),
                exchange_fee: currency(entry.fee),
                cost_or_other_basis: currency(entry.cost_basis),
                acb_per_share: currency(entry.acb_per_unit),
                date_sold: entry
                    .date_sold
                    .as_ref()
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
                sales_proceeds: currency(entry.proceeds),
                gain_or_loss: currency(entry.gain_or_loss),
                order_note: entry.note.clone(),
            },
            LedgerRow::Aggregate(aggregate) => ReportRow {
                additional_description: TOTAL_MARKER.to_string(),
                order_size: aggregate.held_quantity.round_dp(QUANTITY_DP),
                cost_or_other_basis: currency(aggregate.total_cost_basis),
                acb_per_share: currency(aggregate.average_cost_per_unit),
                gain_or_loss: currency(aggregate.cumulative_gain_or_loss),
                ..ReportRow::default()
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GlRecord {
    #[serde(rename = "Additional Description")]
    additional_description: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Date Acquired")]
    date_acquired: String,
    #[serde(rename = "Transaction Type")]
    transaction_type: String,
    #[serde(rename = "Order Size")]
    order_size: String,
    #[serde(rename = "Market Price")]
    market_price: String,
    #[serde(rename = "Exchange Fee")]
    exchange_fee: String,
    #[serde(rename = "Cost or Other Basis")]
    cost_or_other_basis: String,
    #[serde(rename = "ACB per Share")]
    acb_per_share: String,
    #[serde(rename = "Date Sold")]
    date_sold: String,
    #[serde(rename = "Sales Proceeds")]
    sales_proceeds: String,
    #[serde(rename = "Gain or Loss")]
    gain_or_loss: String,
    #[serde(rename = "Order Note")]
    order_note: String,
}

impl GlRecord {
    fn into_row(self, line: u64) -> Result<ReportRow, ReportError> {
        let number = |field: &str, raw: &str| {
            Decimal::from_str_canonical(raw).map_err(|e| ReportError::Malformed {
                line,
                reason: format!("invalid {}: {:?} ({})", field, raw, e),
            })
        };

        Ok(ReportRow {
            order_size: number("order size", &self.order_size)?,
            market_price: number("market price", &self.market_price)?,
            exchange_fee: number("exchange fee", &self.exchange_fee)?,
            cost_or_other_basis: number("cost or other basis", &self.cost_or_other_basis)?,
            acb_per_share: number("acb per share", &self.acb_per_share)?,
            sales_proceeds: number("sales proceeds", &self.sales_proceeds)?,
            gain_or_loss: number("gain or loss", &self.gain_or_loss)?,
            additional_description: self.additional_description,
            description: self.description,
            date_acquired: self.date_acquired,
            transaction_type: self.transaction_type,
            date_sold: self.date_sold,
            order_note: self.order_note,
        })
    }
}

/// Render ledger rows as a GL CSV table with header.
pub fn write_gl_csv(rows: &[LedgerRow]) -> Result<Vec<u8>, ReportError> {
    let report: Vec<ReportRow> = rows.iter().map(ReportRow::from).collect();
    write_report_csv(&report)
}

/// Render already-flattened report rows as a GL CSV table with header.
pub fn write_report_csv(rows: &[ReportRow]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(GL_HEADER)
        .map_err(|e| ReportError::Csv(e.to_string()))?;
    for row in rows {
        writer
            .write_record(row.to_record())
            .map_err(|e| ReportError::Csv(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.to_string()))
}

/// Parse a GL CSV table.
pub fn parse_gl_csv(csv_bytes: &[u8]) -> Result<Vec<ReportRow>, ReportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_bytes);

    let headers = reader
        .headers()
        .map_err(|e| ReportError::Csv(e.to_string()))?
        .clone();
    if headers.iter().ne(GL_HEADER) {
        return Err(ReportError::Malformed {
            line: 1,
            reason: format!("unexpected header: {:?}", headers),
        });
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ReportError::Csv(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw: GlRecord = record
            .deserialize(Some(&headers))
            .map_err(|e| ReportError::Malformed {
                line,
                reason: e.to_string(),
            })?;
        rows.push(raw.into_row(line)?);
    }
    Ok(rows)
}

/// Render ledger rows as JSON lines, one object per row.
pub fn write_gl_json(rows: &[LedgerRow]) -> Result<Vec<u8>, ReportError> {
    let mut out = Vec::new();
    for row in rows {
        serde_json::to_writer(&mut out, &ReportRow::from(row).to_json())?;
        out.push(b'\n');
    }
    Ok(out)
}

/// SHA-256 over the CSV rendering. Equal digests mean byte-identical reports.
pub fn ledger_digest(rows: &[LedgerRow]) -> Result<String, ReportError> {
    let csv = write_gl_csv(rows)?;
    Ok(hex::encode(Sha256::digest(&csv)))
}
