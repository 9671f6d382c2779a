//! Domain primitives: Exchange, Product, Timestamp, Action.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exchange the transaction was executed on (e.g., "coinbase").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Exchange(pub String);

impl Exchange {
    /// Create an Exchange from a string.
    pub fn new(name: String) -> Self {
        Exchange(name)
    }

    /// Get the exchange as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Traded product, usually a pair such as "BTC-USD".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Product(pub String);

impl Product {
    /// Create a Product from a string.
    pub fn new(product: String) -> Self {
        Product(product)
    }

    /// Get the product as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base asset of the product: the text before the first `-` or `/`, upper-cased.
    pub fn base_asset(&self) -> String {
        self.0
            .split(['-', '/'])
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_uppercase()
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO-8601 timestamp as it appeared in the input.
///
/// The raw text is preserved so the ledger reproduces it byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub String);

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

impl Timestamp {
    /// Create a Timestamp from a string.
    pub fn new(ts: String) -> Self {
        Timestamp(ts)
    }

    /// Get the timestamp as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a UTC instant.
    ///
    /// Accepts RFC 3339, or a naive date-time which is taken to be UTC.
    /// Returns None for anything else.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        let raw = self.0.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction action: Buy or Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Acquisition, adds to the pooled position.
    Buy,
    /// Disposal, realizes gain or loss against the pooled average.
    Sell,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized action: {0:?}")]
pub struct ActionParseError(pub String);

impl std::str::FromStr for Action {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Action::Buy),
            "sell" => Ok(Action::Sell),
            _ => Err(ActionParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "Buy"),
            Action::Sell => write!(f, "Sell"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_action_parse_case_insensitive() {
        assert_eq!("Buy".parse::<Action>(), Ok(Action::Buy));
        assert_eq!(" SELL ".parse::<Action>(), Ok(Action::Sell));
    }

    #[test]
    fn test_action_parse_rejects_unknown() {
        let err = "Send".parse::<Action>().unwrap_err();
        assert_eq!(err, ActionParseError("Send".to_string()));
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Buy.to_string(), "Buy");
        assert_eq!(Action::Sell.to_string(), "Sell");
    }

    #[test]
    fn test_product_base_asset() {
        assert_eq!(Product::new("BTC-USD".to_string()).base_asset(), "BTC");
        assert_eq!(Product::new("eth/usd".to_string()).base_asset(), "ETH");
        assert_eq!(Product::new("LTC".to_string()).base_asset(), "LTC");
    }

    #[test]
    fn test_timestamp_instant_rfc3339() {
        let ts = Timestamp::new("2021-03-01T12:00:00+02:00".to_string());
        let expected = Utc.with_ymd_and_hms(2021, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(ts.instant(), Some(expected));
    }

    #[test]
    fn test_timestamp_instant_naive_is_utc() {
        let ts = Timestamp::new("2021-03-01 12:00:00".to_string());
        let expected = Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(ts.instant(), Some(expected));

        let frac = Timestamp::new("2021-03-01T12:00:00.250".to_string());
        assert!(frac.instant().is_some());
    }

    #[test]
    fn test_timestamp_instant_unparsable() {
        assert!(Timestamp::new("yesterday".to_string()).instant().is_none());
    }

    #[test]
    fn test_display_preserves_raw_text() {
        let ts = Timestamp::new("2021-03-01T12:00:00Z".to_string());
        assert_eq!(ts.to_string(), "2021-03-01T12:00:00Z");
        assert_eq!(Exchange::new("kraken".to_string()).to_string(), "kraken");
    }
}
