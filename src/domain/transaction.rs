//! Canonical transaction record consumed by the ledger engine.

use crate::domain::{Action, Decimal, Exchange, Product, Timestamp};
use serde::{Deserialize, Serialize};

/// A single normalized buy or sell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Exchange the order was executed on.
    pub exchange: Exchange,
    /// Product/pair traded.
    pub product: Product,
    /// Execution time as reported by the exchange.
    pub timestamp: Timestamp,
    /// Buy or Sell.
    pub action: Action,
    /// Units of the base asset, strictly positive.
    pub quantity: Decimal,
    /// Price per unit in quote currency.
    pub unit_price: Decimal,
    /// Fee charged in quote currency.
    pub fee: Decimal,
    /// Free-form note carried through to the ledger.
    pub note: String,
}

impl Transaction {
    /// Create a new Transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        exchange: Exchange,
        product: Product,
        timestamp: Timestamp,
        action: Action,
        quantity: Decimal,
        unit_price: Decimal,
        fee: Decimal,
        note: String,
    ) -> Self {
        Transaction {
            exchange,
            product,
            timestamp,
            action,
            quantity,
            unit_price,
            fee,
            note,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.action == Action::Buy
    }

    /// Check the numeric invariants of the record.
    ///
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        if !self.quantity.is_positive() {
            return Err(format!("quantity must be positive, got {}", self.quantity));
        }
        if self.unit_price.is_negative() {
            return Err(format!(
                "unit price must be non-negative, got {}",
                self.unit_price
            ));
        }
        if self.fee.is_negative() {
            return Err(format!("fee must be non-negative, got {}", self.fee));
        }
        Ok(())
    }

    /// Stable identity used to detect duplicates across overlapping exports.
    ///
    /// Numbers are hashed in canonical form, so `1.0` and `1.00000000` collide.
    pub fn transaction_key(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        for field in [
            self.exchange.as_str(),
            self.product.as_str(),
            self.timestamp.as_str(),
        ] {
            hasher.update(field);
            hasher.update([0u8]);
        }
        hasher.update(if self.is_buy() { b"B" } else { b"S" });
        hasher.update(self.quantity.to_canonical_string());
        hasher.update([0u8]);
        hasher.update(self.unit_price.to_canonical_string());
        hasher.update([0u8]);
        hasher.update(self.fee.to_canonical_string());
        hasher.update([0u8]);
        hasher.update(&self.note);
        let hash = hasher.finalize();
        hex::encode(&hash[..16])
    }
}
