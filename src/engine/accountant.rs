//! Per-transaction cost basis and gain/loss against the pooled average.

use crate::domain::{Decimal, LedgerEntry, Timestamp, Transaction};

/// Price an acquisition.
///
/// `cost_basis = quantity * unit_price + fee`; the row's own per-unit cost is
/// informational and does not touch the pooled average. Returns `None` when
/// an amount does not fit in a decimal.
pub fn account_buy(tx: &Transaction) -> Option<LedgerEntry> {
    let cost_basis = tx.quantity.checked_mul(tx.unit_price)?.checked_add(tx.fee)?;
    Some(LedgerEntry {
        exchange: tx.exchange.clone(),
        product: tx.product.clone(),
        date_acquired: Some(tx.timestamp.clone()),
        action: tx.action,
        quantity: tx.quantity,
        unit_price: tx.unit_price,
        fee: tx.fee,
        cost_basis,
        acb_per_unit: cost_basis.div_or_zero(tx.quantity)?,
        date_sold: None,
        proceeds: Decimal::zero(),
        gain_or_loss: Decimal::zero(),
        note: tx.note.clone(),
    })
}

/// Price a disposal using the average frozen when its block opened.
///
/// `gain_or_loss = quantity * unit_price - quantity * frozen_average - fee`.
pub fn account_sell(
    tx: &Transaction,
    frozen_average: Decimal,
    date_acquired: Option<&Timestamp>,
) -> Option<LedgerEntry> {
    let cost_of_goods_sold = tx.quantity.checked_mul(frozen_average)?;
    let proceeds = tx.quantity.checked_mul(tx.unit_price)?;
    let gain_or_loss = proceeds
        .checked_sub(cost_of_goods_sold)?
        .checked_sub(tx.fee)?;
    Some(LedgerEntry {
        exchange: tx.exchange.clone(),
        product: tx.product.clone(),
        date_acquired: date_acquired.cloned(),
        action: tx.action,
        quantity: tx.quantity,
        unit_price: tx.unit_price,
        fee: tx.fee,
        cost_basis: cost_of_goods_sold,
        acb_per_unit: frozen_average,
        date_sold: Some(tx.timestamp.clone()),
        proceeds,
        gain_or_loss,
        note: tx.note.clone(),
    })
}
