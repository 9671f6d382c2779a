//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Provides canonical parsing from strings, fixed-precision rendering for
//! report columns, and formatting without exponent notation.

use rust_decimal::Decimal as RustDecimal;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal places used when rendering quantities.
pub const QUANTITY_DP: u32 = 8;

/// Decimal places used when rendering currency amounts.
pub const CURRENCY_DP: u32 = 2;

/// Lossless decimal numeric type for cost basis arithmetic.
///
/// Backed by rust_decimal to avoid floating-point drift.
/// Serializes to JSON number (not string) by default.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Parse a Decimal from a string losslessly.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s.trim()).map(Decimal)
    }

    /// Format the Decimal as a canonical string (no exponent notation).
    pub fn to_canonical_string(&self) -> String {
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    /// Render with exactly `dp` fractional digits, rounding half away from zero.
    ///
    /// A value that rounds to zero is rendered without a sign.
    pub fn to_fixed(&self, dp: u32) -> String {
        let mut rounded = self
            .0
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_zero() {
            rounded = RustDecimal::ZERO;
        }
        rounded.rescale(dp);
        rounded.to_string()
    }

    /// Round to `dp` fractional digits, half away from zero.
    pub fn round_dp(&self, dp: u32) -> Self {
        Decimal(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Division that resolves to zero when the divisor is zero.
    ///
    /// Returns `None` if the quotient does not fit.
    pub fn div_or_zero(self, divisor: Decimal) -> Option<Decimal> {
        if divisor.is_zero() {
            Some(Decimal::zero())
        } else {
            self.0.checked_div(divisor.0).map(Decimal)
        }
    }

    pub fn checked_add(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_add(rhs.0).map(Decimal)
    }

    pub fn checked_sub(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_sub(rhs.0).map(Decimal)
    }

    pub fn checked_mul(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_mul(rhs.0).map(Decimal)
    }

    /// Sum that stops at the first overflow.
    pub fn checked_sum<I: IntoIterator<Item = Decimal>>(values: I) -> Option<Decimal> {
        values
            .into_iter()
            .try_fold(Decimal::zero(), |acc, d| acc.checked_add(d))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl std::iter::Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::zero(), |acc, d| acc + d)
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Decimal) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Decimal {
    fn sub_assign(&mut self, rhs: Decimal) {
        self.0 -= rhs.0;
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}
