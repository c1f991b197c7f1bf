//! Fixed-point money type.
//!
//! All monetary values in this crate are represented as an exact count of
//! minor units (cents) in an `i64`. This is the same discipline the ledger's
//! ancestor payment engine used for agent balances: money is never a binary
//! float, not even transiently, so rounding error cannot accumulate across a
//! long transaction history.
//!
//! # Example
//! ```
//! use agency_ops_core::money::Money;
//!
//! let balance = Money::from_cents(100_000); // $1,000.00
//! let paid = Money::from_major_minor(250, 0); // $250.00
//! let remaining = balance.checked_sub(paid).unwrap();
//! assert_eq!(remaining.to_cents(), 75_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An exact fixed-point decimal amount, scale 2, stored as minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

/// Errors from checked `Money` arithmetic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoneyError {
    /// The operation would overflow `i64`.
    #[error("money arithmetic overflow")]
    Overflow,
}

impl Money {
    /// The additive identity.
    pub const ZERO: Money = Money(0);

    /// Construct from a raw cent count.
    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Construct from whole currency units and minor units (e.g. dollars, cents).
    ///
    /// `minor` must be in `[0, 99]`; the sign of the result follows `major`.
    pub fn from_major_minor(major: i64, minor: i64) -> Self {
        assert!((0..100).contains(&minor), "minor units must be in [0, 99]");
        let sign = if major < 0 { -1 } else { 1 };
        Money(major * 100 + sign * minor)
    }

    /// Parse a decimal string with at most 2 fractional digits, e.g. `"1234.56"` or `"-40.00"`.
    ///
    /// Returns `None` if the string isn't a valid amount with scale <= 2.
    pub fn parse_decimal(s: &str) -> Option<Money> {
        let s = s.trim();
        let negative = s.starts_with('-');
        let unsigned = s.strip_prefix('-').unwrap_or(s);
        let mut parts = unsigned.splitn(2, '.');
        let whole = parts.next()?;
        let frac = parts.next().unwrap_or("0");
        if frac.len() > 2 || !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        let whole: i64 = whole.parse().ok()?;
        let frac_padded = format!("{:0<2}", frac);
        let frac: i64 = frac_padded.parse().ok()?;
        let cents = whole * 100 + frac;
        Some(Money(if negative { -cents } else { cents }))
    }

    /// Raw cent count.
    pub fn to_cents(self) -> i64 {
        self.0
    }

    /// Whether this amount is strictly positive.
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Whether this amount is negative.
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    pub fn abs(self) -> Money {
        Money(self.0.abs())
    }

    /// Checked addition; `None` on overflow.
    pub fn checked_add(self, rhs: Money) -> Result<Money, MoneyError> {
        self.0.checked_add(rhs.0).map(Money).ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction; `None` on overflow.
    pub fn checked_sub(self, rhs: Money) -> Result<Money, MoneyError> {
        self.0.checked_sub(rhs.0).map(Money).ok_or(MoneyError::Overflow)
    }

    /// Render as a plain decimal string, e.g. `"1234.56"`.
    pub fn to_decimal_string(self) -> String {
        let negative = self.0 < 0;
        let abs = self.0.unsigned_abs();
        let whole = abs / 100;
        let frac = abs % 100;
        format!("{}{}.{:02}", if negative { "-" } else { "" }, whole, frac)
    }

    /// `self / 100.0` as an approximate major-unit value, for log-scale scoring only.
    /// Never used for ledger postings.
    pub fn to_major_approx(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}
