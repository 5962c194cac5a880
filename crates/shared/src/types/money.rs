//! Unsigned monetary amount.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Ledger amounts are always stored unsigned; the direction of a transaction
//! carries the sign, so an `Amount` can only be constructed from a strictly
//! positive `Decimal`. Amounts are also bounded to what a `NUMERIC(19, 4)`
//! column holds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected amount values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Amount was zero.
    #[error("Amount must be greater than 0")]
    Zero,
    /// Amount was negative.
    #[error("Amount must be greater than 0, got {0}")]
    Negative(Decimal),
    /// Amount carries more fractional digits than storage keeps.
    #[error("Amount must have at most {max} decimal places, got {scale}", max = Amount::MAX_SCALE)]
    TooPrecise {
        /// Fractional digits supplied.
        scale: u32,
    },
    /// Amount does not fit the storage column.
    #[error("Amount must be less than {bound}, got {0}", bound = Amount::upper_bound())]
    TooLarge(Decimal),
}

/// A strictly positive monetary amount.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Fractional digits kept by storage.
    pub const MAX_SCALE: u32 = 4;

    /// Exclusive upper bound, `10^15`.
    #[must_use]
    pub fn upper_bound() -> Decimal {
        Decimal::from(1_000_000_000_000_000_i64)
    }

    /// Creates a new amount.
    ///
    /// Rejects zero, negative values, more than four decimal places (after
    /// dropping trailing zeros) and values of `10^15` or more.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_zero() {
            return Err(AmountError::Zero);
        }
        if value.is_sign_negative() {
            return Err(AmountError::Negative(value));
        }
        let scale = value.normalize().scale();
        if scale > Self::MAX_SCALE {
            return Err(AmountError::TooPrecise { scale });
        }
        if value >= Self::upper_bound() {
            return Err(AmountError::TooLarge(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
