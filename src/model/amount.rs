//! Amount type for handling monetary values with exactly two fractional digits.
//!
//! This module provides the `Amount` type which wraps `Decimal` and normalizes every value to a
//! scale of two, rounding half-up, so that amounts read back from a ledger file compare equal to
//! the amounts that were written.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// The number of fractional digits every amount carries.
const SCALE: u32 = 2;

/// Represents a monetary amount.
///
/// The wrapped `Decimal` is always rounded (half-up, i.e. midpoint away from zero) and rescaled to
/// two fractional digits on construction, so `Display` always prints two decimals and equality is
/// numeric.
///
/// # Examples
///
/// ```
/// # use pocket_ledger::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("25.5").unwrap();
/// assert_eq!(amount.to_string(), "25.50");
/// ```
///
/// Half-up rounding:
/// ```
/// # use pocket_ledger::model::Amount;
/// # use std::str::FromStr;
/// assert_eq!(Amount::from_str("0.125").unwrap().to_string(), "0.13");
/// assert_eq!(Amount::from_str("-0.125").unwrap().to_string(), "-0.13");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount, `0.00`.
    pub const ZERO: Amount = Amount(Decimal::from_parts(0, 0, 0, false, SCALE));

    /// The largest amount that still carries two fractional digits.
    pub const MAX: Amount = Amount(Decimal::from_parts(u32::MAX, u32::MAX, u32::MAX, false, SCALE));

    /// The smallest amount that still carries two fractional digits.
    pub const MIN: Amount = Amount(Decimal::from_parts(u32::MAX, u32::MAX, u32::MAX, true, SCALE));

    /// Creates a new Amount from a Decimal value, normalizing it to two fractional digits.
    ///
    /// Values too large to carry two fractional digits are clamped to [`Amount::MAX`] or
    /// [`Amount::MIN`].
    pub fn new(value: Decimal) -> Self {
        Self::try_new(value).unwrap_or(if value.is_sign_negative() {
            Amount::MIN
        } else {
            Amount::MAX
        })
    }

    /// Like `new`, but returns `None` when the value cannot carry two fractional digits.
    fn try_new(value: Decimal) -> Option<Self> {
        let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(SCALE);
        (rounded.scale() == SCALE).then_some(Self(rounded))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::ZERO
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('_') {
            return Err(AmountError(rust_decimal::Error::ErrorString(format!(
                "Invalid amount '{s}'"
            ))));
        }
        let value = Decimal::from_str(s).map_err(AmountError)?;
        Amount::try_new(value).ok_or(AmountError(
            rust_decimal::Error::ExceedsMaximumPossibleValue,
        ))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        match self.0.checked_add(rhs.0) {
            Some(value) => Amount::new(value),
            None if rhs.0.is_sign_negative() => Amount::MIN,
            None => Amount::MAX,
        }
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        match self.0.checked_sub(rhs.0) {
            Some(value) => Amount::new(value),
            None if rhs.0.is_sign_negative() => Amount::MAX,
            None => Amount::MIN,
        }
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
