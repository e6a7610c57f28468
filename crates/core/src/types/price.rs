//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are non-negative amounts in the store's single currency, capped at
//! [`Price::MAX`]. Arithmetic is exact; rounding only happens when a price is
//! formatted for display. Products and sums saturate at `Decimal::MAX`
//! instead of overflowing.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount is above [`Price::MAX`].
    #[error("price cannot exceed {}", Price::MAX)]
    TooLarge,
}

/// A non-negative unit or line price.
///
/// Serialized as a decimal string. Deserialization also accepts JSON numbers,
/// so slots written by older clients that stored `price` as a float still load.
///
/// ```
/// use cartstore_core::Price;
///
/// let price = Price::parse("5.5").unwrap();
/// assert_eq!(price.display(), "$5.50");
/// assert_eq!(price.times(3).display(), "$16.50");
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest accepted unit price (one billion).
    pub const MAX: Self = Self(Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero, or
    /// [`PriceError::TooLarge`] if it is above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount.normalize()))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// Parse a price from text such as `"19.99"` or `"5"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a decimal number or is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.trim().to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// This price multiplied by a quantity, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }

    /// Format for display with two decimal places (e.g. `"$19.99"`).
    ///
    /// Half-cent amounts round away from zero.
    #[must_use]
    pub fn display(&self) -> String {
        let mut rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        format!("${rounded}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
