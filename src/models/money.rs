//! Money type for representing currency-tagged amounts
//!
//! Amounts are stored as integer minor units (cents) together with the
//! currency they are denominated in. Arithmetic between two amounts requires
//! the same currency; anything that could lose a fraction of a minor unit
//! takes an explicit [`RoundingMode`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{SaveError, SaveResult};

/// Minor units per major unit. Every supported currency uses two decimals.
const MINOR_PER_MAJOR: i64 = 100;

/// Three-letter upper-case currency code (e.g. "USD", "EUR")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    pub const USD: Currency = Currency(*b"USD");

    /// Create a currency from its code, normalizing to upper case
    pub fn new(code: &str) -> SaveResult<Self> {
        let code = code.trim();
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(SaveError::Validation(format!(
                "Invalid currency code: '{}'",
                code
            )));
        }

        let mut upper = [0u8; 3];
        for (slot, b) in upper.iter_mut().zip(bytes) {
            *slot = b.to_ascii_uppercase();
        }
        Ok(Self(upper))
    }

    /// The code as a string slice
    pub fn code(&self) -> &str {
        // Only ASCII letters are ever stored
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = SaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = SaveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

/// How to resolve a fractional minor unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round to nearest, ties to the even neighbour (banker's rounding)
    HalfEven,
    /// Drop the fraction (round toward zero)
    Truncate,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
            Self::Truncate => RoundingStrategy::ToZero,
        }
    }
}

/// A currency-tagged amount stored as integer minor units
///
/// Positive values are inflows, negative values are outflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor_units: i64,
    currency: Currency,
}

impl Money {
    /// Create an amount from minor units
    pub const fn new(minor_units: i64, currency: Currency) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    /// Create a zero amount
    pub const fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Amount in minor units
    pub const fn minor_units(&self) -> i64 {
        self.minor_units
    }

    pub const fn currency(&self) -> Currency {
        self.currency
    }

    pub const fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.minor_units > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    fn ensure_same_currency(&self, other: &Money) -> SaveResult<()> {
        if self.currency != other.currency {
            return Err(SaveError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }

    /// Sum of two amounts in the same currency
    pub fn add(&self, other: &Money) -> SaveResult<Money> {
        self.ensure_same_currency(other)?;
        let minor_units = self
            .minor_units
            .checked_add(other.minor_units)
            .ok_or_else(|| SaveError::AmountOverflow(format!("{} + {}", self, other)))?;
        Ok(Self::new(minor_units, self.currency))
    }

    /// Difference of two amounts in the same currency
    pub fn subtract(&self, other: &Money) -> SaveResult<Money> {
        self.ensure_same_currency(other)?;
        let minor_units = self
            .minor_units
            .checked_sub(other.minor_units)
            .ok_or_else(|| SaveError::AmountOverflow(format!("{} - {}", self, other)))?;
        Ok(Self::new(minor_units, self.currency))
    }

    pub fn negate(&self) -> SaveResult<Money> {
        let minor_units = self
            .minor_units
            .checked_neg()
            .ok_or_else(|| SaveError::AmountOverflow(format!("-({})", self)))?;
        Ok(Self::new(minor_units, self.currency))
    }

    /// Absolute value
    pub fn abs(&self) -> SaveResult<Money> {
        if self.is_negative() {
            self.negate()
        } else {
            Ok(*self)
        }
    }

    /// Order two amounts; only defined within one currency
    pub fn compare(&self, other: &Money) -> SaveResult<Ordering> {
        self.ensure_same_currency(other)?;
        Ok(self.minor_units.cmp(&other.minor_units))
    }

    /// Multiply by a possibly fractional factor (e.g. a percentage)
    ///
    /// The rounding mode is mandatory so no caller loses cents silently.
    pub fn scale(&self, factor: Decimal, rounding: RoundingMode) -> SaveResult<Money> {
        let minor_units = self.scaled_minor_units(factor, rounding)?;
        Ok(Self::new(minor_units, self.currency))
    }

    /// Convert into another currency at a pinned rate
    ///
    /// `rate` is units of `target` per one unit of this amount's currency.
    /// Ledger, projection and budget code never call this implicitly.
    pub fn convert(
        &self,
        rate: Decimal,
        target: Currency,
        rounding: RoundingMode,
    ) -> SaveResult<Money> {
        if rate.is_sign_negative() || rate.is_zero() {
            return Err(SaveError::Validation(format!(
                "Exchange rate must be positive, got {}",
                rate
            )));
        }
        let minor_units = self.scaled_minor_units(rate, rounding)?;
        Ok(Self::new(minor_units, target))
    }

    fn scaled_minor_units(&self, factor: Decimal, rounding: RoundingMode) -> SaveResult<i64> {
        let overflow = || SaveError::AmountOverflow(format!("{} x {}", self, factor));
        Decimal::from(self.minor_units)
            .checked_mul(factor)
            .ok_or_else(overflow)?
            .round_dp_with_strategy(0, rounding.strategy())
            .to_i64()
            .ok_or_else(overflow)
    }

    /// Sum a sequence of amounts, all in `currency`
    pub fn sum<'a, I>(currency: Currency, amounts: I) -> SaveResult<Money>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.add(m))
    }

    /// Parse a decimal major-unit amount such as "12.34" or "-5"
    ///
    /// More than two decimal places is rejected rather than rounded.
    pub fn parse(s: &str, currency: Currency) -> SaveResult<Money> {
        let s = s.trim();
        let s = s.strip_prefix('+').unwrap_or(s);
        let value = Decimal::from_str(s)
            .map_err(|_| SaveError::Validation(format!("Invalid money format: {}", s)))?;

        if value.normalize().scale() > 2 {
            return Err(SaveError::Validation(format!(
                "Amount has more than two decimal places: {}",
                s
            )));
        }

        let minor_units = value
            .checked_mul(Decimal::from(MINOR_PER_MAJOR))
            .and_then(|d| d.to_i64())
            .ok_or_else(|| SaveError::AmountOverflow(s.to_string()))?;
        Ok(Self::new(minor_units, currency))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.minor_units.unsigned_abs();
        let per = MINOR_PER_MAJOR as u64;
        write!(
            f,
            "{}{}.{:02} {}",
            sign,
            abs / per,
            abs % per,
            self.currency
        )
    }
}
