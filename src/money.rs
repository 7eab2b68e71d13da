//! Monetary amounts with exactly two decimal places.
//!
//! Amounts cross the API boundary as [Decimal]s and are stored in the database
//! as integer cents so that SQL aggregates are exact.

use std::{
    fmt::Display,
    ops::{Add, Neg, Sub},
};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

use crate::Error;

/// The exclusive upper bound on the magnitude of an amount, in cents.
///
/// Amounts have a precision of 10 digits with 2 after the decimal point, so
/// the largest representable magnitude is 99,999,999.99.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_00;

/// An amount of money, held as a whole number of cents.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// The amount zero.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from a whole number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount as a whole number of cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Parse a user supplied amount, rounding to two decimal places.
    ///
    /// Halfway values are rounded away from zero, e.g. 4.505 becomes 4.51.
    ///
    /// # Errors
    /// Returns [Error::InvalidField] naming `field` if the rounded amount is
    /// zero or its magnitude is not less than 100,000,000.
    pub fn parse(field: &'static str, value: Decimal) -> Result<Self, Error> {
        let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        if rounded.is_zero() {
            return Err(Error::InvalidField {
                field,
                reason: "must not be zero".to_owned(),
            });
        }

        rounded.rescale(2);
        let too_large = || Error::InvalidField {
            field,
            reason: "must be less than 100000000".to_owned(),
        };
        let cents = i64::try_from(rounded.mantissa()).map_err(|_| too_large())?;

        if cents.abs() >= MAX_AMOUNT_CENTS {
            return Err(too_large());
        }

        Ok(Self(cents))
    }

    /// Parse a user supplied amount that must be strictly positive.
    ///
    /// # Errors
    /// Returns [Error::InvalidField] if the amount is invalid (see [Amount::parse])
    /// or negative.
    pub fn parse_positive(field: &'static str, value: Decimal) -> Result<Self, Error> {
        let amount = Self::parse(field, value)?;

        if amount.is_negative() {
            return Err(Error::InvalidField {
                field,
                reason: "must be greater than zero".to_owned(),
            });
        }

        Ok(amount)
    }

    /// Parse a user supplied amount that may be zero but not negative.
    ///
    /// # Errors
    /// Returns [Error::InvalidField] if the amount is negative or too large.
    pub fn parse_non_negative(field: &'static str, value: Decimal) -> Result<Self, Error> {
        if value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .is_zero()
        {
            return Ok(Self::ZERO);
        }

        let amount = Self::parse(field, value)?;

        if amount.is_negative() {
            return Err(Error::InvalidField {
                field,
                reason: "must not be negative".to_owned(),
            });
        }

        Ok(amount)
    }

    /// The magnitude of the amount.
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Whether the amount is less than zero.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// The amount as a decimal number with two decimal places.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// The amount as a float, for display and charting only.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

/// Amounts are serialized as decimal strings, e.g. "-4.50", so that clients
/// never see binary floating point rounding.
impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Serialize an [Amount] as a JSON number, for aggregates that clients chart or
/// do arithmetic on.
///
/// Use with `#[serde(with = "float_format")]`.
pub mod float_format {
    use serde::Serializer;

    use super::Amount;

    /// Serialize `amount` as a float with two decimal places.
    pub fn serialize<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(amount.as_f64())
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Amount)
    }
}
