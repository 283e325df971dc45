use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An exact, possibly fractional, number of leave days.
///
/// Stored as TEXT in SQLite so that half days and manual adjustments never
/// go through binary floating point.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Days(BigDecimal);

impl Days {
    pub fn new(value: BigDecimal) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(BigDecimal::from(0))
    }

    pub fn half() -> Self {
        Self(BigDecimal::new(5.into(), 1))
    }

    pub fn whole(days: i64) -> Self {
        Self(BigDecimal::from(days))
    }

    /// Round user supplied values to two decimal places.
    pub fn from_input(value: BigDecimal) -> Self {
        Self(value.round(2))
    }

    pub fn is_positive(&self) -> bool {
        self.0 > BigDecimal::from(0)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < BigDecimal::from(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigDecimal::from(0)
    }

    /// Negative values read back from storage count as nothing available.
    pub fn non_negative(self) -> Self {
        if self.is_negative() { Self::zero() } else { self }
    }

    pub fn has_fraction(&self) -> bool {
        !self.0.is_integer()
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    pub fn into_inner(self) -> BigDecimal {
        self.0
    }
}

impl Default for Days {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for Days {
    fn from(days: i64) -> Self {
        Self::whole(days)
    }
}

impl From<BigDecimal> for Days {
    fn from(value: BigDecimal) -> Self {
        Self(value)
    }
}

impl Add for Days {
    type Output = Days;

    fn add(self, rhs: Days) -> Days {
        Days(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Days> for &'a Days {
    type Output = Days;

    fn add(self, rhs: &'a Days) -> Days {
        Days(&self.0 + &rhs.0)
    }
}

impl Sub for Days {
    type Output = Days;

    fn sub(self, rhs: Days) -> Days {
        Days(self.0 - rhs.0)
    }
}

impl<'a> Sub<&'a Days> for &'a Days {
    type Output = Days;

    fn sub(self, rhs: &'a Days) -> Days {
        Days(&self.0 - &rhs.0)
    }
}

impl std::iter::Sum for Days {
    fn sum<I: Iterator<Item = Days>>(iter: I) -> Self {
        iter.fold(Days::zero(), |acc, d| acc + d)
    }
}

impl fmt::Display for Days {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.0.to_string();
        if raw.contains('.') && !raw.contains(['e', 'E']) {
            f.write_str(raw.trim_end_matches('0').trim_end_matches('.'))
        } else {
            f.write_str(&raw)
        }
    }
}

impl FromStr for Days {
    type Err = bigdecimal::ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigDecimal::from_str(s.trim()).map(Days)
    }
}

impl Serialize for Days {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Days {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BigDecimal::deserialize(deserializer).map(Days)
    }
}

impl sqlx::Type<sqlx::Sqlite> for Days {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Days {
    fn encode_by_ref(
        &self,
        args: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode(self.to_string(), args)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Days {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(s.parse::<Days>()?)
    }
}
