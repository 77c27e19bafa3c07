//! Column type tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resolution of a datetime column's ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "ms")]
    Milliseconds,
    /// Microseconds since the Unix epoch.
    #[serde(rename = "us")]
    Microseconds,
    /// Nanoseconds since the Unix epoch.
    #[serde(rename = "ns")]
    Nanoseconds,
}

impl TimeUnit {
    /// Short suffix used in type names (`ms`, `us`, `ns`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Milliseconds => "ms",
            Self::Microseconds => "us",
            Self::Nanoseconds => "ns",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical type of a column.
///
/// | Type | Storage |
/// |------|---------|
/// | `Int` | `i64` |
/// | `Float` | `f64` |
/// | `Bool` | `bool` |
/// | `Text` | `String` |
/// | `Date` | `i32` days since 1970-01-01 |
/// | `Datetime` | `i64` ticks since 1970-01-01T00:00:00 in `unit` |
/// | `Time` | `i64` nanoseconds since midnight |
///
/// The text form (`int`, `datetime[ms, UTC]`, ...) is what options files and
/// the command line accept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnType {
    Int,
    Float,
    Bool,
    Text,
    Date,
    Datetime {
        unit: TimeUnit,
        /// Timezone name exactly as the source declared it.
        timezone: Option<String>,
    },
    Time,
}

impl ColumnType {
    /// Naive datetime at microsecond resolution.
    #[must_use]
    pub const fn datetime() -> Self {
        Self::Datetime {
            unit: TimeUnit::Microseconds,
            timezone: None,
        }
    }

    /// Whether values of this type are temporal.
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Datetime { .. } | Self::Time)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Text => f.write_str("text"),
            Self::Date => f.write_str("date"),
            Self::Datetime {
                unit,
                timezone: None,
            } => write!(f, "datetime[{unit}]"),
            Self::Datetime {
                unit,
                timezone: Some(tz),
            } => write!(f, "datetime[{unit}, {tz}]"),
            Self::Time => f.write_str("time"),
        }
    }
}

/// A type name that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown column type '{0}' (expected int, float, bool, text, date, time or datetime[unit, zone])")]
pub struct ParseColumnTypeError(pub String);

impl FromStr for ColumnType {
    type Err = ParseColumnTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let lower = raw.to_ascii_lowercase();
        match lower.as_str() {
            "int" | "integer" | "i64" => return Ok(Self::Int),
            "float" | "f64" => return Ok(Self::Float),
            "bool" | "boolean" => return Ok(Self::Bool),
            "text" | "str" | "string" => return Ok(Self::Text),
            "date" => return Ok(Self::Date),
            "time" => return Ok(Self::Time),
            "datetime" => return Ok(Self::datetime()),
            _ => {}
        }
        let err = || ParseColumnTypeError(raw.to_string());
        // Zone names are case-sensitive, so slice the original text.
        let inner = raw
            .get(..9)
            .filter(|prefix| prefix.eq_ignore_ascii_case("datetime["))
            .and_then(|_| raw[9..].strip_suffix(']'))
            .ok_or_else(err)?;
        let (unit, timezone) = match inner.split_once(',') {
            Some((unit, tz)) => (unit.trim(), Some(tz.trim())),
            None => (inner.trim(), None),
        };
        let unit = match unit.to_ascii_lowercase().as_str() {
            "ms" => TimeUnit::Milliseconds,
            "us" => TimeUnit::Microseconds,
            "ns" => TimeUnit::Nanoseconds,
            _ => return Err(err()),
        };
        if timezone.is_some_and(str::is_empty) {
            return Err(err());
        }
        Ok(Self::Datetime {
            unit,
            timezone: timezone.map(str::to_string),
        })
    }
}

impl TryFrom<String> for ColumnType {
    type Error = ParseColumnTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.to_string()
    }
}
