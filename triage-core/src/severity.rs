use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::TriageError;

/// Ordered traffic-light scale. "Worst" always means maximum.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Green = 1,
    Yellow = 2,
    Red = 3,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Green, Severity::Yellow, Severity::Red];

    /// Map a symbolic name onto the scale. Names are case-sensitive.
    pub fn from_name(name: &str) -> Result<Self, TriageError> {
        match name {
            "Green" => Ok(Severity::Green),
            "Yellow" => Ok(Severity::Yellow),
            "Red" => Ok(Severity::Red),
            other => Err(TriageError::InvalidSeverity(other.to_string())),
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Severity::Green),
            2 => Some(Severity::Yellow),
            3 => Some(Severity::Red),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Green => "Green",
            Severity::Yellow => "Yellow",
            Severity::Red => "Red",
        }
    }

    /// Highest member present, or `None` for an empty input.
    pub fn worst<I>(severities: I) -> Option<Self>
    where
        I: IntoIterator<Item = Severity>,
    {
        severities.into_iter().max()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::from_name(s)
    }
}

/// Validation boundary for every severity read from outside the process.
///
/// Accepts the symbolic name (`"Green"`, `"Yellow"`, `"Red"`) or a value already on
/// the scale (its level, 1 to 3). Both finding shapes go through here, so what counts
/// as a valid severity cannot drift between them.
pub fn parse_severity<'de, D>(deserializer: D) -> Result<Severity, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(SeverityVisitor)
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_severity(deserializer)
    }
}

struct SeverityVisitor;

impl SeverityVisitor {
    fn level<E: de::Error>(value: i128) -> Result<Severity, E> {
        u8::try_from(value)
            .ok()
            .and_then(Severity::from_level)
            .ok_or_else(|| E::custom(TriageError::InvalidSeverity(value.to_string())))
    }
}

impl<'de> Visitor<'de> for SeverityVisitor {
    type Value = Severity;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a severity name (Green, Yellow, Red) or level (1-3)")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Severity::from_name(value).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Self::level(value as i128)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Self::level(value as i128)
    }

    // JavaScript hosts hand every number over as a double.
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if value.fract() == 0.0 && (1.0..=3.0).contains(&value) {
            Self::level(value as i128)
        } else {
            Err(E::custom(TriageError::InvalidSeverity(value.to_string())))
        }
    }
}
