//! Identifier primitives for collections
//!
//! Identifiers are strictly positive integers naming objects in the host
//! store. Zero is reserved as the "no object" sentinel produced by failed
//! coercions, so [`Id`] is backed by [`NonZeroU64`] and zero is
//! unrepresentable.
//!
//! [`IdValue`] is the loose scalar accepted by the sanitizing populate
//! path: callers seeding a collection from external data (form input,
//! JSON, a parent query) hand over whatever they have, and coercion keeps
//! only the values that name a real identifier.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("identifier must be a positive integer, got 0")]
    Zero,

    #[error("identifier must be a positive integer, got {0}")]
    OutOfRange(i64),

    #[error("invalid identifier: expected a positive integer, got '{0}'")]
    Invalid(String),
}

/// A strictly positive object identifier.
///
/// Serializes as a plain JSON number. Construction from zero or negative
/// input is rejected rather than clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Id(NonZeroU64);

impl Id {
    /// Creates an identifier, returning `None` for zero.
    pub fn new(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(Self)
    }

    /// Returns the numeric value.
    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for Id {
    type Error = IdError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Id::new(value).ok_or(IdError::Zero)
    }
}

impl TryFrom<i64> for Id {
    type Error = IdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .ok()
            .and_then(Id::new)
            .ok_or(IdError::OutOfRange(value))
    }
}

impl From<Id> for u64 {
    fn from(id: Id) -> Self {
        id.get()
    }
}

impl FromStr for Id {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: u64 = trimmed
            .parse()
            .map_err(|_| IdError::Invalid(trimmed.to_string()))?;
        Id::new(value).ok_or(IdError::Zero)
    }
}

/// A loose scalar that may or may not name an identifier.
///
/// Conversions exist from the common integer types, floats, strings, and
/// [`serde_json::Value`], so heterogeneous input (decoded JSON, parsed
/// request parameters) can be fed to [`IdList::populate`] directly.
///
/// [`IdList::populate`]: super::IdList::populate
#[derive(Debug, Clone, PartialEq)]
pub enum IdValue {
    Uint(u64),
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl IdValue {
    /// Best-effort coercion to a non-negative integer.
    ///
    /// Anything that does not name a positive integer collapses to 0:
    /// negative numbers, non-finite floats, text without leading digits,
    /// and structured JSON. Text is read as an optional `+` sign followed
    /// by decimal digits, ignoring any trailing garbage (`" 12px"` is 12).
    /// Floats truncate toward zero.
    pub fn coerce(&self) -> u64 {
        match self {
            IdValue::Uint(n) => *n,
            IdValue::Int(i) => {
                if *i > 0 {
                    *i as u64
                } else {
                    0
                }
            }
            IdValue::Float(f) => {
                if f.is_finite() && *f >= 0.0 {
                    *f as u64
                } else {
                    0
                }
            }
            IdValue::Text(s) => leading_uint(s),
            IdValue::Null => 0,
        }
    }

    /// Coerces to an [`Id`], dropping anything that collapses to 0.
    pub fn to_id(&self) -> Option<Id> {
        Id::new(self.coerce())
    }
}

/// Reads the leading unsigned decimal portion of a string.
///
/// Leading whitespace and a single `+` are tolerated. A `-` sign makes the
/// whole value unusable (negative identifiers never exist), as does text
/// with no digits at all. Overflow saturates.
fn leading_uint(s: &str) -> u64 {
    let t = s.trim_start();
    let t = t.strip_prefix('+').unwrap_or(t);
    if t.starts_with('-') {
        return 0;
    }
    let end = t
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(t.len());
    let digits = &t[..end];
    if digits.is_empty() {
        0
    } else {
        // All-ASCII digits: parse fails only on overflow.
        digits.parse().unwrap_or(u64::MAX)
    }
}

impl From<u64> for IdValue {
    fn from(value: u64) -> Self {
        IdValue::Uint(value)
    }
}

impl From<u32> for IdValue {
    fn from(value: u32) -> Self {
        IdValue::Uint(value as u64)
    }
}

impl From<i64> for IdValue {
    fn from(value: i64) -> Self {
        IdValue::Int(value)
    }
}

impl From<i32> for IdValue {
    fn from(value: i32) -> Self {
        IdValue::Int(value as i64)
    }
}

impl From<f64> for IdValue {
    fn from(value: f64) -> Self {
        IdValue::Float(value)
    }
}

impl From<&str> for IdValue {
    fn from(value: &str) -> Self {
        IdValue::Text(value.to_string())
    }
}

impl From<String> for IdValue {
    fn from(value: String) -> Self {
        IdValue::Text(value)
    }
}

impl From<Id> for IdValue {
    fn from(id: Id) -> Self {
        IdValue::Uint(id.get())
    }
}

impl From<serde_json::Value> for IdValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    IdValue::Uint(u)
                } else if let Some(i) = n.as_i64() {
                    IdValue::Int(i)
                } else {
                    IdValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => IdValue::Text(s),
            serde_json::Value::Bool(b) => IdValue::Int(b as i64),
            // Arrays and objects never name an identifier.
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => IdValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_rejects_zero() {
        assert!(Id::new(0).is_none());
        assert_eq!(Id::try_from(0u64), Err(IdError::Zero));
    }

    #[test]
    fn id_rejects_negative() {
        assert_eq!(Id::try_from(-5i64), Err(IdError::OutOfRange(-5)));
        assert_eq!(Id::try_from(0i64), Err(IdError::OutOfRange(0)));
    }

    #[test]
    fn id_accepts_positive() {
        let id = Id::try_from(42u64).unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(Id::try_from(1i64).unwrap().get(), 1);
    }

    #[test]
    fn id_parses_from_string() {
        let id: Id = "17".parse().unwrap();
        assert_eq!(id.get(), 17);

        let id: Id = "  9 ".parse().unwrap();
        assert_eq!(id.get(), 9);
    }

    #[test]
    fn id_parse_rejects_garbage() {
        assert!("abc".parse::<Id>().is_err());
        assert!("-3".parse::<Id>().is_err());
        assert_eq!("0".parse::<Id>(), Err(IdError::Zero));
    }

    #[test]
    fn id_displays_as_number() {
        let id = Id::new(123).unwrap();
        assert_eq!(id.to_string(), "123");
    }

    #[test]
    fn serde_roundtrip_as_number() {
        let id = Id::new(7).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");

        let parsed: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn serde_rejects_zero() {
        assert!(serde_json::from_str::<Id>("0").is_err());
    }

    #[test]
    fn coerce_integers() {
        assert_eq!(IdValue::from(3u64).coerce(), 3);
        assert_eq!(IdValue::from(3i64).coerce(), 3);
        assert_eq!(IdValue::from(0i64).coerce(), 0);
        assert_eq!(IdValue::from(-2i64).coerce(), 0);
    }

    #[test]
    fn coerce_text() {
        assert_eq!(IdValue::from("5").coerce(), 5);
        assert_eq!(IdValue::from(" 12px").coerce(), 12);
        assert_eq!(IdValue::from("+8").coerce(), 8);
        assert_eq!(IdValue::from("007").coerce(), 7);
        assert_eq!(IdValue::from("abc").coerce(), 0);
        assert_eq!(IdValue::from("-2").coerce(), 0);
        assert_eq!(IdValue::from("").coerce(), 0);
    }

    #[test]
    fn coerce_floats_truncate() {
        assert_eq!(IdValue::from(3.9).coerce(), 3);
        assert_eq!(IdValue::from(0.4).coerce(), 0);
        assert_eq!(IdValue::from(-1.5).coerce(), 0);
        assert_eq!(IdValue::from(f64::NAN).coerce(), 0);
        assert_eq!(IdValue::from(f64::INFINITY).coerce(), 0);
    }

    #[test]
    fn coerce_json_values() {
        assert_eq!(IdValue::from(json!(7)).coerce(), 7);
        assert_eq!(IdValue::from(json!("5")).coerce(), 5);
        assert_eq!(IdValue::from(json!(true)).coerce(), 1);
        assert_eq!(IdValue::from(json!(false)).coerce(), 0);
        assert_eq!(IdValue::from(json!(null)).coerce(), 0);
        assert_eq!(IdValue::from(json!([1, 2])).coerce(), 0);
        assert_eq!(IdValue::from(json!({"id": 3})).coerce(), 0);
    }

    #[test]
    fn to_id_drops_zero() {
        assert_eq!(IdValue::from("abc").to_id(), None);
        assert_eq!(IdValue::from(0u64).to_id(), None);
        assert_eq!(IdValue::from(9u64).to_id(), Id::new(9));
    }

    #[test]
    fn overflow_saturates() {
        let huge = "99999999999999999999999999";
        assert_eq!(IdValue::from(huge).coerce(), u64::MAX);
    }
}
