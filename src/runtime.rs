//! Runtime scalar codec
//!
//! A `Runtime` is a count of minutes whose JSON form is the string
//! `"<N> mins"` rather than a bare number. Only the canonical grammar is
//! accepted on decode, so every accepted string re-encodes to itself.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const UNIT: &str = "mins";

/// The string did not match `<decimal-integer> mins`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid runtime format")]
pub struct RuntimeFormatError;

/// Duration in whole minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Runtime(pub i32);

impl Runtime {
    pub fn new(minutes: i32) -> Self {
        Runtime(minutes)
    }

    pub fn minutes(self) -> i32 {
        self.0
    }

    /// Decode from an already-parsed JSON value. Non-string values fail.
    pub fn from_json(value: &JsonValue) -> Result<Self, RuntimeFormatError> {
        match value {
            JsonValue::String(s) => s.parse(),
            _ => Err(RuntimeFormatError),
        }
    }

    pub fn to_json(self) -> JsonValue {
        JsonValue::String(self.to_string())
    }
}

impl From<i32> for Runtime {
    fn from(minutes: i32) -> Self {
        Runtime(minutes)
    }
}

impl From<Runtime> for i32 {
    fn from(runtime: Runtime) -> Self {
        runtime.0
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, UNIT)
    }
}

impl FromStr for Runtime {
    type Err = RuntimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(' ');
        let (Some(number), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RuntimeFormatError);
        };
        if unit != UNIT || !is_canonical_integer(number) {
            return Err(RuntimeFormatError);
        }
        number.parse().map(Runtime).map_err(|_| RuntimeFormatError)
    }
}

/// Decimal digits with an optional leading minus, no `+`, no leading zeros, no `-0`
fn is_canonical_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.starts_with('0') {
        return digits == "0" && digits.len() == s.len();
    }
    true
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuntimeVisitor;

        impl Visitor<'_> for RuntimeVisitor {
            type Value = Runtime;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a string of the form \"<N> mins\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(RuntimeVisitor)
    }
}
