//! Serde helpers for the API's numeric conventions.
//!
//! Responses carry decimals as JSON strings (`"0.040000"`), sometimes as numbers,
//! null, or empty strings. Requests carry them as JSON numbers written with the
//! decimal's exact digits (no float conversion, no exponent form).

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Parse a string or number into a decimal without going through binary floats
/// when the input is a string.
pub(crate) fn parse_decimalish(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Decimal::from_str_exact(s.trim())
            .or_else(|_| Decimal::from_scientific(s.trim()))
            .ok(),
        Value::Number(n) => Decimal::from_str_exact(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        _ => None,
    }
}

/// Optional decimal: accepts string, number, null, or `""`.
pub(crate) mod opt_decimal {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<Value> = Option::deserialize(deserializer)?;
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(v) => match parse_decimalish(&v) {
                Some(d) => Ok(Some(d)),
                None if matches!(&v, Value::String(s) if s.trim().is_empty()) => Ok(None),
                None => Err(serde::de::Error::custom(format!("invalid decimal: {v}"))),
            },
        }
    }
}

/// Decimal sent as a JSON number, read back from a number or a string.
pub(crate) mod decimal_number {
    use super::*;

    pub fn serialize<S>(value: &Decimal, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        rust_decimal::serde::arbitrary_precision::serialize(value, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        parse_decimalish(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid decimal: {value}")))
    }
}

pub(crate) fn is_zero(value: &Decimal) -> bool {
    value.is_zero()
}
