// src/utils/serialization.rs
//! Serialization utilities.
//!
//! Provides:
//! - JSON string helpers used by the IPFS mirror
//! - Lenient coercions for third-party JSON where scalars arrive as either
//!   strings or numbers

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Serializes a value to a pretty-printed JSON string.
///
/// # Arguments
/// * `data` - The value to serialize (must implement `Serialize`)
///
/// # Returns
/// - `Ok(String)` with JSON representation on success
/// - `Err(serde_json::Error)` if serialization fails
pub fn serialize<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}

/// Deserializes a value from a JSON string.
///
/// # Arguments
/// * `data` - JSON string to deserialize
///
/// # Returns
/// - `Ok(T)` with deserialized value on success
/// - `Err(serde_json::Error)` if deserialization fails
pub fn deserialize<T: DeserializeOwned>(data: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(data)
}

/// Converts a JSON scalar to its text form.
///
/// Strings are returned as-is, integral numbers without a fractional part
/// (`2023.0` becomes `"2023"`), booleans as `"true"`/`"false"`. Arrays,
/// objects and `null` yield `None`.
pub fn coerce_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_to_string(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Converts a JSON scalar to a number.
///
/// Numeric strings are parsed after trimming; everything else yields `None`.
pub fn coerce_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// `deserialize_with` adapter accepting a string, number or boolean and
/// storing it as `Option<String>`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_to_string))
}
