//! Reusable field filters
//!
//! These filters transform field values before validation

use anyhow::Result;
use serde_json::{Value, json};

/// Filter: trim whitespace from string
pub fn trim() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.trim().to_string()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: convert string to uppercase
pub fn uppercase() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.to_uppercase()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: convert string to lowercase
pub fn lowercase() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.to_lowercase()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: strip an input mask, keeping digits only
///
/// Numbers are turned into their digit string so that a document typed as a
/// number still validates.
pub fn digits_only() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| match value {
        Value::String(s) => Ok(Value::String(super::documents::digits(&s))),
        Value::Number(n) => Ok(Value::String(super::documents::digits(&n.to_string()))),
        other => Ok(other),
    }
}

/// Filter: accept numbers typed with a decimal comma (`"1.234,56"`)
pub fn parse_decimal() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        let Some(s) = value.as_str() else {
            return Ok(value);
        };
        let normalized = if s.contains(',') {
            s.replace('.', "").replace(',', ".")
        } else {
            s.to_string()
        };
        match normalized.trim().parse::<f64>() {
            Ok(num) => Ok(json!(num)),
            Err(_) => Ok(value),
        }
    }
}

/// Filter: round number to specified decimal places
pub fn round_decimals(
    decimals: u32,
) -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    move |_: &str, value: Value| {
        if let Some(num) = value.as_f64() {
            Ok(json!(round_to(num, decimals)))
        } else {
            Ok(value)
        }
    }
}

/// Round half away from zero
pub fn round_to(num: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (num * factor).round() / factor
}
