//! Lenient decoders for backend payloads.
//!
//! The scoring backend is loosely typed: lab values arrive as numeric
//! strings with thousands separators, optimal ranges arrive as either
//! text or numbers, and empty strings stand in for missing bounds.

use serde::de::{Deserializer, Error};
use serde::Deserialize;
use serde_json::Value;

/// Render a JSON scalar as display text.
pub fn text_from_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_text(&value).ok_or_else(|| D::Error::custom(format!("expected text, found {}", value)))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        // [low, high] pairs are shown as a range
        Value::Array(items) if items.len() == 2 => {
            let low = scalar_text(&items[0])?;
            let high = scalar_text(&items[1])?;
            Some(format!("{}–{}", low, high))
        }
        _ => None,
    }
}

/// Decode a number that may have been sent as a string.
pub fn number_from_scalar<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match parse_number(&value) {
        Some(Some(n)) => Ok(n),
        _ => Err(D::Error::custom(format!("expected a number, found {}", value))),
    }
}

/// Decode an optional number; `null` and blank strings mean absent.
pub fn optional_number_from_scalar<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_number(&value).ok_or_else(|| D::Error::custom(format!("expected a number, found {}", value)))
}

/// Decode optional free text; `null` and blank strings mean absent.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = text_from_scalar(deserializer)?;
    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

/// `Some(None)` is an explicit absence, `None` is a value that is not numeric.
fn parse_number(value: &Value) -> Option<Option<f64>> {
    match value {
        Value::Null => Some(None),
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()).map(Some),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                return Some(None);
            }
            cleaned.parse::<f64>().ok().filter(|n| n.is_finite()).map(Some)
        }
        _ => None,
    }
}
