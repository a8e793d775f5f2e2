//! Field lookup over loosely shaped JSON objects.
//!
//! Stored records and client payloads spell the same field several ways, send
//! numbers as strings and leave fields as `null`. A [`LooseObject`] keeps the
//! raw map and resolves each field from a list of accepted keys in precedence
//! order, so two spellings of one field or an explicit `null` never fail a
//! parse.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct LooseObject(Map<String, Value>);

impl LooseObject {
    /// First non-null value among `keys`.
    pub fn value(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| !value.is_null())
    }

    /// First non-blank text among `keys`, trimmed. Numbers read as their text.
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .filter_map(value_text)
            .find(|text| !text.is_empty())
    }

    /// First readable number among `keys`.
    pub fn number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .find_map(|key| lenient_number(self.0.get(*key)))
    }
}

/// Text of a string or number value, trimmed.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Reads a number that may be a JSON number or a numeric string ("12.50").
pub fn lenient_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// `deserialize_with` for optional text fields that may arrive as numbers.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_text)
        .filter(|text| !text.is_empty()))
}

/// `deserialize_with` for amounts: null, blank or unreadable read as 0.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(lenient_number(value.as_ref()).unwrap_or(0.0))
}
