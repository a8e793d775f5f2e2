use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::loose::{value_text, LooseObject};

/// Label printed for an item that arrived without a name.
pub const UNNAMED: &str = "Sin nombre";

const ID_KEYS: &[&str] = &["id", "product_id", "productId", "sku"];
const NAME_KEYS: &[&str] = &["name", "nombre", "product_name", "productName", "title"];
const DESCRIPTION_KEYS: &[&str] = &["description", "descripcion", "desc", "details"];
const QUANTITY_KEYS: &[&str] = &["quantity", "qty", "cantidad"];
const PRICE_KEYS: &[&str] = &["unit_price", "unitPrice", "price", "precio", "precio_unitario"];

/// Item shape as it arrives from storage or from a client: several spellings
/// of each field, nulls, and numbers that may be encoded as strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawLineItem(LooseObject);

impl RawLineItem {
    fn display_name(&self) -> String {
        self.0.text(NAME_KEYS).unwrap_or_else(|| UNNAMED.to_string())
    }

    fn description(&self) -> Option<String> {
        self.0.text(DESCRIPTION_KEYS)
    }

    /// Quantity defaults to 1 when absent or unreadable; negatives clamp to 0.
    fn quantity(&self) -> f64 {
        non_negative(self.0.number(QUANTITY_KEYS).unwrap_or(1.0), "quantity")
    }

    /// Price defaults to 0 when absent or unreadable; negatives clamp to 0.
    fn unit_price(&self) -> f64 {
        non_negative(self.0.number(PRICE_KEYS).unwrap_or(0.0), "unit price")
    }

    fn identity(&self) -> Option<String> {
        self.0
            .value(ID_KEYS)
            .and_then(value_text)
            .filter(|id| !id.is_empty())
    }
}

fn non_negative(value: f64, field: &str) -> f64 {
    if value < 0.0 {
        log::warn!("Negative {field} {value} clamped to 0");
        0.0
    } else {
        value
    }
}

/// One priced line of a quote or tax document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLineItem")]
pub struct LineItem {
    pub name: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            quantity,
            unit_price,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

impl From<RawLineItem> for LineItem {
    fn from(raw: RawLineItem) -> Self {
        Self {
            name: raw.display_name(),
            description: raw.description(),
            quantity: raw.quantity(),
            unit_price: raw.unit_price(),
        }
    }
}

/// A requested item that could not be matched to inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLineItem")]
pub struct UnresolvedItem {
    pub name: String,
    pub description: String,
    pub quantity: f64,
}

impl From<RawLineItem> for UnresolvedItem {
    fn from(raw: RawLineItem) -> Self {
        Self {
            name: raw.display_name(),
            description: raw.description().unwrap_or_default(),
            quantity: raw.quantity(),
        }
    }
}

/// An item referenced by a stored record, keyed for popularity counting.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencedItem {
    /// Product id when known, otherwise the case-folded name.
    pub key: String,
    pub name: String,
    pub quantity: f64,
}

impl From<RawLineItem> for ReferencedItem {
    fn from(raw: RawLineItem) -> Self {
        let name = raw.display_name();
        let key = raw
            .identity()
            .unwrap_or_else(|| name.trim().to_lowercase());
        Self {
            key,
            name,
            quantity: raw.quantity(),
        }
    }
}

/// Parses the item list embedded in a stored record. The list may be a JSON
/// array or a JSON document serialized into a string. An unreadable list
/// degrades to empty and an unreadable entry is skipped.
pub fn parse_embedded_items(value: Option<&Value>) -> Vec<ReferencedItem> {
    let parsed: Result<Value, serde_json::Error> = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::String(text)) if text.trim().is_empty() => return Vec::new(),
        Some(Value::String(text)) => serde_json::from_str(text),
        Some(other) => Ok(other.clone()),
    };
    let entries = match parsed {
        Ok(Value::Array(entries)) => entries,
        Ok(other) => {
            log::warn!("Ignoring embedded item list that is not an array: {other}");
            return Vec::new();
        }
        Err(e) => {
            log::warn!("Ignoring malformed embedded item list: {e}");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<RawLineItem>(entry) {
            Ok(raw) => Some(ReferencedItem::from(raw)),
            Err(e) => {
                log::warn!("Skipping unreadable embedded item: {e}");
                None
            }
        })
        .collect()
}
