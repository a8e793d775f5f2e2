use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

use crate::model::{
    parse_embedded_items, parse_flexible_date, value_text, ClientInfo, LooseObject,
    ReferencedItem,
};

const NUMBER_KEYS: &[&str] = &["number", "folio", "document_number", "id"];
const CREATED_KEYS: &[&str] = &["created_at", "createdAt", "created", "fecha", "date"];
const TOTAL_KEYS: &[&str] = &["total", "monto", "amount", "grand_total"];
const STATUS_KEYS: &[&str] = &["status", "estado", "state"];
const CLIENT_KEYS: &[&str] = &["client", "cliente"];
const CLIENT_NAME_KEYS: &[&str] = &["client_name", "clientName"];
const CLIENT_EMAIL_KEYS: &[&str] = &["client_email", "clientEmail", "email"];
const ITEMS_KEYS: &[&str] = &["items", "products", "productos", "line_items"];

/// One stored quote or tax document, reduced to what a report needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "LooseObject")]
pub struct SummaryRecord {
    pub number: String,
    /// `None` when the stored timestamp could not be read.
    pub created_at: Option<NaiveDateTime>,
    pub total: f64,
    pub status: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub items: Vec<ReferencedItem>,
}

/// Timestamps arrive as text or as Unix epochs in seconds or milliseconds.
fn read_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(text) => parse_flexible_date(text),
        Value::Number(number) => {
            let epoch = number.as_i64()?;
            let stamp = if epoch.abs() >= 100_000_000_000 {
                DateTime::from_timestamp_millis(epoch)
            } else {
                DateTime::from_timestamp(epoch, 0)
            };
            stamp.map(|stamp| stamp.naive_utc())
        }
        _ => None,
    }
}

fn read_client(value: Option<&Value>) -> ClientInfo {
    match value {
        Some(Value::String(name)) => ClientInfo {
            name: name.trim().to_string(),
            ..ClientInfo::default()
        },
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_default(),
        None => ClientInfo::default(),
    }
}

impl From<LooseObject> for SummaryRecord {
    fn from(raw: LooseObject) -> Self {
        let number = raw.text(NUMBER_KEYS).unwrap_or_default();

        let created_at = raw.value(CREATED_KEYS).and_then(|value| {
            let parsed = read_timestamp(value);
            if parsed.is_none() {
                log::warn!("Record {number}: unreadable timestamp {value}");
            }
            parsed
        });

        let client = read_client(raw.value(CLIENT_KEYS));
        let client_name = raw
            .text(CLIENT_NAME_KEYS)
            .unwrap_or_else(|| client.display_name().to_string());
        let client_email = raw
            .text(CLIENT_EMAIL_KEYS)
            .or(Some(client.email))
            .filter(|email| !email.is_empty());

        Self {
            number,
            created_at,
            total: raw.number(TOTAL_KEYS).unwrap_or(0.0),
            status: raw
                .value(STATUS_KEYS)
                .and_then(value_text)
                .unwrap_or_default(),
            client_name,
            client_email,
            items: parse_embedded_items(raw.value(ITEMS_KEYS)),
        }
    }
}

/// Reads a record export: either a bare JSON array or `{"records": [...]}`.
/// Entries that are not objects are skipped with a warning, so one bad entry
/// never drops the rest of the export.
pub fn parse_records(json: &str) -> serde_json::Result<Vec<SummaryRecord>> {
    let entries = match serde_json::from_str::<Value>(json)? {
        Value::Array(entries) => entries,
        Value::Object(mut wrapper) => match wrapper.remove("records") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(serde::de::Error::custom(
                    "expected an array of records or {\"records\": [...]}",
                ))
            }
        },
        _ => {
            return Err(serde::de::Error::custom(
                "expected an array of records or {\"records\": [...]}",
            ))
        }
    };

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            match serde_json::from_value::<SummaryRecord>(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping record {}: {e}", index + 1);
                    None
                }
            }
        })
        .collect())
}
