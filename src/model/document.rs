use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::client::{ClientInfo, FiscalInfo};
use super::item::{LineItem, UnresolvedItem};
use super::loose::{lenient_amount, lenient_number, optional_text};
use crate::error::DocError;
use crate::format::round_cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[serde(alias = "cotizacion", alias = "cotización")]
    Quote,
    #[serde(alias = "recibo")]
    Receipt,
    #[serde(alias = "factura")]
    Invoice,
}

impl DocumentKind {
    /// Title printed in the banner.
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "COTIZACIÓN",
            DocumentKind::Receipt => "RECIBO",
            DocumentKind::Invoice => "FACTURA",
        }
    }

    /// Short prefix used in default file names.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "COT",
            DocumentKind::Receipt => "REC",
            DocumentKind::Invoice => "FAC",
        }
    }

    pub fn is_tax_document(&self) -> bool {
        !matches!(self, DocumentKind::Quote)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Quote => "quote",
            DocumentKind::Receipt => "receipt",
            DocumentKind::Invoice => "invoice",
        };
        f.write_str(name)
    }
}

impl FromStr for DocumentKind {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quote" | "cotizacion" | "cotización" => Ok(DocumentKind::Quote),
            "receipt" | "recibo" => Ok(DocumentKind::Receipt),
            "invoice" | "factura" => Ok(DocumentKind::Invoice),
            _ => Err(DocError::UnknownKind(s.to_string())),
        }
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or an RFC 3339 timestamp.
pub fn parse_flexible_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(text, format) {
            return Some(stamp);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn deserialize_issue_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let text: Option<String> = Option::deserialize(deserializer)?;
    match text {
        None => Ok(None),
        Some(text) => parse_flexible_date(&text)
            .map(|stamp| Some(stamp.date()))
            .ok_or_else(|| serde::de::Error::custom(format!("invalid issue date '{text}'"))),
    }
}

fn optional_rate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(lenient_number(value.as_ref()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHeader {
    #[serde(alias = "document_kind", alias = "documentKind", alias = "tipo")]
    pub kind: DocumentKind,
    #[serde(
        default,
        alias = "document_number",
        alias = "documentNumber",
        alias = "folio",
        deserialize_with = "optional_text"
    )]
    pub number: Option<String>,
    /// Falls back to the generation date when absent.
    #[serde(
        default,
        alias = "issue_date",
        alias = "issueDate",
        alias = "fecha",
        deserialize_with = "deserialize_issue_date"
    )]
    pub date: Option<NaiveDate>,
    #[serde(default, alias = "cliente")]
    pub client: ClientInfo,
    #[serde(default, alias = "fiscal", alias = "fiscalInfo", alias = "fiscal_info")]
    pub fiscal: Option<FiscalInfo>,
}

impl DocumentHeader {
    pub fn new(kind: DocumentKind, client: ClientInfo) -> Self {
        Self {
            kind,
            number: None,
            date: None,
            client,
            fiscal: None,
        }
    }

    /// Fiscal block to print, if any. Blank fiscal objects count as missing.
    pub fn fiscal_info(&self) -> Option<&FiscalInfo> {
        self.fiscal.as_ref().filter(|fiscal| !fiscal.is_empty())
    }

    pub fn display_number(&self) -> &str {
        self.number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("S/N")
    }
}

/// Input of the quote and tax document templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemDocument {
    #[serde(flatten)]
    pub header: DocumentHeader,
    #[serde(default, alias = "productos", alias = "products", alias = "lines")]
    pub items: Vec<LineItem>,
    #[serde(default, alias = "unresolved_items", alias = "not_found", alias = "no_encontrados")]
    pub unresolved: Vec<UnresolvedItem>,
    /// Discount amount in currency, not a percentage.
    #[serde(default, alias = "descuento", deserialize_with = "lenient_amount")]
    pub discount: f64,
    /// Overrides the configured tax rate (0.16 = 16%).
    #[serde(default, alias = "taxRate", deserialize_with = "optional_rate")]
    pub tax_rate: Option<f64>,
    #[serde(default, alias = "notas")]
    pub notes: Option<String>,
}

impl LineItemDocument {
    pub fn new(header: DocumentHeader, items: Vec<LineItem>) -> Self {
        Self {
            header,
            items,
            unresolved: Vec::new(),
            discount: 0.0,
            tax_rate: None,
            notes: None,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Money summary of the document. Quotes carry tax only when the document
    /// sets a rate; receipts and invoices fall back to `default_tax_rate`.
    pub fn totals(&self, default_tax_rate: f64) -> Totals {
        let rate = match (self.tax_rate, self.header.kind.is_tax_document()) {
            (Some(rate), _) => rate,
            (None, true) => default_tax_rate,
            (None, false) => 0.0,
        };
        Totals::compute(self.subtotal(), self.discount, rate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub discount: f64,
    pub tax_rate: f64,
    pub tax: f64,
    pub total: f64,
}

impl Totals {
    /// Discount is clamped into `0..=subtotal`; tax applies after discount.
    pub fn compute(subtotal: f64, discount: f64, tax_rate: f64) -> Self {
        let subtotal = round_cents(subtotal);
        let discount = round_cents(discount.clamp(0.0, subtotal.max(0.0)));
        let tax_rate = if tax_rate.is_finite() { tax_rate.max(0.0) } else { 0.0 };
        let tax = round_cents((subtotal - discount) * tax_rate);
        Self {
            subtotal,
            discount,
            tax_rate,
            tax,
            total: round_cents(subtotal - discount + tax),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_parses_english_and_spanish() {
        assert_eq!("Factura".parse::<DocumentKind>().unwrap(), DocumentKind::Invoice);
        assert_eq!("quote".parse::<DocumentKind>().unwrap(), DocumentKind::Quote);
        assert!(matches!(
            "memo".parse::<DocumentKind>(),
            Err(DocError::UnknownKind(_))
        ));
    }

    #[test]
    fn document_deserializes_with_flattened_header() {
        let doc: LineItemDocument = serde_json::from_value(json!({
            "kind": "cotizacion",
            "folio": "Q-0042",
            "fecha": "2026-03-05T10:30:00-06:00",
            "cliente": {"nombre": "Ana Ruiz", "correo": "ana@example.com"},
            "items": [
                {"name": "A", "quantity": 1, "unit_price": 10.0},
                {"name": "B", "quantity": 2, "unit_price": 5.5},
                {"name": "C", "quantity": 1, "unit_price": 20.0}
            ]
        }))
        .unwrap();

        assert_eq!(doc.header.kind, DocumentKind::Quote);
        assert_eq!(doc.header.display_number(), "Q-0042");
        assert_eq!(doc.header.date, NaiveDate::from_ymd_opt(2026, 3, 5));
        assert_eq!(doc.header.client.name, "Ana Ruiz");
        assert_eq!(round_cents(doc.subtotal()), 41.0);
    }

    #[test]
    fn null_fields_keep_the_document() {
        let doc: LineItemDocument = serde_json::from_value(json!({
            "kind": "quote",
            "number": 42,
            "date": null,
            "client": {"name": "Ana", "email": null, "phone": null},
            "fiscal": null,
            "discount": null,
            "tax_rate": "0.16",
            "notes": null,
            "items": [{"name": "A", "quantity": 1, "unit_price": 100}]
        }))
        .unwrap();

        assert_eq!(doc.header.display_number(), "42");
        assert_eq!(doc.header.client.email, "");
        assert_eq!(doc.discount, 0.0);
        assert_eq!(doc.totals(0.0).total, 116.0);

        let no_client: LineItemDocument =
            serde_json::from_value(json!({"kind": "recibo", "client": null})).unwrap();
        assert_eq!(no_client.header.client.display_name(), "Sin nombre");
    }

    #[test]
    fn totals_identity() {
        let totals = Totals::compute(41.0, 1.0, 0.16);
        assert_eq!(totals.tax, 6.4);
        assert_eq!(totals.total, 46.4);

        let clamped = Totals::compute(10.0, 25.0, 0.16);
        assert_eq!(clamped.discount, 10.0);
        assert_eq!(clamped.total, 0.0);
    }

    #[test]
    fn quotes_ignore_the_default_tax_rate() {
        let header = DocumentHeader::new(DocumentKind::Quote, ClientInfo::default());
        let doc = LineItemDocument::new(header, vec![LineItem::new("A", 1.0, 100.0)]);
        assert_eq!(doc.totals(0.16).tax, 0.0);

        let mut invoice = doc.clone();
        invoice.header.kind = DocumentKind::Invoice;
        assert_eq!(invoice.totals(0.16).tax, 16.0);
    }

    #[test]
    fn flexible_dates() {
        assert!(parse_flexible_date("2026-01-31").is_some());
        assert!(parse_flexible_date("2026-01-31 08:15:00").is_some());
        assert!(parse_flexible_date("2026-01-31T08:15:00Z").is_some());
        assert!(parse_flexible_date("31/01/2026").is_none());
    }

    #[test]
    fn blank_fiscal_counts_as_missing() {
        let mut header = DocumentHeader::new(DocumentKind::Invoice, ClientInfo::default());
        header.fiscal = Some(FiscalInfo::default());
        assert!(header.fiscal_info().is_none());
    }
}
