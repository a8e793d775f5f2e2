mod client;
mod document;
mod item;
mod loose;

pub use client::{ClientInfo, FiscalInfo};
pub use document::{
    parse_flexible_date, DocumentHeader, DocumentKind, LineItemDocument, Totals,
};
pub use item::{
    parse_embedded_items, LineItem, RawLineItem, ReferencedItem, UnresolvedItem, UNNAMED,
};
pub use loose::{lenient_amount, lenient_number, optional_text, value_text, LooseObject};
