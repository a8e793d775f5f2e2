use super::layout::{compose_line_items, format_date, Composition, LineItemParts, RenderContext};
use crate::config::Config;
use crate::model::{DocumentKind, LineItemDocument};

const RECEIPT_NOTICE: &str = "Gracias por su compra.";
const INVOICE_NOTICE: &str = "Este documento es una representación impresa de un comprobante fiscal.";

/// Receipt or invoice. Tax is always computed, from the document's rate or the
/// configured default, and invoices print the buyer's fiscal data.
pub fn compose_tax_document(
    doc: &LineItemDocument,
    config: &Config,
    ctx: &RenderContext,
) -> Composition {
    let issued = doc.header.date.unwrap_or_else(|| ctx.today());
    let details = vec![
        format!("Folio: {}", doc.header.display_number()),
        format!("Fecha de emisión: {}", format_date(issued)),
    ];

    let notice = match doc.header.kind {
        DocumentKind::Invoice => config
            .document
            .invoice_notice
            .clone()
            .unwrap_or_else(|| INVOICE_NOTICE.to_string()),
        _ => RECEIPT_NOTICE.to_string(),
    };

    compose_line_items(
        doc,
        config,
        ctx,
        LineItemParts {
            details,
            notice: Some(notice),
        },
    )
}
