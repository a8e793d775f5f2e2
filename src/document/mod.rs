mod layout;
mod quote;
mod report;
mod tax;

pub use layout::{format_date, Composition, RenderContext};
pub use quote::compose_quote;
pub use report::{compose_report, summary_cards, EMPTY_NOTICE};
pub use tax::compose_tax_document;

use crate::config::Config;
use crate::error::Result;
use crate::model::{DocumentKind, LineItemDocument};
use crate::summary::{ReportWindow, SummaryRecord};

/// Lays out a quote, receipt or invoice depending on its kind.
pub fn compose_document(
    doc: &LineItemDocument,
    config: &Config,
    ctx: &RenderContext,
) -> Composition {
    match doc.header.kind {
        DocumentKind::Quote => compose_quote(doc, config, ctx),
        DocumentKind::Receipt | DocumentKind::Invoice => compose_tax_document(doc, config, ctx),
    }
}

/// Renders a line item document into PDF bytes.
pub fn render_document(
    doc: &LineItemDocument,
    config: &Config,
    ctx: &RenderContext,
) -> Result<Vec<u8>> {
    compose_document(doc, config, ctx).finish()
}

/// Renders the periodic summary report into PDF bytes.
pub fn render_report(
    records: &[SummaryRecord],
    window: &ReportWindow,
    config: &Config,
    ctx: &RenderContext,
) -> Result<Vec<u8>> {
    compose_report(records, window, config, ctx).finish()
}

/// Default file name, e.g. `COT-Q-0042.pdf`.
pub fn document_file_name(doc: &LineItemDocument) -> String {
    let number: String = doc
        .header
        .display_number()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{}-{}.pdf", doc.header.kind.file_prefix(), number)
}

pub fn report_file_name(window: &ReportWindow) -> String {
    format!(
        "REPORTE-{}-{}-{}.pdf",
        window.period,
        window.from.format("%Y%m%d"),
        window.to.format("%Y%m%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientInfo, DocumentHeader};

    #[test]
    fn file_names_are_path_safe() {
        let mut header = DocumentHeader::new(DocumentKind::Invoice, ClientInfo::default());
        header.number = Some("F 12/3".into());
        let doc = LineItemDocument::new(header, vec![]);
        assert_eq!(document_file_name(&doc), "FAC-F_12_3.pdf");

        let header = DocumentHeader::new(DocumentKind::Quote, ClientInfo::default());
        let doc = LineItemDocument::new(header, vec![]);
        assert_eq!(document_file_name(&doc), "COT-S_N.pdf");
    }
}
