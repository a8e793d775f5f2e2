use chrono::Duration;

use super::layout::{compose_line_items, format_date, Composition, LineItemParts, RenderContext};
use crate::config::Config;
use crate::model::LineItemDocument;

const DEFAULT_NOTICE: &str =
    "Precios sujetos a cambio sin previo aviso. Esta cotización no representa un comprobante fiscal.";

/// Sales quote: validity line in the banner and the configured quote notice.
pub fn compose_quote(doc: &LineItemDocument, config: &Config, ctx: &RenderContext) -> Composition {
    let issued = doc.header.date.unwrap_or_else(|| ctx.today());
    let valid_until = issued + Duration::days(i64::from(config.document.quote_validity_days));

    let details = vec![
        format!("No. {}", doc.header.display_number()),
        format!("Fecha: {}", format_date(issued)),
        format!("Válida hasta: {}", format_date(valid_until)),
    ];
    let notice = config
        .document
        .quote_notice
        .clone()
        .unwrap_or_else(|| DEFAULT_NOTICE.to_string());

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientInfo, DocumentHeader, DocumentKind, LineItem};
    use chrono::NaiveDate;

    fn ctx() -> RenderContext {
        RenderContext::at(
            NaiveDate::from_ymd_opt(2026, 10, 19)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn quote_shows_validity_from_issue_date() {
        let mut header = DocumentHeader::new(DocumentKind::Quote, ClientInfo::default());
        header.date = NaiveDate::from_ymd_opt(2026, 1, 10);
        let doc = LineItemDocument::new(header, vec![LineItem::new("Tubo PVC", 2.0, 35.0)]);

        let composition = compose_quote(&doc, &Config::default(), &ctx());
        let page = composition.surface.page(0).unwrap();
        assert_eq!(page.count_text("Válida hasta: 25/01/2026"), 1);
        assert_eq!(page.count_text("COTIZACIÓN"), 1);
        assert_eq!(composition.subtotal, 70.0);
    }

    #[test]
    fn missing_issue_date_uses_the_render_date() {
        let header = DocumentHeader::new(DocumentKind::Quote, ClientInfo::default());
        let doc = LineItemDocument::new(header, vec![]);
        let composition = compose_quote(&doc, &Config::default(), &ctx());
        let page = composition.surface.page(0).unwrap();
        assert_eq!(page.count_text("Fecha: 19/10/2026"), 1);
        assert_eq!(page.count_text("Válida hasta: 03/11/2026"), 1);
    }
}
