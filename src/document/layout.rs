use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::config::Config;
use crate::error::Result;
use crate::model::{LineItemDocument, Totals};
use crate::pdf::{
    banner, client_box, line_items_lead, notice_box, render_line_items, section_title,
    stamp_footers, totals_box, unresolved_items, BannerContent, Color, DocumentInfo, FooterContent, Margins,
    PageFlow, Surface, TableOutcome, TableStyle, BLOCK_GAP,
};

/// Inputs that are not part of the document data.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// Used for missing issue dates, the report's "today" and footers.
    pub now: NaiveDateTime,
}

impl RenderContext {
    pub fn at(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Reads the local clock.
    pub fn current() -> Self {
        Self {
            now: Local::now().naive_local(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }
}

pub fn page_margins() -> Margins {
    Margins::default()
}

pub fn table_style(config: &Config) -> TableStyle {
    TableStyle::default().with_banding(config.layout.banding)
}

pub fn footer(config: &Config, generated_at: Option<NaiveDateTime>) -> FooterContent {
    FooterContent {
        contact: config.organization.contact_line(),
        generated_at,
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// A laid-out document that has not been serialized yet.
pub struct Composition {
    pub surface: Surface,
    pub info: DocumentInfo,
    /// Outcome of the main table, when the template has one.
    pub table: Option<TableOutcome>,
    pub subtotal: f64,
    pub totals: Option<Totals>,
}

impl Composition {
    pub fn page_count(&self) -> usize {
        self.surface.page_count()
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let pages = self.surface.page_count();
        let bytes = self.surface.finish(&self.info)?;
        log::info!(
            "Rendered '{}': {} page(s), {} bytes",
            self.info.title,
            pages,
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Per-template parts of a line item document.
pub struct LineItemParts {
    pub details: Vec<String>,
    pub notice: Option<String>,
}

/// Shared body of the quote and tax document templates: banner, client box,
/// priced items, totals, unresolved items, notes and notice.
pub fn compose_line_items(
    doc: &LineItemDocument,
    config: &Config,
    ctx: &RenderContext,
    parts: LineItemParts,
) -> Composition {
    let settings = &config.document;
    let issued = doc.header.date.unwrap_or_else(|| ctx.today());
    let style = table_style(config);
    let totals = doc.totals(settings.tax_rate);

    let mut surface = Surface::new(config.layout.page);
    let items = {
        let mut flow = PageFlow::new(&mut surface, page_margins());
        let content = BannerContent {
            title: doc.header.kind.title().to_string(),
            details: parts.details,
        };
        banner(&mut flow, &config.organization, &content);
        client_box(&mut flow, &doc.header, &format_date(issued));

        let lead = line_items_lead(
            flow.content_width(),
            &doc.items,
            &settings.currency_prefix,
            &style,
        );
        section_title(&mut flow, "Detalle", Color::BRAND, lead);
        let items = render_line_items(&mut flow, &doc.items, &settings.currency_prefix, &style);
        flow.advance(BLOCK_GAP);

        totals_box(&mut flow, &totals, &settings.tax_label, &settings.currency_prefix);
        unresolved_items(&mut flow, &doc.unresolved, &style);

        if let Some(notes) = doc.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            section_title(&mut flow, "Notas", Color::BRAND, 12.0);
            notice_box(&mut flow, notes);
        }
        if let Some(notice) = parts.notice.as_deref() {
            notice_box(&mut flow, notice);
        }
        items
    };

    stamp_footers(&mut surface, page_margins(), &footer(config, None));

    Composition {
        surface,
        info: DocumentInfo {
            title: format!(
                "{} {}",
                doc.header.kind.title(),
                doc.header.display_number()
            ),
            created_at: Some(ctx.now),
        },
        table: Some(items.table),
        subtotal: items.subtotal,
        totals: Some(totals),
    }
}
