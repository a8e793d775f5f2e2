//! Composite blocks shared by the document templates.
//!
//! Each composer asks the flow for its full height before drawing, draws at
//! the cursor and leaves the cursor below itself plus a small gap.

use chrono::NaiveDateTime;

use super::flow::{Margins, PageFlow};
use super::style::{Align, Color, FontSpec, ShapeStyle, Stroke, TextStyle};
use super::surface::Surface;
use super::table::{render_table, table_lead, Cell, ColumnSpec, TableOutcome, TableRow, TableStyle};
use super::text::wrap;
use crate::config::Organization;
use crate::format::{format_money, format_quantity};
use crate::model::{DocumentHeader, DocumentKind, Totals, UnresolvedItem};

/// Vertical gap left after every block.
pub const BLOCK_GAP: f32 = 5.0;

pub const BANNER_HEIGHT: f32 = 30.0;
const BANNER_INSET: f32 = 4.0;
const LOGO_RADIUS: f32 = 10.5;
const LOGO_RING_GAP: f32 = 1.5;

const BOX_LINE_HEIGHT: f32 = 5.0;
const BOX_PADDING: f32 = 4.0;

fn label_style() -> TextStyle {
    TextStyle::new(FontSpec::bold(8.0), Color::MUTED)
}

fn body_style() -> TextStyle {
    TextStyle::new(FontSpec::regular(9.0), Color::TEXT)
}

/// What the banner says about the document itself.
#[derive(Debug, Clone, Default)]
pub struct BannerContent {
    pub title: String,
    /// Lines under the title: number, dates, validity.
    pub details: Vec<String>,
}

/// Page banner: a filled band with a ringed logo mark and the document title
/// on the left, the organization's identity right-aligned. Always the same
/// height.
pub fn banner(flow: &mut PageFlow<'_>, organization: &Organization, content: &BannerContent) {
    flow.ensure_space(BANNER_HEIGHT);
    let top = flow.y();
    let band_left = flow.left();
    let band_width = flow.content_width();
    let left = band_left + BANNER_INSET;
    let right = band_left + band_width - BANNER_INSET;
    let surface = flow.surface();

    surface.rect(
        band_left,
        top,
        band_width,
        BANNER_HEIGHT,
        &ShapeStyle::filled(Color::BRAND),
    );

    let cx = left + LOGO_RADIUS;
    let cy = top + BANNER_HEIGHT / 2.0;
    surface.circle(cx, cy, LOGO_RADIUS, &ShapeStyle::outlined(Color::WHITE, 0.6));
    surface.circle(
        cx,
        cy,
        LOGO_RADIUS - LOGO_RING_GAP,
        &ShapeStyle::filled(Color::WHITE),
    );
    surface.text(
        &organization.logo_initials(),
        cx,
        cy + 2.0,
        &TextStyle::new(FontSpec::bold(14.0), Color::BRAND).aligned(Align::Center),
    );

    let title_x = left + 2.0 * LOGO_RADIUS + 5.0;
    surface.text(
        &content.title,
        title_x,
        top + 9.0,
        &TextStyle::new(FontSpec::bold(16.0), Color::WHITE),
    );
    surface.text_lines(
        &content.details,
        title_x,
        top + 15.0,
        4.2,
        &TextStyle::new(FontSpec::regular(8.5), Color::BRAND_LIGHT),
    );

    let mut identity = vec![organization.address.clone()];
    identity.extend(organization.phone.iter().cloned());
    identity.push(organization.email.clone());
    identity.extend(organization.website.iter().cloned());
    surface.text(
        &organization.name,
        right,
        top + 7.0,
        &TextStyle::new(FontSpec::bold(12.0), Color::WHITE).aligned(Align::Right),
    );
    let mut baseline = top + 11.5;
    if let Some(tagline) = &organization.tagline {
        surface.text(
            tagline,
            right,
            baseline,
            &TextStyle::new(FontSpec::regular(8.0), Color::BRAND_LIGHT).aligned(Align::Right),
        );
        baseline += 4.0;
    }
    // Identity lines are clipped so the banner height never changes.
    let room = ((top + BANNER_HEIGHT - 2.0 - baseline) / 3.8).max(0.0) as usize;
    let shown: Vec<String> = identity.into_iter().take(room).collect();
    surface.text_lines(
        &shown,
        right,
        baseline,
        3.8,
        &TextStyle::new(FontSpec::regular(8.0), Color::WHITE).aligned(Align::Right),
    );

    flow.advance(BANNER_HEIGHT + BLOCK_GAP);
}

/// Fixed number of text lines the client box reserves for a document kind.
pub fn client_box_lines(kind: DocumentKind, has_fiscal: bool) -> usize {
    let base = match kind {
        DocumentKind::Quote => 4,
        DocumentKind::Receipt | DocumentKind::Invoice => 5,
    };
    if has_fiscal {
        base + 3
    } else {
        base
    }
}

pub fn client_box_height(kind: DocumentKind, has_fiscal: bool) -> f32 {
    client_box_lines(kind, has_fiscal) as f32 * BOX_LINE_HEIGHT + 2.0 * BOX_PADDING
}

/// Client and fiscal data. The height depends only on the document kind and
/// whether fiscal data is present, never on the text itself.
pub fn client_box(flow: &mut PageFlow<'_>, header: &DocumentHeader, issued: &str) -> f32 {
    let fiscal = header.fiscal_info();
    if header.kind == DocumentKind::Invoice && fiscal.is_none() {
        log::warn!(
            "Invoice {} has no fiscal information, printing the client box without it",
            header.display_number()
        );
    }

    let height = client_box_height(header.kind, fiscal.is_some());
    flow.ensure_space(height);
    let top = flow.y();
    let left = flow.left();
    let width = flow.content_width();
    let surface = flow.surface();

    surface.rounded_rect(
        left,
        top,
        width,
        height,
        2.0,
        &ShapeStyle::filled_outlined(Color::BRAND_LIGHT, Color::RULE, 0.3),
    );

    let client = &header.client;
    let or_dash = |value: &str| {
        if value.trim().is_empty() {
            "-".to_string()
        } else {
            value.trim().to_string()
        }
    };
    let mut rows: Vec<(String, String)> = vec![
        ("CLIENTE".to_string(), client.display_name().to_string()),
        ("Correo".to_string(), or_dash(&client.email)),
        ("Teléfono".to_string(), or_dash(&client.phone)),
        ("Fecha de emisión".to_string(), issued.to_string()),
    ];
    if header.kind.is_tax_document() {
        rows.push(("Folio".to_string(), header.display_number().to_string()));
    }
    if let Some(fiscal) = fiscal {
        rows.push(("RFC".to_string(), or_dash(&fiscal.tax_id)));
        rows.push(("Razón social".to_string(), or_dash(&fiscal.legal_name)));
        rows.push(("Domicilio fiscal".to_string(), or_dash(&fiscal.address)));
    }

    let value_x = left + 38.0;
    let value_width = width - 38.0 - BOX_PADDING;
    let mut baseline = top + BOX_PADDING + BOX_LINE_HEIGHT * 0.75;
    for (label, value) in &rows {
        surface.text(label, left + BOX_PADDING, baseline, &label_style());
        // One line per field; longer values are cut to the first wrapped line.
        let first = wrap(value, value_width, body_style().font)
            .into_iter()
            .next()
            .unwrap_or_default();
        surface.text(&first, value_x, baseline, &body_style());
        baseline += BOX_LINE_HEIGHT;
    }

    flow.advance(height + BLOCK_GAP);
    height
}

const TOTALS_WIDTH: f32 = 78.0;
const TOTALS_ROW: f32 = 6.0;
const TOTAL_BAND: f32 = 10.0;

/// Right-aligned money summary with the grand total in its own filled box.
pub fn totals_box(flow: &mut PageFlow<'_>, totals: &Totals, tax_label: &str, currency: &str) -> f32 {
    let mut rows = vec![("Subtotal".to_string(), format_money(totals.subtotal, currency))];
    if totals.discount > 0.0 {
        rows.push((
            "Descuento".to_string(),
            format!("-{}", format_money(totals.discount, currency)),
        ));
    }
    if totals.tax_rate > 0.0 || totals.tax > 0.0 {
        rows.push((
            format!("{} ({}%)", tax_label, format_quantity(totals.tax_rate * 100.0)),
            format_money(totals.tax, currency),
        ));
    }

    let height = rows.len() as f32 * TOTALS_ROW + TOTAL_BAND + 2.0;
    flow.ensure_space(height);
    let top = flow.y();
    let right = flow.left() + flow.content_width();
    let left = right - TOTALS_WIDTH;
    let surface = flow.surface();

    let mut baseline = top + TOTALS_ROW * 0.7;
    for (label, amount) in &rows {
        surface.text(label, left + 3.0, baseline, &body_style().colored(Color::MUTED));
        surface.text(amount, right - 3.0, baseline, &body_style().aligned(Align::Right));
        baseline += TOTALS_ROW;
    }

    let band_top = top + rows.len() as f32 * TOTALS_ROW + 2.0;
    surface.rect(
        left,
        band_top,
        TOTALS_WIDTH,
        TOTAL_BAND,
        &ShapeStyle::filled_outlined(Color::BRAND, Color::BRAND, 0.4),
    );
    let total_style = TextStyle::new(FontSpec::bold(11.0), Color::WHITE);
    let band_baseline = band_top + TOTAL_BAND / 2.0 + 1.4;
    surface.text("TOTAL", left + 3.0, band_baseline, &total_style);
    surface.text(
        &format_money(totals.total, currency),
        right - 3.0,
        band_baseline,
        &total_style.aligned(Align::Right),
    );

    flow.advance(height + BLOCK_GAP);
    height
}

const NOTICE_LINE: f32 = 4.2;

pub fn notice_height(text: &str, width: f32) -> f32 {
    let lines = wrap(text, width - 2.0 * BOX_PADDING, FontSpec::regular(8.5)).len();
    lines.max(1) as f32 * NOTICE_LINE + 2.0 * BOX_PADDING
}

/// Boxed, centered advisory text sized from its wrapped line count.
pub fn notice_box(flow: &mut PageFlow<'_>, text: &str) -> f32 {
    if text.trim().is_empty() {
        return 0.0;
    }
    let width = flow.content_width();
    let height = notice_height(text, width);
    flow.ensure_space(height);

    let top = flow.y();
    let left = flow.left();
    let style = TextStyle::new(FontSpec::regular(8.5), Color::TEXT).aligned(Align::Center);
    let lines = wrap(text, width - 2.0 * BOX_PADDING, style.font);
    let surface = flow.surface();
    surface.rounded_rect(
        left,
        top,
        width,
        height,
        2.0,
        &ShapeStyle::filled_outlined(Color::WARNING_LIGHT, Color::WARNING, 0.3),
    );
    surface.text_lines(
        &lines,
        left + width / 2.0,
        top + BOX_PADDING + NOTICE_LINE * 0.75,
        NOTICE_LINE,
        &style,
    );

    flow.advance(height + BLOCK_GAP);
    height
}

const TITLE_HEIGHT: f32 = 7.0;

/// Bold heading above a block. Kept with at least `keep_with` millimetres of
/// the block that follows it, or with as much of it as a page holds.
pub fn section_title(flow: &mut PageFlow<'_>, title: &str, color: Color, keep_with: f32) {
    let needed = (TITLE_HEIGHT + keep_with).min(flow.page_room());
    let opens_page = flow.ensure_space(needed) || flow.at_top_of_page();
    let y = flow.y();
    let x = flow.left();
    flow.surface()
        .text(title, x, y + 4.5, &TextStyle::new(FontSpec::bold(10.0), color));
    flow.advance(TITLE_HEIGHT);
    if opens_page {
        flow.mark_page_top();
    }
}

pub const UNRESOLVED_TITLE: &str = "Productos no encontrados";

/// Advisory table listing requested items that could not be priced.
pub fn unresolved_items(
    flow: &mut PageFlow<'_>,
    items: &[UnresolvedItem],
    base: &TableStyle,
) -> Option<TableOutcome> {
    if items.is_empty() {
        return None;
    }
    let style = TableStyle {
        header_fill: Color::WARNING,
        zebra: Some(Color::WARNING_LIGHT),
        ..base.clone()
    };
    let width = flow.content_width();
    let columns = vec![
        ColumnSpec::new("Producto solicitado", width * 0.82, Align::Left),
        ColumnSpec::new("Cant.", width * 0.18, Align::Center),
    ];
    let rows: Vec<TableRow> = items
        .iter()
        .map(|item| {
            let detail = Some(item.description.clone()).filter(|d| !d.trim().is_empty());
            TableRow::new(vec![
                Cell::Wrapped {
                    title: item.name.clone(),
                    detail,
                },
                Cell::Text(format_quantity(item.quantity)),
            ])
        })
        .collect();

    section_title(
        flow,
        UNRESOLVED_TITLE,
        Color::WARNING,
        table_lead(&columns, &rows, &style),
    );
    let x = flow.left();
    let outcome = render_table(flow, x, &columns, &rows, &style);
    flow.advance(BLOCK_GAP);
    Some(outcome)
}

/// A labelled figure shown in the report's card grid.
#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub label: String,
    pub value: String,
}

impl StatCard {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

const CARD_HEIGHT: f32 = 20.0;
const CARD_GAP: f32 = 4.0;
const CARDS_PER_ROW: usize = 3;

/// Grid of stat cards, three per row.
pub fn stat_cards(flow: &mut PageFlow<'_>, cards: &[StatCard]) {
    let width = flow.content_width();
    let card_width = (width - CARD_GAP * (CARDS_PER_ROW as f32 - 1.0)) / CARDS_PER_ROW as f32;

    for row in cards.chunks(CARDS_PER_ROW) {
        flow.ensure_space(CARD_HEIGHT);
        let top = flow.y();
        let left = flow.left();
        let surface = flow.surface();

        for (i, card) in row.iter().enumerate() {
            let x = left + i as f32 * (card_width + CARD_GAP);
            surface.rounded_rect(
                x,
                top,
                card_width,
                CARD_HEIGHT,
                2.0,
                &ShapeStyle::filled_outlined(Color::BRAND_LIGHT, Color::RULE, 0.3),
            );
            surface.text(
                &card.value,
                x + card_width / 2.0,
                top + 10.0,
                &TextStyle::new(FontSpec::bold(14.0), Color::BRAND).aligned(Align::Center),
            );
            surface.text(
                &card.label,
                x + card_width / 2.0,
                top + 15.5,
                &TextStyle::new(FontSpec::regular(8.0), Color::MUTED).aligned(Align::Center),
            );
        }
        flow.advance(CARD_HEIGHT + CARD_GAP);
    }
    flow.advance(BLOCK_GAP - CARD_GAP);
}

/// What the footer post-pass prints on every page.
#[derive(Debug, Clone, Default)]
pub struct FooterContent {
    pub contact: String,
    pub generated_at: Option<NaiveDateTime>,
}

pub fn page_label(page: usize, total: usize) -> String {
    format!("Página {page} de {total}")
}

/// Stamps "Página i de n" and the contact line on every page. Runs after all
/// content is laid out, when the page total is known.
pub fn stamp_footers(surface: &mut Surface, margins: Margins, footer: &FooterContent) {
    let total = surface.page_count();
    let left = margins.left;
    let right = surface.page_width() - margins.right;
    let rule_y = surface.page_height() - margins.bottom + 6.0;
    let small = TextStyle::new(FontSpec::regular(7.5), Color::MUTED);

    for index in 0..total {
        if !surface.select_page(index) {
            continue;
        }
        surface.line(left, rule_y, right, rule_y, Stroke { color: Color::RULE, width: 0.3 });
        surface.text(&footer.contact, left, rule_y + 4.5, &small);
        surface.text(
            &page_label(index + 1, total),
            right,
            rule_y + 4.5,
            &small.aligned(Align::Right),
        );
        if let Some(stamp) = footer.generated_at {
            surface.text(
                &format!("Generado el {}", stamp.format("%d/%m/%Y %H:%M")),
                left,
                rule_y + 8.5,
                &small,
            );
        }
    }
    log::debug!("Stamped footers on {total} page(s)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientInfo, FiscalInfo};
    use crate::pdf::style::PT_PER_MM;
    use crate::pdf::surface::PageSize;

    #[test]
    fn client_box_line_counts() {
        assert_eq!(client_box_lines(DocumentKind::Quote, false), 4);
        assert_eq!(client_box_lines(DocumentKind::Receipt, false), 5);
        assert_eq!(client_box_lines(DocumentKind::Invoice, true), 8);
    }

    #[test]
    fn client_box_height_ignores_text_length() {
        let mut header = DocumentHeader::new(
            DocumentKind::Invoice,
            ClientInfo {
                name: "Nombre ".repeat(80),
                email: "x@y.mx".into(),
                phone: String::new(),
            },
        );
        header.fiscal = Some(FiscalInfo {
            tax_id: "XAXX010101000".into(),
            legal_name: "Razón ".repeat(50),
            address: "Calle 1".into(),
        });

        let mut surface = Surface::new(PageSize::A4);
        let mut flow = PageFlow::new(&mut surface, Margins::default());
        let height = client_box(&mut flow, &header, "01/02/2026");
        assert_eq!(height, client_box_height(DocumentKind::Invoice, true));
    }

    #[test]
    fn banner_has_constant_height() {
        let mut organization = Organization::default();
        organization.tagline = Some("Ferretería y materiales".into());
        organization.phone = Some("555 123 4567".into());
        organization.website = Some("example.com".into());

        let mut surface = Surface::new(PageSize::A4);
        let mut flow = PageFlow::new(&mut surface, Margins::default());
        let content = BannerContent {
            title: "COTIZACIÓN".into(),
            details: vec!["No. Q-1".into(), "Fecha: 01/02/2026".into()],
        };
        banner(&mut flow, &organization, &content);
        assert_eq!(flow.y(), Margins::default().top + BANNER_HEIGHT + BLOCK_GAP);
    }

    #[test]
    fn banner_is_a_filled_band_with_a_ringed_logo() {
        let mut surface = Surface::new(PageSize::A4);
        let mut flow = PageFlow::new(&mut surface, Margins::default());
        let width = flow.content_width();
        banner(&mut flow, &Organization::default(), &BannerContent::default());
        drop(flow);

        let ops = surface.page(0).unwrap().operations();
        let brand = Color::BRAND.components();
        let band = ops.windows(2).any(|pair| {
            pair[0].operator == "rg"
                && pair[0]
                    .operands
                    .iter()
                    .map(|o| o.as_float().unwrap_or(-1.0))
                    .eq(brand)
                && pair[1].operator == "re"
                && (pair[1].operands[2].as_float().unwrap() - width * PT_PER_MM).abs() < 0.01
                && (pair[1].operands[3].as_float().unwrap() - BANNER_HEIGHT * PT_PER_MM).abs()
                    < 0.01
        });
        assert!(band);

        // outer ring stroked, inner disc filled
        let painters: Vec<&str> = ops
            .iter()
            .filter(|op| matches!(op.operator.as_str(), "f" | "S" | "B"))
            .map(|op| op.operator.as_str())
            .collect();
        assert_eq!(&painters[..3], &["f", "S", "f"]);
    }

    #[test]
    fn title_moves_with_a_tall_first_row() {
        let style = TableStyle::default();
        let items = vec![UnresolvedItem {
            name: "Válvula de compuerta bridada ".repeat(20),
            description: String::new(),
            quantity: 2.0,
        }];

        let mut surface = Surface::new(PageSize::A4);
        let mut flow = PageFlow::new(&mut surface, Margins::default());
        // room for the title, the header and a minimum-height row only
        let short_lead = 7.0 + style.header_height + style.min_row_height;
        flow.move_to(flow.limit() - short_lead - 1.0);
        let outcome = unresolved_items(&mut flow, &items, &style).unwrap();
        drop(flow);

        assert_eq!(outcome.rows_per_page, vec![(1, 1)]);
        assert_eq!(surface.page(0).unwrap().count_text(UNRESOLVED_TITLE), 0);
        assert_eq!(surface.page(1).unwrap().count_text(UNRESOLVED_TITLE), 1);
    }

    #[test]
    fn totals_box_prints_promoted_total() {
        let mut surface = Surface::new(PageSize::A4);
        let mut flow = PageFlow::new(&mut surface, Margins::default());
        totals_box(&mut flow, &Totals::compute(1234.5, 0.0, 0.16), "IVA", "$");
        drop(flow);

        let page = surface.page(0).unwrap();
        assert_eq!(page.count_text("TOTAL"), 1);
        assert_eq!(page.count_text("$1,234.50"), 1);
        assert_eq!(page.count_text("IVA (16%)"), 1);
        assert_eq!(page.count_text("$1,432.02"), 1);
        assert_eq!(page.count_text("Descuento"), 0);
    }

    #[test]
    fn notice_breaks_before_drawing() {
        let mut surface = Surface::new(PageSize::A4);
        let mut flow = PageFlow::new(&mut surface, Margins::default());
        flow.move_to(270.0);
        notice_box(&mut flow, "Precios sujetos a cambio sin previo aviso.");
        assert_eq!(flow.current_page(), 1);
        drop(flow);
        assert_eq!(surface.page(0).unwrap().operations().len(), 0);
    }

    #[test]
    fn footers_stamp_every_page() {
        let mut surface = Surface::new(PageSize::A4);
        surface.add_page();
        surface.add_page();
        let footer = FooterContent {
            contact: "ventas@example.com".into(),
            generated_at: None,
        };
        stamp_footers(&mut surface, Margins::default(), &footer);
        for index in 0..3 {
            let page = surface.page(index).unwrap();
            assert_eq!(page.count_text(&page_label(index + 1, 3)), 1);
            assert_eq!(page.count_text("ventas@example.com"), 1);
        }
    }

    #[test]
    fn empty_unresolved_list_draws_nothing() {
        let mut surface = Surface::new(PageSize::A4);
        let mut flow = PageFlow::new(&mut surface, Margins::default());
        assert!(unresolved_items(&mut flow, &[], &TableStyle::default()).is_none());
        assert_eq!(flow.y(), Margins::default().top);
    }
}
