//! Column tables with measured row heights.
//!
//! Every row is measured with the same wrapping the drawing code uses, the
//! flow is asked for that much room, and only then is anything drawn. Rows are
//! never split: a row that cannot fit on an empty page is drawn anyway and
//! reported in [`TableOutcome::oversized_rows`].

use serde::{Deserialize, Serialize};

use super::flow::{Cursor, PageFlow};
use super::style::{Align, Color, FontSpec, ShapeStyle, Stroke, TextStyle};
use super::surface::Surface;
use super::text::{line_count, text_width, wrap};
use crate::format::{format_money, format_quantity};
use crate::model::LineItem;

/// Whether zebra banding restarts on each page or runs through the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandingPolicy {
    #[default]
    Continuous,
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub label: String,
    /// Width in millimetres, cell padding included.
    pub width: f32,
    pub align: Align,
}

impl ColumnSpec {
    pub fn new(label: impl Into<String>, width: f32, align: Align) -> Self {
        Self {
            label: label.into(),
            width,
            align,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableStyle {
    pub header_height: f32,
    pub header_fill: Color,
    pub header_text: TextStyle,
    pub body_text: TextStyle,
    pub title_text: TextStyle,
    pub detail_text: TextStyle,
    pub line_height: f32,
    pub detail_line_height: f32,
    /// Top plus bottom padding of a row.
    pub vertical_padding: f32,
    pub min_row_height: f32,
    /// Horizontal padding on each side of a cell.
    pub cell_padding: f32,
    pub zebra: Option<Color>,
    pub rule: Stroke,
    pub banding: BandingPolicy,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_height: 8.0,
            header_fill: Color::BRAND,
            header_text: TextStyle::new(FontSpec::bold(9.0), Color::WHITE),
            body_text: TextStyle::new(FontSpec::regular(9.0), Color::TEXT),
            title_text: TextStyle::new(FontSpec::bold(9.0), Color::TEXT),
            detail_text: TextStyle::new(FontSpec::regular(7.5), Color::MUTED),
            line_height: 4.0,
            detail_line_height: 3.2,
            vertical_padding: 6.0,
            min_row_height: 10.0,
            cell_padding: 2.0,
            zebra: Some(Color::ZEBRA),
            rule: Stroke {
                color: Color::RULE,
                width: 0.2,
            },
            banding: BandingPolicy::Continuous,
        }
    }
}

impl TableStyle {
    pub fn with_banding(mut self, banding: BandingPolicy) -> Self {
        self.banding = banding;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Plain text, wrapped to the column.
    Text(String),
    /// A bold title with an optional smaller detail paragraph under it.
    Wrapped { title: String, detail: Option<String> },
    /// A colored pill with a short label.
    Chip { text: String, color: Color },
    /// A horizontal bar filled to `fraction` of the cell, followed by a label.
    Bar {
        fraction: f32,
        label: String,
        color: Color,
    },
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Cell::Text(text.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<Cell>,
}

impl TableRow {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableOutcome {
    /// Cursor position right below the table.
    pub end_y: f32,
    /// `(page index, rows drawn on it)` in page order.
    pub rows_per_page: Vec<(usize, usize)>,
    pub oversized_rows: usize,
}

impl TableOutcome {
    pub fn total_rows(&self) -> usize {
        self.rows_per_page.iter().map(|(_, rows)| rows).sum()
    }
}

/// Height of a row holding `title_lines` title lines and `detail_lines`
/// detail lines.
pub fn row_height(title_lines: usize, detail_lines: usize, style: &TableStyle) -> f32 {
    let content = title_lines as f32 * style.line_height
        + detail_lines as f32 * style.detail_line_height
        + style.vertical_padding;
    content.max(style.min_row_height)
}

fn content_width(column: &ColumnSpec, style: &TableStyle) -> f32 {
    column.width - 2.0 * style.cell_padding
}

fn detail_lines(detail: Option<&str>, width: f32, style: &TableStyle) -> usize {
    match detail {
        Some(detail) if !detail.trim().is_empty() => {
            line_count(detail, width, style.detail_text.font)
        }
        _ => 0,
    }
}

/// Height the row will occupy once drawn into `columns`.
pub fn measure_row(row: &TableRow, columns: &[ColumnSpec], style: &TableStyle) -> f32 {
    row.cells
        .iter()
        .zip(columns)
        .map(|(cell, column)| {
            let width = content_width(column, style);
            match cell {
                Cell::Text(text) => {
                    row_height(line_count(text, width, style.body_text.font), 0, style)
                }
                Cell::Wrapped { title, detail } => row_height(
                    line_count(title, width, style.title_text.font),
                    detail_lines(detail.as_deref(), width, style),
                    style,
                ),
                Cell::Chip { .. } | Cell::Bar { .. } => row_height(1, 0, style),
            }
        })
        .fold(style.min_row_height, f32::max)
}

/// Room the header band and the first row need together. Headings above a
/// table keep this much of it on their page.
pub fn table_lead(columns: &[ColumnSpec], rows: &[TableRow], style: &TableStyle) -> f32 {
    style.header_height
        + rows
            .first()
            .map(|row| measure_row(row, columns, style))
            .unwrap_or(0.0)
}

/// Draws the header band with its top edge at `y` and returns its height.
pub fn draw_header(
    surface: &mut Surface,
    x: f32,
    y: f32,
    columns: &[ColumnSpec],
    style: &TableStyle,
) -> f32 {
    let total: f32 = columns.iter().map(|c| c.width).sum();
    surface.rect(
        x,
        y,
        total,
        style.header_height,
        &ShapeStyle::filled(style.header_fill),
    );

    let baseline = y + (style.header_height + style.header_text.font.size * 0.25) / 2.0 + 0.5;
    let mut left = x;
    for column in columns {
        let text_style = style.header_text.aligned(column.align);
        surface.text(
            &column.label,
            anchor_x(left, column, style),
            baseline,
            &text_style,
        );
        left += column.width;
    }
    style.header_height
}

fn anchor_x(left: f32, column: &ColumnSpec, style: &TableStyle) -> f32 {
    match column.align {
        Align::Left => left + style.cell_padding,
        Align::Center => left + column.width / 2.0,
        Align::Right => left + column.width - style.cell_padding,
    }
}

/// Renders the table at the flow's cursor, repeating the header band on every
/// page the table spills onto.
pub fn render_table(
    flow: &mut PageFlow<'_>,
    x: f32,
    columns: &[ColumnSpec],
    rows: &[TableRow],
    style: &TableStyle,
) -> TableOutcome {
    let total_width: f32 = columns.iter().map(|c| c.width).sum();
    let mut outcome = TableOutcome::default();

    // The header never sits alone at the bottom of a page.
    let lead = table_lead(columns, rows, style).min(flow.page_room());
    let opens_page = flow.ensure_space(lead) || flow.at_top_of_page();

    let y = flow.y();
    let header = draw_header(flow.surface(), x, y, columns, style);
    flow.advance(header);
    if opens_page {
        // An oversized first row then stays under this header.
        flow.mark_page_top();
    }

    let hook_columns = columns.to_vec();
    let hook_style = style.clone();
    flow.set_repeat_hook(Box::new(move |surface: &mut Surface, cursor: &mut Cursor| {
        cursor.y += draw_header(surface, x, cursor.y, &hook_columns, &hook_style);
    }));

    let usable = flow.limit() - flow.margins().top - style.header_height;
    let mut page_row = 0usize;

    for (index, row) in rows.iter().enumerate() {
        let height = measure_row(row, columns, style);
        if height > usable {
            outcome.oversized_rows += 1;
            log::warn!(
                "Table row {} is {:.1}mm tall and cannot fit on one page, drawing it overflowing",
                index + 1,
                height
            );
        }

        if flow.ensure_space(height) {
            page_row = 0;
        }

        let page = flow.current_page();
        match outcome.rows_per_page.last_mut() {
            Some((last, count)) if *last == page => *count += 1,
            _ => outcome.rows_per_page.push((page, 1)),
        }

        let band_index = match style.banding {
            BandingPolicy::Continuous => index,
            BandingPolicy::Reset => page_row,
        };
        let top = flow.y();
        let surface = flow.surface();

        if let Some(zebra) = style.zebra.filter(|_| band_index % 2 == 1) {
            surface.rect(x, top, total_width, height, &ShapeStyle::filled(zebra));
        }
        // Right under a header band the band itself is the separator.
        if page_row > 0 {
            surface.line(x, top, x + total_width, top, style.rule);
        }
        draw_cells(surface, x, top, height, row, columns, style);

        flow.advance(height);
        page_row += 1;
    }

    let bottom = flow.y();
    flow.surface()
        .line(x, bottom, x + total_width, bottom, style.rule);
    flow.clear_repeat_hook();

    outcome.end_y = bottom;
    outcome
}

fn draw_cells(
    surface: &mut Surface,
    x: f32,
    top: f32,
    height: f32,
    row: &TableRow,
    columns: &[ColumnSpec],
    style: &TableStyle,
) {
    let mut left = x;
    surface.line(left, top, left, top + height, style.rule);

    for (cell, column) in row.cells.iter().zip(columns) {
        let width = content_width(column, style);
        let anchor = anchor_x(left, column, style);

        match cell {
            Cell::Text(text) => {
                let lines = wrap(text, width, style.body_text.font);
                let block = lines.len() as f32 * style.line_height;
                let baseline = top + (height - block) / 2.0 + style.line_height * 0.75;
                surface.text_lines(
                    &lines,
                    anchor,
                    baseline,
                    style.line_height,
                    &style.body_text.aligned(column.align),
                );
            }
            Cell::Wrapped { title, detail } => {
                let baseline = top + style.vertical_padding / 2.0 + style.line_height * 0.75;
                let title_lines = wrap(title, width, style.title_text.font);
                let next = surface.text_lines(
                    &title_lines,
                    anchor,
                    baseline,
                    style.line_height,
                    &style.title_text.aligned(column.align),
                );
                if let Some(detail) = detail {
                    let detail_lines = wrap(detail, width, style.detail_text.font);
                    surface.text_lines(
                        &detail_lines,
                        anchor,
                        next - style.line_height + style.detail_line_height,
                        style.detail_line_height,
                        &style.detail_text.aligned(column.align),
                    );
                }
            }
            Cell::Chip { text, color } => {
                draw_chip(surface, left + column.width / 2.0, top + height / 2.0, text, *color);
            }
            Cell::Bar {
                fraction,
                label,
                color,
            } => {
                let label_width = text_width(label, style.body_text.font);
                let track = (width - label_width - 2.0).max(0.0);
                let filled = track * fraction.clamp(0.0, 1.0);
                if filled > 0.0 {
                    surface.rect(
                        left + style.cell_padding,
                        top + height / 2.0 - 1.5,
                        filled,
                        3.0,
                        &ShapeStyle::filled(*color),
                    );
                }
                surface.text(
                    label,
                    left + column.width - style.cell_padding,
                    top + height / 2.0 + 1.1,
                    &style.body_text.aligned(Align::Right),
                );
            }
        }

        left += column.width;
        surface.line(left, top, left, top + height, style.rule);
    }
}

const CHIP_FONT: FontSpec = FontSpec::bold(7.0);
const CHIP_HEIGHT: f32 = 5.0;

/// Draws a status pill centered on (`cx`, `cy`) and returns its width.
pub fn draw_chip(surface: &mut Surface, cx: f32, cy: f32, text: &str, color: Color) -> f32 {
    let width = text_width(text, CHIP_FONT) + 5.0;
    surface.rounded_rect(
        cx - width / 2.0,
        cy - CHIP_HEIGHT / 2.0,
        width,
        CHIP_HEIGHT,
        CHIP_HEIGHT / 2.0,
        &ShapeStyle::filled(color),
    );
    surface.text(
        text,
        cx,
        cy + 0.9,
        &TextStyle::new(CHIP_FONT, Color::WHITE).aligned(Align::Center),
    );
    width
}

pub const DESCRIPTION_LABEL: &str = "Descripción";

/// Columns of a priced item table spanning `width` millimetres.
pub fn line_item_columns(width: f32) -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new(DESCRIPTION_LABEL, width * 0.52, Align::Left),
        ColumnSpec::new("Cant.", width * 0.12, Align::Center),
        ColumnSpec::new("P. Unitario", width * 0.18, Align::Right),
        ColumnSpec::new("Importe", width * 0.18, Align::Right),
    ]
}

pub fn line_item_row(item: &LineItem, currency: &str) -> TableRow {
    TableRow::new(vec![
        Cell::Wrapped {
            title: item.name.clone(),
            detail: item.description.clone(),
        },
        Cell::Text(format_quantity(item.quantity)),
        Cell::Text(format_money(item.unit_price, currency)),
        Cell::Text(format_money(item.line_total(), currency)),
    ])
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItemsOutcome {
    pub table: TableOutcome,
    pub subtotal: f64,
}

/// [`table_lead`] of the priced item table for `items`.
pub fn line_items_lead(width: f32, items: &[LineItem], currency: &str, style: &TableStyle) -> f32 {
    let first: Vec<TableRow> = items
        .iter()
        .take(1)
        .map(|item| line_item_row(item, currency))
        .collect();
    table_lead(&line_item_columns(width), &first, style)
}

/// Renders the priced item table and accumulates the subtotal of what it drew.
pub fn render_line_items(
    flow: &mut PageFlow<'_>,
    items: &[LineItem],
    currency: &str,
    style: &TableStyle,
) -> LineItemsOutcome {
    let columns = line_item_columns(flow.content_width());
    let rows: Vec<TableRow> = items.iter().map(|item| line_item_row(item, currency)).collect();
    let x = flow.left();
    let table = render_table(flow, x, &columns, &rows, style);
    let subtotal = items.iter().map(LineItem::line_total).sum();

    LineItemsOutcome { table, subtotal }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::flow::Margins;
    use crate::pdf::surface::PageSize;

    fn single_line_rows(count: usize) -> Vec<TableRow> {
        (1..=count)
            .map(|i| {
                TableRow::new(vec![
                    Cell::Wrapped {
                        title: format!("Item {i}"),
                        detail: None,
                    },
                    Cell::text("1"),
                    Cell::text("$1.00"),
                    Cell::text("$1.00"),
                ])
            })
            .collect()
    }

    #[test]
    fn three_title_lines_and_two_detail_lines() {
        let style = TableStyle::default();
        let height = row_height(3, 2, &style);
        assert!((height - 24.4).abs() < 1e-4, "{height}");
        assert_eq!(row_height(1, 0, &style), 10.0);
        assert_eq!(row_height(0, 0, &style), style.min_row_height);
    }

    #[test]
    fn measured_row_matches_wrapped_line_counts() {
        let style = TableStyle::default();
        let columns = line_item_columns(180.0);
        let width = content_width(&columns[0], &style);
        let title = "Bomba sumergible de acero inoxidable con controlador de nivel y protección térmica integrada para cisterna";
        let detail = "Incluye instalación, cableado, pruebas de presión y garantía extendida de dos años en mano de obra";
        let row = TableRow::new(vec![
            Cell::Wrapped {
                title: title.into(),
                detail: Some(detail.into()),
            },
            Cell::text("1"),
            Cell::text("$10.00"),
            Cell::text("$10.00"),
        ]);
        let expected = row_height(
            wrap(title, width, style.title_text.font).len(),
            wrap(detail, width, style.detail_text.font).len(),
            &style,
        );
        assert_eq!(measure_row(&row, &columns, &style), expected);
    }

    #[test]
    fn longer_text_never_shrinks_a_row() {
        let style = TableStyle::default();
        let columns = line_item_columns(180.0);
        let mut previous = 0.0;
        let mut title = String::new();
        for word in 0..60 {
            title.push_str(&format!("palabra{word} "));
            let row = TableRow::new(vec![
                Cell::Wrapped {
                    title: title.clone(),
                    detail: Some(title.clone()),
                },
                Cell::text("1"),
                Cell::text("$1.00"),
                Cell::text("$1.00"),
            ]);
            let height = measure_row(&row, &columns, &style);
            assert!(height >= previous, "{height} < {previous}");
            previous = height;
        }
    }

    #[test]
    fn forty_rows_split_twenty_five_and_fifteen() {
        let style = TableStyle::default();
        let mut surface = Surface::new(PageSize::A4);
        let mut flow = PageFlow::new(&mut surface, Margins::default());
        let columns = line_item_columns(180.0);
        let outcome = render_table(&mut flow, 15.0, &columns, &single_line_rows(40), &style);
        drop(flow);

        assert_eq!(outcome.rows_per_page, vec![(0, 25), (1, 15)]);
        assert_eq!(outcome.oversized_rows, 0);
        // 15 top margin + 8 header + 15 rows of 10mm
        assert!((outcome.end_y - 173.0).abs() < 1e-3);

        assert_eq!(surface.page_count(), 2);
        for index in 0..2 {
            let page = surface.page(index).unwrap();
            assert_eq!(page.count_text(DESCRIPTION_LABEL), 1);
        }
        assert_eq!(surface.page(0).unwrap().count_text("Item 25"), 1);
        assert_eq!(surface.page(1).unwrap().count_text("Item 26"), 1);
    }

    #[test]
    fn every_row_lands_on_exactly_one_page() {
        let style = TableStyle::default();
        let columns = line_item_columns(180.0);
        for count in [0usize, 1, 24, 25, 26, 51, 120] {
            let mut surface = Surface::new(PageSize::A4);
            let mut flow = PageFlow::new(&mut surface, Margins::default());
            let rows = single_line_rows(count);
            let outcome = render_table(&mut flow, 15.0, &columns, &rows, &style);
            drop(flow);
            assert_eq!(outcome.total_rows(), count);

            for i in 1..=count {
                let label = format!("Item {i}");
                let seen: usize = (0..surface.page_count())
                    .map(|p| surface.page(p).unwrap().count_text(&label))
                    .sum();
                assert_eq!(seen, 1, "{label}");
            }
        }
    }

    #[test]
    fn oversized_row_is_drawn_once_and_reported() {
        let style = TableStyle::default();
        let columns = line_item_columns(180.0);
        let huge = "palabra ".repeat(2000);
        let mut rows = single_line_rows(2);
        rows.insert(
            1,
            TableRow::new(vec![
                Cell::Wrapped {
                    title: huge,
                    detail: None,
                },
                Cell::text("1"),
                Cell::text("$1.00"),
                Cell::text("$1.00"),
            ]),
        );

        let mut surface = Surface::new(PageSize::A4);
        let mut flow = PageFlow::new(&mut surface, Margins::default());
        let outcome = render_table(&mut flow, 15.0, &columns, &rows, &style);
        assert_eq!(outcome.oversized_rows, 1);
        assert_eq!(outcome.total_rows(), 3);
    }

    #[test]
    fn oversized_first_row_stays_under_its_header() {
        let style = TableStyle::default();
        let columns = line_item_columns(180.0);
        let rows = vec![TableRow::new(vec![
            Cell::Wrapped {
                title: "palabra ".repeat(2000),
                detail: None,
            },
            Cell::text("1"),
            Cell::text("$1.00"),
            Cell::text("$1.00"),
        ])];

        let mut surface = Surface::new(PageSize::A4);
        let mut flow = PageFlow::new(&mut surface, Margins::default());
        flow.advance(50.0);
        let outcome = render_table(&mut flow, 15.0, &columns, &rows, &style);
        drop(flow);

        assert_eq!(outcome.oversized_rows, 1);
        assert_eq!(outcome.rows_per_page, vec![(1, 1)]);
        assert_eq!(surface.page_count(), 2);
        assert!(surface.page(0).unwrap().operations().is_empty());
        let page = surface.page(1).unwrap();
        assert_eq!(page.count_text(DESCRIPTION_LABEL), 1);
        assert!(page.texts().iter().any(|text| text.starts_with("palabra")));
    }

    #[test]
    fn lead_covers_header_and_first_row() {
        let style = TableStyle::default();
        let columns = line_item_columns(180.0);
        let rows = single_line_rows(3);
        assert_eq!(table_lead(&columns, &rows, &style), 18.0);
        assert_eq!(table_lead(&columns, &[], &style), style.header_height);

        let items = vec![LineItem::new("A", 1.0, 1.0)];
        assert_eq!(line_items_lead(180.0, &items, "$", &style), 18.0);
    }

    fn is_zebra_fill(op: &lopdf::content::Operation) -> bool {
        let [r, g, b] = Color::ZEBRA.components();
        op.operator == "rg"
            && op
                .operands
                .iter()
                .map(|o| o.as_float().unwrap_or(-1.0))
                .eq([r, g, b])
    }

    fn shows(op: &lopdf::content::Operation, text: &str) -> bool {
        op.operator == "Tj"
            && matches!(op.operands.first(), Some(lopdf::Object::String(s, _)) if s == text.as_bytes())
    }

    #[test]
    fn banding_policy_controls_the_second_page() {
        let columns = line_item_columns(180.0);
        let rows = single_line_rows(27);

        // Rows 26 and 27 land on page 2. Running indices 25 and 26 shade the
        // first of them; page-local indices 0 and 1 shade the second.
        for (policy, shades_row_26) in [
            (BandingPolicy::Continuous, true),
            (BandingPolicy::Reset, false),
        ] {
            let style = TableStyle::default().with_banding(policy);
            let mut surface = Surface::new(PageSize::A4);
            let mut flow = PageFlow::new(&mut surface, Margins::default());
            render_table(&mut flow, 15.0, &columns, &rows, &style);
            drop(flow);

            let ops = surface.page(1).unwrap().operations();
            let zebras: Vec<usize> = (0..ops.len()).filter(|&i| is_zebra_fill(&ops[i])).collect();
            assert_eq!(zebras.len(), 1, "{policy:?}");

            let row_26 = ops.iter().position(|op| shows(op, "Item 26")).unwrap();
            assert_eq!(zebras[0] < row_26, shades_row_26, "{policy:?}");
        }
    }

    #[test]
    fn line_item_subtotal_sums_line_totals() {
        let items = vec![
            LineItem::new("A", 1.0, 10.0),
            LineItem::new("B", 2.0, 5.5),
            LineItem::new("C", 1.0, 20.0),
        ];
        let mut surface = Surface::new(PageSize::A4);
        let mut flow = PageFlow::new(&mut surface, Margins::default());
        let outcome = render_line_items(&mut flow, &items, "$", &TableStyle::default());
        assert_eq!(crate::format::round_cents(outcome.subtotal), 41.0);
        assert_eq!(outcome.table.total_rows(), 3);
    }
}
