use super::layout::{footer, format_date, page_margins, table_style, Composition, RenderContext};
use crate::config::Config;
use crate::format::{format_grouped_int, format_money, format_quantity};
use crate::pdf::{
    banner, notice_box, render_table, section_title, stamp_footers, stat_cards, table_lead,
    Align, BannerContent, Cell, Color, ColumnSpec, DocumentInfo, PageFlow, StatCard, Surface,
    TableOutcome, TableRow, TableStyle, BLOCK_GAP,
};
use crate::summary::{
    aggregate, records_in_window, unknown_status_label, ReportWindow, Status, Summary,
    SummaryRecord, OTHER_STATUS_COLOR,
};

pub const EMPTY_NOTICE: &str = "No hay documentos registrados en el periodo seleccionado.";

/// Stat cards in display order. Every card has a value even with no records.
pub fn summary_cards(summary: &Summary, currency: &str) -> Vec<StatCard> {
    vec![
        StatCard::new(
            "Documentos",
            format_grouped_int(summary.record_count as i64),
        ),
        StatCard::new("Ingresos", format_money(summary.revenue, currency)),
        StatCard::new(
            "Clientes distintos",
            format_grouped_int(summary.distinct_clients as i64),
        ),
        StatCard::new(
            "Ticket promedio",
            format_money(summary.average_ticket(), currency),
        ),
        StatCard::new(
            "Tasa de aprobación",
            format!("{:.1}%", summary.approval_rate() * 100.0),
        ),
        StatCard::new(
            "Fuera de la serie",
            format_grouped_int(summary.unbucketed as i64),
        ),
    ]
}

fn status_chip(raw: &str) -> Cell {
    match Status::from_name(raw) {
        Some(status) => Cell::Chip {
            text: status.label().to_string(),
            color: status.color(),
        },
        None => Cell::Chip {
            text: unknown_status_label(raw),
            color: OTHER_STATUS_COLOR,
        },
    }
}

fn titled_table(
    flow: &mut PageFlow<'_>,
    title: &str,
    columns: &[ColumnSpec],
    rows: &[TableRow],
    style: &TableStyle,
) -> TableOutcome {
    section_title(flow, title, Color::BRAND, table_lead(columns, rows, style));
    let x = flow.left();
    let outcome = render_table(flow, x, columns, rows, style);
    flow.advance(BLOCK_GAP);
    outcome
}

fn bucket_table(flow: &mut PageFlow<'_>, summary: &Summary, currency: &str, style: &TableStyle) {
    let width = flow.content_width();
    let columns = vec![
        ColumnSpec::new("Periodo", width * 0.3, Align::Left),
        ColumnSpec::new("Documentos", width * 0.18, Align::Center),
        ColumnSpec::new("Ingresos", width * 0.52, Align::Left),
    ];
    let max = summary.max_bucket_revenue();
    let rows: Vec<TableRow> = summary
        .buckets
        .iter()
        .map(|bucket| {
            let fraction = if max > 0.0 { bucket.revenue / max } else { 0.0 };
            TableRow::new(vec![
                Cell::text(bucket.label.clone()),
                Cell::text(bucket.count.to_string()),
                Cell::Bar {
                    fraction: fraction as f32,
                    label: format_money(bucket.revenue, currency),
                    color: Color::BRAND,
                },
            ])
        })
        .collect();
    titled_table(flow, "Ingresos por periodo", &columns, &rows, style);
}

fn status_table(flow: &mut PageFlow<'_>, summary: &Summary, style: &TableStyle) {
    let width = flow.content_width();
    let columns = vec![
        ColumnSpec::new("Estado", width * 0.5, Align::Center),
        ColumnSpec::new("Documentos", width * 0.5, Align::Center),
    ];
    let rows: Vec<TableRow> = summary
        .tally
        .entries()
        .into_iter()
        .map(|(label, count, color)| {
            TableRow::new(vec![
                Cell::Chip { text: label, color },
                Cell::text(count.to_string()),
            ])
        })
        .collect();
    titled_table(flow, "Documentos por estado", &columns, &rows, style);
}

fn top_items_table(flow: &mut PageFlow<'_>, summary: &Summary, style: &TableStyle) {
    if summary.top_items.is_empty() {
        return;
    }
    let width = flow.content_width();
    let columns = vec![
        ColumnSpec::new("#", width * 0.08, Align::Center),
        ColumnSpec::new("Producto", width * 0.56, Align::Left),
        ColumnSpec::new("Documentos", width * 0.18, Align::Center),
        ColumnSpec::new("Cantidad", width * 0.18, Align::Center),
    ];
    let rows: Vec<TableRow> = summary
        .top_items
        .iter()
        .enumerate()
        .map(|(rank, item)| {
            TableRow::new(vec![
                Cell::text((rank + 1).to_string()),
                Cell::text(item.name.clone()),
                Cell::text(item.records.to_string()),
                Cell::text(format_quantity(item.quantity)),
            ])
        })
        .collect();
    titled_table(flow, "Productos más solicitados", &columns, &rows, style);
}

fn record_table(
    flow: &mut PageFlow<'_>,
    records: &[&SummaryRecord],
    currency: &str,
    style: &TableStyle,
) -> TableOutcome {
    let width = flow.content_width();
    let columns = vec![
        ColumnSpec::new("Folio", width * 0.14, Align::Left),
        ColumnSpec::new("Fecha", width * 0.16, Align::Center),
        ColumnSpec::new("Cliente", width * 0.36, Align::Left),
        ColumnSpec::new("Estado", width * 0.16, Align::Center),
        ColumnSpec::new("Total", width * 0.18, Align::Right),
    ];
    let rows: Vec<TableRow> = records
        .iter()
        .map(|record| {
            let date = record
                .created_at
                .map(|stamp| format_date(stamp.date()))
                .unwrap_or_default();
            let number = if record.number.is_empty() {
                "S/N".to_string()
            } else {
                record.number.clone()
            };
            TableRow::new(vec![
                Cell::text(number),
                Cell::text(date),
                Cell::Wrapped {
                    title: record.client_name.clone(),
                    detail: record.client_email.clone(),
                },
                status_chip(&record.status),
                Cell::text(format_money(record.total, currency)),
            ])
        })
        .collect();
    titled_table(flow, "Detalle de documentos", &columns, &rows, style)
}

/// Periodic summary: stat cards, bucket series, status tally, top items and
/// the per-record table.
pub fn compose_report(
    records: &[SummaryRecord],
    window: &ReportWindow,
    config: &Config,
    ctx: &RenderContext,
) -> Composition {
    let currency = &config.document.currency_prefix;
    let style = table_style(config);
    let summary = aggregate(records, window, config.layout.top_n_items);
    let selected = records_in_window(records, window);

    let mut surface = Surface::new(config.layout.page);
    let table = {
        let mut flow = PageFlow::new(&mut surface, page_margins());
        let content = BannerContent {
            title: window.period.title().to_uppercase(),
            details: vec![
                format!("Periodo: {}", window.describe()),
                format!("Generado: {}", ctx.now.format("%d/%m/%Y %H:%M")),
            ],
        };
        banner(&mut flow, &config.organization, &content);
        stat_cards(&mut flow, &summary_cards(&summary, currency));
        bucket_table(&mut flow, &summary, currency, &style);
        status_table(&mut flow, &summary, &style);
        top_items_table(&mut flow, &summary, &style);

        if selected.is_empty() {
            notice_box(&mut flow, EMPTY_NOTICE);
            None
        } else {
            Some(record_table(&mut flow, &selected, currency, &style))
        }
    };

    stamp_footers(&mut surface, page_margins(), &footer(config, Some(ctx.now)));

    Composition {
        surface,
        info: DocumentInfo {
            title: format!("{} {}", window.period.title(), window.describe()),
            created_at: Some(ctx.now),
        },
        table,
        subtotal: summary.revenue,
        totals: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{parse_records, Period, NO_STATUS_LABEL};
    use chrono::NaiveDate;

    fn ctx() -> RenderContext {
        RenderContext::at(
            NaiveDate::from_ymd_opt(2026, 10, 19)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn empty_daily_report_shows_zero_cards() {
        let window = ReportWindow::new(Period::Daily, ctx().today());
        let composition = compose_report(&[], &window, &Config::default(), &ctx());
        let page = composition.surface.page(0).unwrap();

        // two money cards plus seven empty revenue bars
        assert_eq!(page.count_text("$0.00"), 2 + 7);
        assert_eq!(page.count_text("0.0%"), 1);
        let notices: usize = (0..composition.page_count())
            .map(|i| composition.surface.page(i).unwrap().count_text(EMPTY_NOTICE))
            .sum();
        assert_eq!(notices, 1);
        assert!(composition.table.is_none());
    }

    #[test]
    fn cards_never_show_blank_values() {
        let window = ReportWindow::new(Period::Daily, ctx().today());
        let summary = aggregate(&[], &window, 5);
        let cards = summary_cards(&summary, "$");
        assert_eq!(cards.len(), 6);
        assert!(cards.iter().all(|card| !card.value.is_empty()));
        assert_eq!(cards[0].value, "0");
        assert_eq!(cards[1].value, "$0.00");
    }

    #[test]
    fn blank_status_reads_the_same_in_chip_and_tally() {
        let records = parse_records(
            r#"[{"folio": "Q-1", "created_at": "2026-10-19 09:00:00", "total": 10, "status": null}]"#,
        )
        .unwrap();
        let window = ReportWindow::new(Period::Weekly, ctx().today());
        let composition = compose_report(&records, &window, &Config::default(), &ctx());

        let seen: usize = (0..composition.page_count())
            .map(|i| composition.surface.page(i).unwrap().count_text(NO_STATUS_LABEL))
            .sum();
        // once in the status table, once on the record's chip
        assert_eq!(seen, 2);
        assert_eq!(status_chip(""), status_chip("   "));
    }

    #[test]
    fn record_table_lists_every_in_window_record() {
        let records = parse_records(
            r#"[
                {"folio": "Q-1", "created_at": "2026-10-19 09:00:00", "total": 10, "status": "pendiente"},
                {"folio": "Q-2", "created_at": "2026-10-18 09:00:00", "total": 20, "status": "archivada"},
                {"folio": "Q-3", "created_at": "2025-01-01", "total": 30, "status": "sent"}
            ]"#,
        )
        .unwrap();
        let window = ReportWindow::new(Period::Weekly, ctx().today());
        let composition = compose_report(&records, &window, &Config::default(), &ctx());

        assert_eq!(composition.table.as_ref().unwrap().total_rows(), 2);
        assert_eq!(composition.subtotal, 30.0);
        let texts: Vec<String> = (0..composition.page_count())
            .flat_map(|i| composition.surface.page(i).unwrap().texts())
            .collect();
        assert!(texts.iter().any(|t| t == "archivada"));
        assert!(!texts.iter().any(|t| t == "Q-3"));
    }
}
