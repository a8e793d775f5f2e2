mod flow;
mod metrics;
mod sections;
mod style;
mod surface;
mod table;
mod text;

pub use flow::{Cursor, Margins, PageFlow, RepeatHook};
pub use metrics::char_width;
pub use sections::{
    banner, client_box, client_box_height, client_box_lines, notice_box, notice_height,
    page_label, section_title, stamp_footers, stat_cards, totals_box, unresolved_items,
    BannerContent, FooterContent, StatCard, BANNER_HEIGHT, BLOCK_GAP, UNRESOLVED_TITLE,
};
pub use style::{Align, Color, FontSpec, FontWeight, ShapeStyle, Stroke, TextStyle, PT_PER_MM};
pub use surface::{DocumentInfo, Page, PageSize, Surface};
pub use table::{
    draw_chip, draw_header, line_item_columns, line_item_row, line_items_lead, measure_row,
    render_line_items, render_table, row_height, table_lead, BandingPolicy, Cell, ColumnSpec,
    LineItemsOutcome, TableOutcome, TableRow, TableStyle, DESCRIPTION_LABEL,
};
pub use text::{line_count, text_width, wrap};
