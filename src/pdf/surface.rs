//! In-memory vector canvas over fixed-size pages.
//!
//! Coordinates are millimetres measured from the top-left corner of the page;
//! they are flipped into PDF user space (points, bottom-left origin) when the
//! operations are recorded. Each page keeps its own operation list until
//! [`Surface::finish`] serializes everything with `lopdf`.

use chrono::NaiveDateTime;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use serde::{Deserialize, Serialize};

use super::style::{Align, FontSpec, FontWeight, ShapeStyle, Stroke, TextStyle, PT_PER_MM};
use super::text::text_width;
use crate::error::Result;

/// Bezier control distance for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

const REGULAR_FONT: &[u8] = b"F1";
const BOLD_FONT: &[u8] = b"F2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// (width, height) in millimetres.
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        }
    }
}

/// Metadata written to the document's Info dictionary.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub created_at: Option<NaiveDateTime>,
}

/// The recorded draw operations of one page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    operations: Vec<Operation>,
}

impl Page {
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Every string shown on the page, in drawing order.
    pub fn texts(&self) -> Vec<String> {
        self.operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.iter().map(|&b| b as char).collect()),
                _ => None,
            })
            .collect()
    }

    /// Number of times `needle` is shown verbatim on the page.
    pub fn count_text(&self, needle: &str) -> usize {
        self.texts().iter().filter(|text| text.as_str() == needle).count()
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }
}

pub struct Surface {
    width: f32,
    height: f32,
    pages: Vec<Page>,
    current: usize,
}

impl Surface {
    /// Creates a surface holding one blank page.
    pub fn new(size: PageSize) -> Self {
        let (width, height) = size.dimensions();
        Self {
            width,
            height,
            pages: vec![Page::default()],
            current: 0,
        }
    }

    pub fn page_width(&self) -> f32 {
        self.width
    }

    pub fn page_height(&self) -> f32 {
        self.height
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Appends a blank page and makes it the drawing target.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.current = self.pages.len() - 1;
        self.current
    }

    /// Redirects drawing to an existing page. Used by post-passes such as
    /// footer stamping; returns `false` if the page does not exist.
    pub fn select_page(&mut self, index: usize) -> bool {
        if index < self.pages.len() {
            self.current = index;
            true
        } else {
            log::warn!("Page {} does not exist ({} pages)", index + 1, self.pages.len());
            false
        }
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, style: &ShapeStyle) {
        if !style.is_visible() {
            return;
        }
        let (px, py) = self.to_user_space(x, y + height);
        let ops = vec![px, py, (width * PT_PER_MM).into(), (height * PT_PER_MM).into()];
        self.paint(style, |page| page.push("re", ops));
    }

    pub fn rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        style: &ShapeStyle,
    ) {
        let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        if r == 0.0 {
            self.rect(x, y, width, height, style);
            return;
        }
        if !style.is_visible() {
            return;
        }
        let k = r * KAPPA;
        let (right, bottom) = (x + width, y + height);

        let mut path = Vec::new();
        path.push(self.path_op("m", &[(x + r, y)]));
        path.push(self.path_op("l", &[(right - r, y)]));
        path.push(self.path_op("c", &[(right - r + k, y), (right, y + r - k), (right, y + r)]));
        path.push(self.path_op("l", &[(right, bottom - r)]));
        path.push(self.path_op(
            "c",
            &[(right, bottom - r + k), (right - r + k, bottom), (right - r, bottom)],
        ));
        path.push(self.path_op("l", &[(x + r, bottom)]));
        path.push(self.path_op("c", &[(x + r - k, bottom), (x, bottom - r + k), (x, bottom - r)]));
        path.push(self.path_op("l", &[(x, y + r)]));
        path.push(self.path_op("c", &[(x, y + r - k), (x + r - k, y), (x + r, y)]));
        path.push(Operation::new("h", vec![]));

        self.paint(style, |page| page.operations.extend(path));
    }

    pub fn circle(&mut self, cx: f32, cy: f32, radius: f32, style: &ShapeStyle) {
        if !style.is_visible() || radius <= 0.0 {
            return;
        }
        let r = radius;
        let k = r * KAPPA;

        let path = vec![
            self.path_op("m", &[(cx + r, cy)]),
            self.path_op("c", &[(cx + r, cy + k), (cx + k, cy + r), (cx, cy + r)]),
            self.path_op("c", &[(cx - k, cy + r), (cx - r, cy + k), (cx - r, cy)]),
            self.path_op("c", &[(cx - r, cy - k), (cx - k, cy - r), (cx, cy - r)]),
            self.path_op("c", &[(cx + k, cy - r), (cx + r, cy - k), (cx + r, cy)]),
            Operation::new("h", vec![]),
        ];

        self.paint(style, |page| page.operations.extend(path));
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: Stroke) {
        let start = self.path_op("m", &[(x1, y1)]);
        let end = self.path_op("l", &[(x2, y2)]);
        let style = ShapeStyle {
            fill: None,
            stroke: Some(stroke),
        };
        self.paint(&style, |page| page.operations.extend([start, end]));
    }

    /// Draws one line of text whose baseline sits at `y`; `x` is the left
    /// edge, center or right edge depending on the style's alignment.
    pub fn text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let width = text_width(text, style.font);
        let left = match style.align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        let (px, py) = self.to_user_space(left, y);
        let [r, g, b] = style.color.components();
        let page = &mut self.pages[self.current];
        page.push("q", vec![]);
        page.push("rg", vec![r.into(), g.into(), b.into()]);
        page.push("BT", vec![]);
        page.push("Tf", vec![font_resource(style.font), style.font.size.into()]);
        page.push("Td", vec![px, py]);
        page.push(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        );
        page.push("ET", vec![]);
        page.push("Q", vec![]);
    }

    /// Draws consecutive lines starting with the first baseline at `y`.
    /// Returns the baseline the next line would use.
    pub fn text_lines(
        &mut self,
        lines: &[String],
        x: f32,
        y: f32,
        line_height: f32,
        style: &TextStyle,
    ) -> f32 {
        let mut baseline = y;
        for line in lines {
            self.text(line, x, baseline, style);
            baseline += line_height;
        }
        baseline
    }

    /// Serializes every page into a PDF file held in memory.
    pub fn finish(self, info: &DocumentInfo) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            (self.width * PT_PER_MM).into(),
            (self.height * PT_PER_MM).into(),
        ];

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let content = Content {
                operations: page.operations,
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut info_dict = dictionary! {
            "Title" => Object::String(to_win_ansi(&info.title), StringFormat::Literal),
            "Producer" => Object::String(
                format!("quotedoc {}", env!("CARGO_PKG_VERSION")).into_bytes(),
                StringFormat::Literal,
            ),
        };
        if let Some(created_at) = info.created_at {
            info_dict.set(
                "CreationDate",
                Object::String(
                    created_at.format("D:%Y%m%d%H%M%S").to_string().into_bytes(),
                    StringFormat::Literal,
                ),
            );
        }
        let info_id = doc.add_object(info_dict);
        doc.trailer.set("Info", info_id);

        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn to_user_space(&self, x: f32, y: f32) -> (Object, Object) {
        ((x * PT_PER_MM).into(), ((self.height - y) * PT_PER_MM).into())
    }

    fn path_op(&self, operator: &str, points: &[(f32, f32)]) -> Operation {
        let operands = points
            .iter()
            .flat_map(|&(x, y)| {
                let (px, py) = self.to_user_space(x, y);
                [px, py]
            })
            .collect();
        Operation::new(operator, operands)
    }

    /// Wraps a path in its own graphics state with the colors and line width
    /// of `style`, then paints it.
    fn paint(&mut self, style: &ShapeStyle, build_path: impl FnOnce(&mut Page)) {
        let page = &mut self.pages[self.current];
        page.push("q", vec![]);
        if let Some(fill) = style.fill {
            let [r, g, b] = fill.components();
            page.push("rg", vec![r.into(), g.into(), b.into()]);
        }
        if let Some(stroke) = style.stroke {
            let [r, g, b] = stroke.color.components();
            page.push("RG", vec![r.into(), g.into(), b.into()]);
            page.push("w", vec![(stroke.width * PT_PER_MM).into()]);
        }
        build_path(page);
        let painter = match (style.fill.is_some(), style.stroke.is_some()) {
            (true, true) => "B",
            (true, false) => "f",
            _ => "S",
        };
        page.push(painter, vec![]);
        page.push("Q", vec![]);
    }
}

fn font_resource(font: FontSpec) -> Object {
    let name = match font.weight {
        FontWeight::Regular => REGULAR_FONT,
        FontWeight::Bold => BOLD_FONT,
    };
    Object::Name(name.to_vec())
}

/// Latin-1 code points map directly onto WinAnsi; anything else becomes '?'.
fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) <= 255 { c as u8 } else { b'?' })
        .collect()
}
