//! Forward-only page flow.
//!
//! [`PageFlow`] owns the vertical [`Cursor`] and borrows the [`Surface`] for
//! the lifetime of one document. Blocks ask for room with
//! [`PageFlow::ensure_space`] before they draw anything; when the room is not
//! there a new page is opened and the registered repeat hook (a table's
//! column header band, for instance) is replayed at its top.

use super::surface::Surface;

/// Vertical position of the next block, in millimetres from the page top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 15.0,
            right: 15.0,
            bottom: 22.0,
            left: 15.0,
        }
    }
}

/// Drawn at the top of every page opened while it is registered.
pub type RepeatHook<'a> = Box<dyn FnMut(&mut Surface, &mut Cursor) + 'a>;

pub struct PageFlow<'s> {
    surface: &'s mut Surface,
    cursor: Cursor,
    margins: Margins,
    repeat: Option<RepeatHook<'s>>,
    breaks: usize,
    /// Cursor position right after the current page was opened.
    page_top: f32,
}

impl<'s> PageFlow<'s> {
    /// Starts flowing at the top margin of the surface's current page.
    pub fn new(surface: &'s mut Surface, margins: Margins) -> Self {
        Self {
            surface,
            cursor: Cursor { y: margins.top },
            margins,
            repeat: None,
            breaks: 0,
            page_top: margins.top,
        }
    }

    pub fn surface(&mut self) -> &mut Surface {
        &mut *self.surface
    }

    pub fn y(&self) -> f32 {
        self.cursor.y
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor.y += dy;
    }

    /// Moves the cursor to `y`. The flow never moves backwards, so a target
    /// above the cursor is ignored.
    pub fn move_to(&mut self, y: f32) {
        if y > self.cursor.y {
            self.cursor.y = y;
        }
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn left(&self) -> f32 {
        self.margins.left
    }

    /// Horizontal room between the side margins.
    pub fn content_width(&self) -> f32 {
        self.surface.page_width() - self.margins.left - self.margins.right
    }

    pub fn current_page(&self) -> usize {
        self.surface.current_page()
    }

    /// Number of page breaks taken so far.
    pub fn breaks(&self) -> usize {
        self.breaks
    }

    /// Lowest y a block may reach on the current page.
    pub fn limit(&self) -> f32 {
        self.surface.page_height() - self.margins.bottom
    }

    /// Room left above the bottom margin.
    pub fn remaining(&self) -> f32 {
        (self.limit() - self.cursor.y).max(0.0)
    }

    /// Registers the hook replayed on each new page. Replaces any previous hook.
    pub fn set_repeat_hook(&mut self, hook: RepeatHook<'s>) {
        self.repeat = Some(hook);
    }

    pub fn clear_repeat_hook(&mut self) {
        self.repeat = None;
    }

    /// Guarantees `height` millimetres below the cursor, opening a new page if
    /// needed. Returns `true` when a break happened.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        self.ensure_space_reserving(height, 0.0)
    }

    /// Like [`ensure_space`](Self::ensure_space) but also keeps `reserve`
    /// millimetres free below the block, for blocks that must not end flush
    /// against the bottom margin.
    pub fn ensure_space_reserving(&mut self, height: f32, reserve: f32) -> bool {
        if self.cursor.y + height + reserve <= self.limit() {
            return false;
        }

        // A block taller than a whole page would break forever; it is drawn
        // where it is and allowed to overflow.
        if self.at_top_of_page() {
            log::warn!(
                "Block of {:.1}mm does not fit on an empty page ({:.1}mm available), drawing it anyway",
                height,
                self.remaining()
            );
            return false;
        }

        self.break_page();
        true
    }

    /// Opens a new page unconditionally and replays the repeat hook.
    pub fn break_page(&mut self) {
        let page = self.surface.add_page();
        self.breaks += 1;
        self.cursor.y = self.margins.top;
        log::debug!("Page break, continuing on page {}", page + 1);
        if let Some(hook) = self.repeat.as_mut() {
            hook(&mut *self.surface, &mut self.cursor);
        }
        self.page_top = self.cursor.y;
    }

    /// Whether nothing has been placed below the page's running header yet.
    pub fn at_top_of_page(&self) -> bool {
        self.cursor.y <= self.page_top + 0.01
    }

    /// Treats the cursor as the top of the current page. Called after a block
    /// that opens a page and belongs with what follows it (a table header, a
    /// heading), so that block is not left alone by the next break.
    pub fn mark_page_top(&mut self) {
        self.page_top = self.cursor.y;
    }

    /// Room on an empty page, between the margins.
    pub fn page_room(&self) -> f32 {
        self.limit() - self.margins.top
    }
}
