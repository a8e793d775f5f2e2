//! Text measurement and greedy word wrapping.
//!
//! Both functions are pure: the table renderer measures a row with them and
//! then draws the very same lines, so they must agree call for call.

use super::metrics::char_width;
use super::style::{FontSpec, PT_PER_MM};

/// Width of `text` in millimetres when set in `font`.
pub fn text_width(text: &str, font: FontSpec) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| u32::from(char_width(c, font.weight)))
        .sum();
    units as f32 / 1000.0 * font.size / PT_PER_MM
}

/// Wraps `text` into lines no wider than `max_width` millimetres.
///
/// Explicit newlines start a new line. A single word wider than `max_width`
/// is kept whole on its own line. Empty or whitespace-only input yields no lines.
pub fn wrap(text: &str, max_width: f32, font: FontSpec) -> Vec<String> {
    let mut lines = Vec::new();
    if text.trim().is_empty() {
        return lines;
    }

    for paragraph in text.lines() {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if text_width(&candidate, font) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Number of lines `text` occupies, never less than one.
///
/// Feeds page-break decisions, so any degenerate measurement (a width that is
/// not a positive finite number) falls back to a single line.
pub fn line_count(text: &str, max_width: f32, font: FontSpec) -> usize {
    if !max_width.is_finite() || max_width <= 0.0 {
        log::warn!(
            "Cannot wrap text into a width of {max_width}, counting it as a single line"
        );
        return 1;
    }
    wrap(text, max_width, font).len().max(1)
}
