//! Immutable style values passed explicitly into every draw call.
//!
//! The surface keeps no "current" font or color between calls: each operation
//! it emits sets exactly the state it needs.

use serde::{Deserialize, Serialize};

/// Points per millimetre. All layout happens in millimetres; font sizes are in points.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TEXT: Color = Color::rgb(33, 37, 41);
    pub const MUTED: Color = Color::rgb(108, 117, 125);
    pub const RULE: Color = Color::rgb(206, 212, 218);
    pub const ZEBRA: Color = Color::rgb(245, 247, 250);
    pub const BRAND: Color = Color::rgb(22, 58, 107);
    pub const BRAND_LIGHT: Color = Color::rgb(228, 236, 247);
    pub const WARNING: Color = Color::rgb(214, 120, 0);
    pub const WARNING_LIGHT: Color = Color::rgb(255, 243, 224);

    /// Components scaled to the 0..1 range PDF color operators expect.
    pub fn components(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    /// Size in points.
    pub size: f32,
    pub weight: FontWeight,
}

impl FontSpec {
    pub const fn regular(size: f32) -> Self {
        Self {
            size,
            weight: FontWeight::Regular,
        }
    }

    pub const fn bold(size: f32) -> Self {
        Self {
            size,
            weight: FontWeight::Bold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: FontSpec,
    pub color: Color,
    pub align: Align,
}

impl TextStyle {
    pub const fn new(font: FontSpec, color: Color) -> Self {
        Self {
            font,
            color,
            align: Align::Left,
        }
    }

    pub const fn aligned(self, align: Align) -> Self {
        Self { align, ..self }
    }

    pub const fn colored(self, color: Color) -> Self {
        Self { color, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    /// Line width in millimetres.
    pub width: f32,
}

/// Fill and/or outline for a closed shape. A shape with neither is not drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeStyle {
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
}

impl ShapeStyle {
    pub const fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
        }
    }

    pub const fn outlined(color: Color, width: f32) -> Self {
        Self {
            fill: None,
            stroke: Some(Stroke { color, width }),
        }
    }

    pub const fn filled_outlined(fill: Color, stroke: Color, width: f32) -> Self {
        Self {
            fill: Some(fill),
            stroke: Some(Stroke {
                color: stroke,
                width,
            }),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.fill.is_some() || self.stroke.is_some()
    }
}
