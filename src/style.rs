//! # Style Primitives
//!
//! The handful of visual properties a report needs: RGB colors, font style,
//! and text alignment. Colors use 0-255 channels because every color in a
//! report comes from a config file, where `[248, 248, 248]` reads better than
//! `0.9725`.

use serde::{Deserialize, Serialize};

/// An RGB color with 8-bit channels. Serializes as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const WHITE: Color = Color(255, 255, 255);

    /// Channels scaled to the 0.0-1.0 range PDF color operators expect.
    pub fn unit(&self) -> (f64, f64, f64) {
        (
            self.0 as f64 / 255.0,
            self.1 as f64 / 255.0,
            self.2 as f64 / 255.0,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// Font, size and color for a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_style: FontStyle,
    /// Size in points.
    pub font_size: f64,
    pub color: Color,
}

impl TextStyle {
    pub fn new(font_style: FontStyle, font_size: f64) -> Self {
        Self {
            font_style,
            font_size,
            color: Color::BLACK,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Outline for a drawn shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    /// Line width in millimetres.
    pub width: f64,
}
