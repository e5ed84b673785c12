//! # Fonts
//!
//! Reports are set entirely in the standard Helvetica family, which every
//! PDF viewer ships. Nothing is embedded; the writer references the faces by
//! name and the layout measures with the AFM widths in [`metrics`].

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::style::FontStyle;

/// Millimetres per typographic point.
pub const MM_PER_PT: f64 = 0.3528;

/// The four Helvetica faces a report can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl StandardFont {
    /// Every face, in resource order (`/F1`..`/F4`).
    pub const ALL: [StandardFont; 4] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
    ];

    pub fn for_style(style: FontStyle) -> Self {
        match style {
            FontStyle::Normal => StandardFont::Helvetica,
            FontStyle::Bold => StandardFont::HelveticaBold,
            FontStyle::Italic => StandardFont::HelveticaOblique,
            FontStyle::BoldItalic => StandardFont::HelveticaBoldOblique,
        }
    }

    /// The PostScript base font name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    /// Page resource name used in content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "F1",
            StandardFont::HelveticaBold => "F2",
            StandardFont::HelveticaOblique => "F3",
            StandardFont::HelveticaBoldOblique => "F4",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            StandardFont::Helvetica | StandardFont::HelveticaOblique => {
                StandardFontMetrics::helvetica()
            }
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => {
                StandardFontMetrics::helvetica_bold()
            }
        }
    }

    /// Width of `text` in millimetres at `font_size` points.
    pub fn text_width_mm(&self, text: &str, font_size: f64) -> f64 {
        self.metrics().measure_string(text, font_size) * MM_PER_PT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_maps_to_face() {
        assert_eq!(StandardFont::for_style(FontStyle::Bold).pdf_name(), "Helvetica-Bold");
        assert_eq!(
            StandardFont::for_style(FontStyle::Italic).pdf_name(),
            "Helvetica-Oblique"
        );
        assert_eq!(StandardFont::for_style(FontStyle::BoldItalic).resource_name(), "F4");
    }

    #[test]
    fn bold_is_wider() {
        let text = "Turnover Items";
        let regular = StandardFont::Helvetica.text_width_mm(text, 12.0);
        let bold = StandardFont::HelveticaBold.text_width_mm(text, 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn width_scales_with_size() {
        let w12 = StandardFont::Helvetica.text_width_mm("abc", 12.0);
        let w24 = StandardFont::Helvetica.text_width_mm("abc", 24.0);
        assert!((w24 - 2.0 * w12).abs() < 1e-9);
    }
}
