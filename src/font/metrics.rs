//! Advance widths for the standard Helvetica faces, in 1/1000 em.
//!
//! Values come from the Adobe Core 14 AFM files. The oblique faces share the
//! upright widths. Only printable ASCII is tabulated; everything else falls
//! back to the width of a digit, which is close enough for wrapping decisions.

/// Widths for U+0020..=U+007E, Helvetica regular.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Widths for U+0020..=U+007E, Helvetica-Bold.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

const FALLBACK_WIDTH: u16 = 556;

/// Per-face width table.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    widths: &'static [u16; 95],
}

impl StandardFontMetrics {
    pub(super) const fn helvetica() -> Self {
        Self { widths: &HELVETICA }
    }

    pub(super) const fn helvetica_bold() -> Self {
        Self {
            widths: &HELVETICA_BOLD,
        }
    }

    /// Advance width of one character in 1/1000 em.
    pub fn units(&self, ch: char) -> u16 {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) {
            self.widths[(cp - 0x20) as usize]
        } else if ch == '\u{00A0}' {
            self.widths[0]
        } else {
            FALLBACK_WIDTH
        }
    }

    /// Advance width of one character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.units(ch) as f64 / 1000.0 * font_size
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        let units: u32 = text.chars().map(|c| self.units(c) as u32).sum();
        units as f64 / 1000.0 * font_size
    }
}
