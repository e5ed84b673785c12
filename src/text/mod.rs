//! # Text Wrapping
//!
//! Greedy line breaking against the Helvetica metrics. Break opportunities
//! come from UAX#14 via `unicode-linebreak`, so hyphenated words and slashes
//! wrap where a reader expects. Words longer than the line are broken at the
//! character that overflows. Hard newlines always start a new line.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::{StandardFont, MM_PER_PT};

/// Height of one line of text in millimetres.
pub fn line_height_mm(font_size: f64, line_height_factor: f64) -> f64 {
    font_size * MM_PER_PT * line_height_factor
}

/// Break opportunities indexed by char position: entry `i` says whether a
/// line may end before `chars[i]`.
fn break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }
    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn finish_line(chars: &[char]) -> String {
    let line: String = chars.iter().filter(|c| !is_newline(**c)).collect();
    line.trim_end().to_string()
}

/// Wrap `text` to `max_width` millimetres.
///
/// Always returns at least one line; empty input yields a single empty line
/// so that an empty boxed section still occupies one line of height.
pub fn wrap_text(text: &str, font: StandardFont, font_size: f64, max_width: f64) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let metrics = font.metrics();
    let chars: Vec<char> = text.chars().collect();
    let widths: Vec<f64> = chars
        .iter()
        .map(|&c| {
            if is_newline(c) {
                0.0
            } else {
                metrics.char_width(c, font_size) * MM_PER_PT
            }
        })
        .collect();
    let opps = break_opportunities(text);

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0.0;
    let mut last_break: Option<usize> = None;

    for i in 0..chars.len() {
        if i > 0 {
            match opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    lines.push(finish_line(&chars[line_start..i]));
                    line_start = i;
                    line_width = 0.0;
                    last_break = None;
                }
                Some(BreakOpportunity::Allowed) => last_break = Some(i),
                None => {}
            }
        }

        if is_newline(chars[i]) {
            continue;
        }

        // Trailing spaces may hang past the edge.
        if line_width + widths[i] > max_width && line_start < i && !chars[i].is_whitespace() {
            let break_at = match last_break {
                Some(bp) if bp > line_start => bp,
                _ => i,
            };
            lines.push(finish_line(&chars[line_start..break_at]));
            line_start = break_at;
            line_width = widths[break_at..i].iter().sum();
            last_break = None;
        }

        line_width += widths[i];
    }

    if line_start < chars.len() || lines.is_empty() {
        lines.push(finish_line(&chars[line_start..]));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_line() {
        let lines = wrap_text("2 keys", StandardFont::Helvetica, 12.0, 170.0);
        assert_eq!(lines, vec!["2 keys"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        let lines = wrap_text("", StandardFont::Helvetica, 12.0, 170.0);
        assert_eq!(lines, vec![String::new()]);
    }

    #[test]
    fn explicit_newlines_split() {
        let lines = wrap_text("Bleachers\nScoreboard", StandardFont::Helvetica, 12.0, 170.0);
        assert_eq!(lines, vec!["Bleachers", "Scoreboard"]);
    }

    #[test]
    fn wraps_at_spaces() {
        let text = "the quick brown fox jumps over the lazy dog";
        let lines = wrap_text(text, StandardFont::Helvetica, 12.0, 30.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(StandardFont::Helvetica.text_width_mm(line, 12.0) <= 30.0 + 1e-9);
            assert!(!line.ends_with(' '));
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn long_word_is_broken() {
        let word = "x".repeat(200);
        let lines = wrap_text(&word, StandardFont::Helvetica, 12.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn line_height_uses_factor() {
        assert!((line_height_mm(12.0, 1.15) - 12.0 * 0.3528 * 1.15).abs() < 1e-9);
    }
}
