//! # Page Break Decisions
//!
//! The rules for when a section moves to a new page. Breaks are only ever
//! considered before a top-level section, never inside one, with a single
//! exception: boxed text can be split line-wise when that is switched on.

use crate::config::LayoutConfig;

/// Where the page ends, as far as break decisions care.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakGeometry {
    /// y where content starts on a fresh page.
    pub top: f64,
    /// A section starting below this always moves on.
    pub threshold: f64,
    /// Content should end above this.
    pub bottom: f64,
}

impl From<&LayoutConfig> for BreakGeometry {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            top: config.margin,
            threshold: config.break_threshold,
            bottom: config.content_bottom(),
        }
    }
}

impl BreakGeometry {
    pub fn is_at_top(&self, y: f64) -> bool {
        y <= self.top + 1e-6
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Start the section here.
    Place,
    /// Start the section on a fresh page.
    MoveToNextPage,
    /// Put this many lines here and carry the rest over.
    Split { lines_on_current_page: usize },
}

/// Decide whether a section starting at `y` must move to the next page.
///
/// `section_height` is the measured height of a text section, or `None`
/// for sections whose height isn't known up front (grids, signature boxes),
/// which only honour the threshold.
pub fn decide_section_break(
    y: f64,
    section_height: Option<f64>,
    geometry: &BreakGeometry,
) -> BreakDecision {
    if y > geometry.threshold {
        return BreakDecision::MoveToNextPage;
    }
    match section_height {
        Some(h) if y + h > geometry.bottom && !geometry.is_at_top(y) => {
            BreakDecision::MoveToNextPage
        }
        _ => BreakDecision::Place,
    }
}

/// How much of a boxed text block fits between `box_top` and the bottom.
///
/// `padding` is the vertical padding the box adds around its lines.
pub fn split_boxed_lines(
    box_top: f64,
    line_count: usize,
    line_height: f64,
    padding: f64,
    geometry: &BreakGeometry,
) -> BreakDecision {
    let available = geometry.bottom - box_top - padding;
    let fit = if available <= 0.0 || line_height <= 0.0 {
        0
    } else {
        (available / line_height + 1e-9).floor() as usize
    };

    if fit >= line_count {
        BreakDecision::Place
    } else if fit == 0 {
        BreakDecision::MoveToNextPage
    } else {
        BreakDecision::Split {
            lines_on_current_page: fit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4() -> BreakGeometry {
        BreakGeometry::from(&LayoutConfig::default())
    }

    #[test]
    fn past_threshold_always_breaks() {
        assert_eq!(
            decide_section_break(250.1, None, &a4()),
            BreakDecision::MoveToNextPage
        );
        assert_eq!(decide_section_break(250.0, None, &a4()), BreakDecision::Place);
    }

    #[test]
    fn tall_text_moves_when_not_at_top() {
        assert_eq!(
            decide_section_break(200.0, Some(90.0), &a4()),
            BreakDecision::MoveToNextPage
        );
        assert_eq!(decide_section_break(200.0, Some(70.0), &a4()), BreakDecision::Place);
    }

    #[test]
    fn oversized_text_at_top_stays() {
        assert_eq!(decide_section_break(20.0, Some(400.0), &a4()), BreakDecision::Place);
    }

    #[test]
    fn unmeasured_sections_only_use_threshold() {
        assert_eq!(decide_section_break(240.0, None, &a4()), BreakDecision::Place);
    }

    #[test]
    fn split_counts_fitting_lines() {
        let g = a4();
        // 277 - 200 - 10 = 67 mm available; 67 / 5 = 13 lines
        assert_eq!(
            split_boxed_lines(200.0, 40, 5.0, 10.0, &g),
            BreakDecision::Split {
                lines_on_current_page: 13
            }
        );
        assert_eq!(split_boxed_lines(200.0, 13, 5.0, 10.0, &g), BreakDecision::Place);
        assert_eq!(
            split_boxed_lines(270.0, 3, 5.0, 10.0, &g),
            BreakDecision::MoveToNextPage
        );
    }
}
