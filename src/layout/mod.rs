//! # Flow Layout
//!
//! Reports are laid out top to bottom with a single cursor. Each section is
//! placed where the previous one ended; before a section is placed we ask
//! whether it still belongs on this page, and if not the whole section moves
//! to a fresh one. There is no infinite canvas to slice afterwards.
//!
//! Coordinates are millimetres with the origin at the top-left of the page.
//! Text y positions are baselines. The PDF writer does the conversion to
//! points and flips the axis.
//!
//! Three kinds of content flow through [`FlowLayout::add_section`]:
//!
//! - literal text, optionally in a filled box, measured before placement
//! - a drawing closure ([`DrawFn`]) that draws whatever it likes from a
//!   [`Frame`] and reports where the cursor ends up
//! - nothing, for bare headings

pub mod gallery;
pub mod grid;
pub mod page_break;

use crate::config::LayoutConfig;
use crate::font::StandardFont;
use crate::image_loader::LoadedImage;
use crate::style::{Color, FontStyle, Stroke, TextAlign, TextStyle};
use crate::text::{line_height_mm, wrap_text};

use page_break::{decide_section_break, split_boxed_lines, BreakDecision, BreakGeometry};

/// Horizontal padding inside a text box, per side.
const BOX_PADDING_X: f64 = 5.0;
/// Vertical padding a text box adds around its lines.
const BOX_PADDING_Y: f64 = 10.0;
/// The box starts this far above the section's cursor position.
const BOX_RAISE: f64 = 5.0;

/// A finished page.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl LayoutPage {
    /// All text on the page, line by line, in drawing order.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().flat_map(|c| match c {
            DrawCommand::Text { lines, .. } => lines.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.text_lines().any(|l| l.contains(needle))
    }

    /// Baseline of the first text line that equals `text`.
    pub fn text_y(&self, text: &str) -> Option<f64> {
        self.commands.iter().find_map(|c| match c {
            DrawCommand::Text {
                y,
                lines,
                line_height,
                ..
            } => lines
                .iter()
                .position(|l| l == text)
                .map(|i| y + i as f64 * line_height),
            _ => None,
        })
    }

    pub fn image_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Image { .. }))
            .count()
    }
}

/// One drawing operation on a page.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Text {
        x: f64,
        /// Baseline of the first line.
        y: f64,
        lines: Vec<String>,
        line_height: f64,
        font: StandardFont,
        font_size: f64,
        color: Color,
        align: TextAlign,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Stroke,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: LoadedImage,
    },
}

/// The pages of a document being drawn. Drawing always targets the last page.
#[derive(Debug)]
pub struct PageCanvas {
    width: f64,
    height: f64,
    line_height_factor: f64,
    pages: Vec<LayoutPage>,
}

impl PageCanvas {
    pub fn new(width: f64, height: f64, line_height_factor: f64) -> Self {
        let mut canvas = Self {
            width,
            height,
            line_height_factor,
            pages: Vec::new(),
        };
        canvas.add_page();
        canvas
    }

    pub fn add_page(&mut self) {
        self.pages.push(LayoutPage {
            width: self.width,
            height: self.height,
            commands: Vec::new(),
        });
    }

    pub fn page_width(&self) -> f64 {
        self.width
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[LayoutPage] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<LayoutPage> {
        self.pages
    }

    fn push(&mut self, command: DrawCommand) {
        if let Some(page) = self.pages.last_mut() {
            page.commands.push(command);
        }
    }

    /// Draw lines of text with the first baseline at `y`.
    pub fn text(&mut self, x: f64, y: f64, lines: Vec<String>, style: TextStyle) {
        self.text_aligned(x, y, lines, style, TextAlign::Left);
    }

    /// Draw one line centered on the page.
    pub fn centered_text(&mut self, y: f64, text: &str, style: TextStyle) {
        let x = self.width / 2.0;
        self.text_aligned(x, y, vec![text.to_string()], style, TextAlign::Center);
    }

    fn text_aligned(&mut self, x: f64, y: f64, lines: Vec<String>, style: TextStyle, align: TextAlign) {
        let line_height = line_height_mm(style.font_size, self.line_height_factor);
        self.push(DrawCommand::Text {
            x,
            y,
            lines,
            line_height,
            font: StandardFont::for_style(style.font_style),
            font_size: style.font_size,
            color: style.color,
            align,
        });
    }

    /// Filled and stroked rounded rectangle.
    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: Color,
        border: Color,
    ) {
        self.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            radius,
            fill: Some(fill),
            stroke: Some(Stroke {
                color: border,
                width: 0.2,
            }),
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64) {
        self.push(DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            stroke: Stroke {
                color: Color::BLACK,
                width,
            },
        });
    }

    pub fn image(&mut self, x: f64, y: f64, width: f64, height: f64, image: LoadedImage) {
        self.push(DrawCommand::Image {
            x,
            y,
            width,
            height,
            image,
        });
    }

    /// Draw `image` aspect-fitted and centered inside the given box.
    pub fn image_fit(&mut self, x: f64, y: f64, max_w: f64, max_h: f64, image: LoadedImage) {
        let (w, h) = image.fit_within(max_w, max_h);
        self.image(x + (max_w - w) / 2.0, y + (max_h - h) / 2.0, w, h, image);
    }
}

/// Where a drawing closure may draw: the left edge, the cursor, the usable
/// width, and the spacing it should leave after itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub spacing: f64,
}

/// Custom section content. Draws into the canvas and returns the new cursor y.
pub type DrawFn<'a> = Box<dyn FnOnce(&mut PageCanvas, Frame) -> f64 + 'a>;

pub enum SectionContent<'a> {
    Empty,
    Text(String),
    Draw(DrawFn<'a>),
}

impl<'a> SectionContent<'a> {
    pub fn text(s: impl Into<String>) -> Self {
        SectionContent::Text(s.into())
    }

    pub fn draw(f: impl FnOnce(&mut PageCanvas, Frame) -> f64 + 'a) -> Self {
        SectionContent::Draw(Box::new(f))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionOptions {
    pub font_size: f64,
    pub font_style: FontStyle,
    pub spacing: f64,
    pub boxed: bool,
}

impl Default for SectionOptions {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            font_style: FontStyle::Normal,
            spacing: 5.0,
            boxed: false,
        }
    }
}

impl SectionOptions {
    pub fn boxed() -> Self {
        Self {
            boxed: true,
            ..Self::default()
        }
    }

    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn font(mut self, font_style: FontStyle, font_size: f64) -> Self {
        self.font_style = font_style;
        self.font_size = font_size;
        self
    }
}

/// The vertical position on the current page and the usable width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub y: f64,
    pub width: f64,
}

/// Text that has been wrapped and measured but not yet drawn.
struct MeasuredText {
    lines: Vec<String>,
    line_height: f64,
    /// Height of the text itself, plus box padding when boxed.
    height: f64,
}

/// One render pass: the canvas plus the cursor that walks down it.
pub struct FlowLayout<'c> {
    config: &'c LayoutConfig,
    geometry: BreakGeometry,
    canvas: PageCanvas,
    cursor: LayoutCursor,
}

impl<'c> FlowLayout<'c> {
    pub fn new(config: &'c LayoutConfig) -> Self {
        Self {
            config,
            geometry: BreakGeometry::from(config),
            canvas: PageCanvas::new(config.page_width, config.page_height, config.line_height_factor),
            cursor: LayoutCursor {
                y: config.margin,
                width: config.content_width(),
            },
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        self.config
    }

    pub fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    pub fn y(&self) -> f64 {
        self.cursor.y
    }

    pub fn set_y(&mut self, y: f64) {
        self.cursor.y = y;
    }

    pub fn advance(&mut self, dy: f64) {
        self.cursor.y += dy;
    }

    pub fn canvas(&self) -> &PageCanvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut PageCanvas {
        &mut self.canvas
    }

    pub fn page_count(&self) -> usize {
        self.canvas.page_count()
    }

    /// Start a new page and put the cursor back at the top margin.
    pub fn break_page(&mut self) {
        self.canvas.add_page();
        self.cursor.y = self.config.margin;
    }

    pub fn finish(self) -> Vec<LayoutPage> {
        self.canvas.into_pages()
    }

    /// Draw a centered line `offset` below the cursor, then move the cursor
    /// one contact-line gap past it.
    pub fn center_text(&mut self, text: &str, style: TextStyle, offset: f64) -> f64 {
        let y = self.cursor.y + offset;
        self.canvas.centered_text(y, text, style);
        self.cursor.y = y + self.config.contact_line_gap;
        self.cursor.y
    }

    /// Horizontal rule across the content width, `offset` below the cursor.
    /// The cursor does not move.
    pub fn divider(&mut self, offset: f64) {
        let y = self.cursor.y + offset;
        let x2 = self.config.page_width - self.config.margin;
        self.canvas
            .line(self.config.margin, y, x2, y, self.config.divider_width);
    }

    fn measure(&self, text: &str, opts: &SectionOptions) -> MeasuredText {
        let wrap_width = if opts.boxed {
            self.cursor.width - 2.0 * BOX_PADDING_X
        } else {
            self.cursor.width
        };
        let font = StandardFont::for_style(opts.font_style);
        let lines = wrap_text(text, font, opts.font_size, wrap_width);
        let line_height = line_height_mm(opts.font_size, self.config.line_height_factor);
        let mut height = lines.len() as f64 * line_height;
        if opts.boxed {
            height += BOX_PADDING_Y;
        }
        MeasuredText {
            lines,
            line_height,
            height,
        }
    }

    /// Place one section and return the new cursor y.
    ///
    /// The page-break check runs once, before anything is drawn: a section
    /// starting past the break threshold, or a text section too tall for the
    /// space left (when not already at the top of a page), starts on a new
    /// page instead. A section is never broken mid-way, except boxed text
    /// when `split_boxed_text` is on.
    pub fn add_section(
        &mut self,
        title: Option<&str>,
        content: SectionContent<'_>,
        opts: &SectionOptions,
    ) -> f64 {
        let measured = match &content {
            SectionContent::Text(text) => Some(self.measure(text, opts)),
            _ => None,
        };
        let title_height = if title.is_some() { opts.spacing } else { 0.0 };
        let section_height = measured.as_ref().map(|m| title_height + m.height);

        if decide_section_break(self.cursor.y, section_height, &self.geometry)
            == BreakDecision::MoveToNextPage
        {
            tracing::debug!(
                y = self.cursor.y,
                height = section_height,
                page = self.page_count() + 1,
                "section moved to new page"
            );
            self.break_page();
        }

        if let Some(title) = title {
            let style = TextStyle::new(FontStyle::Bold, opts.font_size);
            self.canvas
                .text(self.config.margin, self.cursor.y, vec![title.to_string()], style);
            self.cursor.y += opts.spacing;
        }

        match (content, measured) {
            (SectionContent::Text(_), Some(m)) => {
                let style = TextStyle::new(opts.font_style, opts.font_size);
                if opts.boxed {
                    self.draw_boxed_text(m, style, opts.spacing);
                } else {
                    self.canvas.text(self.config.margin, self.cursor.y, m.lines, style);
                    self.cursor.y += m.height + opts.spacing;
                }
            }
            (SectionContent::Draw(draw), _) => {
                let frame = Frame {
                    x: self.config.margin,
                    y: self.cursor.y,
                    width: self.cursor.width,
                    spacing: opts.spacing,
                };
                self.cursor.y = draw(&mut self.canvas, frame);
            }
            _ => {}
        }

        self.cursor.y
    }

    fn draw_boxed_text(&mut self, measured: MeasuredText, style: TextStyle, spacing: f64) {
        let MeasuredText {
            mut lines,
            line_height,
            ..
        } = measured;

        loop {
            let take = if self.config.split_boxed_text {
                match split_boxed_lines(
                    self.cursor.y - BOX_RAISE,
                    lines.len(),
                    line_height,
                    BOX_PADDING_Y,
                    &self.geometry,
                ) {
                    BreakDecision::Place => lines.len(),
                    BreakDecision::Split {
                        lines_on_current_page,
                    } => lines_on_current_page,
                    // Nothing fits below the cursor: a fresh page always
                    // takes at least one line.
                    BreakDecision::MoveToNextPage if !self.geometry.is_at_top(self.cursor.y) => {
                        self.break_page();
                        continue;
                    }
                    BreakDecision::MoveToNextPage => 1,
                }
            } else {
                lines.len()
            };

            let rest = lines.split_off(take.min(lines.len()));
            let box_height = lines.len() as f64 * line_height + BOX_PADDING_Y;
            let x = self.config.margin;
            self.canvas.rounded_rect(
                x,
                self.cursor.y - BOX_RAISE,
                self.cursor.width,
                box_height,
                self.config.corner_radius,
                self.config.light_fill,
                self.config.text_box_border,
            );
            self.canvas
                .text(x + BOX_PADDING_X, self.cursor.y + BOX_RAISE, lines, style);
            self.cursor.y += box_height + spacing;

            if rest.is_empty() {
                break;
            }
            tracing::debug!(remaining = rest.len(), "boxed text continues on next page");
            self.break_page();
            lines = rest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LayoutConfig {
        LayoutConfig::default()
    }

    fn long_text(lines: usize) -> String {
        (0..lines)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn boxed_section_advances_by_box_and_spacing() {
        let cfg = config();
        let mut flow = FlowLayout::new(&cfg);
        flow.set_y(100.0);
        let y = flow.add_section(
            Some("Turnover Items:"),
            SectionContent::text("2 keys"),
            &SectionOptions::boxed().spacing(10.0),
        );
        let lh = line_height_mm(12.0, cfg.line_height_factor);
        // title spacing + one line + padding + spacing
        assert!((y - (100.0 + 10.0 + lh + 10.0 + 10.0)).abs() < 1e-9);
        assert_eq!(flow.page_count(), 1);

        let page = &flow.canvas().pages()[0];
        assert_eq!(page.text_y("Turnover Items:"), Some(100.0));
        assert_eq!(page.text_y("2 keys"), Some(115.0));
    }

    #[test]
    fn empty_text_still_draws_one_line_box() {
        let cfg = config();
        let mut flow = FlowLayout::new(&cfg);
        let start = flow.y();
        let y = flow.add_section(Some("Notes:"), SectionContent::text(""), &SectionOptions::boxed());
        assert!(y > start + 15.0);
    }

    #[test]
    fn section_past_threshold_goes_to_top_of_next_page() {
        let cfg = config();
        let mut flow = FlowLayout::new(&cfg);
        flow.set_y(251.0);
        flow.add_section(Some("Notes:"), SectionContent::Empty, &SectionOptions::default());
        assert_eq!(flow.page_count(), 2);
        assert_eq!(flow.canvas().pages()[1].text_y("Notes:"), Some(cfg.margin));
    }

    #[test]
    fn tall_box_breaks_exactly_once() {
        let cfg = config();
        let mut flow = FlowLayout::new(&cfg);
        flow.set_y(150.0);
        flow.add_section(
            Some("Description:"),
            SectionContent::text(long_text(30)),
            &SectionOptions::boxed(),
        );
        assert_eq!(flow.page_count(), 2);
        let second = &flow.canvas().pages()[1];
        assert_eq!(second.text_y("Description:"), Some(cfg.margin));
        assert!(second.contains_text("line 29"));
        assert!(flow.canvas().pages()[0].commands.is_empty());
    }

    #[test]
    fn oversized_box_at_top_does_not_break() {
        let cfg = config();
        let mut flow = FlowLayout::new(&cfg);
        flow.add_section(None, SectionContent::text(long_text(80)), &SectionOptions::boxed());
        assert_eq!(flow.page_count(), 1);
    }

    #[test]
    fn split_boxed_text_spreads_over_pages() {
        let cfg = LayoutConfig {
            split_boxed_text: true,
            ..config()
        };
        let mut flow = FlowLayout::new(&cfg);
        flow.add_section(None, SectionContent::text(long_text(80)), &SectionOptions::boxed());
        assert!(flow.page_count() >= 2);
        let pages = flow.canvas().pages();
        assert!(pages[0].contains_text("line 0"));
        assert!(pages.last().is_some_and(|p| p.contains_text("line 79")));
        for page in pages {
            for cmd in &page.commands {
                if let DrawCommand::Rect { y, height, .. } = cmd {
                    assert!(y + height <= cfg.content_bottom() + 1e-6);
                }
            }
        }
    }

    #[test]
    fn draw_closure_controls_cursor() {
        let cfg = config();
        let mut flow = FlowLayout::new(&cfg);
        let y = flow.add_section(
            None,
            SectionContent::draw(|canvas, frame| {
                canvas.line(frame.x, frame.y, frame.x + frame.width, frame.y, 1.0);
                frame.y + 42.0 + frame.spacing
            }),
            &SectionOptions::default(),
        );
        assert!((y - (cfg.margin + 47.0)).abs() < 1e-9);
    }

    #[test]
    fn center_text_uses_page_center() {
        let cfg = config();
        let mut flow = FlowLayout::new(&cfg);
        let y = flow.center_text("Phone: 555-0100", TextStyle::new(FontStyle::Normal, 10.0), 0.0);
        assert!((y - (cfg.margin + cfg.contact_line_gap)).abs() < 1e-9);
        match &flow.canvas().pages()[0].commands[0] {
            DrawCommand::Text { x, align, .. } => {
                assert_eq!(*x, 105.0);
                assert_eq!(*align, TextAlign::Center);
            }
            other => panic!("expected text, got {:?}", other),
        }
    }
}
