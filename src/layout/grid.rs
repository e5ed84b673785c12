//! # Field Grids
//!
//! Label/value pairs, two per row. The content width is split into two
//! equal columns; each column holds a bold label followed by a filled
//! rounded box with the value. Rows have a fixed height and values are not
//! wrapped, so the grid's height depends only on how many fields it has.

use crate::config::LayoutConfig;
use crate::model::FormField;
use crate::style::{Color, FontStyle, TextStyle};

use super::{DrawFn, Frame, PageCanvas};

/// Value text sits this far right of the box edge and below the row top.
const VALUE_INSET: f64 = 5.0;
/// Boxes start this far above the row's cursor position.
const BOX_RAISE: f64 = 2.0;

/// Column geometry for one grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridColumns {
    pub column_width: f64,
    pub box_width: f64,
}

impl GridColumns {
    pub fn new(content_width: f64, config: &LayoutConfig) -> Self {
        let column_width = content_width / 2.0;
        Self {
            column_width,
            box_width: (column_width - config.label_width - config.column_gap / 2.0).max(0.0),
        }
    }
}

/// Build a drawing closure for a field grid.
///
/// Each row advances the cursor by the row height plus the section spacing,
/// whatever the values contain.
pub fn render_form_fields<'a>(fields: Vec<FormField>, config: &'a LayoutConfig) -> DrawFn<'a> {
    Box::new(move |canvas: &mut PageCanvas, frame: Frame| {
        let columns = GridColumns::new(frame.width, config);
        let mut y = frame.y;
        for row in fields.chunks(2) {
            for (col, field) in row.iter().enumerate() {
                let x = frame.x + col as f64 * columns.column_width;
                draw_field(canvas, field, x, y, &columns, config);
            }
            y += config.row_height + frame.spacing;
        }
        y
    })
}

fn draw_field(
    canvas: &mut PageCanvas,
    field: &FormField,
    x: f64,
    y: f64,
    columns: &GridColumns,
    config: &LayoutConfig,
) {
    let size = config.body_font_size;
    canvas.text(
        x,
        y + VALUE_INSET,
        vec![format!("{}:", field.label)],
        TextStyle::new(FontStyle::Bold, size),
    );

    let box_x = x + config.label_width;
    let (fill, text_color) = if field.dark {
        (config.dark_fill, Color::WHITE)
    } else {
        (config.light_fill, Color::BLACK)
    };
    canvas.rounded_rect(
        box_x,
        y - BOX_RAISE,
        columns.box_width,
        config.row_height,
        config.corner_radius,
        fill,
        config.box_border,
    );
    canvas.text(
        box_x + VALUE_INSET,
        y + VALUE_INSET,
        vec![field.value.clone()],
        TextStyle::new(FontStyle::Normal, size).with_color(text_color),
    );
}
