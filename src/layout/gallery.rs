//! # Photo Gallery
//!
//! Trailing pages with the uploaded photos. The gallery always opens a new
//! page headed "Photos" and places a fixed number of photos per page, each
//! under a bold caption inside a bordered box. A photo that failed to decode
//! gets a one-line placeholder in its slot and the rest carry on.

use tracing::warn;

use crate::photos::PhotoEntry;
use crate::style::{FontStyle, TextStyle};

use super::FlowLayout;

const TITLE_Y: f64 = 20.0;
const TITLE_RULE_Y: f64 = 25.0;
const CAPTION_GAP: f64 = 10.0;
const PHOTO_GAP: f64 = 20.0;
const PLACEHOLDER_OFFSET: f64 = 20.0;
const PLACEHOLDER_ADVANCE: f64 = 40.0;
const PHOTO_RADIUS: f64 = 3.0;

/// Lay out the gallery. Does nothing when there are no photos.
pub fn add_photos(flow: &mut FlowLayout<'_>, photos: Vec<PhotoEntry>) {
    if photos.is_empty() {
        return;
    }
    let cfg = flow.config().clone();
    let body = TextStyle::new(FontStyle::Bold, cfg.body_font_size);

    flow.break_page();
    flow.canvas_mut().centered_text(
        TITLE_Y,
        "Photos",
        TextStyle::new(FontStyle::Bold, cfg.photo_title_font_size),
    );
    flow.set_y(TITLE_RULE_Y);
    flow.divider(0.0);

    let mut y = cfg.photo_start_y;
    let width = cfg.content_width();

    for (i, entry) in photos.into_iter().enumerate() {
        if i > 0 && i % cfg.photos_per_page == 0 {
            flow.break_page();
            y = cfg.photo_start_y;
        }

        let canvas = flow.canvas_mut();
        canvas.text(
            cfg.margin,
            y,
            vec![format!("Photo {}: {}", i + 1, entry.name)],
            body,
        );
        y += CAPTION_GAP;

        match entry.image {
            Ok(image) => {
                canvas.rounded_rect(
                    cfg.margin,
                    y,
                    width,
                    cfg.photo_box_height,
                    PHOTO_RADIUS,
                    cfg.photo_fill,
                    cfg.box_border,
                );
                canvas.image_fit(
                    cfg.margin + cfg.photo_inset,
                    y + cfg.photo_inset,
                    width - 2.0 * cfg.photo_inset,
                    cfg.photo_box_height - 2.0 * cfg.photo_inset,
                    image,
                );
                y += cfg.photo_box_height + PHOTO_GAP;
            }
            Err(e) => {
                warn!(photo = i + 1, name = %entry.name, error = %e, "photo replaced by placeholder");
                canvas.text(
                    cfg.margin,
                    y + PLACEHOLDER_OFFSET,
                    vec![format!("Error adding photo {}", i + 1)],
                    body,
                );
                y += PLACEHOLDER_ADVANCE;
            }
        }
    }
    flow.set_y(y);
}

/// Gallery page (0-based, counted from the first gallery page) for photo `i`.
pub fn gallery_page_of(i: usize, per_page: usize) -> usize {
    i / per_page.max(1)
}
