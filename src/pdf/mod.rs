//! # PDF Serializer
//!
//! Writes laid-out pages as a PDF 1.7 file. The subset a report needs is
//! small: the four standard Helvetica faces (referenced, never embedded),
//! filled and stroked paths, and image XObjects.
//!
//! ```text
//! %PDF-1.7
//! 1 0 obj  Catalog
//! 2 0 obj  Pages
//! 3-6      Helvetica, -Bold, -Oblique, -BoldOblique
//! ...      per page: image XObjects, content stream, page dictionary
//! ...      Info
//! xref / trailer / %%EOF
//! ```
//!
//! Layout works in millimetres from the top-left; PDF user space is points
//! from the bottom-left. Every coordinate goes through [`PageSpace`].

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::ReportError;
use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, LoadedImage};
use crate::layout::{DrawCommand, LayoutPage};
use crate::style::{Color, Stroke, TextAlign};

/// Points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Bezier control-point factor for quarter circles.
const KAPPA: f64 = 0.552_284_749_8;

const FIRST_FONT_OBJ: usize = 3;

/// Document-level metadata for the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub subject: Option<String>,
}

#[derive(Default)]
pub struct PdfWriter;

struct PdfBuilder {
    objects: Vec<PdfObject>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn new() -> Self {
        // Object 0 is the free-list head; 1 and 2 are filled in last.
        let mut objects = Vec::new();
        for _ in 0..FIRST_FONT_OBJ {
            objects.push(PdfObject { data: Vec::new() });
        }
        Self { objects }
    }

    fn add(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(PdfObject { data });
        self.objects.len() - 1
    }

    fn add_stream(&mut self, dict_entries: &str, payload: &[u8]) -> usize {
        let mut data = Vec::with_capacity(payload.len() + 128);
        let _ = write!(
            data,
            "<< {} /Length {} >>\nstream\n",
            dict_entries,
            payload.len()
        );
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.add(data)
    }
}

/// Converts layout millimetres (top-left origin) to PDF points.
#[derive(Debug, Clone, Copy)]
struct PageSpace {
    height_mm: f64,
}

impl PageSpace {
    fn x(&self, mm: f64) -> f64 {
        mm * PT_PER_MM
    }

    fn y(&self, mm: f64) -> f64 {
        (self.height_mm - mm) * PT_PER_MM
    }

    fn len(&self, mm: f64) -> f64 {
        mm * PT_PER_MM
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize pages to PDF bytes.
    pub fn write(&self, pages: &[LayoutPage], metadata: &Metadata) -> Result<Vec<u8>, ReportError> {
        if pages.is_empty() {
            return Err(ReportError::Render("document has no pages".into()));
        }

        let mut builder = PdfBuilder::new();

        for font in StandardFont::ALL {
            let dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.add(dict.into_bytes());
        }
        let font_resources: String = StandardFont::ALL
            .iter()
            .enumerate()
            .map(|(i, f)| format!("/{} {} 0 R", f.resource_name(), FIRST_FONT_OBJ + i))
            .collect::<Vec<_>>()
            .join(" ");

        let mut page_obj_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let mut image_ids = Vec::new();
            for cmd in &page.commands {
                if let DrawCommand::Image { image, .. } = cmd {
                    image_ids.push(Self::write_image_xobject(&mut builder, image)?);
                }
            }

            let content = self.build_content_stream(page);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let content_id = builder.add_stream("/Filter /FlateDecode", &compressed);

            let mut resources = format!("/Font << {} >>", font_resources);
            if !image_ids.is_empty() {
                let xobjects: Vec<String> = image_ids
                    .iter()
                    .enumerate()
                    .map(|(i, id)| format!("/Im{} {} 0 R", i, id))
                    .collect();
                let _ = write!(resources, " /XObject << {} >>", xobjects.join(" "));
            }
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width * PT_PER_MM,
                page.height * PT_PER_MM,
                content_id,
                resources
            );
            page_obj_ids.push(builder.add(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids: Vec<String> = page_obj_ids.iter().map(|id| format!("{} 0 R", id)).collect();
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info = String::from("<< ");
        if let Some(title) = &metadata.title {
            let _ = write!(info, "/Title {} ", Self::text_string(title));
        }
        if let Some(subject) = &metadata.subject {
            let _ = write!(info, "/Subject {} ", Self::text_string(subject));
        }
        info.push_str("/Producer (fieldreport) /Creator (fieldreport) >>");
        let info_id = builder.add(info.into_bytes());

        Ok(Self::serialize(&builder, info_id))
    }

    fn build_content_stream(&self, page: &LayoutPage) -> String {
        let space = PageSpace {
            height_mm: page.height,
        };
        let mut stream = String::new();
        let mut image_index = 0usize;

        for cmd in &page.commands {
            match cmd {
                DrawCommand::Text {
                    x,
                    y,
                    lines,
                    line_height,
                    font,
                    font_size,
                    color,
                    align,
                } => {
                    for (i, line) in lines.iter().enumerate() {
                        if line.is_empty() {
                            continue;
                        }
                        let left = match align {
                            TextAlign::Left => *x,
                            TextAlign::Center => x - font.text_width_mm(line, *font_size) / 2.0,
                        };
                        let baseline = y + i as f64 * line_height;
                        Self::write_text(&mut stream, &space, left, baseline, line, *font, *font_size, *color);
                    }
                }
                DrawCommand::Rect {
                    x,
                    y,
                    width,
                    height,
                    radius,
                    fill,
                    stroke,
                } => {
                    let paint = match (fill, stroke) {
                        (Some(_), Some(_)) => "B",
                        (Some(_), None) => "f",
                        (None, Some(_)) => "S",
                        (None, None) => continue,
                    };
                    stream.push_str("q\n");
                    if let Some(c) = fill {
                        Self::set_fill(&mut stream, *c);
                    }
                    if let Some(s) = stroke {
                        Self::set_stroke(&mut stream, &space, s);
                    }
                    Self::write_rounded_rect(
                        &mut stream,
                        space.x(*x),
                        space.y(y + height),
                        space.len(*width),
                        space.len(*height),
                        space.len(*radius),
                    );
                    let _ = writeln!(stream, "{}\nQ", paint);
                }
                DrawCommand::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    stroke,
                } => {
                    stream.push_str("q\n");
                    Self::set_stroke(&mut stream, &space, stroke);
                    let _ = writeln!(
                        stream,
                        "{:.2} {:.2} m {:.2} {:.2} l S\nQ",
                        space.x(*x1),
                        space.y(*y1),
                        space.x(*x2),
                        space.y(*y2)
                    );
                }
                DrawCommand::Image {
                    x,
                    y,
                    width,
                    height,
                    ..
                } => {
                    let _ = writeln!(
                        stream,
                        "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/Im{} Do\nQ",
                        space.len(*width),
                        space.len(*height),
                        space.x(*x),
                        space.y(y + height),
                        image_index
                    );
                    image_index += 1;
                }
            }
        }

        stream
    }

    #[allow(clippy::too_many_arguments)]
    fn write_text(
        stream: &mut String,
        space: &PageSpace,
        x: f64,
        baseline: f64,
        text: &str,
        font: StandardFont,
        font_size: f64,
        color: Color,
    ) {
        let (r, g, b) = color.unit();
        let _ = writeln!(
            stream,
            "BT\n/{} {:.1} Tf\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} Td\n<{}> Tj\nET",
            font.resource_name(),
            font_size,
            r,
            g,
            b,
            space.x(x),
            space.y(baseline),
            Self::winansi_hex(text)
        );
    }

    fn set_fill(stream: &mut String, color: Color) {
        let (r, g, b) = color.unit();
        let _ = writeln!(stream, "{:.3} {:.3} {:.3} rg", r, g, b);
    }

    fn set_stroke(stream: &mut String, space: &PageSpace, stroke: &Stroke) {
        let (r, g, b) = stroke.color.unit();
        let _ = writeln!(
            stream,
            "{:.3} {:.3} {:.3} RG\n{:.2} w",
            r,
            g,
            b,
            space.len(stroke.width)
        );
    }

    /// Path for a rectangle with equal rounded corners. `(x, y)` is the
    /// bottom-left corner in PDF space.
    fn write_rounded_rect(stream: &mut String, x: f64, y: f64, w: f64, h: f64, radius: f64) {
        let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
        if r == 0.0 {
            let _ = writeln!(stream, "{:.2} {:.2} {:.2} {:.2} re", x, y, w, h);
            return;
        }
        let c = r * KAPPA;
        let _ = writeln!(stream, "{:.2} {:.2} m", x + r, y);
        let _ = writeln!(stream, "{:.2} {:.2} l", x + w - r, y);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x + w - r + c,
            y,
            x + w,
            y + r - c,
            x + w,
            y + r
        );
        let _ = writeln!(stream, "{:.2} {:.2} l", x + w, y + h - r);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x + w,
            y + h - r + c,
            x + w - r + c,
            y + h,
            x + w - r,
            y + h
        );
        let _ = writeln!(stream, "{:.2} {:.2} l", x + r, y + h);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x + r - c,
            y + h,
            x,
            y + h - r + c,
            x,
            y + h - r
        );
        let _ = writeln!(stream, "{:.2} {:.2} l", x, y + r);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x,
            y + r - c,
            x + r - c,
            y,
            x + r,
            y
        );
        stream.push_str("h\n");
    }

    /// Write one image, plus its SMask if it has alpha. Returns the id of
    /// the image XObject.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> Result<usize, ReportError> {
        if image.width_px == 0 || image.height_px == 0 {
            return Err(ReportError::Render("cannot embed an empty image".into()));
        }
        let size = format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /BitsPerComponent 8",
            image.width_px, image.height_px
        );

        let id = match &image.pixel_data {
            ImagePixelData::Jpeg { data, grayscale } => {
                let color_space = if *grayscale { "/DeviceGray" } else { "/DeviceRGB" };
                builder.add_stream(
                    &format!("{} /ColorSpace {} /Filter /DCTDecode", size, color_space),
                    data,
                )
            }
            ImagePixelData::Decoded { rgb, alpha } => {
                let smask = alpha.as_ref().map(|a| {
                    builder.add_stream(
                        &format!("{} /ColorSpace /DeviceGray /Filter /FlateDecode", size),
                        &compress_to_vec_zlib(a, 6),
                    )
                });
                let smask_ref = smask
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                builder.add_stream(
                    &format!(
                        "{} /ColorSpace /DeviceRGB /Filter /FlateDecode{}",
                        size, smask_ref
                    ),
                    &compress_to_vec_zlib(rgb, 6),
                )
            }
        };
        Ok(id)
    }

    /// Hex-encode `text` in WinAnsiEncoding. Characters outside it become `?`.
    fn winansi_hex(text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let byte = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            let _ = write!(out, "{:02X}", byte);
        }
        out
    }

    /// Map a code point to its WinAnsiEncoding (Windows-1252) byte.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match ch {
            '\t' => Some(b' '),
            '€' => Some(0x80),
            '‚' => Some(0x82),
            'ƒ' => Some(0x83),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '†' => Some(0x86),
            '‡' => Some(0x87),
            'ˆ' => Some(0x88),
            '‰' => Some(0x89),
            'Š' => Some(0x8A),
            '‹' => Some(0x8B),
            'Œ' => Some(0x8C),
            'Ž' => Some(0x8E),
            '\u{2018}' => Some(0x91),
            '\u{2019}' => Some(0x92),
            '\u{201C}' => Some(0x93),
            '\u{201D}' => Some(0x94),
            '•' => Some(0x95),
            '\u{2013}' => Some(0x96),
            '\u{2014}' => Some(0x97),
            '˜' => Some(0x98),
            '™' => Some(0x99),
            'š' => Some(0x9A),
            '›' => Some(0x9B),
            'œ' => Some(0x9C),
            'ž' => Some(0x9E),
            'Ÿ' => Some(0x9F),
            _ => None,
        }
    }

    /// A text string for the Info dictionary: UTF-16BE with a byte-order mark.
    fn text_string(s: &str) -> String {
        let mut out = String::from("<FEFF");
        for unit in s.encode_utf16() {
            let _ = write!(out, "{:04X}", unit);
        }
        out.push('>');
        out
    }

    fn serialize(builder: &PdfBuilder, info_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets = vec![0usize; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n0000000000 65535 f \n", builder.objects.len());
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_id,
            xref_offset
        );

        output
    }
}
