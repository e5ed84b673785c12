//! # Image Loading
//!
//! Turns logos, signatures and photos into something the PDF writer can
//! embed. JPEG bytes are kept as-is and embedded with DCTDecode. PNG is
//! decoded to RGB with a separate alpha plane for an SMask.

use std::io::Cursor;

use image::ImageDecoder;

use crate::error::ReportError;
use crate::model::PhotoSource;

/// A decoded image ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImagePixelData {
    /// Untouched JPEG stream.
    Jpeg { data: Vec<u8>, grayscale: bool },
    /// RGB triples plus an alpha plane when any pixel is not opaque.
    Decoded { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

impl LoadedImage {
    /// Largest `(w, h)` with this image's aspect ratio that fits in
    /// `max_w` x `max_h`.
    pub fn fit_within(&self, max_w: f64, max_h: f64) -> (f64, f64) {
        if self.width_px == 0 || self.height_px == 0 {
            return (max_w, max_h);
        }
        let aspect = self.width_px as f64 / self.height_px as f64;
        if max_w / max_h > aspect {
            (max_h * aspect, max_h)
        } else {
            (max_w, max_w / aspect)
        }
    }
}

/// Load an image from a path, a data URL or bare base64.
///
/// Data URLs are recognised by their `data:` prefix. Strings starting with
/// `/`, `./` or `../`, or ending in a known image extension, are read from
/// disk. Anything else is treated as base64.
pub fn load_image(src: &str) -> Result<LoadedImage, ReportError> {
    let bytes = if src.starts_with("data:") || !looks_like_path(src) {
        decode_encoded(src)?
    } else {
        std::fs::read(src).map_err(|e| ReportError::io(src, e))?
    };
    decode_image_bytes(&bytes)
}

/// Decode the bytes behind a photo upload.
pub fn load_photo(source: &PhotoSource) -> Result<LoadedImage, ReportError> {
    match source {
        PhotoSource::Encoded(s) => decode_image_bytes(&decode_encoded(s)?),
        PhotoSource::Bytes(b) => decode_image_bytes(b),
    }
}

fn looks_like_path(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    src.starts_with('/')
        || src.starts_with("./")
        || src.starts_with("../")
        || [".png", ".jpg", ".jpeg"].iter().any(|ext| lower.ends_with(ext))
}

/// Strip a data URL header if present and base64-decode the payload.
fn decode_encoded(src: &str) -> Result<Vec<u8>, ReportError> {
    use base64::Engine;

    let payload = if src.starts_with("data:") {
        let comma = src
            .find(',')
            .ok_or_else(|| ReportError::Image("Invalid data URL: missing comma".into()))?;
        &src[comma + 1..]
    } else {
        src
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ReportError::Image(format!("Base64 decode error: {}", e)))
}

/// Sniff the format from magic bytes and decode.
pub fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, ReportError> {
    if data.starts_with(&[0xFF, 0xD8]) {
        decode_jpeg(data)
    } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        decode_png(data)
    } else {
        Err(ReportError::Image(
            "Unsupported image format (expected JPEG or PNG)".into(),
        ))
    }
}

/// Read the JPEG header only; the stream itself is embedded unchanged.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, ReportError> {
    let decoder = image::codecs::jpeg::JpegDecoder::new(Cursor::new(data))
        .map_err(|e| ReportError::Image(format!("Failed to read JPEG header: {}", e)))?;
    let (width, height) = decoder.dimensions();
    let grayscale = matches!(decoder.color_type(), image::ColorType::L8 | image::ColorType::L16);
    check_dimensions(width, height)?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            grayscale,
        },
        width_px: width,
        height_px: height,
    })
}

fn decode_png(data: &[u8]) -> Result<LoadedImage, ReportError> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)
        .map_err(|e| ReportError::Image(format!("Failed to decode PNG: {}", e)))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    check_dimensions(width, height)?;

    let pixel_count = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }
    let opaque = alpha.iter().all(|&a| a == 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: (!opaque).then_some(alpha),
        },
        width_px: width,
        height_px: height,
    })
}

fn check_dimensions(width: u32, height: u32) -> Result<(), ReportError> {
    if width == 0 || height == 0 {
        return Err(ReportError::Image(format!(
            "Image has zero size ({}x{})",
            width, height
        )));
    }
    Ok(())
}
