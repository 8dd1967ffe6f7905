//! JPEG encoding for export.
//!
//! JPEG has no alpha channel, so transparent areas (for example the strip
//! uncovered by a vertical image offset) are flattened onto black, the same
//! way a browser canvas does when exporting to JPEG.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate_rgba, EncodeError};

/// Quality used when the caller has no preference.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Encode straight-alpha RGBA pixel data to JPEG bytes.
///
/// `quality` is clamped to 1-100.
///
/// # Errors
///
/// Returns an error if width or height is zero, if the buffer length does
/// not match `width * height * 4`, or if the encoder fails.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate_rgba(pixels, width, height)?;

    let rgb = flatten_on_black(pixels);
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

fn flatten_on_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = u16::from(px[3]);
        for &c in &px[..3] {
            rgb.push(((u16::from(c) * a + 127) / 255) as u8);
        }
    }
    rgb
}
