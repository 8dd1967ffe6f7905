//! Byte-level image loading with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageReader, Limits};

use super::{DecodeError, DecodedImage, Orientation};

/// Largest accepted width or height, in pixels.
pub const MAX_DIMENSION: u32 = 16_384;

/// Decode an image (JPEG, PNG or WebP) from bytes.
///
/// The format is sniffed from the content, EXIF orientation is applied so
/// the result is upright, and the pixels are converted to RGBA8.
///
/// # Errors
///
/// - `DecodeError::EmptyInput` if `bytes` is empty
/// - `DecodeError::InvalidFormat` if the format is not recognized
/// - `DecodeError::TooLarge` if the image exceeds [`MAX_DIMENSION`] or the
///   decoder's memory limit
/// - `DecodeError::CorruptedFile` if the data is damaged or truncated
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let reader = open(bytes)?;
    let orientation = extract_orientation(bytes);

    let img = reader.decode().map_err(map_image_error)?;
    let upright = apply_orientation(img, orientation);
    Ok(DecodedImage::from_rgba_image(upright.into_rgba8()))
}

/// Read the upright dimensions of an encoded image without decoding pixels.
pub fn read_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    let reader = open(bytes)?;
    let (width, height) = reader.into_dimensions().map_err(map_image_error)?;
    if extract_orientation(bytes).swaps_dimensions() {
        Ok((height, width))
    } else {
        Ok((width, height))
    }
}

/// Extract the EXIF orientation of an encoded image.
///
/// Returns `Orientation::Normal` when there is no EXIF data.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

fn open(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }
    reader.limits(decode_limits());
    Ok(reader)
}

fn decode_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DIMENSION);
    limits.max_image_height = Some(MAX_DIMENSION);
    limits
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Limits(e) => DecodeError::TooLarge(e.to_string()),
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}

fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from)
        .unwrap_or_default()
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let bytes = png_bytes(5, 3, [200, 100, 50, 128]);
        let img = decode_image(&bytes).unwrap();
        assert_eq!((img.width, img.height), (5, 3));
        assert_eq!(img.pixels.len(), 5 * 3 * 4);
        assert_eq!(img.pixel(4, 2), [200, 100, 50, 128]);
    }

    #[test]
    fn test_decode_jpeg_is_opaque() {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([90, 90, 90]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg).unwrap();

        let decoded = decode_image(out.get_ref()).unwrap();
        assert_eq!((decoded.width, decoded.height), (8, 8));
        assert_eq!(decoded.pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_read_dimensions() {
        let bytes = png_bytes(7, 2, [0, 0, 0, 255]);
        assert_eq!(read_dimensions(&bytes).unwrap(), (7, 2));
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(matches!(decode_image(&[]), Err(DecodeError::EmptyInput)));
    }

    #[test]
    fn test_decode_unknown_format() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_truncated_png() {
        let bytes = png_bytes(16, 16, [1, 2, 3, 255]);
        let result = decode_image(&bytes[..40]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_orientation_without_exif() {
        let bytes = png_bytes(2, 2, [0, 0, 0, 255]);
        assert_eq!(get_orientation(&bytes), Orientation::Normal);
        assert_eq!(get_orientation(&[0x00, 0x01]), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_rotate90() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 255, 0, 255]));

        let result = apply_orientation(DynamicImage::ImageRgba8(img), Orientation::Rotate90CW);
        let rgba = result.into_rgba8();
        assert_eq!(rgba.dimensions(), (1, 2));
        assert_eq!(rgba.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 255, 0, 255]));

        let result = apply_orientation(DynamicImage::ImageRgba8(img), Orientation::FlipHorizontal);
        let rgba = result.into_rgba8();
        assert_eq!(rgba.get_pixel(0, 0).0, [0, 255, 0, 255]);
        assert_eq!(rgba.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }
}
