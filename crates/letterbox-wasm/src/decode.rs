//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, read_dimensions } from '@letterbox/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! const data = new ImageData(new Uint8ClampedArray(image.pixels()), image.width, image.height);
//! ```

use crate::types::JsDecodedImage;
use letterbox_core::decode;
use wasm_bindgen::prelude::*;

/// Decode a JPEG, PNG or WebP image to RGBA, applying EXIF orientation.
///
/// # Errors
///
/// Returns an error for empty, unrecognized, corrupted or oversized input.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| {
            web_sys::console::warn_1(&JsValue::from_str(&format!("decode failed: {}", e)));
            JsValue::from_str(&e.to_string())
        })
}

/// Upright `[width, height]` of an encoded image without decoding pixels.
#[wasm_bindgen]
pub fn read_dimensions(bytes: &[u8]) -> Result<Vec<u32>, JsValue> {
    decode::read_dimensions(bytes)
        .map(|(w, h)| vec![w, h])
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// EXIF orientation value (1-8) of an encoded image; 1 when absent.
#[wasm_bindgen]
pub fn get_orientation(bytes: &[u8]) -> u8 {
    decode::get_orientation(bytes) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterbox_core::decode::{DecodedImage, Orientation};
    use letterbox_core::encode::encode_png;

    #[test]
    fn test_orientation_without_exif() {
        let image = DecodedImage::filled(2, 2, [0, 0, 0, 255]);
        let png = encode_png(&image.pixels, 2, 2).unwrap();
        assert_eq!(get_orientation(&png), Orientation::Normal as u8);
        assert_eq!(get_orientation(&png), 1);
    }
}

/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use letterbox_core::decode::DecodedImage;
    use letterbox_core::encode::encode_png;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_image_png() {
        let image = DecodedImage::filled(3, 2, [10, 20, 30, 40]);
        let png = encode_png(&image.pixels, 3, 2).unwrap();
        let decoded = decode_image(&png).unwrap();
        assert_eq!(decoded.width(), 3);
        assert_eq!(decoded.height(), 2);
        assert_eq!(&decoded.pixels()[0..4], &[10, 20, 30, 40]);
    }

    #[wasm_bindgen_test]
    fn test_decode_image_invalid() {
        assert!(decode_image(&[0, 1, 2, 3]).is_err());
        assert!(decode_image(&[]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_read_dimensions() {
        let image = DecodedImage::filled(7, 5, [0, 0, 0, 255]);
        let png = encode_png(&image.pixels, 7, 5).unwrap();
        assert_eq!(read_dimensions(&png).unwrap(), vec![7, 5]);
    }
}
