//! Image encoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { encode_png, encode_jpeg } from '@letterbox/wasm';
//!
//! const data = ctx.getImageData(0, 0, w, h);
//! const png = encode_png(new Uint8Array(data.data.buffer), w, h);
//! const jpeg = encode_jpeg(new Uint8Array(data.data.buffer), w, h, 90);
//! ```

use crate::types::JsDecodedImage;
use letterbox_core::encode;
use wasm_bindgen::prelude::*;

/// Encode RGBA pixel data to PNG bytes.
///
/// # Errors
///
/// Returns an error if width or height is zero or the buffer length does not
/// match `width * height * 4`.
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(pixels, width, height).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode RGBA pixel data to JPEG bytes. Transparent areas become black.
///
/// `quality` is clamped to 1-100.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode a `JsDecodedImage` to PNG bytes.
#[wasm_bindgen]
pub fn encode_png_from_image(image: &JsDecodedImage) -> Result<Vec<u8>, JsValue> {
    encode_png(image.pixel_data(), image.width(), image.height())
}


/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_encode_png_basic() {
        let pixels = vec![200u8; 20 * 20 * 4];
        let png = encode_png(&pixels, 20, 20).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[wasm_bindgen_test]
    fn test_encode_jpeg_basic() {
        let pixels = vec![128u8; 50 * 50 * 4];
        let jpeg = encode_jpeg(&pixels, 50, 50, 90).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[wasm_bindgen_test]
    fn test_encode_invalid_input() {
        assert!(encode_png(&[0u8; 10], 0, 10).is_err());
        assert!(encode_jpeg(&[0u8; 12], 2, 2, 90).is_err());
    }

    #[wasm_bindgen_test]
    fn test_encode_png_from_image() {
        let img = JsDecodedImage::new(4, 4, vec![255u8; 4 * 4 * 4]);
        assert!(encode_png_from_image(&img).is_ok());
    }
}
