//! Stateless geometry helpers for JavaScript.
//!
//! Results are plain objects built with `serde-wasm-bindgen`.

use letterbox_core::bars;
use letterbox_core::geometry;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Bars needed to frame a `width`x`height` image at `ratio`.
///
/// Returns `{ type: "none" }`, `{ type: "letterbox", size }` or
/// `{ type: "pillarbox", size }` with `size` in image pixels.
#[wasm_bindgen]
pub fn compute_bars(width: u32, height: u32, ratio: f64) -> Result<JsValue, JsValue> {
    to_js(&bars::compute_bars(width, height, ratio))
}

/// Scale-to-fit placement of an image inside a container.
///
/// Returns `{ rect: { x, y, w, h }, scale }`, or `null` for empty sizes.
#[wasm_bindgen]
pub fn compute_fit_rect(
    container_width: f64,
    container_height: f64,
    image_width: u32,
    image_height: u32,
) -> Result<JsValue, JsValue> {
    to_js(&geometry::compute_fit_rect(
        container_width,
        container_height,
        image_width,
        image_height,
    ))
}

/// Serialize to a plain JS value (`None` becomes `null`, maps become objects).
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_compute_bars_letterbox() {
        let value = compute_bars(1920, 1080, 2.39).unwrap();
        let bars: bars::BarGeometry = serde_wasm_bindgen::from_value(value).unwrap();
        assert!(matches!(bars, bars::BarGeometry::Letterbox { .. }));
    }

    #[wasm_bindgen_test]
    fn test_compute_fit_rect_null_for_empty() {
        assert!(compute_fit_rect(100.0, 100.0, 0, 10).unwrap().is_null());
    }
}
