//! Editor session WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { JsEditorSession } from '@letterbox/wasm';
//!
//! const session = new JsEditorSession(canvas.width, canvas.height);
//! session.load_image(file.name, new Uint8Array(await file.arrayBuffer()));
//!
//! canvas.onpointerdown = (e) => session.pointer_down(e.offsetX, e.offsetY) && redraw();
//! canvas.onpointermove = (e) => {
//!   canvas.style.cursor = session.cursor(e.offsetX, e.offsetY);
//!   if (session.pointer_move(e.offsetX, e.offsetY)) redraw();
//! };
//! window.onpointerup = () => session.pointer_up();
//!
//! function redraw() {
//!   const rgba = session.render_preview();
//!   ctx.putImageData(new ImageData(new Uint8ClampedArray(rgba.buffer),
//!     session.preview_width, session.preview_height), 0, 0);
//! }
//! ```

use letterbox_core::compositor::{CommandRecorder, PixelSurface};
use letterbox_core::crop::PointerEvent;
use letterbox_core::encode::{OutputFormat, DEFAULT_JPEG_QUALITY};
use letterbox_core::params::EditorSettings;
use letterbox_core::session::{EditorSession, ExportedImage};
use wasm_bindgen::prelude::*;

use crate::geometry::to_js;

/// An encoded export returned to JavaScript.
#[wasm_bindgen]
pub struct JsExport {
    bytes: Vec<u8>,
    file_name: String,
    mime_type: String,
    width: u32,
    height: u32,
}

#[wasm_bindgen]
impl JsExport {
    /// Encoded file bytes. Returns a copy.
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.mime_type.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl From<ExportedImage> for JsExport {
    fn from(export: ExportedImage) -> Self {
        Self {
            mime_type: export.format.mime_type().to_string(),
            bytes: export.bytes,
            file_name: export.file_name,
            width: export.width,
            height: export.height,
        }
    }
}

/// The interactive editor, owned by JavaScript.
#[wasm_bindgen]
pub struct JsEditorSession {
    inner: EditorSession,
}

#[wasm_bindgen]
impl JsEditorSession {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_width: f64, canvas_height: f64) -> JsEditorSession {
        JsEditorSession {
            inner: EditorSession::new(canvas_width, canvas_height),
        }
    }

    /// Resize the preview canvas. Returns `true` if a redraw is needed.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) -> bool {
        self.inner.set_canvas_size(width, height)
    }

    /// Decode and install a new base image. On error the previous image is
    /// kept.
    pub fn load_image(&mut self, name: &str, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.load_image(name, bytes).map_err(|e| {
            web_sys::console::warn_1(&JsValue::from_str(&format!("{}: {}", name, e)));
            JsValue::from_str(&e.to_string())
        })
    }

    /// Decode and install a watermark image.
    pub fn load_watermark(&mut self, name: &str, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.load_watermark(name, bytes).map_err(|e| {
            web_sys::console::warn_1(&JsValue::from_str(&format!("{}: {}", name, e)));
            JsValue::from_str(&e.to_string())
        })
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.image().is_some()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.inner.handle_pointer(PointerEvent::Down { x, y })
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.inner.handle_pointer(PointerEvent::Move { x, y })
    }

    pub fn pointer_up(&mut self) -> bool {
        self.inner.handle_pointer(PointerEvent::Up)
    }

    /// CSS cursor for a hover at `(x, y)`.
    pub fn cursor(&self, x: f64, y: f64) -> String {
        self.inner.cursor_at(x, y).css()
    }

    pub fn reset_crop(&mut self) -> bool {
        self.inner.reset_crop()
    }

    /// Replace the working image with the current selection.
    pub fn apply_crop(&mut self) -> bool {
        self.inner.apply_crop()
    }

    pub fn set_crop_enabled(&mut self, enabled: bool) {
        self.inner.set_crop_enabled(enabled);
    }

    /// Set the crop aspect: `"free"`, a decimal, or `"W:H"`.
    pub fn set_crop_aspect(&mut self, aspect: &str) -> Result<(), JsValue> {
        self.inner
            .set_crop_aspect(aspect)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Apply a settings object. Missing fields take their defaults.
    ///
    /// Every field is applied even when one is invalid; the first problem is
    /// reported as the error.
    pub fn apply_settings(&mut self, settings: JsValue) -> Result<(), JsValue> {
        let settings: EditorSettings = serde_wasm_bindgen::from_value(settings)
            .map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))?;
        self.inner
            .apply_settings(&settings)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Current settings as a plain object.
    pub fn settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.settings())
    }

    /// Display status as a plain object.
    pub fn status(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.status())
    }

    /// Crop rectangle `{x, y, w, h}` in canvas coordinates, or `null`.
    pub fn crop_rect(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.crop().rect())
    }

    /// Selection in image pixels `{x, y, width, height}`, or `null`.
    pub fn crop_region(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.crop_region())
    }

    #[wasm_bindgen(getter)]
    pub fn preview_width(&self) -> u32 {
        self.preview_size().0
    }

    #[wasm_bindgen(getter)]
    pub fn preview_height(&self) -> u32 {
        self.preview_size().1
    }

    /// Render the preview, crop overlay included, into an RGBA buffer of
    /// `preview_width * preview_height * 4` bytes.
    pub fn render_preview(&self) -> Vec<u8> {
        let (width, height) = self.preview_size();
        let mut surface = PixelSurface::new(width, height);
        self.inner.render_preview(&mut surface);
        surface.into_image().pixels
    }

    /// The preview as a list of draw commands, for replay on a 2D context.
    pub fn preview_commands(&self) -> Result<JsValue, JsValue> {
        let (width, height) = self.preview_size();
        let mut recorder = CommandRecorder::new(width, height);
        self.inner.render_preview(&mut recorder);
        to_js(recorder.commands())
    }

    /// Composite and encode at full resolution. Pass a JPEG quality for JPEG
    /// output, or nothing for PNG. Returns `undefined` when no image is
    /// loaded.
    pub fn export(&self, jpeg_quality: Option<u8>) -> Result<Option<JsExport>, JsValue> {
        let format = match jpeg_quality {
            Some(quality) => OutputFormat::Jpeg { quality },
            None => OutputFormat::Png,
        };
        self.inner
            .export(format)
            .map(|export| export.map(JsExport::from))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// JPEG quality used when the UI has no preference.
    pub fn default_jpeg_quality() -> u8 {
        DEFAULT_JPEG_QUALITY
    }
}

impl JsEditorSession {
    fn preview_size(&self) -> (u32, u32) {
        let (width, height) = self.inner.canvas_size();
        (
            width.max(0.0).round() as u32,
            height.max(0.0).round() as u32,
        )
    }
}
