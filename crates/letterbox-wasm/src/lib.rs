//! Letterbox WASM - WebAssembly bindings for Letterbox
//!
//! This crate exposes the letterbox-core editor to JavaScript/TypeScript.
//!
//! # Module Structure
//!
//! - `session` - The interactive editor (crop, bars, watermark, export)
//! - `geometry` - Stateless bar and fit calculations
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding bindings (JPEG, PNG, WebP)
//! - `encode` - Image encoding bindings (PNG, JPEG)
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditorSession } from '@letterbox/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const session = new JsEditorSession(canvas.width, canvas.height);
//! session.load_image(file.name, new Uint8Array(await file.arrayBuffer()));
//! const out = session.export();
//! download(out.bytes(), out.file_name, out.mime_type);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod geometry;
mod session;
mod types;

// Re-export public types
pub use decode::{decode_image, get_orientation, read_dimensions};
pub use encode::{encode_jpeg, encode_png, encode_png_from_image};
pub use geometry::{compute_bars, compute_fit_rect};
pub use session::{JsEditorSession, JsExport};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
