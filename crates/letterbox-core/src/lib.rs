//! Letterbox Core - crop, bar and watermark compositing
//!
//! This crate holds everything behind the Letterbox editor UI: rectangle
//! math for the interactive crop tool, the crop state machine, letterbox and
//! pillarbox bar geometry, the compositor that draws preview and export
//! frames, the clamped parameter store, and image decode/encode.
//!
//! [`EditorSession`] ties the pieces together and is the entry point for a
//! front end.

pub mod bars;
pub mod compositor;
pub mod crop;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod params;
pub mod session;

pub use bars::{compute_bars, BarGeometry};
pub use compositor::{render, PixelSurface, Scene, Surface};
pub use crop::{CropSession, CursorHint, PixelRect, PointerEvent};
pub use decode::{decode_image, DecodeError, DecodedImage};
pub use encode::{encode_image, EncodeError, OutputFormat};
pub use geometry::{compute_fit_rect, FitRect, Handle, Point, Rect};
pub use params::{AspectChoice, EditorSettings, ParamError, Params, Rgb};
pub use session::{EditorSession, ExportedImage, SessionStatus};
