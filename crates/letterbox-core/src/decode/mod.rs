//! Image loading for the editor.
//!
//! This module turns the bytes of a user-supplied file into an upright RGBA
//! raster:
//! - Format sniffing (JPEG, PNG, WebP)
//! - EXIF orientation correction
//! - Dimension limits, so oversized inputs fail instead of exhausting memory
//!
//! Failures never touch editor state; the session keeps its previous image.
//!
//! # Examples
//!
//! ```ignore
//! use letterbox_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod load;
mod types;

pub use load::{decode_image, get_orientation, read_dimensions, MAX_DIMENSION};
pub use types::{DecodeError, DecodedImage, Orientation};
