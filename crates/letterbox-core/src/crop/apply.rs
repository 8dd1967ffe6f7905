//! Turning a preview-space selection into a new image.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;
use crate::geometry::{FitRect, Rect};

/// An integer rectangle in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.x as f64,
            self.y as f64,
            self.width as f64,
            self.height as f64,
        )
    }

    /// Restrict to a `width`x`height` image. Returns `None` if nothing is
    /// left.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<PixelRect> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let clamped = PixelRect::new(
            self.x,
            self.y,
            self.width.min(width - self.x),
            self.height.min(height - self.y),
        );
        (!clamped.is_empty()).then_some(clamped)
    }

    /// Project a preview-space `rect` into the pixels of an image displayed
    /// at `fit`.
    ///
    /// The origin and size are rounded independently, then clamped to the
    /// image bounds.
    pub fn from_preview(
        rect: &Rect,
        fit: &FitRect,
        image_width: u32,
        image_height: u32,
    ) -> Option<PixelRect> {
        if fit.scale <= 0.0 || !fit.scale.is_finite() {
            return None;
        }
        let src = fit.to_image_space(rect);
        let x = src.x.round().max(0.0) as u32;
        let y = src.y.round().max(0.0) as u32;
        let width = src.w.round().max(0.0) as u32;
        let height = src.h.round().max(0.0) as u32;
        PixelRect::new(x, y, width, height).clamp_to(image_width, image_height)
    }
}

/// Copy `region` of `image` into a new image.
///
/// Returns `None` if the region does not overlap the image.
pub fn crop_image(image: &DecodedImage, region: &PixelRect) -> Option<DecodedImage> {
    let region = region.clamp_to(image.width, image.height)?;
    if region.x == 0 && region.y == 0 && region.width == image.width && region.height == image.height
    {
        return Some(image.clone());
    }

    let channels = DecodedImage::CHANNELS;
    let src_stride = image.width as usize * channels;
    let row_len = region.width as usize * channels;
    let mut pixels = Vec::with_capacity(row_len * region.height as usize);

    for y in region.y..region.y + region.height {
        let start = y as usize * src_stride + region.x as usize * channels;
        pixels.extend_from_slice(&image.pixels[start..start + row_len]);
    }

    Some(DecodedImage::new(region.width, region.height, pixels))
}
