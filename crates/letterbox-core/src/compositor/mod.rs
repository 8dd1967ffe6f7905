//! Deterministic compositing of base image, bars and watermark.
//!
//! # Layer Order
//!
//! Later layers cover earlier ones:
//! 1. Base image, shifted vertically by the image offset, clipped to the frame
//! 2. Letterbox or pillarbox bars
//! 3. Watermark, scaled relative to the base image, clipped to the frame
//!
//! # Resolution Independence
//!
//! The same [`render`] call draws the on-screen preview (frame = fit rect on
//! the canvas) and the export (frame = the full output raster). Every
//! parameter is a percentage or a ratio, so the only thing that changes
//! between the two is the frame size.

mod overlay;
mod raster;
mod surface;

pub use overlay::draw_crop_overlay;
pub use raster::PixelSurface;
pub use surface::{CommandRecorder, DrawCommand, Layer, Surface};

use crate::bars::{compute_bars, BarGeometry};
use crate::crop::PixelRect;
use crate::decode::DecodedImage;
use crate::geometry::Rect;
use crate::params::{BarSpec, WatermarkSpec};

/// A watermark image together with its placement.
#[derive(Debug, Clone, Copy)]
pub struct WatermarkLayer<'a> {
    pub image: &'a DecodedImage,
    pub spec: WatermarkSpec,
}

/// Everything the compositor needs to draw one picture.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub base: &'a DecodedImage,
    /// Region of `base` to use, in image pixels. `None` means the whole image.
    pub source: Option<PixelRect>,
    /// Percent of the frame height, positive moves the image down.
    pub image_offset_percent: f64,
    pub bars: BarSpec,
    /// Present only when the watermark is enabled and loaded.
    pub watermark: Option<WatermarkLayer<'a>>,
}

/// Resolved placement of every layer for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Source region of the base image, in image pixels.
    pub source: Rect,
    /// Where the base image is drawn before clipping.
    pub image_dst: Rect,
    pub bars: BarGeometry,
    /// Bar rectangles in surface space (empty when there are no bars).
    pub bar_rects: Vec<Rect>,
    pub watermark_dst: Option<Rect>,
}

impl<'a> Scene<'a> {
    /// Width and height of the base image region being composited.
    pub fn base_size(&self) -> (u32, u32) {
        match self.source {
            Some(region) => (region.width, region.height),
            None => (self.base.width, self.base.height),
        }
    }
}

/// Compute where every layer lands inside `frame`.
///
/// Returns `None` if there is nothing to draw (empty image, empty source
/// region or empty frame).
pub fn layout(frame: &Rect, scene: &Scene<'_>) -> Option<Layout> {
    let source = match scene.source {
        Some(region) => region.clamp_to(scene.base.width, scene.base.height)?,
        None => PixelRect::new(0, 0, scene.base.width, scene.base.height),
    };
    if source.is_empty() || frame.w <= 0.0 || frame.h <= 0.0 {
        return None;
    }

    let scale = frame.w / source.width as f64;
    let offset = scene.image_offset_percent / 100.0 * frame.h;
    let image_dst = frame.translate(0.0, offset);

    let bars = compute_bars(source.width, source.height, scene.bars.target_ratio);
    let bar_rects = match bars {
        BarGeometry::None => Vec::new(),
        BarGeometry::Letterbox { size } => {
            let bar = size * scale;
            vec![
                Rect::new(frame.x, frame.y, frame.w, bar),
                Rect::new(frame.x, frame.bottom() - bar, frame.w, bar),
            ]
        }
        BarGeometry::Pillarbox { size } => {
            let bar = size * scale;
            vec![
                Rect::new(frame.x, frame.y, bar, frame.h),
                Rect::new(frame.right() - bar, frame.y, bar, frame.h),
            ]
        }
    };

    let watermark_dst = scene.watermark.and_then(|wm| {
        if wm.image.is_empty() {
            return None;
        }
        let factor = wm.spec.scale_percent / 100.0 * scale;
        let w = wm.image.width as f64 * factor;
        let h = wm.image.height as f64 * factor;
        let center = frame.center();
        let x = center.x - w / 2.0 + wm.spec.offset_x_percent / 100.0 * frame.w;
        let y = center.y - h / 2.0 + wm.spec.offset_y_percent / 100.0 * frame.h;
        Some(Rect::new(x, y, w, h))
    });

    Some(Layout {
        source: source.to_rect(),
        image_dst,
        bars,
        bar_rects,
        watermark_dst,
    })
}

/// Draw `scene` into `frame` on `surface`.
///
/// Never fails: degenerate inputs simply draw nothing.
#[tracing::instrument(skip_all, fields(frame_w = frame.w, frame_h = frame.h))]
pub fn render<S: Surface + ?Sized>(surface: &mut S, frame: &Rect, scene: &Scene<'_>) {
    let Some(layout) = layout(frame, scene) else {
        tracing::debug!("nothing to render");
        return;
    };

    surface.draw_image(
        Layer::Base,
        scene.base,
        layout.source,
        layout.image_dst,
        *frame,
        1.0,
    );

    for bar in &layout.bar_rects {
        surface.fill_rect(*bar, scene.bars.color, scene.bars.opacity);
    }

    if let (Some(wm), Some(dst)) = (scene.watermark, layout.watermark_dst) {
        let src = Rect::new(0.0, 0.0, wm.image.width as f64, wm.image.height as f64);
        surface.draw_image(Layer::Watermark, wm.image, src, dst, *frame, wm.spec.opacity);
    }
}

/// Render `scene` at the base region's native resolution.
pub fn render_full_resolution(scene: &Scene<'_>) -> Option<DecodedImage> {
    let (width, height) = scene.base_size();
    if width == 0 || height == 0 {
        return None;
    }
    let mut surface = PixelSurface::new(width, height);
    let frame = Rect::new(0.0, 0.0, width as f64, height as f64);
    render(&mut surface, &frame, scene);
    Some(surface.into_image())
}
