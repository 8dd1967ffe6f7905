//! CPU raster surface.
//!
//! Pixels are straight-alpha RGBA8. A pixel is covered by a shape when its
//! center lies inside the shape, so edges are hard and results are exact
//! functions of the inputs.
//!
//! # Algorithm
//!
//! `draw_image` uses inverse mapping: for each covered destination pixel the
//! matching source position is computed and sampled bilinearly, with the
//! interpolation done on premultiplied values so transparent neighbours do
//! not darken edges.

use super::surface::{Layer, Surface};
use crate::decode::DecodedImage;
use crate::geometry::Rect;
use crate::params::Rgb;

/// An in-memory RGBA8 render target, initially fully transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn into_image(self) -> DecodedImage {
        DecodedImage::new(self.width, self.height, self.pixels)
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Pixel index ranges whose centers fall inside `rect`, limited to the
    /// surface.
    fn covered(&self, rect: &Rect) -> Option<(u32, u32, u32, u32)> {
        let area = rect.intersect(&self.bounds())?;
        let x0 = (area.x - 0.5).ceil().max(0.0) as u32;
        let y0 = (area.y - 0.5).ceil().max(0.0) as u32;
        let x1 = ((area.right() - 0.5).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((area.bottom() - 0.5).ceil().max(0.0) as u32).min(self.height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    /// Composite a straight-alpha color over the pixel at `idx`.
    #[inline]
    fn blend(&mut self, idx: usize, rgb: [f64; 3], alpha: f64) {
        if alpha <= 0.0 {
            return;
        }
        let dst_a = self.pixels[idx + 3] as f64 / 255.0;
        let out_a = alpha + dst_a * (1.0 - alpha);
        if out_a <= 0.0 {
            return;
        }
        for (c, &src) in rgb.iter().enumerate() {
            let dst = self.pixels[idx + c] as f64;
            let value = (src * alpha + dst * dst_a * (1.0 - alpha)) / out_a;
            self.pixels[idx + c] = value.round().clamp(0.0, 255.0) as u8;
        }
        self.pixels[idx + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

impl Surface for PixelSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f64) {
        let alpha = alpha.clamp(0.0, 1.0);
        let Some((x0, y0, x1, y1)) = self.covered(&rect) else {
            return;
        };
        let rgb = [color.r as f64, color.g as f64, color.b as f64];
        for y in y0..y1 {
            for x in x0..x1 {
                let idx = self.index(x, y);
                self.blend(idx, rgb, alpha);
            }
        }
    }

    fn draw_image(
        &mut self,
        _layer: Layer,
        image: &DecodedImage,
        src: Rect,
        dst: Rect,
        clip: Rect,
        opacity: f64,
    ) {
        let opacity = opacity.clamp(0.0, 1.0);
        if image.is_empty() || opacity <= 0.0 || dst.w <= 0.0 || dst.h <= 0.0 {
            return;
        }
        let Some(src) = src.intersect(&Rect::new(0.0, 0.0, image.width as f64, image.height as f64))
        else {
            return;
        };
        let Some(visible) = dst.intersect(&clip) else {
            return;
        };
        let Some((x0, y0, x1, y1)) = self.covered(&visible) else {
            return;
        };

        let sampler = Sampler::new(image, &src);
        let sx = src.w / dst.w;
        let sy = src.h / dst.h;

        for y in y0..y1 {
            let v = src.y + (y as f64 + 0.5 - dst.y) * sy;
            for x in x0..x1 {
                let u = src.x + (x as f64 + 0.5 - dst.x) * sx;
                let (rgb, a) = sampler.sample(u, v);
                let idx = self.index(x, y);
                self.blend(idx, rgb, a * opacity);
            }
        }
    }
}

/// Bilinear sampler restricted to a source region.
struct Sampler<'a> {
    image: &'a DecodedImage,
    min_x: i64,
    max_x: i64,
    min_y: i64,
    max_y: i64,
}

impl<'a> Sampler<'a> {
    fn new(image: &'a DecodedImage, region: &Rect) -> Self {
        let last_x = image.width as i64 - 1;
        let last_y = image.height as i64 - 1;
        let min_x = (region.x.floor() as i64).clamp(0, last_x);
        let min_y = (region.y.floor() as i64).clamp(0, last_y);
        Self {
            image,
            min_x,
            max_x: ((region.right().ceil() as i64) - 1).clamp(min_x, last_x),
            min_y,
            max_y: ((region.bottom().ceil() as i64) - 1).clamp(min_y, last_y),
        }
    }

    /// Straight-alpha color and alpha (0.0 to 1.0) at image position `(u, v)`.
    fn sample(&self, u: f64, v: f64) -> ([f64; 3], f64) {
        let fx = u - 0.5;
        let fy = v - 0.5;
        let bx = fx.floor();
        let by = fy.floor();
        let tx = fx - bx;
        let ty = fy - by;

        let x0 = (bx as i64).clamp(self.min_x, self.max_x);
        let x1 = (bx as i64 + 1).clamp(self.min_x, self.max_x);
        let y0 = (by as i64).clamp(self.min_y, self.max_y);
        let y1 = (by as i64 + 1).clamp(self.min_y, self.max_y);

        let taps = [
            (x0, y0, (1.0 - tx) * (1.0 - ty)),
            (x1, y0, tx * (1.0 - ty)),
            (x0, y1, (1.0 - tx) * ty),
            (x1, y1, tx * ty),
        ];

        let mut premul = [0.0f64; 3];
        let mut alpha = 0.0f64;
        for (x, y, weight) in taps {
            if weight == 0.0 {
                continue;
            }
            let px = self.image.pixel(x as u32, y as u32);
            let a = px[3] as f64 / 255.0 * weight;
            for c in 0..3 {
                premul[c] += px[c] as f64 * a;
            }
            alpha += a;
        }

        if alpha <= 0.0 {
            return ([0.0; 3], 0.0);
        }
        (
            [premul[0] / alpha, premul[1] / alpha, premul[2] / alpha],
            alpha.min(1.0),
        )
    }
}
