//! Rectangle math for the interactive crop editor.
//!
//! Everything in this module is a pure function over value types. The crop
//! session and the compositor call into it; nothing here holds state.
//!
//! # Coordinate System
//!
//! - Rectangles live in preview-canvas space unless stated otherwise
//! - Origin is the top-left corner, y grows downwards
//! - `FitRect::scale` converts image pixels to preview units

mod resize;

pub use resize::{resize_rect, resize_rect_within};

use serde::{Deserialize, Serialize};

/// Smallest width or height a crop rectangle may take, in preview units.
pub const MIN_CROP_SIZE: f64 = 40.0;

/// Half-size of the square grab area around each handle anchor.
pub const HANDLE_TOLERANCE: f64 = 10.0;

/// Fraction of the fit box covered by a freshly initialized crop rectangle.
pub const DEFAULT_CROP_FRACTION: f64 = 0.8;

/// A point in preview space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Same size, shifted by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Overlap of two rectangles, or `None` when they do not intersect.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// True if `other` lies fully inside `self`, allowing for float noise.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-6;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}

/// Where the base image sits inside the preview canvas after scale-to-fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitRect {
    pub rect: Rect,
    /// Preview units per image pixel (`rect.w / image_width`).
    pub scale: f64,
}

impl FitRect {
    /// Map a preview-space rectangle into image pixel space.
    pub fn to_image_space(&self, rect: &Rect) -> Rect {
        Rect::new(
            (rect.x - self.rect.x) / self.scale,
            (rect.y - self.rect.y) / self.scale,
            rect.w / self.scale,
            rect.h / self.scale,
        )
    }

    /// Map an image-space rectangle into preview space.
    pub fn to_preview_space(&self, rect: &Rect) -> Rect {
        Rect::new(
            self.rect.x + rect.x * self.scale,
            self.rect.y + rect.y * self.scale,
            rect.w * self.scale,
            rect.h * self.scale,
        )
    }
}

/// Scale an image of `image_w`x`image_h` to fit a container, centered.
///
/// The image is fully visible and keeps its aspect ratio exactly. Returns
/// `None` when any dimension is zero or negative.
pub fn compute_fit_rect(
    container_w: f64,
    container_h: f64,
    image_w: u32,
    image_h: u32,
) -> Option<FitRect> {
    if image_w == 0 || image_h == 0 || container_w <= 0.0 || container_h <= 0.0 {
        return None;
    }
    let iw = image_w as f64;
    let ih = image_h as f64;
    let scale = (container_w / iw).min(container_h / ih);
    let w = iw * scale;
    let h = ih * scale;
    Some(FitRect {
        rect: Rect::new((container_w - w) / 2.0, (container_h - h) / 2.0, w, h),
        scale,
    })
}

/// Move a preview-space rectangle from one fit rect to another so it covers
/// the same image pixels.
pub fn reproject_rect(rect: &Rect, from: &FitRect, to: &FitRect) -> Rect {
    to.to_preview_space(&from.to_image_space(rect))
}

/// One of the eight grab points on a crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Nw,
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
}

impl Handle {
    /// Hit-test order. The first handle within tolerance wins.
    pub const ALL: [Handle; 8] = [
        Handle::Nw,
        Handle::N,
        Handle::Ne,
        Handle::E,
        Handle::Se,
        Handle::S,
        Handle::Sw,
        Handle::W,
    ];

    pub fn has_north(self) -> bool {
        matches!(self, Handle::Nw | Handle::N | Handle::Ne)
    }

    pub fn has_south(self) -> bool {
        matches!(self, Handle::Sw | Handle::S | Handle::Se)
    }

    pub fn has_east(self) -> bool {
        matches!(self, Handle::Ne | Handle::E | Handle::Se)
    }

    pub fn has_west(self) -> bool {
        matches!(self, Handle::Nw | Handle::W | Handle::Sw)
    }

    pub fn is_corner(self) -> bool {
        (self.has_east() || self.has_west()) && (self.has_north() || self.has_south())
    }

    /// Compass name, e.g. `"nw"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Handle::Nw => "nw",
            Handle::N => "n",
            Handle::Ne => "ne",
            Handle::E => "e",
            Handle::Se => "se",
            Handle::S => "s",
            Handle::Sw => "sw",
            Handle::W => "w",
        }
    }

    /// Anchor position of this handle on `rect`.
    pub fn anchor(self, rect: &Rect) -> Point {
        let x = if self.has_west() {
            rect.x
        } else if self.has_east() {
            rect.right()
        } else {
            rect.x + rect.w / 2.0
        };
        let y = if self.has_north() {
            rect.y
        } else if self.has_south() {
            rect.bottom()
        } else {
            rect.y + rect.h / 2.0
        };
        Point::new(x, y)
    }
}

/// Return the first handle whose anchor is within [`HANDLE_TOLERANCE`] of
/// `point` on both axes.
pub fn hit_test_handle(point: Point, rect: &Rect) -> Option<Handle> {
    Handle::ALL.into_iter().find(|handle| {
        let anchor = handle.anchor(rect);
        (point.x - anchor.x).abs() <= HANDLE_TOLERANCE
            && (point.y - anchor.y).abs() <= HANDLE_TOLERANCE
    })
}

/// Inclusive containment test.
pub fn point_in_rect(point: Point, rect: &Rect) -> bool {
    point.x >= rect.x && point.x <= rect.right() && point.y >= rect.y && point.y <= rect.bottom()
}

/// Shrink `rect` to fit within `bounds`, then slide it inside.
///
/// The result is always contained in `bounds`, even when the input was
/// larger than `bounds`.
pub fn clamp_rect(rect: &Rect, bounds: &Rect) -> Rect {
    let w = rect.w.min(bounds.w);
    let h = rect.h.min(bounds.h);
    let x = rect.x.max(bounds.x).min(bounds.right() - w);
    let y = rect.y.max(bounds.y).min(bounds.bottom() - h);
    Rect::new(x, y, w, h)
}

/// Shrink whichever dimension is too large for `aspect`, keeping the origin.
pub fn conform_to_aspect(rect: &Rect, aspect: f64) -> Rect {
    let mut out = *rect;
    if out.w / out.h > aspect {
        out.w = out.h * aspect;
    } else {
        out.h = out.w / aspect;
    }
    out
}

/// Centered crop rectangle covering [`DEFAULT_CROP_FRACTION`] of `fit`,
/// shrunk to `aspect` when one is set.
pub fn default_crop_rect(fit: &Rect, aspect: Option<f64>) -> Rect {
    let mut w = fit.w * DEFAULT_CROP_FRACTION;
    let mut h = fit.h * DEFAULT_CROP_FRACTION;
    if let Some(aspect) = aspect {
        if w / h > aspect {
            w = h * aspect;
        } else {
            h = w / aspect;
        }
    }
    Rect::new(fit.x + (fit.w - w) / 2.0, fit.y + (fit.h - h) / 2.0, w, h)
}
