//! Letterbox / pillarbox bar geometry.
//!
//! Bars are computed in the source image's own pixel space. Callers scale
//! the result by their display or export factor.

use serde::{Deserialize, Serialize};

/// Ratios closer than this to the image ratio need no bars.
pub const RATIO_EPSILON: f64 = 1e-3;

/// Which pair of bars, if any, is needed to reach a target ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BarGeometry {
    /// Image already matches the target ratio.
    None,
    /// Top and bottom bars, each `size` pixels tall.
    Letterbox { size: f64 },
    /// Left and right bars, each `size` pixels wide.
    Pillarbox { size: f64 },
}

impl BarGeometry {
    /// Thickness of one bar in image pixels (0 when there are no bars).
    pub fn size(&self) -> f64 {
        match self {
            BarGeometry::None => 0.0,
            BarGeometry::Letterbox { size } | BarGeometry::Pillarbox { size } => *size,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, BarGeometry::None)
    }
}

/// Compute symmetric bars that frame a `width`x`height` image at `ratio`.
///
/// A wider image than the target gets pillarbox bars, a narrower one gets
/// letterbox bars. Degenerate inputs (zero sizes, non-positive or
/// non-finite ratio) produce no bars.
pub fn compute_bars(width: u32, height: u32, ratio: f64) -> BarGeometry {
    if width == 0 || height == 0 || !ratio.is_finite() || ratio <= 0.0 {
        return BarGeometry::None;
    }
    let w = width as f64;
    let h = height as f64;
    let current = w / h;

    if (current - ratio).abs() < RATIO_EPSILON {
        return BarGeometry::None;
    }

    if current > ratio {
        let visible_w = h * ratio;
        BarGeometry::Pillarbox {
            size: (w - visible_w) / 2.0,
        }
    } else {
        let visible_h = w / ratio;
        BarGeometry::Letterbox {
            size: (h - visible_h) / 2.0,
        }
    }
}
