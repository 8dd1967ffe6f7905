//! Crop selection overlay drawn on top of the preview.
//!
//! Only used for the on-screen preview, never for export.

use super::surface::Surface;
use crate::geometry::{Handle, Rect};
use crate::params::Rgb;

/// Dimming applied outside the selection.
pub const SHADE_ALPHA: f64 = 0.4;

/// Side length of a drawn handle square.
pub const HANDLE_BOX: f64 = 10.0;

const HANDLE_COLOR: Rgb = Rgb::new(0xf5, 0xf3, 0xf0);
const HANDLE_BORDER_ALPHA: f64 = 0.5;

const OUTLINE_WIDTH: f64 = 2.0;
const OUTLINE_ALPHA: f64 = 0.85;

/// Dash and gap length of the thirds grid.
const DASH: f64 = 6.0;

/// Shade everything outside `crop`, outline it with a dashed thirds grid,
/// and mark its eight handles.
///
/// Lines are drawn as thin filled strips centered on the ideal line, so a
/// surface only needs `fill_rect`.
pub fn draw_crop_overlay<S: Surface + ?Sized>(surface: &mut S, crop: &Rect) {
    let canvas = Rect::new(0.0, 0.0, surface.width() as f64, surface.height() as f64);
    for band in shade_bands(&canvas, crop) {
        surface.fill_rect(band, Rgb::new(0, 0, 0), SHADE_ALPHA);
    }
    for strip in outline(crop, OUTLINE_WIDTH) {
        surface.fill_rect(strip, HANDLE_COLOR, OUTLINE_ALPHA);
    }
    for dash in thirds_grid(crop) {
        surface.fill_rect(dash, HANDLE_COLOR, OUTLINE_ALPHA);
    }
    for handle in Handle::ALL {
        let anchor = handle.anchor(crop);
        let half = HANDLE_BOX / 2.0;
        let square = Rect::new(anchor.x - half, anchor.y - half, HANDLE_BOX, HANDLE_BOX);
        surface.fill_rect(square, HANDLE_COLOR, 1.0);
        for strip in outline(&square, 1.0) {
            surface.fill_rect(strip, Rgb::new(0, 0, 0), HANDLE_BORDER_ALPHA);
        }
    }
}

/// Four non-overlapping strips of `width` centered on the edges of `rect`.
fn outline(rect: &Rect, width: f64) -> [Rect; 4] {
    let half = width / 2.0;
    let outer_w = rect.w + width;
    let inner_h = (rect.h - width).max(0.0);
    [
        Rect::new(rect.x - half, rect.y - half, outer_w, width),
        Rect::new(rect.x - half, rect.bottom() - half, outer_w, width),
        Rect::new(rect.x - half, rect.y + half, width, inner_h),
        Rect::new(rect.right() - half, rect.y + half, width, inner_h),
    ]
}

/// Dashed lines at a third and two thirds of the width and height.
fn thirds_grid(crop: &Rect) -> Vec<Rect> {
    let half = OUTLINE_WIDTH / 2.0;
    let mut dashes = Vec::new();
    for k in [1.0, 2.0] {
        let x = crop.x + crop.w * k / 3.0;
        for (start, len) in dash_segments(crop.h) {
            dashes.push(Rect::new(x - half, crop.y + start, OUTLINE_WIDTH, len));
        }
    }
    for k in [1.0, 2.0] {
        let y = crop.y + crop.h * k / 3.0;
        for (start, len) in dash_segments(crop.w) {
            dashes.push(Rect::new(crop.x + start, y - half, len, OUTLINE_WIDTH));
        }
    }
    dashes
}

/// `(offset, length)` of each dash along a line of `length`.
fn dash_segments(length: f64) -> Vec<(f64, f64)> {
    let mut segments = Vec::new();
    let mut offset = 0.0;
    while offset < length {
        segments.push((offset, DASH.min(length - offset)));
        offset += 2.0 * DASH;
    }
    segments
}

/// Non-overlapping bands covering `canvas` minus `hole`.
fn shade_bands(canvas: &Rect, hole: &Rect) -> Vec<Rect> {
    let Some(hole) = hole.intersect(canvas) else {
        return vec![*canvas];
    };
    let mut bands = vec![
        // Full-width strips above and below.
        Rect::new(canvas.x, canvas.y, canvas.w, hole.y - canvas.y),
        Rect::new(canvas.x, hole.bottom(), canvas.w, canvas.bottom() - hole.bottom()),
        // Side strips at the hole's height.
        Rect::new(canvas.x, hole.y, hole.x - canvas.x, hole.h),
        Rect::new(hole.right(), hole.y, canvas.right() - hole.right(), hole.h),
    ];
    bands.retain(|band| band.w > 0.0 && band.h > 0.0);
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::{CommandRecorder, DrawCommand, PixelSurface};

    #[test]
    fn test_shade_bands_cover_outside_only() {
        let canvas = Rect::new(0.0, 0.0, 100.0, 80.0);
        let hole = Rect::new(20.0, 10.0, 50.0, 40.0);
        let bands = shade_bands(&canvas, &hole);
        assert_eq!(bands.len(), 4);
        let area: f64 = bands.iter().map(|b| b.w * b.h).sum();
        assert!((area - (100.0 * 80.0 - 50.0 * 40.0)).abs() < 1e-9);
        assert!(bands.iter().all(|b| b.intersect(&hole).is_none()));
    }

    #[test]
    fn test_shade_bands_hole_touching_edges() {
        let canvas = Rect::new(0.0, 0.0, 100.0, 80.0);
        let bands = shade_bands(&canvas, &Rect::new(0.0, 0.0, 100.0, 40.0));
        assert_eq!(bands, vec![Rect::new(0.0, 40.0, 100.0, 40.0)]);
    }

    #[test]
    fn test_dash_segments() {
        assert_eq!(dash_segments(40.0), vec![(0.0, 6.0), (12.0, 6.0), (24.0, 6.0), (36.0, 4.0)]);
        assert_eq!(dash_segments(12.0), vec![(0.0, 6.0)]);
        assert!(dash_segments(0.0).is_empty());
    }

    #[test]
    fn test_outline_strips_do_not_overlap() {
        let strips = outline(&Rect::new(20.0, 10.0, 50.0, 40.0), 2.0);
        assert_eq!(strips[0], Rect::new(19.0, 9.0, 52.0, 2.0));
        assert_eq!(strips[1], Rect::new(19.0, 49.0, 52.0, 2.0));
        assert_eq!(strips[2], Rect::new(19.0, 11.0, 2.0, 38.0));
        assert_eq!(strips[3], Rect::new(69.0, 11.0, 2.0, 38.0));
        for (i, a) in strips.iter().enumerate() {
            for b in &strips[i + 1..] {
                assert!(a.intersect(b).is_none());
            }
        }
    }

    fn fill(command: &DrawCommand) -> (Rect, f64) {
        match command {
            DrawCommand::FillRect { rect, alpha, .. } => (*rect, *alpha),
            other => panic!("expected fill, got {:?}", other),
        }
    }

    #[test]
    fn test_overlay_draws_shade_outline_grid_then_handles() {
        let crop = Rect::new(20.0, 10.0, 50.0, 40.0);
        let mut recorder = CommandRecorder::new(100, 80);
        draw_crop_overlay(&mut recorder, &crop);
        let commands = recorder.commands();

        // 4 shade bands, 4 outline strips, 2x4 vertical and 2x5 horizontal
        // dashes, then 8 handles of one square and 4 border strips each.
        let grid = 2 * 4 + 2 * 5;
        assert_eq!(commands.len(), 4 + 4 + grid + 8 * 5);

        for command in &commands[..4] {
            assert_eq!(fill(command).1, SHADE_ALPHA);
        }

        let (top, alpha) = fill(&commands[4]);
        assert_eq!(top, Rect::new(19.0, 9.0, 52.0, 2.0));
        assert_eq!(alpha, OUTLINE_ALPHA);

        let (first_dash, alpha) = fill(&commands[8]);
        assert!((first_dash.x + 1.0 - (20.0 + 50.0 / 3.0)).abs() < 1e-9);
        assert_eq!((first_dash.y, first_dash.w, first_dash.h), (10.0, 2.0, 6.0));
        assert_eq!(alpha, OUTLINE_ALPHA);

        let (last_dash, _) = fill(&commands[8 + grid - 1]);
        assert!((last_dash.y + 1.0 - (10.0 + 80.0 / 3.0)).abs() < 1e-9);
        assert_eq!((last_dash.x, last_dash.w), (68.0, 2.0));

        let handles = 8 + grid;
        let (square, alpha) = fill(&commands[handles]);
        assert_eq!(square, Rect::new(15.0, 5.0, 10.0, 10.0));
        assert_eq!(alpha, 1.0);
        let (border, alpha) = fill(&commands[handles + 1]);
        assert_eq!(border, Rect::new(14.5, 4.5, 11.0, 1.0));
        assert_eq!(alpha, HANDLE_BORDER_ALPHA);
    }

    #[test]
    fn test_overlay_leaves_selection_untouched() {
        let mut surface = PixelSurface::new(100, 80);
        draw_crop_overlay(&mut surface, &Rect::new(20.0, 10.0, 50.0, 40.0));
        assert_eq!(surface.pixel(45, 30), [0, 0, 0, 0]);
        assert_eq!(surface.pixel(5, 70)[3], 102);
    }
}
