//! The drawing primitives the compositor is allowed to use.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;
use crate::geometry::Rect;
use crate::params::Rgb;

/// Which image a `draw_image` call refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Base,
    Watermark,
}

/// A render target.
///
/// The compositor issues only these calls, so any backend that implements
/// them (a CPU raster, a recorded command list replayed on an HTML canvas)
/// produces the same picture.
pub trait Surface {
    /// Width in surface pixels.
    fn width(&self) -> u32;

    /// Height in surface pixels.
    fn height(&self) -> u32;

    /// Fill `rect` with `color` at `alpha` (0.0 to 1.0).
    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f64);

    /// Draw the `src` region of `image` (image pixel space) scaled into `dst`
    /// (surface space), restricted to `clip`, at `opacity` (0.0 to 1.0).
    fn draw_image(
        &mut self,
        layer: Layer,
        image: &DecodedImage,
        src: Rect,
        dst: Rect,
        clip: Rect,
        opacity: f64,
    );
}

/// One recorded primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Rgb,
        alpha: f64,
    },
    DrawImage {
        layer: Layer,
        src: Rect,
        dst: Rect,
        clip: Rect,
        opacity: f64,
    },
}

/// A surface that remembers the calls made on it instead of drawing.
///
/// Used to hand the compositor's output to a UI that owns its own canvas.
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }
}

impl Surface for CommandRecorder {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f64) {
        self.commands.push(DrawCommand::FillRect { rect, color, alpha });
    }

    fn draw_image(
        &mut self,
        layer: Layer,
        _image: &DecodedImage,
        src: Rect,
        dst: Rect,
        clip: Rect,
        opacity: f64,
    ) {
        self.commands.push(DrawCommand::DrawImage {
            layer,
            src,
            dst,
            clip,
            opacity,
        });
    }
}
