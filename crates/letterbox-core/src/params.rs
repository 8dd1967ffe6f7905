//! Normalized editor configuration.
//!
//! Every value that reaches the bar calculator or the compositor passes
//! through [`Params`], which clamps ranges and parses the textual inputs a
//! UI collects (ratios like `"16:9"`, colors like `"#0b0b0b"`).
//!
//! [`EditorSettings`] is the serializable snapshot of the whole
//! configuration surface, used to hand settings across the WASM boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing configuration input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    /// A ratio was not numeric, or not strictly positive.
    #[error("Invalid ratio: {0:?}")]
    InvalidRatio(String),

    /// A color was not a `#rgb` or `#rrggbb` hex string.
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),
}

/// Vertical image offset range, in percent of the frame height.
pub const IMAGE_OFFSET_RANGE: (f64, f64) = (-50.0, 50.0);
/// Watermark offset range on either axis, in percent of the frame.
pub const WATERMARK_OFFSET_RANGE: (f64, f64) = (-50.0, 50.0);
/// Watermark scale range, in percent of its natural size.
pub const WATERMARK_SCALE_RANGE: (f64, f64) = (10.0, 300.0);
/// Opacity range for bars and watermark, in percent.
pub const OPACITY_RANGE: (f64, f64) = (0.0, 100.0);

/// Ratio used whenever a ratio input cannot be parsed.
pub const FALLBACK_RATIO: f64 = 1.0;

/// Bar ratio presets offered by the UI: (label, width / height).
pub const BAR_RATIO_PRESETS: &[(&str, f64)] = &[
    ("2.39:1", 2.39),
    ("2.35:1", 2.35),
    ("2:1", 2.0),
    ("1.85:1", 1.85),
    ("16:9", 16.0 / 9.0),
    ("3:2", 1.5),
    ("4:3", 4.0 / 3.0),
    ("1:1", 1.0),
    ("4:5", 0.8),
    ("9:16", 9.0 / 16.0),
];

/// Crop aspect presets offered by the UI, as accepted by [`AspectChoice::parse`].
pub const CROP_ASPECT_PRESETS: &[&str] = &["free", "1:1", "4:3", "3:2", "16:9", "4:5", "9:16"];

/// Clamp into `[min, max]`, mapping NaN to `min`.
pub fn clamp_param(value: f64, (min, max): (f64, f64)) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

/// Parse a ratio written as a decimal (`"2.39"`) or as `"W:H"` (`"16:9"`).
pub fn parse_ratio(input: &str) -> Result<f64, ParamError> {
    let trimmed = input.trim();
    match trimmed.split_once(':') {
        Some((w, h)) => custom_ratio(w, h),
        None => positive(trimmed).ok_or_else(|| ParamError::InvalidRatio(input.to_string())),
    }
}

/// Build a ratio from separate width and height fields.
pub fn custom_ratio(width: &str, height: &str) -> Result<f64, ParamError> {
    match (positive(width.trim()), positive(height.trim())) {
        (Some(w), Some(h)) => Ok(w / h),
        _ => Err(ParamError::InvalidRatio(format!("{}:{}", width, height))),
    }
}

fn positive(input: &str) -> Option<f64> {
    input
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Crop aspect constraint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AspectChoice {
    #[default]
    Free,
    /// Locked width / height ratio.
    Fixed(f64),
}

impl AspectChoice {
    /// Parse `"free"`, a decimal ratio, or `"W:H"`.
    pub fn parse(input: &str) -> Result<Self, ParamError> {
        if input.trim().eq_ignore_ascii_case("free") {
            return Ok(AspectChoice::Free);
        }
        parse_ratio(input).map(AspectChoice::Fixed)
    }

    pub fn ratio(self) -> Option<f64> {
        match self {
            AspectChoice::Free => None,
            AspectChoice::Fixed(ratio) => Some(ratio),
        }
    }

    /// Textual form accepted back by [`AspectChoice::parse`].
    pub fn to_input(self) -> String {
        match self {
            AspectChoice::Free => "free".to_string(),
            AspectChoice::Fixed(ratio) => ratio.to_string(),
        }
    }
}

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (the leading `#` is optional).
    pub fn from_hex(input: &str) -> Result<Self, ParamError> {
        let err = || ParamError::InvalidColor(input.to_string());
        let hex = input.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let expanded: String = match hex.len() {
            6 => hex.to_string(),
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            _ => return Err(err()),
        };
        let value = u32::from_str_radix(&expanded, 16).map_err(|_| err())?;
        Ok(Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Letterbox/pillarbox bar parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarSpec {
    /// Target width / height ratio, always > 0.
    pub target_ratio: f64,
    pub color: Rgb,
    /// 0.0 to 1.0
    pub opacity: f64,
}

/// Watermark placement, relative to the base image footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSpec {
    /// -50 to 50, percent of frame width
    pub offset_x_percent: f64,
    /// -50 to 50, percent of frame height
    pub offset_y_percent: f64,
    /// 10 to 300, percent of natural size
    pub scale_percent: f64,
    /// 0.0 to 1.0
    pub opacity: f64,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            offset_x_percent: 0.0,
            offset_y_percent: 0.0,
            scale_percent: 100.0,
            opacity: 0.8,
        }
    }
}

/// The clamped parameter store.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    bar: BarSpec,
    image_offset_percent: f64,
    watermark_enabled: bool,
    watermark: WatermarkSpec,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            bar: BarSpec {
                target_ratio: 2.39,
                color: Rgb::new(0x0b, 0x0b, 0x0b),
                opacity: 1.0,
            },
            image_offset_percent: 0.0,
            watermark_enabled: false,
            watermark: WatermarkSpec::default(),
        }
    }
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bar_spec(&self) -> BarSpec {
        self.bar
    }

    pub fn watermark_spec(&self) -> WatermarkSpec {
        self.watermark
    }

    pub fn watermark_enabled(&self) -> bool {
        self.watermark_enabled
    }

    pub fn image_offset_percent(&self) -> f64 {
        self.image_offset_percent
    }

    /// Set the bar ratio. Invalid ratios store [`FALLBACK_RATIO`] and report
    /// the error.
    pub fn set_bar_ratio(&mut self, ratio: f64) -> Result<(), ParamError> {
        if ratio.is_finite() && ratio > 0.0 {
            self.bar.target_ratio = ratio;
            Ok(())
        } else {
            self.fallback_ratio(ParamError::InvalidRatio(ratio.to_string()))
        }
    }

    /// Set the bar ratio from a preset or typed value (`"2.39"`, `"16:9"`).
    pub fn set_bar_ratio_input(&mut self, input: &str) -> Result<(), ParamError> {
        match parse_ratio(input) {
            Ok(ratio) => self.set_bar_ratio(ratio),
            Err(e) => self.fallback_ratio(e),
        }
    }

    /// Set the bar ratio from custom width and height fields.
    pub fn set_bar_ratio_custom(&mut self, width: &str, height: &str) -> Result<(), ParamError> {
        match custom_ratio(width, height) {
            Ok(ratio) => self.set_bar_ratio(ratio),
            Err(e) => self.fallback_ratio(e),
        }
    }

    fn fallback_ratio(&mut self, err: ParamError) -> Result<(), ParamError> {
        tracing::warn!(error = %err, "falling back to ratio {}", FALLBACK_RATIO);
        self.bar.target_ratio = FALLBACK_RATIO;
        Err(err)
    }

    /// Set the bar color. The previous color is kept on error.
    pub fn set_bar_color_hex(&mut self, hex: &str) -> Result<(), ParamError> {
        self.bar.color = Rgb::from_hex(hex)?;
        Ok(())
    }

    pub fn set_bar_opacity_percent(&mut self, percent: f64) {
        self.bar.opacity = clamp_param(percent, OPACITY_RANGE) / 100.0;
    }

    pub fn set_image_offset_percent(&mut self, percent: f64) {
        self.image_offset_percent = clamp_param(percent, IMAGE_OFFSET_RANGE);
    }

    pub fn set_watermark_enabled(&mut self, enabled: bool) {
        self.watermark_enabled = enabled;
    }

    pub fn set_watermark_offset_x(&mut self, percent: f64) {
        self.watermark.offset_x_percent = clamp_param(percent, WATERMARK_OFFSET_RANGE);
    }

    pub fn set_watermark_offset_y(&mut self, percent: f64) {
        self.watermark.offset_y_percent = clamp_param(percent, WATERMARK_OFFSET_RANGE);
    }

    pub fn set_watermark_scale(&mut self, percent: f64) {
        self.watermark.scale_percent = clamp_param(percent, WATERMARK_SCALE_RANGE);
    }

    pub fn set_watermark_opacity_percent(&mut self, percent: f64) {
        self.watermark.opacity = clamp_param(percent, OPACITY_RANGE) / 100.0;
    }

    /// Apply every non-crop field of `settings`.
    ///
    /// All fields are applied even if one fails; the first error is returned.
    pub fn apply_settings(&mut self, settings: &EditorSettings) -> Result<(), ParamError> {
        let ratio = self.set_bar_ratio_input(&settings.bar_ratio);
        let color = self.set_bar_color_hex(&settings.bar_color);
        self.set_bar_opacity_percent(settings.bar_opacity);
        self.set_image_offset_percent(settings.image_offset);
        self.set_watermark_enabled(settings.watermark_enabled);
        self.set_watermark_offset_x(settings.watermark_offset_x);
        self.set_watermark_offset_y(settings.watermark_offset_y);
        self.set_watermark_scale(settings.watermark_scale);
        self.set_watermark_opacity_percent(settings.watermark_opacity);
        ratio.and(color)
    }
}

/// Serializable snapshot of the configuration surface.
///
/// Percentages are in UI units (0–100), ratios and colors are the raw text
/// inputs. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub crop_enabled: bool,
    /// `"free"`, a decimal, or `"W:H"`
    pub crop_aspect: String,
    /// A decimal or `"W:H"`
    pub bar_ratio: String,
    /// `#rrggbb`
    pub bar_color: String,
    pub bar_opacity: f64,
    pub image_offset: f64,
    pub watermark_enabled: bool,
    pub watermark_offset_x: f64,
    pub watermark_offset_y: f64,
    pub watermark_scale: f64,
    pub watermark_opacity: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            crop_enabled: true,
            crop_aspect: "free".to_string(),
            bar_ratio: "2.39".to_string(),
            bar_color: "#0b0b0b".to_string(),
            bar_opacity: 100.0,
            image_offset: 0.0,
            watermark_enabled: false,
            watermark_offset_x: 0.0,
            watermark_offset_y: 0.0,
            watermark_scale: 100.0,
            watermark_opacity: 80.0,
        }
    }
}
