//! The editor session: one owned object holding everything the UI edits.
//!
//! All mutation goes through `&mut self` methods that run synchronously.
//! Decoding can happen elsewhere; loads are split into `begin_*_load`, which
//! hands out a [`LoadTicket`], and `complete_*_load`, which drops results
//! whose ticket has been superseded by a newer load.

use serde::{Deserialize, Serialize};

use crate::bars::{compute_bars, BarGeometry};
use crate::compositor::{
    draw_crop_overlay, render, render_full_resolution, Scene, Surface, WatermarkLayer,
};
use crate::crop::{crop_image, CropSession, CursorHint, PixelRect, PointerEvent};
use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::encode::{encode_image, EncodeError, OutputFormat};
use crate::geometry::{compute_fit_rect, FitRect, Point};
use crate::params::{AspectChoice, EditorSettings, ParamError, Params};

/// Proof of a started load. Only the most recent ticket is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone)]
struct LoadedImage {
    image: DecodedImage,
    name: String,
}

#[derive(Debug, Clone)]
struct LoadedWatermark {
    image: DecodedImage,
    name: String,
    byte_size: u64,
}

/// An encoded export ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
pub struct EditorSession {
    canvas_width: f64,
    canvas_height: f64,
    image: Option<LoadedImage>,
    fit: Option<FitRect>,
    crop: CropSession,
    params: Params,
    watermark: Option<LoadedWatermark>,
    image_epoch: u64,
    watermark_epoch: u64,
}

impl EditorSession {
    /// Create an empty session for a preview canvas of the given size.
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            canvas_width,
            canvas_height,
            image: None,
            fit: None,
            crop: CropSession::new(),
            params: Params::new(),
            watermark: None,
            image_epoch: 0,
            watermark_epoch: 0,
        }
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (self.canvas_width, self.canvas_height)
    }

    /// Resize the preview canvas.
    ///
    /// The crop rectangle is re-projected so it covers the same image
    /// pixels. Returns `true` if a redraw is needed.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) -> bool {
        self.canvas_width = width;
        self.canvas_height = height;
        let Some(image) = &self.image else {
            return false;
        };
        let Some(next) = compute_fit_rect(width, height, image.image.width, image.image.height)
        else {
            // Keep the last usable fit so a later resize can still re-project.
            return false;
        };
        match self.fit {
            Some(prev) => self.crop.reproject(&prev, &next),
            None => self.crop.reset(&next.rect),
        }
        self.fit = Some(next);
        true
    }

    pub fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref().map(|loaded| &loaded.image)
    }

    pub fn image_name(&self) -> Option<&str> {
        self.image.as_ref().map(|loaded| loaded.name.as_str())
    }

    pub fn watermark_image(&self) -> Option<&DecodedImage> {
        self.watermark.as_ref().map(|loaded| &loaded.image)
    }

    pub fn fit_rect(&self) -> Option<FitRect> {
        self.fit
    }

    pub fn crop(&self) -> &CropSession {
        &self.crop
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Direct access to the parameter store. Every setter clamps its input.
    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// The current selection in image pixels, if cropping is on.
    pub fn crop_region(&self) -> Option<PixelRect> {
        let (image, fit, rect) = (self.image()?, self.fit?, self.crop.rect()?);
        PixelRect::from_preview(&rect, &fit, image.width, image.height)
    }

    pub fn begin_image_load(&mut self) -> LoadTicket {
        self.image_epoch += 1;
        LoadTicket(self.image_epoch)
    }

    /// Finish a load started with [`begin_image_load`](Self::begin_image_load).
    ///
    /// Returns `Ok(true)` if the image was installed and `Ok(false)` if the
    /// ticket is stale. A decode error leaves the session unchanged.
    pub fn complete_image_load(
        &mut self,
        ticket: LoadTicket,
        name: &str,
        decoded: Result<DecodedImage, DecodeError>,
    ) -> Result<bool, DecodeError> {
        if ticket.0 != self.image_epoch {
            tracing::warn!(name, "discarding stale image load");
            return Ok(false);
        }
        let image = decoded.map_err(|e| {
            tracing::warn!(name, error = %e, "image decode failed");
            e
        })?;
        tracing::debug!(name, width = image.width, height = image.height, "image loaded");
        self.install_image(image, name.to_string());
        Ok(true)
    }

    /// Decode `bytes` and install the result in one step.
    pub fn load_image(&mut self, name: &str, bytes: &[u8]) -> Result<(), DecodeError> {
        let ticket = self.begin_image_load();
        self.complete_image_load(ticket, name, decode_image(bytes))
            .map(|_| ())
    }

    fn install_image(&mut self, image: DecodedImage, name: String) {
        self.fit = compute_fit_rect(
            self.canvas_width,
            self.canvas_height,
            image.width,
            image.height,
        );
        self.image = Some(LoadedImage { image, name });
        match self.fit {
            Some(fit) => self.crop.reset(&fit.rect),
            None => self.crop.clear(),
        }
    }

    pub fn begin_watermark_load(&mut self) -> LoadTicket {
        self.watermark_epoch += 1;
        LoadTicket(self.watermark_epoch)
    }

    /// Finish a watermark load. Same contract as
    /// [`complete_image_load`](Self::complete_image_load); `byte_size` is the
    /// size of the source file, kept for display.
    pub fn complete_watermark_load(
        &mut self,
        ticket: LoadTicket,
        name: &str,
        byte_size: u64,
        decoded: Result<DecodedImage, DecodeError>,
    ) -> Result<bool, DecodeError> {
        if ticket.0 != self.watermark_epoch {
            tracing::warn!(name, "discarding stale watermark load");
            return Ok(false);
        }
        let image = decoded.map_err(|e| {
            tracing::warn!(name, error = %e, "watermark decode failed");
            e
        })?;
        tracing::debug!(name, byte_size, "watermark loaded");
        self.watermark = Some(LoadedWatermark {
            image,
            name: name.to_string(),
            byte_size,
        });
        Ok(true)
    }

    pub fn load_watermark(&mut self, name: &str, bytes: &[u8]) -> Result<(), DecodeError> {
        let ticket = self.begin_watermark_load();
        self.complete_watermark_load(ticket, name, bytes.len() as u64, decode_image(bytes))
            .map(|_| ())
    }

    /// Dispatch a pointer event to the crop editor. Returns `true` if a
    /// redraw is needed.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match self.editable_fit() {
            Some(fit) => self.crop.handle_event(event, &fit.rect),
            None => false,
        }
    }

    /// Hover cursor for `(x, y)` in canvas coordinates.
    pub fn cursor_at(&self, x: f64, y: f64) -> CursorHint {
        match self.editable_fit() {
            Some(_) => self.crop.cursor_at(Point::new(x, y)),
            None => CursorHint::Default,
        }
    }

    fn editable_fit(&self) -> Option<FitRect> {
        if self.image.is_some() && self.crop.enabled() {
            self.fit
        } else {
            None
        }
    }

    /// Replace the selection with a fresh centered default.
    pub fn reset_crop(&mut self) -> bool {
        match self.editable_fit() {
            Some(fit) => {
                self.crop.reset(&fit.rect);
                true
            }
            None => false,
        }
    }

    /// Replace the working image with the selected region.
    ///
    /// The image is renamed to `<stem>-crop.png` and the crop editor starts
    /// over on the new image. Returns `false` if there is nothing to apply.
    pub fn apply_crop(&mut self) -> bool {
        let Some(region) = self.crop_region() else {
            return false;
        };
        let Some(loaded) = &self.image else {
            return false;
        };
        let Some(cropped) = crop_image(&loaded.image, &region) else {
            return false;
        };
        let name = format!("{}-crop.png", file_stem(&loaded.name));
        tracing::debug!(?region, name, "crop applied");
        self.install_image(cropped, name);
        true
    }

    pub fn set_crop_enabled(&mut self, enabled: bool) {
        let fit = self.image.as_ref().and(self.fit);
        self.crop.set_enabled(enabled, fit.as_ref().map(|f| &f.rect));
    }

    /// Set the crop aspect from `"free"`, a decimal, or `"W:H"`.
    ///
    /// An unparseable value leaves the constraint unchanged.
    pub fn set_crop_aspect(&mut self, input: &str) -> Result<(), ParamError> {
        let aspect = AspectChoice::parse(input)?;
        self.set_crop_aspect_choice(aspect);
        Ok(())
    }

    pub fn set_crop_aspect_choice(&mut self, aspect: AspectChoice) {
        let fit = self.image.as_ref().and(self.fit);
        self.crop.set_aspect(aspect, fit.as_ref().map(|f| &f.rect));
    }

    /// Apply a full settings snapshot. Every field is applied; the first
    /// error is returned.
    pub fn apply_settings(&mut self, settings: &EditorSettings) -> Result<(), ParamError> {
        if settings.crop_enabled != self.crop.enabled() {
            self.set_crop_enabled(settings.crop_enabled);
        }
        let aspect = match AspectChoice::parse(&settings.crop_aspect) {
            Ok(aspect) if aspect != self.crop.aspect() => {
                self.set_crop_aspect_choice(aspect);
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };
        let params = self.params.apply_settings(settings);
        aspect.and(params)
    }

    /// Snapshot of the current configuration.
    pub fn settings(&self) -> EditorSettings {
        let bar = self.params.bar_spec();
        let wm = self.params.watermark_spec();
        EditorSettings {
            crop_enabled: self.crop.enabled(),
            crop_aspect: self.crop.aspect().to_input(),
            bar_ratio: bar.target_ratio.to_string(),
            bar_color: bar.color.to_hex(),
            bar_opacity: bar.opacity * 100.0,
            image_offset: self.params.image_offset_percent(),
            watermark_enabled: self.params.watermark_enabled(),
            watermark_offset_x: wm.offset_x_percent,
            watermark_offset_y: wm.offset_y_percent,
            watermark_scale: wm.scale_percent,
            watermark_opacity: wm.opacity * 100.0,
        }
    }

    /// The compositor input for the current state, if an image is loaded.
    pub fn scene(&self) -> Option<Scene<'_>> {
        let base = self.image()?;
        let watermark = match (&self.watermark, self.params.watermark_enabled()) {
            (Some(wm), true) => Some(WatermarkLayer {
                image: &wm.image,
                spec: self.params.watermark_spec(),
            }),
            _ => None,
        };
        Some(Scene {
            base,
            source: None,
            image_offset_percent: self.params.image_offset_percent(),
            bars: self.params.bar_spec(),
            watermark,
        })
    }

    /// Draw the preview onto a canvas-sized `surface`, including the crop
    /// overlay. Returns `false` if there is no image to show.
    pub fn render_preview<S: Surface + ?Sized>(&self, surface: &mut S) -> bool {
        let (Some(scene), Some(fit)) = (self.scene(), self.fit) else {
            return false;
        };
        render(surface, &fit.rect, &scene);
        if let Some(crop) = self.crop.rect() {
            draw_crop_overlay(surface, &crop);
        }
        true
    }

    /// Composite the current image at its native resolution.
    pub fn render_export(&self) -> Option<DecodedImage> {
        render_full_resolution(&self.scene()?)
    }

    /// Composite and encode the current image. `Ok(None)` when no image is
    /// loaded.
    #[tracing::instrument(skip(self))]
    pub fn export(&self, format: OutputFormat) -> Result<Option<ExportedImage>, EncodeError> {
        let (Some(name), Some(composited)) = (self.image_name(), self.render_export()) else {
            tracing::debug!("export skipped, no image");
            return Ok(None);
        };
        let bytes = encode_image(&composited, format)?;
        Ok(Some(ExportedImage {
            bytes,
            file_name: export_file_name(name, format),
            format,
            width: composited.width,
            height: composited.height,
        }))
    }

    /// Display state derived from the session.
    pub fn status(&self) -> SessionStatus {
        let Some(loaded) = &self.image else {
            return SessionStatus {
                file: None,
                crop: CropStatus::NoImage,
                image_ratio: None,
                bars: BarStatus::NoImage,
                offset_percent: self.params.image_offset_percent().round() as i32,
                watermark: self.watermark_status(),
                bar_opacity_percent: self.bar_opacity_percent(),
            };
        };
        let image = &loaded.image;

        let crop = if !self.crop.enabled() {
            CropStatus::Disabled
        } else {
            match (self.crop.rect(), self.fit) {
                (Some(rect), Some(fit)) => CropStatus::Region {
                    width: (rect.w / fit.scale).round() as u32,
                    height: (rect.h / fit.scale).round() as u32,
                },
                _ => CropStatus::NoImage,
            }
        };

        let bars = match compute_bars(
            image.width,
            image.height,
            self.params.bar_spec().target_ratio,
        ) {
            BarGeometry::None => BarStatus::None,
            BarGeometry::Letterbox { size } => BarStatus::Letterbox {
                size: size.round() as u32,
            },
            BarGeometry::Pillarbox { size } => BarStatus::Pillarbox {
                size: size.round() as u32,
            },
        };

        let ratio = image.width as f64 / image.height as f64;
        SessionStatus {
            file: Some(FileStatus {
                name: loaded.name.clone(),
                width: image.width,
                height: image.height,
            }),
            crop,
            image_ratio: Some((ratio * 100.0).round() / 100.0),
            bars,
            offset_percent: self.params.image_offset_percent().round() as i32,
            watermark: self.watermark_status(),
            bar_opacity_percent: self.bar_opacity_percent(),
        }
    }

    fn watermark_status(&self) -> WatermarkStatus {
        if !self.params.watermark_enabled() {
            return WatermarkStatus::Disabled;
        }
        match &self.watermark {
            None => WatermarkStatus::NotLoaded,
            Some(wm) => WatermarkStatus::Loaded {
                name: wm.name.clone(),
                width: wm.image.width,
                height: wm.image.height,
                size: format_bytes(wm.byte_size),
            },
        }
    }

    fn bar_opacity_percent(&self) -> u32 {
        (self.params.bar_spec().opacity * 100.0).round() as u32
    }
}

/// Everything a UI needs to label the current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub file: Option<FileStatus>,
    pub crop: CropStatus,
    /// Width / height rounded to two decimals.
    pub image_ratio: Option<f64>,
    pub bars: BarStatus,
    pub offset_percent: i32,
    pub watermark: WatermarkStatus,
    pub bar_opacity_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStatus {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CropStatus {
    NoImage,
    Disabled,
    /// Selection size in image pixels.
    Region { width: u32, height: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BarStatus {
    NoImage,
    None,
    Letterbox { size: u32 },
    Pillarbox { size: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WatermarkStatus {
    Disabled,
    NotLoaded,
    Loaded {
        name: String,
        width: u32,
        height: u32,
        /// Human-readable file size, e.g. `"12.3 KB"`.
        size: String,
    },
}

/// Human-readable byte count with one decimal, e.g. `"1.5 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// File name without its last extension.
fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => &name[..dot],
        _ => name,
    }
}

/// `<stem>-letterbox.<ext>` for the given output format.
pub fn export_file_name(name: &str, format: OutputFormat) -> String {
    format!("{}-letterbox.{}", file_stem(name), format.extension())
}
