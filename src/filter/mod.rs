//! Per-image filter parameters, the active filter stack, and how a stack is
//! applied to a bitmap.

use image::{DynamicImage, Rgba, RgbaImage, imageops};
use serde::{Deserialize, Serialize};

mod cache;
mod editor;

pub use cache::FilterCache;
pub use editor::FilterEditor;

pub const NEUTRAL_PERCENT: f32 = 100.0;

/// Filter record stored on an image element.
///
/// Percentages are centred on 100 (no change); `blur` is a radius in px.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub blur: f32,
    pub grayscale: bool,
    pub sepia: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            brightness: NEUTRAL_PERCENT,
            contrast: NEUTRAL_PERCENT,
            saturation: NEUTRAL_PERCENT,
            blur: 0.0,
            grayscale: false,
            sepia: false,
        }
    }
}

impl FilterSettings {
    pub fn is_neutral(&self) -> bool {
        active_stack(Some(self)).is_empty()
    }

    pub fn set(&mut self, field: FilterField) {
        match field {
            FilterField::Brightness(v) => self.brightness = v,
            FilterField::Contrast(v) => self.contrast = v,
            FilterField::Saturation(v) => self.saturation = v,
            FilterField::Blur(v) => self.blur = v.max(0.0),
            FilterField::Grayscale(v) => self.grayscale = v,
            FilterField::Sepia(v) => self.sepia = v,
        }
    }
}

/// A single live edit from the filter controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterField {
    Brightness(f32),
    Contrast(f32),
    Saturation(f32),
    Blur(f32),
    Grayscale(bool),
    Sepia(bool),
}

/// One stage of the active stack. Adjustment amounts are normalised to
/// `(percent - 100) / 100`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Brighten(f32),
    Contrast(f32),
    Blur(f32),
    Grayscale,
    Sepia,
    Saturate(f32),
}

fn normalized(percent: f32) -> f32 {
    (percent - NEUTRAL_PERCENT) / NEUTRAL_PERCENT
}

/// Build the ordered stack of non-default filters. `None` and an all-default
/// record both give an empty stack.
pub fn active_stack(settings: Option<&FilterSettings>) -> Vec<FilterOp> {
    let Some(s) = settings else {
        return Vec::new();
    };

    let mut stack = Vec::new();
    // Brightness and contrast always travel together
    if s.brightness != NEUTRAL_PERCENT || s.contrast != NEUTRAL_PERCENT {
        stack.push(FilterOp::Brighten(normalized(s.brightness)));
        stack.push(FilterOp::Contrast(normalized(s.contrast)));
    }
    if s.blur > 0.0 {
        stack.push(FilterOp::Blur(s.blur));
    }
    if s.grayscale {
        stack.push(FilterOp::Grayscale);
    }
    if s.sepia {
        stack.push(FilterOp::Sepia);
    }
    if s.saturation != NEUTRAL_PERCENT {
        stack.push(FilterOp::Saturate(normalized(s.saturation)));
    }
    stack
}

/// Applies a filter stack to a bitmap
pub trait FilterBackend {
    fn apply(&self, source: &RgbaImage, stack: &[FilterOp]) -> RgbaImage;
}

/// Filter kernels built on the `image` crate's pixel operations
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFilterBackend;

impl FilterBackend for ImageFilterBackend {
    fn apply(&self, source: &RgbaImage, stack: &[FilterOp]) -> RgbaImage {
        let mut current = source.clone();
        for op in stack {
            current = match *op {
                FilterOp::Brighten(amount) => imageops::brighten(&current, (amount * 255.0).round() as i32),
                FilterOp::Contrast(amount) => imageops::contrast(&current, amount * 100.0),
                FilterOp::Blur(radius) => imageops::blur(&current, radius),
                FilterOp::Grayscale => DynamicImage::ImageRgba8(current).grayscale().to_rgba8(),
                FilterOp::Sepia => map_pixels(current, sepia),
                FilterOp::Saturate(amount) => map_pixels(current, |p| saturate(p, amount)),
            };
        }
        current
    }
}

fn map_pixels(mut image: RgbaImage, f: impl Fn(Rgba<u8>) -> Rgba<u8>) -> RgbaImage {
    for pixel in image.pixels_mut() {
        *pixel = f(*pixel);
    }
    image
}

fn clamp_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn sepia(p: Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, a] = p.0.map(f32::from);
    Rgba([
        clamp_channel(r * 0.393 + g * 0.769 + b * 0.189),
        clamp_channel(r * 0.349 + g * 0.686 + b * 0.168),
        clamp_channel(r * 0.272 + g * 0.534 + b * 0.131),
        a as u8,
    ])
}

fn saturate(p: Rgba<u8>, amount: f32) -> Rgba<u8> {
    let [r, g, b, a] = p.0.map(f32::from);
    let luma = 0.299 * r + 0.587 * g + 0.114 * b;
    let factor = 1.0 + amount;
    Rgba([
        clamp_channel(luma + (r - luma) * factor),
        clamp_channel(luma + (g - luma) * factor),
        clamp_channel(luma + (b - luma) * factor),
        a as u8,
    ])
}
