//! Scene painting.
//!
//! [`RenderSurface`] is the seam towards whatever paints the scene. The
//! bundled [`RasterCompositor`] paints image elements into an `RgbaImage`
//! (transform, crop, filters and zone clipping), the grid overlay and the
//! selection outline. Text, emoji and sticker glyphs need a font or asset
//! pipeline and are left to richer surfaces.

use egui::{Color32, Pos2, Rect, Vec2, pos2, vec2};
use image::{Pixel, Rgba, RgbaImage};

use crate::document::Document;
use crate::element::{CanvasElement, Element, ImageContent};
use crate::error::{CollageError, Result};
use crate::filter::{FilterBackend, FilterCache};
use crate::grid::{GridZone, overlay_edges};
use crate::id_generator::ElementId;

pub const SELECTION_COLOR: Color32 = Color32::from_rgb(0x63, 0x66, 0xf1);
pub const SELECTION_STROKE_WIDTH: f32 = 3.0;

/// What to paint: a canvas region of a document at a pixel ratio
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub document: &'a Document,
    pub selection: Option<&'a ElementId>,
    /// Canvas-space region to capture
    pub region: Rect,
    pub pixel_ratio: f32,
}

impl<'a> Frame<'a> {
    /// The whole canvas at 1:1
    pub fn full(document: &'a Document, selection: Option<&'a ElementId>) -> Self {
        Self {
            document,
            selection,
            region: Rect::from_min_size(Pos2::ZERO, document.canvas().to_vec2()),
            pixel_ratio: 1.0,
        }
    }

    /// Output bitmap dimensions
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        let size = self.region.size() * self.pixel_ratio;
        let (w, h) = (size.x.round(), size.y.round());
        if w.is_finite() && h.is_finite() && w >= 1.0 && h >= 1.0 {
            Some((w as u32, h as u32))
        } else {
            None
        }
    }
}

/// The rendering collaborator: turns a frame into a flattened bitmap
pub trait RenderSurface {
    fn capture(&mut self, frame: &Frame<'_>) -> Result<RgbaImage>;
}

/// Software compositor over `RgbaImage`, sampling nearest source pixels
pub struct RasterCompositor<'a> {
    cache: &'a mut FilterCache,
    backend: &'a dyn FilterBackend,
    background: Color32,
}

impl<'a> RasterCompositor<'a> {
    pub fn new(cache: &'a mut FilterCache, backend: &'a dyn FilterBackend, background: Color32) -> Self {
        Self {
            cache,
            backend,
            background,
        }
    }
}

impl RenderSurface for RasterCompositor<'_> {
    fn capture(&mut self, frame: &Frame<'_>) -> Result<RgbaImage> {
        let (width, height) = frame
            .pixel_size()
            .ok_or_else(|| CollageError::Render(format!("empty capture region {:?}", frame.region)))?;
        log::debug!(
            "Capturing {:?} at {}x -> {}x{}",
            frame.region,
            frame.pixel_ratio,
            width,
            height
        );

        let mut target = Target {
            pixels: RgbaImage::from_pixel(width, height, to_rgba(self.background)),
            origin: frame.region.min,
            ratio: frame.pixel_ratio,
        };
        self.cache.begin_frame();

        let document = frame.document;
        let canvas = document.canvas().to_vec2();
        let grid = document.grid();
        for element in document.paint_order() {
            let Some(content) = element.as_image() else {
                log::trace!("No raster painter for {} {}", element.element_type(), element.id);
                continue;
            };
            let clip = if grid.is_active() { grid.zone_of(&element.id) } else { None };
            let bitmap = self.cache.render(&element.id, content, self.backend);
            paint_image(&mut target, element, content, &bitmap, clip, canvas);
        }

        if grid.is_active() && grid.line_settings.visible {
            let settings = grid.line_settings;
            for segment in overlay_edges(grid.zones(), canvas) {
                let points = settings.polyline(segment);
                target.stroke(&points, settings.color, settings.width, settings.style.dash_pattern());
            }
        }

        if let Some(element) = frame.selection.and_then(|id| document.element(id)) {
            let corners = element.corners();
            let outline = [corners[0], corners[1], corners[2], corners[3], corners[0]];
            target.stroke(&outline, SELECTION_COLOR, SELECTION_STROKE_WIDTH, None);
        }

        Ok(target.pixels)
    }
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

/// Output bitmap plus its placement on the canvas
struct Target {
    pixels: RgbaImage,
    origin: Pos2,
    ratio: f32,
}

impl Target {
    /// Canvas point under the centre of output pixel `(px, py)`
    fn canvas_point(&self, px: u32, py: u32) -> Pos2 {
        self.origin + vec2(px as f32 + 0.5, py as f32 + 0.5) / self.ratio
    }

    /// Output pixel range `(x0, y0, x1, y1)`, exclusive, covering canvas `rect`
    fn pixel_span(&self, rect: Rect) -> (u32, u32, u32, u32) {
        let min = (rect.min - self.origin) * self.ratio;
        let max = (rect.max - self.origin) * self.ratio;
        let clamp_x = |v: f32| v.max(0.0).min(self.pixels.width() as f32) as u32;
        let clamp_y = |v: f32| v.max(0.0).min(self.pixels.height() as f32) as u32;
        (
            clamp_x(min.x.floor()),
            clamp_y(min.y.floor()),
            clamp_x(max.x.ceil()),
            clamp_y(max.y.ceil()),
        )
    }

    fn blend(&mut self, px: u32, py: u32, color: Rgba<u8>) {
        let Some(pixel) = self.pixels.get_pixel_mut_checked(px, py) else {
            return;
        };
        match color.0[3] {
            0 => {}
            u8::MAX => *pixel = color,
            _ => pixel.blend(&color),
        }
    }

    /// Stamp a square brush of `width` canvas px centred on `point`
    fn stamp(&mut self, point: Pos2, color: Rgba<u8>, width: f32) {
        let half = width.max(1.0 / self.ratio) / 2.0;
        let rect = Rect::from_center_size(point, Vec2::splat(half * 2.0));
        let (x0, y0, x1, y1) = self.pixel_span(rect);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color);
            }
        }
    }

    /// Draw a polyline, optionally dashed with an on/off `pattern` in canvas px
    fn stroke(&mut self, points: &[Pos2], color: Color32, width: f32, pattern: Option<&[f32]>) {
        let color = to_rgba(color);
        let step = 0.5 / self.ratio;
        let period: f32 = pattern.map(|p| p.iter().sum()).unwrap_or(0.0);
        let mut travelled = 0.0;

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let length = a.distance(b);
            let mut t = 0.0;
            while t <= length {
                let on = match pattern {
                    Some(pattern) if period > 0.0 => dash_is_on(pattern, (travelled + t) % period),
                    _ => true,
                };
                if on {
                    let point = if length > 0.0 { a + (b - a) * (t / length) } else { a };
                    self.stamp(point, color, width);
                }
                t += step;
            }
            travelled += length;
        }
    }
}

/// Whether `offset` (already reduced modulo the period) falls on a dash
fn dash_is_on(pattern: &[f32], offset: f32) -> bool {
    let mut edge = 0.0;
    for (i, len) in pattern.iter().enumerate() {
        edge += len;
        if offset < edge {
            return i % 2 == 0;
        }
    }
    false
}

/// Inverse-map every output pixel under the element's rotated box back to
/// a source pixel of `bitmap`
fn paint_image(
    target: &mut Target,
    element: &CanvasElement,
    content: &ImageContent,
    bitmap: &RgbaImage,
    clip: Option<&GridZone>,
    canvas: Vec2,
) {
    let bounds = element.rect();
    if !bounds.is_positive() {
        return;
    }
    let (x0, y0, x1, y1) = target.pixel_span(bounds);
    let display = element.display_size();
    let local_box = Rect::from_two_pos(Pos2::ZERO, display.to_pos2());
    let scale = element.scale();
    let offset = content.crop.map(|c| vec2(c.x, c.y)).unwrap_or(Vec2::ZERO);
    let (bw, bh) = (bitmap.width() as f32, bitmap.height() as f32);

    for py in y0..y1 {
        for px in x0..x1 {
            let point = target.canvas_point(px, py);
            if clip.is_some_and(|zone| !zone.contains(point, canvas)) {
                continue;
            }
            let local = element.to_local(point);
            if !local_box.contains(local.to_pos2()) {
                continue;
            }
            let source = offset + local / scale;
            let (sx, sy) = (source.x.floor(), source.y.floor());
            if sx < 0.0 || sy < 0.0 || sx >= bw || sy >= bh {
                continue;
            }
            target.blend(px, py, *bitmap.get_pixel(sx as u32, sy as u32));
        }
    }
}

/// Colour at canvas point `point` of a bitmap captured from `frame`
pub fn sample(bitmap: &RgbaImage, frame: &Frame<'_>, point: Pos2) -> Option<Rgba<u8>> {
    let p = (point - frame.region.min) * frame.pixel_ratio;
    let (x, y) = (p.x.floor(), p.y.floor());
    if x < 0.0 || y < 0.0 {
        return None;
    }
    bitmap.get_pixel_checked(x as u32, y as u32).copied()
}

/// Centre of the canvas pixel whose top-left corner is `(x, y)`
pub fn pixel_center(x: f32, y: f32) -> Pos2 {
    pos2(x + 0.5, y + 0.5)
}
