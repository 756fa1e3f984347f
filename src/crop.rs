//! Crop geometry: entering, adjusting, applying and cancelling a crop on an
//! image element.
//!
//! The crop rectangle lives in canvas-absolute pixels while the user edits
//! it. Applying converts it into source pixels of the element's current
//! backing raster and replaces that raster, so repeated crops compose.

use egui::{Pos2, Rect, Vec2, pos2, vec2};
use image::imageops::{self, FilterType};

use crate::document::Document;
use crate::element::{CanvasElement, ElementPatch, ImagePatch, Raster, origin_for_center};
use crate::error::TransitionError;
use crate::id_generator::ElementId;

/// Position and rotation of the element before the crop began
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    position: Pos2,
    rotation: f32,
}

/// Transient state of an in-progress crop
#[derive(Debug, Clone, PartialEq)]
pub struct TempCropData {
    /// Crop rectangle in canvas-absolute pixels
    pub rect: Rect,
    /// Rotation zeroed on entry, restored on apply and cancel
    pub original_rotation: Option<f32>,
    original: Placement,
}

impl TempCropData {
    /// Drag the rectangle, keeping it inside `bounds`
    pub fn move_to(&mut self, min: Pos2, bounds: Rect) {
        let size = self.rect.size();
        let x = min.x.min(bounds.max.x - size.x).max(bounds.min.x);
        let y = min.y.min(bounds.max.y - size.y).max(bounds.min.y);
        self.rect = Rect::from_min_size(pos2(x, y), size);
    }

    /// Replace the rectangle after a handle resize
    pub fn resize(&mut self, rect: Rect, bounds: Rect, min_size: f32) {
        self.rect = clamp_crop_rect(rect, bounds, min_size);
    }
}

/// Axis-aligned display rectangle of an unrotated image element
pub fn display_rect(element: &CanvasElement) -> Rect {
    Rect::from_min_size(element.position(), element.display_size())
}

/// Keep `rect` inside `bounds` with both edges at least `min_size`.
///
/// The origin is limited to `[min, max - min_size]`, then the size to what
/// is left between the origin and the far edge.
pub fn clamp_crop_rect(rect: Rect, bounds: Rect, min_size: f32) -> Rect {
    let x = rect.min.x.min(bounds.max.x - min_size).max(bounds.min.x);
    let y = rect.min.y.min(bounds.max.y - min_size).max(bounds.min.y);
    let width = rect.width().min(bounds.max.x - x).max(min_size);
    let height = rect.height().min(bounds.max.y - y).max(min_size);
    Rect::from_min_size(pos2(x, y), vec2(width, height))
}

/// Enter crop mode. A rotated image is first re-anchored to rotation 0
/// around its visual centre; the crop rectangle starts as the full display box.
pub fn start_crop(document: &mut Document, id: &ElementId) -> Result<TempCropData, TransitionError> {
    let element = document
        .element(id)
        .ok_or_else(|| TransitionError::NotAnImage(id.to_string()))?;
    if !element.is_image() {
        return Err(TransitionError::NotAnImage(id.to_string()));
    }

    let original = Placement {
        position: element.position(),
        rotation: element.rotation,
    };
    let display = element.display_size();

    let original_rotation = if element.rotation != 0.0 {
        let center = element.center();
        let unrotated = center - display / 2.0;
        document.update_element(id, ElementPatch::position(unrotated).with_rotation(0.0));
        log::debug!("Re-anchored {} from rotation {} for cropping", id, original.rotation);
        Some(original.rotation)
    } else {
        None
    };

    let origin = document.element(id).map(CanvasElement::position).unwrap_or(original.position);
    log::info!("Crop started on {}", id);
    Ok(TempCropData {
        rect: Rect::from_min_size(origin, display),
        original_rotation,
        original,
    })
}

/// Source-pixel rectangle `(sx, sy, sw, sh)` of the backing raster under `rect`
pub fn source_rect(element: &CanvasElement, rect: Rect) -> Rect {
    let offset = rect.min - element.position();
    let scale = element.scale();
    let base = element
        .as_image()
        .and_then(|img| img.crop)
        .map(|c| vec2(c.x, c.y))
        .unwrap_or(Vec2::ZERO);
    Rect::from_min_size(
        (base + offset / scale).to_pos2(),
        vec2(rect.width() / scale.x, rect.height() / scale.y),
    )
}

/// Bake the crop into a new raster and put the element back in place.
///
/// Returns false when the element vanished or is not an image.
pub fn apply_crop(document: &mut Document, id: &ElementId, data: &TempCropData, min_size: f32) -> bool {
    let Some(element) = document.element(id) else {
        log::warn!("Crop target {} no longer exists", id);
        return false;
    };
    let Some(content) = element.as_image() else {
        return false;
    };

    let rect = clamp_crop_rect(data.rect, display_rect(element), min_size);
    let source = source_rect(element, rect);
    let raster = extract(&content.raster, source, rect.size());
    let size = raster.size();
    log::info!(
        "Applying crop on {}: source {:?} -> {}x{}",
        id,
        source,
        raster.width(),
        raster.height()
    );

    let (position, rotation) = match data.original_rotation {
        Some(rotation) => (origin_for_center(rect.center(), size, rotation), rotation),
        None => (rect.min, 0.0),
    };
    let patch = ElementPatch::image(ImagePatch {
        raster: Some(raster),
        width: Some(size.x),
        height: Some(size.y),
        crop: Some(None),
        filters: None,
    })
    .with_position(position)
    .with_scale(vec2(1.0, 1.0))
    .with_rotation(rotation);
    document.update_element(id, patch)
}

/// Leave crop mode without touching the raster
pub fn cancel_crop(document: &mut Document, id: &ElementId, data: &TempCropData) -> bool {
    log::info!("Crop cancelled on {}", id);
    let patch = ElementPatch::position(data.original.position).with_rotation(data.original.rotation);
    document.update_element(id, patch)
}

/// Cut `source` out of `raster` and resample it to `target` pixels
fn extract(raster: &Raster, source: Rect, target: Vec2) -> Raster {
    let image = raster.image();
    let (w, h) = (image.width(), image.height());
    let x = (source.min.x.round().max(0.0) as u32).min(w.saturating_sub(1));
    let y = (source.min.y.round().max(0.0) as u32).min(h.saturating_sub(1));
    let sw = (source.width().round().max(1.0) as u32).min(w - x);
    let sh = (source.height().round().max(1.0) as u32).min(h - y);

    let cropped = imageops::crop_imm(image, x, y, sw, sh).to_image();
    let tw = target.x.round().max(1.0) as u32;
    let th = target.y.round().max(1.0) as u32;
    if (tw, th) == (sw, sh) {
        Raster::new(cropped)
    } else {
        Raster::new(imageops::resize(&cropped, tw, th, FilterType::Triangle))
    }
}
