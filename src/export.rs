//! Export: choose the capture region, hide the selection, render at the
//! export pixel ratio and encode a PNG.

use egui::{Pos2, Rect, pos2};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::document::{CanvasSize, Document};
use crate::element::{CanvasElement, Element, ElementKind, calculate_bounds};
use crate::error::{CollageError, Result};
use crate::id_generator::ElementId;
use crate::renderer::{Frame, RenderSurface};
use crate::util::time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportMode {
    FullCanvas,
    /// Crop to the union of the visible bitmaps
    #[default]
    ContentBounds,
}

/// A finished export
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub filename: String,
    /// Canvas-space region that was captured
    pub region: Rect,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

pub fn full_canvas_region(canvas: CanvasSize) -> Rect {
    Rect::from_min_size(Pos2::ZERO, canvas.to_vec2())
}

/// Bitmap-backed elements (images and stickers) with a non-empty display box
fn is_visible_bitmap(element: &CanvasElement) -> bool {
    let size = element.display_size();
    matches!(element.kind, ElementKind::Image(_) | ElementKind::Sticker(_)) && size.x != 0.0 && size.y != 0.0
}

/// Union of the rotated client rectangles of every visible bitmap, unclamped
pub fn content_bounds(document: &Document) -> Option<Rect> {
    let corners: Vec<Pos2> = document
        .elements()
        .iter()
        .filter(|e| is_visible_bitmap(e))
        .flat_map(|e| {
            let r = e.rect();
            [r.min, r.max]
        })
        .collect();
    if corners.is_empty() {
        return None;
    }
    Some(calculate_bounds(&corners))
}

/// Region to capture. Grid layouts always export the whole canvas; free
/// layouts honour `mode`, falling back to the whole canvas when the content
/// box is empty or lies outside the canvas.
pub fn export_region(document: &Document, mode: ExportMode) -> Rect {
    let canvas = document.canvas();
    let full = full_canvas_region(canvas);
    if document.grid().is_active() || mode == ExportMode::FullCanvas {
        return full;
    }
    let Some(bounds) = content_bounds(document) else {
        log::debug!("No visible images, exporting the full canvas");
        return full;
    };

    let clamp = |v: f32, max: f32| v.max(0.0).min(max);
    let x = clamp(bounds.min.x, canvas.width);
    let y = clamp(bounds.min.y, canvas.height);
    let w = clamp(bounds.max.x, canvas.width) - x;
    let h = clamp(bounds.max.y, canvas.height) - y;
    if w > 0.0 && h > 0.0 {
        Rect::from_min_size(pos2(x, y), egui::vec2(w, h))
    } else {
        log::debug!("Degenerate content bounds {:?}, exporting the full canvas", bounds);
        full
    }
}

/// Clears the selection for the lifetime of the guard and puts it back on
/// drop, including when the capture fails
pub struct SelectionGuard<'a> {
    slot: &'a mut Option<ElementId>,
    saved: Option<ElementId>,
}

impl<'a> SelectionGuard<'a> {
    pub fn hide(slot: &'a mut Option<ElementId>) -> Self {
        let saved = slot.take();
        Self { slot, saved }
    }

    /// Selection visible to the renderer while the guard lives
    pub fn current(&self) -> Option<&ElementId> {
        self.slot.as_ref()
    }

    pub fn hidden(&self) -> Option<&ElementId> {
        self.saved.as_ref()
    }
}

impl Drop for SelectionGuard<'_> {
    fn drop(&mut self) {
        if self.saved.is_some() {
            *self.slot = self.saved.take();
        }
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(CollageError::Encode)?;
    Ok(bytes.into_inner())
}

pub fn export_filename(timestamp_ms: u64) -> String {
    format!("collage-{}.png", timestamp_ms)
}

/// Render and encode the document. The selection is hidden during capture
/// and restored afterwards whatever the outcome; nothing else is touched.
pub fn export_document(
    document: &Document,
    selection: &mut Option<ElementId>,
    surface: &mut dyn RenderSurface,
    mode: ExportMode,
    pixel_ratio: f32,
) -> Result<ExportOutput> {
    let region = export_region(document, mode);
    let guard = SelectionGuard::hide(selection);
    if let Some(id) = guard.hidden() {
        log::debug!("Hiding selection {} for export", id);
    }

    let frame = Frame {
        document,
        selection: guard.current(),
        region,
        pixel_ratio,
    };
    let bitmap = surface.capture(&frame).inspect_err(|err| log::error!("Export capture failed: {}", err))?;
    let png = encode_png(&bitmap).inspect_err(|err| log::error!("{}", err))?;
    drop(guard);

    let output = ExportOutput {
        filename: export_filename(time::timestamp_millis()),
        region,
        width: bitmap.width(),
        height: bitmap.height(),
        png,
    };
    log::info!(
        "Exported {} ({}x{}, {} bytes)",
        output.filename,
        output.width,
        output.height,
        output.png.len()
    );
    Ok(output)
}

fn write_into(dir: &Path, output: &ExportOutput) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(&output.filename);
    fs::write(&path, &output.png)?;
    Ok(path)
}

/// Write the export into `primary`, then `fallback`. Both failing is
/// reported as [`CollageError::SaveUnavailable`].
pub fn save_export(output: &ExportOutput, primary: &Path, fallback: &Path) -> Result<PathBuf> {
    let first = match write_into(primary, output) {
        Ok(path) => {
            log::info!("Saved export to {}", path.display());
            return Ok(path);
        }
        Err(err) => err,
    };
    log::warn!("Saving to {} failed ({}), trying {}", primary.display(), first, fallback.display());

    match write_into(fallback, output) {
        Ok(path) => {
            log::info!("Saved export to {}", path.display());
            Ok(path)
        }
        Err(source) => {
            log::error!("Export could not be saved: {}", source);
            Err(CollageError::SaveUnavailable {
                tried: vec![primary.join(&output.filename), fallback.join(&output.filename)],
                source,
            })
        }
    }
}
