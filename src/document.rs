use egui::{Pos2, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::element::{
    CanvasElement, DEFAULT_EMOJI_SIZE, DEFAULT_STICKER_SIZE, DEFAULT_TEXT_FILL, DEFAULT_TEXT_FONT,
    DEFAULT_TEXT_SIZE, Element, ElementKind, ElementPatch, EmojiContent, ImageContent, StickerContent,
    TextContent, sticker_by_id,
};
use crate::error::{CollageError, Result};
use crate::grid::GridLayout;
use crate::id_generator::ElementId;
use crate::loader::DecodedImage;
use crate::transform::{ZOrderOp, plan_z_order};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn to_vec2(self) -> Vec2 {
        vec2(self.width, self.height)
    }

    pub fn center(self) -> Pos2 {
        pos2(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        CANVAS_PRESETS[0].size
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub size: CanvasSize,
}

pub static CANVAS_PRESETS: [CanvasPreset; 7] = [
    CanvasPreset { id: "default", name: "Default", size: CanvasSize::new(800.0, 600.0) },
    CanvasPreset { id: "square", name: "Square", size: CanvasSize::new(1080.0, 1080.0) },
    CanvasPreset { id: "ig-post", name: "Instagram Post", size: CanvasSize::new(1080.0, 1080.0) },
    CanvasPreset { id: "ig-story", name: "Instagram Story", size: CanvasSize::new(1080.0, 1920.0) },
    CanvasPreset { id: "fb-post", name: "Facebook Post", size: CanvasSize::new(1200.0, 630.0) },
    CanvasPreset { id: "portrait", name: "Portrait", size: CanvasSize::new(800.0, 1200.0) },
    CanvasPreset { id: "landscape", name: "Landscape", size: CanvasSize::new(1200.0, 800.0) },
];

pub fn canvas_preset(id: &str) -> Option<&'static CanvasPreset> {
    CANVAS_PRESETS.iter().find(|p| p.id == id)
}

/// The element list plus canvas size and grid assignments.
///
/// Elements are only mutated through [`Document::update_element`], which
/// keeps ids unique, the variant fixed and crops inside their source.
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<CanvasElement>,
    canvas: CanvasSize,
    grid: GridLayout,
    batch_jitter: f32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(CanvasSize::default())
    }
}

impl Document {
    pub fn new(canvas: CanvasSize) -> Self {
        Self::with_config(canvas, &EditorConfig::default())
    }

    pub fn with_config(canvas: CanvasSize, config: &EditorConfig) -> Self {
        Self {
            elements: Vec::new(),
            canvas,
            grid: GridLayout::new(),
            batch_jitter: config.batch_jitter,
        }
    }

    pub(crate) fn from_parts(canvas: CanvasSize, elements: Vec<CanvasElement>, grid: GridLayout) -> Self {
        Self {
            elements,
            canvas,
            grid,
            batch_jitter: EditorConfig::default().batch_jitter,
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn set_canvas_size(&mut self, canvas: CanvasSize) {
        log::info!("Canvas resized to {}x{}", canvas.width, canvas.height);
        self.canvas = canvas;
    }

    /// Elements in insertion order
    pub fn elements(&self) -> &[CanvasElement] {
        &self.elements
    }

    pub fn element(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| &e.id == id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.element(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut GridLayout {
        &mut self.grid
    }

    /// Paint order: ascending zIndex, ties in insertion order
    pub fn paint_order(&self) -> Vec<&CanvasElement> {
        let mut sorted: Vec<&CanvasElement> = self.elements.iter().collect();
        sorted.sort_by_key(|e| e.z_index);
        sorted
    }

    /// zIndex for the next added element: above everything, starting at 1
    pub fn next_z_index(&self) -> i64 {
        self.elements.iter().map(|e| e.z_index).max().unwrap_or(0) + 1
    }

    fn insert(&mut self, element: CanvasElement) -> ElementId {
        log::debug!(
            "Added {} {} at ({}, {}) z={}",
            element.element_type(),
            element.id,
            element.x,
            element.y,
            element.z_index
        );
        let id = element.id.clone();
        self.elements.push(element);
        id
    }

    pub fn add_image(&mut self, image: DecodedImage) -> ElementId {
        // A single image gets no jitter
        self.add_images(vec![image]).remove(0)
    }

    /// Place a batch of decoded images at a third of the canvas, fanned out
    /// diagonally around the centre
    pub fn add_images(&mut self, images: Vec<DecodedImage>) -> Vec<ElementId> {
        let base_z = self.elements.iter().map(|e| e.z_index).max().unwrap_or(0);
        let (cw, ch) = (self.canvas.width, self.canvas.height);
        let count = images.len();

        let ids: Vec<ElementId> = images
            .into_iter()
            .enumerate()
            .map(|(i, image)| {
                let content = ImageContent::new(image.raster);
                let scale = (cw / 3.0 / content.width).min(ch / 3.0 / content.height);
                let display = content.source_size() * scale;
                let jitter = (i as f32 - (count as f32 - 1.0) / 2.0) * self.batch_jitter;
                let max = vec2((cw - display.x).max(0.0), (ch - display.y).max(0.0));
                let x = ((cw - display.x) / 2.0 + jitter).max(0.0).min(max.x);
                let y = ((ch - display.y) / 2.0 + jitter).max(0.0).min(max.y);

                let mut element = CanvasElement::new(ElementKind::Image(content), pos2(x, y), base_z + i as i64 + 1);
                element.scale_x = scale;
                element.scale_y = scale;
                log::info!("Placing image {} at scale {:.3}", image.name, scale);
                self.insert(element)
            })
            .collect();
        ids
    }

    pub fn add_text(&mut self, text: &str) -> ElementId {
        let center = self.canvas.center();
        let content = TextContent {
            text: text.to_owned(),
            font_size: DEFAULT_TEXT_SIZE,
            font_family: DEFAULT_TEXT_FONT.to_owned(),
            fill: DEFAULT_TEXT_FILL.to_owned(),
            font_style: None,
            align: None,
        };
        let z = self.next_z_index();
        self.insert(CanvasElement::new(ElementKind::Text(content), center - vec2(50.0, 20.0), z))
    }

    pub fn add_emoji(&mut self, emoji: &str) -> ElementId {
        let center = self.canvas.center();
        let content = EmojiContent {
            emoji: emoji.to_owned(),
            font_size: DEFAULT_EMOJI_SIZE,
        };
        let z = self.next_z_index();
        self.insert(CanvasElement::new(ElementKind::Emoji(content), center - vec2(30.0, 30.0), z))
    }

    pub fn add_sticker(&mut self, sticker_id: &str) -> Result<ElementId> {
        let record = sticker_by_id(sticker_id).ok_or_else(|| CollageError::UnknownSticker(sticker_id.to_owned()))?;
        let content = StickerContent {
            sticker_id: record.id.to_owned(),
            category: record.category,
            size: DEFAULT_STICKER_SIZE,
        };
        let origin = self.canvas.center() - vec2(DEFAULT_STICKER_SIZE, DEFAULT_STICKER_SIZE) / 2.0;
        let z = self.next_z_index();
        Ok(self.insert(CanvasElement::new(ElementKind::Sticker(content), origin, z)))
    }

    /// Shallow-merge `patch` into the element. Unknown ids are a no-op.
    pub fn update_element(&mut self, id: &ElementId, patch: ElementPatch) -> bool {
        match self.elements.iter_mut().find(|e| &e.id == id) {
            Some(element) => patch.apply(element),
            None => {
                log::debug!("Update for missing element {}", id);
                false
            }
        }
    }

    /// Remove an element, its zone back-references and, if it was selected,
    /// the selection
    pub fn delete_element(&mut self, id: &ElementId, selection: &mut Option<ElementId>) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| &e.id != id);
        if self.elements.len() == before {
            log::debug!("Delete for missing element {}", id);
            return false;
        }
        if self.grid.release(id) {
            log::debug!("Released zone held by deleted element {}", id);
        }
        if selection.as_ref() == Some(id) {
            *selection = None;
        }
        log::info!("Deleted element {}", id);
        true
    }

    pub fn clear_all(&mut self, selection: &mut Option<ElementId>) {
        log::info!("Clearing {} elements", self.elements.len());
        self.elements.clear();
        self.grid.clear_assignments();
        *selection = None;
    }

    /// Top-most element whose display box contains `point`
    pub fn hit_test(&self, point: Pos2) -> Option<&CanvasElement> {
        self.paint_order().into_iter().rev().find(|e| e.hit_test(point))
    }

    /// Reorder the selected element. Returns whether anything changed.
    pub fn apply_z_order(&mut self, selected: Option<&ElementId>, op: ZOrderOp) -> bool {
        let changes = plan_z_order(&self.elements, selected, op);
        if changes.is_empty() {
            return false;
        }
        log::debug!("{:?}: {:?}", op, changes);
        for (id, z) in changes {
            self.update_element(&id, ElementPatch::z_index(z));
        }
        true
    }
}
