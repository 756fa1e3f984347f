use egui::{Pos2, Rect, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};

mod common;
pub(crate) mod image;
pub(crate) mod sticker;
pub(crate) mod text;

pub use common::{
    DEFAULT_EMOJI_SIZE, DEFAULT_STICKER_SIZE, DEFAULT_TEXT_FILL, DEFAULT_TEXT_FONT, DEFAULT_TEXT_SIZE,
    origin_for_center, rotate_vec, rotated_corners,
};
pub(crate) use common::calculate_bounds;
pub use self::image::{CropRect, ImageContent, ImagePatch, Raster};
pub use sticker::{
    STICKERS, StickerCategory, StickerContent, StickerPatch, StickerRecord, sticker_by_id,
    stickers_in_category,
};
pub use text::{EmojiContent, EmojiPatch, FontStyle, TextAlign, TextContent, TextPatch};

use crate::id_generator::{ElementId, generate_id};

/// Common trait that all canvas elements implement
pub trait Element {
    /// Get the unique identifier for this element
    fn id(&self) -> &ElementId;

    /// Get the element type as a string
    fn element_type(&self) -> &'static str;

    /// Axis-aligned bounds of the rendered element in canvas space
    fn rect(&self) -> Rect;

    /// Test if the element's rotated display box contains the given position
    fn hit_test(&self, pos: Pos2) -> bool;
}

/// Variant payload of a canvas element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Image(ImageContent),
    Text(TextContent),
    Emoji(EmojiContent),
    Sticker(StickerContent),
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Image(_) => "image",
            ElementKind::Text(_) => "text",
            ElementKind::Emoji(_) => "emoji",
            ElementKind::Sticker(_) => "sticker",
        }
    }
}

/// A placeable object on the canvas.
///
/// `x`/`y` is the canvas-absolute top-left and the pivot for `rotation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasElement {
    pub id: ElementId,
    pub x: f32,
    pub y: f32,
    /// Degrees, any real value
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub z_index: i64,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl CanvasElement {
    pub fn new(kind: ElementKind, position: Pos2, z_index: i64) -> Self {
        Self {
            id: generate_id(),
            x: position.x,
            y: position.y,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            z_index,
            kind,
        }
    }

    pub fn position(&self) -> Pos2 {
        pos2(self.x, self.y)
    }

    pub fn scale(&self) -> Vec2 {
        vec2(self.scale_x, self.scale_y)
    }

    pub fn as_image(&self) -> Option<&ImageContent> {
        match &self.kind {
            ElementKind::Image(content) => Some(content),
            _ => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, ElementKind::Image(_))
    }

    /// Unscaled content size. For images this is the visible crop when one is set.
    pub fn base_size(&self) -> Vec2 {
        match &self.kind {
            ElementKind::Image(content) => match content.crop {
                Some(crop) => vec2(crop.width, crop.height),
                None => content.source_size(),
            },
            ElementKind::Text(content) => content.approximate_size(),
            ElementKind::Emoji(content) => content.approximate_size(),
            ElementKind::Sticker(content) => content.approximate_size(),
        }
    }

    pub fn display_size(&self) -> Vec2 {
        self.base_size() * self.scale()
    }

    /// Corners of the display box after rotation about the origin
    pub fn corners(&self) -> [Pos2; 4] {
        rotated_corners(self.position(), self.display_size(), self.rotation)
    }

    /// Visual centre of the display box
    pub fn center(&self) -> Pos2 {
        self.position() + rotate_vec(self.display_size() / 2.0, self.rotation)
    }

    /// Map a canvas point into the element's unrotated display space
    pub fn to_local(&self, point: Pos2) -> Vec2 {
        rotate_vec(point - self.position(), -self.rotation)
    }
}

impl Element for CanvasElement {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn element_type(&self) -> &'static str {
        self.kind.name()
    }

    fn rect(&self) -> Rect {
        calculate_bounds(&self.corners())
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        let local = self.to_local(pos);
        let size = self.display_size();
        // Negative scales flip the box to the other side of the origin
        let local_box = Rect::from_two_pos(Pos2::ZERO, size.to_pos2());
        local_box.contains(local.to_pos2())
    }
}

/// Variant-specific half of an [`ElementPatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum KindPatch {
    Image(ImagePatch),
    Text(TextPatch),
    Emoji(EmojiPatch),
    Sticker(StickerPatch),
}

impl KindPatch {
    fn name(&self) -> &'static str {
        match self {
            KindPatch::Image(_) => "image",
            KindPatch::Text(_) => "text",
            KindPatch::Emoji(_) => "emoji",
            KindPatch::Sticker(_) => "sticker",
        }
    }
}

/// Shallow partial update of an element. The `type` discriminant and the id
/// are never writable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub rotation: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
    pub z_index: Option<i64>,
    pub kind: Option<KindPatch>,
}

impl ElementPatch {
    pub fn position(position: Pos2) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            ..Default::default()
        }
    }

    pub fn transform(scale: Vec2, rotation: f32) -> Self {
        Self {
            scale_x: Some(scale.x),
            scale_y: Some(scale.y),
            rotation: Some(rotation),
            ..Default::default()
        }
    }

    pub fn z_index(z_index: i64) -> Self {
        Self {
            z_index: Some(z_index),
            ..Default::default()
        }
    }

    pub fn image(patch: ImagePatch) -> Self {
        Self {
            kind: Some(KindPatch::Image(patch)),
            ..Default::default()
        }
    }

    pub fn with_position(mut self, position: Pos2) -> Self {
        self.x = Some(position.x);
        self.y = Some(position.y);
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale_x = Some(scale.x);
        self.scale_y = Some(scale.y);
        self
    }

    /// Merge into `element`. A variant patch for the wrong kind rejects the
    /// whole patch and leaves the element untouched.
    pub(crate) fn apply(self, element: &mut CanvasElement) -> bool {
        if let Some(kind) = &self.kind {
            if kind.name() != element.kind.name() {
                log::warn!(
                    "Rejected {} patch for {} element {}",
                    kind.name(),
                    element.kind.name(),
                    element.id
                );
                return false;
            }
        }

        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if let Some(rotation) = self.rotation {
            element.rotation = rotation;
        }
        if let Some(scale_x) = self.scale_x {
            element.scale_x = scale_x;
        }
        if let Some(scale_y) = self.scale_y {
            element.scale_y = scale_y;
        }
        if let Some(z_index) = self.z_index {
            element.z_index = z_index;
        }

        match (self.kind, &mut element.kind) {
            (Some(KindPatch::Image(patch)), ElementKind::Image(content)) => patch.apply(content),
            (Some(KindPatch::Text(patch)), ElementKind::Text(content)) => patch.apply(content),
            (Some(KindPatch::Emoji(patch)), ElementKind::Emoji(content)) => patch.apply(content),
            (Some(KindPatch::Sticker(patch)), ElementKind::Sticker(content)) => patch.apply(content),
            _ => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::RgbaImage;

    fn image_element(w: u32, h: u32) -> CanvasElement {
        let raster = Raster::new(RgbaImage::new(w, h));
        CanvasElement::new(ElementKind::Image(ImageContent::new(raster)), pos2(10.0, 20.0), 1)
    }

    #[test]
    fn test_mismatched_patch_is_rejected_whole() {
        let mut element = image_element(40, 30);
        let before = element.clone();
        let patch = ElementPatch {
            x: Some(99.0),
            kind: Some(KindPatch::Text(TextPatch {
                text: Some("leak".to_owned()),
                ..Default::default()
            })),
            ..Default::default()
        };
        assert!(!patch.apply(&mut element));
        assert_eq!(element, before);
    }

    #[test]
    fn test_hit_test_follows_rotation() {
        let mut element = image_element(100, 50);
        element.rotation = 90.0;
        // Rotated about (10, 20): the box now spans x in [-40, 10], y in [20, 120]
        assert!(element.hit_test(pos2(-15.0, 100.0)));
        assert!(!element.hit_test(pos2(50.0, 30.0)));
        let rect = element.rect();
        assert!((rect.min.x + 40.0).abs() < 1e-3);
        assert!((rect.max.y - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_crop_drives_base_size() {
        let mut element = image_element(100, 50);
        ElementPatch::image(ImagePatch {
            crop: Some(Some(CropRect { x: 10.0, y: 10.0, width: 30.0, height: 20.0 })),
            ..Default::default()
        })
        .apply(&mut element);
        assert_eq!(element.base_size(), vec2(30.0, 20.0));
    }

    #[test]
    fn test_serialized_shape_is_tagged() {
        let element = CanvasElement::new(
            ElementKind::Emoji(EmojiContent { emoji: "🎉".to_owned(), font_size: 64.0 }),
            pos2(1.0, 2.0),
            3,
        );
        let value = serde_json::to_value(&element).unwrap();
        assert_eq!(value["type"], "emoji");
        assert_eq!(value["zIndex"], 3);
        assert_eq!(value["fontSize"], 64.0);
        let back: CanvasElement = serde_json::from_value(value).unwrap();
        assert_eq!(back, element);
    }
}
