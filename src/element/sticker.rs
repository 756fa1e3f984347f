use egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StickerCategory {
    Stars,
    Sparkles,
    Hearts,
    Explosion,
}

impl StickerCategory {
    pub const ALL: [StickerCategory; 4] = [
        StickerCategory::Stars,
        StickerCategory::Sparkles,
        StickerCategory::Hearts,
        StickerCategory::Explosion,
    ];
}

/// Static catalog entry. The image itself is loaded by the rendering side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickerRecord {
    pub id: &'static str,
    pub category: StickerCategory,
    pub image: &'static str,
    pub name: &'static str,
}

const fn record(
    id: &'static str,
    category: StickerCategory,
    image: &'static str,
    name: &'static str,
) -> StickerRecord {
    StickerRecord { id, category, image, name }
}

pub static STICKERS: [StickerRecord; 12] = [
    record("stars-group-1", StickerCategory::Stars, "stickers/stars-group-1.svg", "Star cluster"),
    record("stars-group-2", StickerCategory::Stars, "stickers/stars-group-2.svg", "Constellation"),
    record("stars-group-3", StickerCategory::Stars, "stickers/stars-group-3.svg", "Shooting stars"),
    record("sparkles-1", StickerCategory::Sparkles, "stickers/sparkles-1.svg", "Glitter"),
    record("sparkles-2", StickerCategory::Sparkles, "stickers/sparkles-2.svg", "Shine"),
    record("sparkles-3", StickerCategory::Sparkles, "stickers/sparkles-3.svg", "Twinkle"),
    record("hearts-1", StickerCategory::Hearts, "stickers/hearts-1.svg", "Many hearts"),
    record("hearts-2", StickerCategory::Hearts, "stickers/hearts-2.svg", "Spinning hearts"),
    record("hearts-3", StickerCategory::Hearts, "stickers/hearts-3.svg", "Heart burst"),
    record("explosion-1", StickerCategory::Explosion, "stickers/explosion-1.svg", "Boom"),
    record("explosion-2", StickerCategory::Explosion, "stickers/explosion-2.svg", "Fireworks"),
    record("explosion-3", StickerCategory::Explosion, "stickers/explosion-3.svg", "Burst"),
];

pub fn sticker_by_id(id: &str) -> Option<&'static StickerRecord> {
    STICKERS.iter().find(|s| s.id == id)
}

pub fn stickers_in_category(category: StickerCategory) -> impl Iterator<Item = &'static StickerRecord> {
    STICKERS.iter().filter(move |s| s.category == category)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerContent {
    pub sticker_id: String,
    pub category: StickerCategory,
    /// Base edge length in px
    pub size: f32,
}

impl StickerContent {
    pub fn approximate_size(&self) -> Vec2 {
        vec2(self.size, self.size)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StickerPatch {
    pub size: Option<f32>,
}

impl StickerPatch {
    pub(crate) fn apply(self, content: &mut StickerContent) {
        if let Some(size) = self.size {
            content.size = size;
        }
    }
}
