use base64::{Engine as _, engine::general_purpose};
use egui::{Rect, Vec2, pos2, vec2};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::io::Cursor;
use std::sync::Arc;

use crate::filter::FilterSettings;

/// Shared handle to a decoded RGBA bitmap.
///
/// Cloning is cheap; crop apply swaps in a new handle instead of mutating
/// pixels in place.
#[derive(Clone)]
pub struct Raster(Arc<RgbaImage>);

impl Raster {
    pub fn new(image: RgbaImage) -> Self {
        Self(Arc::new(image))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.0
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.0.width() as f32, self.0.height() as f32)
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Cursor::new(Vec::new());
        self.0.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }
}

// Custom Debug implementation to avoid dumping pixel data
impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl PartialEq for Raster {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Serialize for Raster {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let png = self.encode_png().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&general_purpose::STANDARD.encode(png))
    }
}

impl<'de> Deserialize<'de> for Raster {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)?;
        let decoded = image::load_from_memory(&bytes).map_err(serde::de::Error::custom)?;
        Ok(Self::new(decoded.to_rgba8()))
    }
}

/// Rectangle in source-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRect {
    pub fn to_rect(self) -> Rect {
        Rect::from_min_size(pos2(self.x, self.y), vec2(self.width, self.height))
    }

    /// Intersect with `[0, 0, width, height]`, `None` if nothing is left
    pub fn contained_in(self, width: f32, height: f32) -> Option<Self> {
        let bounds = Rect::from_min_size(pos2(0.0, 0.0), vec2(width, height));
        let clipped = self.to_rect().intersect(bounds);
        if clipped.width() <= 0.0 || clipped.height() <= 0.0 {
            return None;
        }
        Some(Self {
            x: clipped.min.x,
            y: clipped.min.y,
            width: clipped.width(),
            height: clipped.height(),
        })
    }
}

/// Image element payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    #[serde(rename = "image")]
    pub raster: Raster,
    /// Source pixel dimensions (post any prior crop)
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterSettings>,
}

impl ImageContent {
    pub fn new(raster: Raster) -> Self {
        let size = raster.size();
        Self {
            raster,
            width: size.x,
            height: size.y,
            crop: None,
            filters: None,
        }
    }

    pub fn source_size(&self) -> Vec2 {
        vec2(self.width, self.height)
    }
}

/// Partial update of an image payload. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagePatch {
    pub raster: Option<Raster>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub crop: Option<Option<CropRect>>,
    pub filters: Option<Option<FilterSettings>>,
}

impl ImagePatch {
    pub(crate) fn apply(self, content: &mut ImageContent) {
        let resized = self.width.is_some() || self.height.is_some();
        if let Some(raster) = self.raster {
            content.raster = raster;
        }
        if let Some(width) = self.width {
            content.width = width;
        }
        if let Some(height) = self.height {
            content.height = height;
        }
        if let Some(filters) = self.filters {
            content.filters = filters;
        }
        // Containment is checked against the dimensions after this patch
        let crop = match self.crop {
            Some(crop) => crop,
            None if resized => content.crop,
            None => return,
        };
        content.crop = crop.and_then(|c| {
            let contained = c.contained_in(content.width, content.height);
            if contained != Some(c) {
                log::warn!("Crop {:?} clamped into {}x{}", c, content.width, content.height);
            }
            contained
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_crop_is_kept_inside_source() {
        let mut content = ImageContent::new(Raster::new(RgbaImage::new(100, 50)));
        ImagePatch {
            crop: Some(Some(CropRect { x: 80.0, y: 10.0, width: 40.0, height: 60.0 })),
            ..Default::default()
        }
        .apply(&mut content);

        assert_eq!(content.crop, Some(CropRect { x: 80.0, y: 10.0, width: 20.0, height: 40.0 }));
    }

    #[test]
    fn test_shrinking_the_source_reclamps_an_existing_crop() {
        let mut content = ImageContent::new(Raster::new(RgbaImage::new(100, 50)));
        content.crop = Some(CropRect { x: 40.0, y: 10.0, width: 50.0, height: 30.0 });
        ImagePatch {
            width: Some(60.0),
            height: Some(20.0),
            ..Default::default()
        }
        .apply(&mut content);
        assert_eq!(content.crop, Some(CropRect { x: 40.0, y: 10.0, width: 20.0, height: 10.0 }));

        // Entirely outside the new bounds: dropped
        ImagePatch {
            width: Some(30.0),
            ..Default::default()
        }
        .apply(&mut content);
        assert_eq!(content.crop, None);
    }

    #[test]
    fn test_raster_serializes_as_png_payload() {
        let raster = Raster::new(RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255])));
        let json = serde_json::to_string(&raster).unwrap();
        let back: Raster = serde_json::from_str(&json).unwrap();
        assert_eq!(back.width(), 3);
        assert_eq!(back.image().get_pixel(2, 1), &Rgba([10, 20, 30, 255]));
    }
}
