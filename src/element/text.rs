use egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

// Rough glyph metrics; exact measurement belongs to the rendering collaborator
const GLYPH_WIDTH_RATIO: f32 = 0.6;
const LINE_HEIGHT_RATIO: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "bold")]
    Bold,
    #[serde(rename = "italic")]
    Italic,
    #[serde(rename = "bold italic")]
    BoldItalic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
    pub font_size: f32,
    pub font_family: String,
    /// Colour as `#rrggbb`
    pub fill: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
}

impl TextContent {
    /// Unscaled layout box: longest line by line count
    pub fn approximate_size(&self) -> Vec2 {
        let lines: Vec<&str> = self.text.lines().collect();
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let line_count = lines.len().max(1);
        vec2(
            (longest.max(1) as f32) * self.font_size * GLYPH_WIDTH_RATIO,
            line_count as f32 * self.font_size * LINE_HEIGHT_RATIO,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPatch {
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub fill: Option<String>,
    pub font_style: Option<Option<FontStyle>>,
    pub align: Option<Option<TextAlign>>,
}

impl TextPatch {
    pub(crate) fn apply(self, content: &mut TextContent) {
        if let Some(text) = self.text {
            content.text = text;
        }
        if let Some(size) = self.font_size {
            content.font_size = size;
        }
        if let Some(family) = self.font_family {
            content.font_family = family;
        }
        if let Some(fill) = self.fill {
            content.fill = fill;
        }
        if let Some(style) = self.font_style {
            content.font_style = style;
        }
        if let Some(align) = self.align {
            content.align = align;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiContent {
    pub emoji: String,
    pub font_size: f32,
}

impl EmojiContent {
    pub fn approximate_size(&self) -> Vec2 {
        vec2(self.font_size, self.font_size)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmojiPatch {
    pub emoji: Option<String>,
    pub font_size: Option<f32>,
}

impl EmojiPatch {
    pub(crate) fn apply(self, content: &mut EmojiContent) {
        if let Some(emoji) = self.emoji {
            content.emoji = emoji;
        }
        if let Some(size) = self.font_size {
            content.font_size = size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_style_wire_names() {
        let json = serde_json::to_string(&FontStyle::BoldItalic).unwrap();
        assert_eq!(json, "\"bold italic\"");
        let align: TextAlign = serde_json::from_str("\"center\"").unwrap();
        assert_eq!(align, TextAlign::Center);
    }

    #[test]
    fn test_multiline_text_box() {
        let text = TextContent {
            text: "ab\nabcd".to_owned(),
            font_size: 10.0,
            font_family: "Arial".to_owned(),
            fill: "#000000".to_owned(),
            font_style: None,
            align: None,
        };
        let size = text.approximate_size();
        assert!((size.x - 24.0).abs() < 1e-4);
        assert!((size.y - 24.0).abs() < 1e-4);
    }
}
