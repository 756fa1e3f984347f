use egui::Color32;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rotation snapping thresholds.
///
/// Gesture and handle contexts carry their own thresholds; nothing
/// requires them to agree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub enabled: bool,
    /// Degrees, used when a two-finger gesture ends
    pub gesture_threshold: f32,
    /// Degrees, used when a transform handle drag ends
    pub handle_threshold: f32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gesture_threshold: 15.0,
            handle_threshold: 10.0,
        }
    }
}

/// Tunables for the editor core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing keys fall back to defaults
pub struct EditorConfig {
    pub snap: SnapConfig,
    /// Quiet period before live filter edits are committed to the element
    pub filter_commit_delay_ms: u64,
    /// Idle window before a filtered bitmap is baked into the cache
    pub filter_cache_delay_ms: u64,
    /// Maximum number of baked filter bitmaps kept around
    pub filter_cache_capacity: usize,
    /// Smallest crop rectangle edge, in canvas pixels
    pub min_crop_size: f32,
    /// Smallest display box a handle transform may produce
    pub min_handle_box: f32,
    pub export_pixel_ratio: f32,
    /// Offset between consecutive images of one batch
    pub batch_jitter: f32,
    /// Canvas background as `#rrggbb`
    pub background: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            filter_commit_delay_ms: 300,
            filter_cache_delay_ms: 800,
            filter_cache_capacity: 32,
            min_crop_size: 20.0,
            min_handle_box: 20.0,
            export_pixel_ratio: 2.0,
            batch_jitter: 16.0,
            background: "#ffffff".to_owned(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn filter_commit_delay(&self) -> Duration {
        Duration::from_millis(self.filter_commit_delay_ms)
    }

    pub fn filter_cache_delay(&self) -> Duration {
        Duration::from_millis(self.filter_cache_delay_ms)
    }

    pub fn background_color(&self) -> Color32 {
        Color32::from_hex(&self.background).unwrap_or_else(|_| {
            log::warn!("Invalid background colour {:?}, using white", self.background);
            Color32::WHITE
        })
    }
}
