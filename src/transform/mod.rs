//! Move, scale and rotate commits, rotation snapping and z-ordering.

use egui::{Pos2, Rect, Vec2};

mod gestures;
mod zorder;

pub use gestures::{GestureTransform, MultiTouchGesture};
pub use zorder::{ZOrderOp, plan_z_order};

use crate::config::EditorConfig;
use crate::document::Document;
use crate::element::{CanvasElement, Element, ElementPatch};
use crate::id_generator::ElementId;

pub const SNAP_ANGLES: [f32; 5] = [0.0, 90.0, 180.0, 270.0, 360.0];

/// Snap `rotation` to the nearest right angle when it lies strictly within
/// `threshold` degrees of it, otherwise return it untouched. A full turn
/// snaps to 0.
pub fn snap_rotation(rotation: f32, enabled: bool, threshold: f32) -> f32 {
    if !enabled || !rotation.is_finite() {
        return rotation;
    }
    let normalized = rotation.rem_euclid(360.0);
    let (closest, diff) = SNAP_ANGLES
        .iter()
        .map(|angle| (*angle, (normalized - angle).abs()))
        .fold((SNAP_ANGLES[0], f32::INFINITY), |best, candidate| {
            if candidate.1 < best.1 { candidate } else { best }
        });

    if diff < threshold { closest % 360.0 } else { rotation }
}

/// Final state read from the interactive handles when a drag ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleTransform {
    pub position: Pos2,
    pub scale: Vec2,
    pub rotation: f32,
}

/// Drag end: write the new top-left
pub fn commit_move(document: &mut Document, id: &ElementId, position: Pos2) -> bool {
    document.update_element(id, ElementPatch::position(position))
}

/// Handle drag end: snap with the handle threshold and commit. Transforms
/// that would shrink the display box below the minimum are dropped.
pub fn commit_handle_transform(
    document: &mut Document,
    id: &ElementId,
    transform: HandleTransform,
    config: &EditorConfig,
) -> bool {
    let Some(element) = document.element(id) else {
        return false;
    };
    let display = element.base_size() * transform.scale;
    if display.x.abs() < config.min_handle_box || display.y.abs() < config.min_handle_box {
        log::debug!("Handle transform for {} below minimum box: {:?}", id, display);
        return false;
    }

    let rotation = snap_rotation(transform.rotation, config.snap.enabled, config.snap.handle_threshold);
    if rotation != transform.rotation {
        log::debug!("Rotation snapped to {}", rotation);
    }
    let patch = ElementPatch::transform(transform.scale, rotation).with_position(transform.position);
    document.update_element(id, patch)
}

/// Axis-aligned bounds of the element's rotated display box
pub fn rotated_bounding_box(element: &CanvasElement) -> Rect {
    element.rect()
}
