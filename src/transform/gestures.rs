use egui::{Pos2, Vec2};

use super::snap_rotation;
use crate::config::SnapConfig;
use crate::element::{CanvasElement, ElementPatch};
use crate::id_generator::ElementId;

/// Values captured when the second finger lands
#[derive(Debug, Clone, Copy)]
struct GestureStart {
    distance: f32,
    angle: f32,
    scale: Vec2,
    rotation: f32,
    position: Pos2,
}

/// Transform produced by a pinch/rotate gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTransform {
    pub position: Pos2,
    pub scale: Vec2,
    pub rotation: f32,
}

impl GestureTransform {
    pub fn to_patch(self) -> ElementPatch {
        ElementPatch::transform(self.scale, self.rotation).with_position(self.position)
    }
}

/// Two-finger pinch and rotate on a single element.
///
/// Every move is computed against the values captured at gesture start, so
/// rounding never accumulates across frames.
#[derive(Debug, Clone)]
pub struct MultiTouchGesture {
    snap: SnapConfig,
    target: Option<ElementId>,
    start: Option<GestureStart>,
    current: Option<GestureTransform>,
}

fn distance(a: Pos2, b: Pos2) -> f32 {
    a.distance(b)
}

/// Angle of the line from `a` to `b` in degrees
fn angle(a: Pos2, b: Pos2) -> f32 {
    let d = b - a;
    d.y.atan2(d.x).to_degrees()
}

impl MultiTouchGesture {
    pub fn new(snap: SnapConfig) -> Self {
        Self {
            snap,
            target: None,
            start: None,
            current: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    pub fn target(&self) -> Option<&ElementId> {
        self.target.as_ref()
    }

    /// Live preview of the gesture, if one is running
    pub fn current(&self) -> Option<GestureTransform> {
        self.current
    }

    /// A finger went down. Two contacts start the gesture; fewer than two
    /// while active abandon it without committing.
    pub fn touch_start(&mut self, touches: &[Pos2], element: &CanvasElement) {
        if self.is_active() && touches.len() < 2 {
            log::debug!("Multi-touch reset, {} contact(s) left", touches.len());
            self.reset();
            return;
        }
        if touches.len() != 2 {
            return;
        }

        let start_distance = distance(touches[0], touches[1]);
        if start_distance <= f32::EPSILON {
            return;
        }
        let start = GestureStart {
            distance: start_distance,
            angle: angle(touches[0], touches[1]),
            scale: element.scale(),
            rotation: element.rotation,
            position: element.position(),
        };
        log::debug!(
            "Multi-touch start on {}: distance {:.0}, angle {:.1}",
            element.id,
            start.distance,
            start.angle
        );
        self.target = Some(element.id.clone());
        self.start = Some(start);
        self.current = Some(GestureTransform {
            position: start.position,
            scale: start.scale,
            rotation: start.rotation,
        });
    }

    pub fn touch_move(&mut self, touches: &[Pos2]) -> Option<GestureTransform> {
        let start = self.start?;
        if touches.len() != 2 {
            return None;
        }
        let ratio = distance(touches[0], touches[1]) / start.distance;
        let delta = angle(touches[0], touches[1]) - start.angle;
        let transform = GestureTransform {
            position: start.position,
            scale: start.scale * ratio,
            rotation: start.rotation + delta,
        };
        self.current = Some(transform);
        Some(transform)
    }

    /// A finger lifted. Dropping below two contacts ends the gesture: the
    /// snapped transform is returned once and the state is cleared. The
    /// remaining finger never restarts it.
    pub fn touch_end(&mut self, remaining: usize) -> Option<(ElementId, GestureTransform)> {
        if !self.is_active() || remaining >= 2 {
            return None;
        }
        let target = self.target.clone();
        let current = self.current;
        self.reset();

        let mut transform = current?;
        let snapped = snap_rotation(transform.rotation, self.snap.enabled, self.snap.gesture_threshold);
        if snapped != transform.rotation {
            log::debug!("Gesture rotation snapped to {}", snapped);
            transform.rotation = snapped;
        }
        log::debug!("Multi-touch end, committing {:?}", transform);
        Some((target?, transform))
    }

    /// Abandon a running gesture without committing
    pub fn cancel(&mut self) {
        if self.is_active() {
            log::debug!("Multi-touch cancelled");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.target = None;
        self.start = None;
        self.current = None;
    }
}
