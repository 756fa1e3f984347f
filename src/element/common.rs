use egui::{Pos2, Rect, Vec2, pos2, vec2};

// Common constants for all element types
pub const DEFAULT_TEXT_SIZE: f32 = 32.0;
pub const DEFAULT_TEXT_FONT: &str = "Arial";
pub const DEFAULT_TEXT_FILL: &str = "#000000";
pub const DEFAULT_EMOJI_SIZE: f32 = 64.0;
pub const DEFAULT_STICKER_SIZE: f32 = 350.0;

/// Rotate `v` by `degrees` (clockwise in y-down canvas space)
pub fn rotate_vec(v: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    vec2(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// The four corners of a `size` box anchored at `origin` and rotated about it
pub fn rotated_corners(origin: Pos2, size: Vec2, degrees: f32) -> [Pos2; 4] {
    [
        origin,
        origin + rotate_vec(vec2(size.x, 0.0), degrees),
        origin + rotate_vec(size, degrees),
        origin + rotate_vec(vec2(0.0, size.y), degrees),
    ]
}

/// Calculate the bounding box for a set of points
pub(crate) fn calculate_bounds(points: &[Pos2]) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(pos2(min_x, min_y), pos2(max_x, max_y))
}

/// Position the top-left origin so that a `size` box rotated by `degrees`
/// about that origin has its visual centre at `center`
pub fn origin_for_center(center: Pos2, size: Vec2, degrees: f32) -> Pos2 {
    center - rotate_vec(size / 2.0, degrees)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_rotated_bounds_quarter_turn() {
        let corners = rotated_corners(pos2(100.0, 100.0), vec2(200.0, 100.0), 90.0);
        let bounds = calculate_bounds(&corners);
        assert!(approx(bounds.min.x, 0.0));
        assert!(approx(bounds.min.y, 100.0));
        assert!(approx(bounds.width(), 100.0));
        assert!(approx(bounds.height(), 200.0));
    }

    #[test]
    fn test_origin_for_center_round_trips() {
        let size = vec2(80.0, 40.0);
        let origin = pos2(10.0, 20.0);
        let center = origin + rotate_vec(size / 2.0, 37.0);
        let back = origin_for_center(center, size, 37.0);
        assert!(approx(back.x, origin.x) && approx(back.y, origin.y));
    }
}
