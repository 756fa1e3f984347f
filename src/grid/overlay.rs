use egui::{Color32, Pos2, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::GridZone;

const ZIGZAG_AMPLITUDE: f32 = 5.0;
const ZIGZAG_STEP: f32 = 15.0;

const DASHED: &[f32] = &[10.0, 5.0];
const DOTTED: &[f32] = &[2.0, 4.0];
const DASH_DOT: &[f32] = &[10.0, 5.0, 2.0, 5.0];
const LONG_DASH: &[f32] = &[20.0, 8.0];
const ZIGZAG_DASH: &[f32] = &[8.0, 4.0, 4.0, 4.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineStyle {
    Solid,
    #[default]
    Dashed,
    Dotted,
    DashDot,
    LongDash,
    Zigzag,
}

impl LineStyle {
    /// On/off lengths in px, `None` for a continuous line
    pub fn dash_pattern(self) -> Option<&'static [f32]> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some(DASHED),
            LineStyle::Dotted => Some(DOTTED),
            LineStyle::DashDot => Some(DASH_DOT),
            LineStyle::LongDash => Some(LONG_DASH),
            LineStyle::Zigzag => Some(ZIGZAG_DASH),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLineSettings {
    pub visible: bool,
    pub color: Color32,
    pub width: f32,
    pub style: LineStyle,
}

impl Default for GridLineSettings {
    fn default() -> Self {
        Self {
            visible: true,
            color: Color32::from_rgb(0x63, 0x66, 0xf1),
            width: 2.0,
            style: LineStyle::default(),
        }
    }
}

impl GridLineSettings {
    /// Points of the polyline drawn for one overlay edge
    pub fn polyline(&self, segment: Segment) -> Vec<Pos2> {
        match self.style {
            LineStyle::Zigzag => zigzag_points(segment.a, segment.b, ZIGZAG_AMPLITUDE, ZIGZAG_STEP),
            _ => vec![segment.a, segment.b],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Pos2,
    pub b: Pos2,
}

type Point = (i64, i64);

fn rounded(p: Pos2) -> Point {
    (p.x.round() as i64, p.y.round() as i64)
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 { a.abs() } else { gcd(b, a % b) }
}

/// Reduced direction and offset of the infinite line through `a` and `b`.
/// Collinear segments share a key.
fn line_key(a: Point, b: Point) -> (Point, i64) {
    let (mut dx, mut dy) = (b.0 - a.0, b.1 - a.1);
    let g = gcd(dx, dy);
    dx /= g;
    dy /= g;
    if dx < 0 || (dx == 0 && dy < 0) {
        dx = -dx;
        dy = -dy;
    }
    ((dx, dy), dy * a.0 - dx * a.1)
}

/// Every zone outline edge, with borders shared by neighbouring zones drawn
/// once: collinear edges that overlap or touch merge into one segment.
pub fn overlay_edges(zones: &[GridZone], canvas: Vec2) -> Vec<Segment> {
    let mut lines: BTreeMap<(Point, i64), Vec<(i64, Point, i64, Point)>> = BTreeMap::new();
    for zone in zones {
        let outline = zone.outline(canvas);
        for (i, a) in outline.iter().enumerate() {
            let (a, b) = (rounded(*a), rounded(outline[(i + 1) % outline.len()]));
            if a == b {
                continue;
            }
            let key = line_key(a, b);
            let (dx, dy) = key.0;
            let (ta, tb) = (dx * a.0 + dy * a.1, dx * b.0 + dy * b.1);
            let span = if ta <= tb { (ta, a, tb, b) } else { (tb, b, ta, a) };
            lines.entry(key).or_default().push(span);
        }
    }

    let mut segments = Vec::new();
    for mut spans in lines.into_values() {
        spans.sort();
        let mut current: Option<(i64, Point, i64, Point)> = None;
        for span in spans {
            current = match current {
                Some(mut open) if span.0 <= open.2 => {
                    if span.2 > open.2 {
                        open.2 = span.2;
                        open.3 = span.3;
                    }
                    Some(open)
                }
                Some(done) => {
                    segments.push(to_segment(done));
                    Some(span)
                }
                None => Some(span),
            };
        }
        segments.extend(current.map(to_segment));
    }
    segments
}

fn to_segment((_, a, _, b): (i64, Point, i64, Point)) -> Segment {
    Segment {
        a: pos2(a.0 as f32, a.1 as f32),
        b: pos2(b.0 as f32, b.1 as f32),
    }
}

/// Zigzag polyline from `a` to `b`, alternating `amplitude` either side of the
/// line every `step` px
pub fn zigzag_points(a: Pos2, b: Pos2, amplitude: f32, step: f32) -> Vec<Pos2> {
    let delta = b - a;
    let length = delta.length();
    if length == 0.0 || step <= 0.0 {
        return vec![a, b];
    }

    let unit = delta / length;
    let perpendicular = vec2(-unit.y, unit.x);
    let mut points = vec![a];
    let mut travelled = step;
    let mut up = true;
    while travelled < length {
        let offset = if up { amplitude } else { -amplitude };
        points.push(a + unit * travelled + perpendicular * offset);
        up = !up;
        travelled += step;
    }
    points.push(b);
    points
}
