//! Grid layouts: zone templates, zone/canvas mapping and element assignment.

use egui::{Pos2, Rect, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};

mod overlay;
mod templates;

pub use overlay::{GridLineSettings, LineStyle, Segment, overlay_edges, zigzag_points};
pub use templates::{
    FREE_TEMPLATE_ID, GridTemplate, TEMPLATES, ZoneSpec, free_template, get_template, list_templates,
};

use crate::error::{CollageError, Result};
use crate::id_generator::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    #[default]
    Free,
    Grid,
}

/// A live zone of the selected template plus its element back-reference
#[derive(Debug, Clone, PartialEq)]
pub struct GridZone {
    spec: &'static ZoneSpec,
    pub element_id: Option<ElementId>,
}

impl GridZone {
    pub fn id(&self) -> &'static str {
        self.spec.id
    }

    pub fn spec(&self) -> &'static ZoneSpec {
        self.spec
    }

    pub fn is_empty(&self) -> bool {
        self.element_id.is_none()
    }

    /// `(x*cw, y*ch, w*cw, h*ch)`
    pub fn absolute_rect(&self, canvas: Vec2) -> Rect {
        let rel = self.spec.relative_rect();
        Rect::from_min_size(
            pos2(rel.min.x * canvas.x, rel.min.y * canvas.y),
            vec2(rel.width() * canvas.x, rel.height() * canvas.y),
        )
    }

    /// Zone-local position to canvas position
    pub fn to_canvas(&self, local: Pos2, canvas: Vec2) -> Pos2 {
        self.absolute_rect(canvas).min + local.to_vec2()
    }

    /// Canvas position to zone-local position
    pub fn to_local(&self, point: Pos2, canvas: Vec2) -> Pos2 {
        (point - self.absolute_rect(canvas).min).to_pos2()
    }

    /// Canvas-space outline: the clip polygon when present, else the rectangle corners
    pub fn outline(&self, canvas: Vec2) -> Vec<Pos2> {
        let abs = self.absolute_rect(canvas);
        if self.spec.is_polygon() {
            self.spec
                .clip_path
                .iter()
                .map(|p| abs.min + vec2(p.x * abs.width(), p.y * abs.height()))
                .collect()
        } else {
            vec![abs.left_top(), abs.right_top(), abs.right_bottom(), abs.left_bottom()]
        }
    }

    /// Anchor for the empty-zone affordance
    pub fn centroid(&self, canvas: Vec2) -> Pos2 {
        if !self.spec.is_polygon() {
            return self.absolute_rect(canvas).center();
        }
        let outline = self.outline(canvas);
        let sum = outline.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
        (sum / outline.len() as f32).to_pos2()
    }

    /// Whether a canvas point lies inside the zone's clip region
    pub fn contains(&self, point: Pos2, canvas: Vec2) -> bool {
        if !self.spec.is_polygon() {
            return self.absolute_rect(canvas).contains(point);
        }
        point_in_polygon(point, &self.outline(canvas))
    }
}

/// Even-odd ray casting
pub(crate) fn point_in_polygon(point: Pos2, polygon: &[Pos2]) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let cross_x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Cover-fit placement of a `size` image into `zone`: returns the top-left
/// origin and the uniform scale. Overflow is left to render-time clipping.
pub fn cover_fit(zone: Rect, size: Vec2) -> (Pos2, f32) {
    let scale = (zone.width() / size.x).max(zone.height() / size.y);
    let origin = pos2(
        zone.min.x + (zone.width() - size.x * scale) / 2.0,
        zone.min.y + (zone.height() - size.y * scale) / 2.0,
    );
    (origin, scale)
}

/// Zone with the centre nearest to `point`; the first one wins ties
pub fn find_closest_zone<'a>(point: Pos2, zones: &'a [GridZone], canvas: Vec2) -> Option<&'a GridZone> {
    zones
        .iter()
        .map(|zone| (zone, zone.absolute_rect(canvas).center().distance(point)))
        .fold(None, |best: Option<(&GridZone, f32)>, (zone, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((zone, distance)),
        })
        .map(|(zone, _)| zone)
}

/// Selected template and zone assignments. Assignments are non-owning
/// references into the document's element list.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    template: &'static GridTemplate,
    zones: Vec<GridZone>,
    pub line_settings: GridLineSettings,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl GridLayout {
    pub fn new() -> Self {
        Self {
            template: free_template(),
            zones: Vec::new(),
            line_settings: GridLineSettings::default(),
        }
    }

    pub fn template(&self) -> &'static GridTemplate {
        self.template
    }

    pub fn zones(&self) -> &[GridZone] {
        &self.zones
    }

    pub fn is_active(&self) -> bool {
        !self.zones.is_empty()
    }

    pub fn zone(&self, zone_id: &str) -> Option<&GridZone> {
        self.zones.iter().find(|z| z.id() == zone_id)
    }

    pub fn zone_of(&self, element_id: &ElementId) -> Option<&GridZone> {
        self.zones.iter().find(|z| z.element_id.as_ref() == Some(element_id))
    }

    pub fn is_assigned(&self, element_id: &ElementId) -> bool {
        self.zone_of(element_id).is_some()
    }

    /// Switch template. Assignments survive where the new template has a
    /// zone with the same id; the dropped ones are returned.
    pub fn select_template(&mut self, template_id: &str) -> Result<Vec<ElementId>> {
        let template =
            get_template(template_id).ok_or_else(|| CollageError::UnknownTemplate(template_id.to_owned()))?;

        let previous = std::mem::take(&mut self.zones);
        let mut zones: Vec<GridZone> = template
            .zones
            .iter()
            .map(|spec| GridZone { spec, element_id: None })
            .collect();

        let mut dropped = Vec::new();
        for old in previous {
            let Some(element_id) = old.element_id else { continue };
            match zones.iter_mut().find(|z| z.id() == old.spec.id) {
                Some(zone) => zone.element_id = Some(element_id),
                None => dropped.push(element_id),
            }
        }

        log::info!(
            "Selected grid template {} ({} zones, {} assignments dropped)",
            template.id,
            zones.len(),
            dropped.len()
        );
        self.template = template;
        self.zones = zones;
        Ok(dropped)
    }

    /// Put `element_id` into `zone_id`, replacing any previous occupant and
    /// releasing any other zone the element held. Returns the displaced
    /// occupant, or `None` for an unknown zone.
    pub(crate) fn assign(&mut self, zone_id: &str, element_id: &ElementId) -> Option<Option<ElementId>> {
        if self.zone(zone_id).is_none() {
            log::warn!("Assignment to unknown zone {}", zone_id);
            return None;
        }

        for zone in self.zones.iter_mut().filter(|z| z.id() != zone_id) {
            if zone.element_id.as_ref() == Some(element_id) {
                log::debug!("Releasing {} from zone {}", element_id, zone.id());
                zone.element_id = None;
            }
        }

        let zone = self.zones.iter_mut().find(|z| z.id() == zone_id)?;
        let displaced = zone.element_id.replace(element_id.clone()).filter(|old| old != element_id);
        if let Some(old) = &displaced {
            log::debug!("Zone {} now holds {}, displacing {}", zone_id, element_id, old);
        }
        Some(displaced)
    }

    pub fn remove_from_zone(&mut self, zone_id: &str) -> Option<ElementId> {
        self.zones
            .iter_mut()
            .find(|z| z.id() == zone_id)
            .and_then(|z| z.element_id.take())
    }

    /// Clear every zone pointing at `element_id`
    pub fn release(&mut self, element_id: &ElementId) -> bool {
        let mut released = false;
        for zone in self.zones.iter_mut() {
            if zone.element_id.as_ref() == Some(element_id) {
                zone.element_id = None;
                released = true;
            }
        }
        released
    }

    pub fn clear_assignments(&mut self) {
        for zone in self.zones.iter_mut() {
            zone.element_id = None;
        }
    }

    pub(crate) fn restore_assignment(&mut self, zone_id: &str, element_id: ElementId) -> bool {
        match self.zones.iter_mut().find(|z| z.id() == zone_id) {
            Some(zone) => {
                zone.element_id = Some(element_id);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Vec2 = vec2(1000.0, 500.0);

    fn layout(template: &str) -> GridLayout {
        let mut layout = GridLayout::new();
        layout.select_template(template).unwrap();
        layout
    }

    #[test]
    fn test_absolute_zone() {
        let layout = layout("grid-2x2");
        let br = layout.zone("br").unwrap().absolute_rect(CANVAS);
        assert_eq!(br, Rect::from_min_size(pos2(500.0, 250.0), vec2(500.0, 250.0)));
    }

    #[test]
    fn test_closest_zone_at_centre_is_that_zone() {
        let layout = layout("grid-3x3");
        for zone in layout.zones() {
            let centre = zone.absolute_rect(CANVAS).center();
            assert_eq!(find_closest_zone(centre, layout.zones(), CANVAS).map(|z| z.id()), Some(zone.id()));
        }
        assert!(find_closest_zone(pos2(0.0, 0.0), &[], CANVAS).is_none());
    }

    #[test]
    fn test_cover_fit_centres_overflow() {
        let zone = Rect::from_min_size(pos2(0.0, 0.0), vec2(200.0, 100.0));
        let (origin, scale) = cover_fit(zone, vec2(100.0, 100.0));
        assert_eq!(scale, 2.0);
        assert_eq!(origin, pos2(0.0, -50.0));
    }

    #[test]
    fn test_polygon_centroid_and_containment() {
        let layout = layout("diagonal-split");
        let top_left = layout.zone("top-left").unwrap();
        let centroid = top_left.centroid(CANVAS);
        assert!((centroid.x - 1000.0 / 3.0).abs() < 1e-3);
        assert!((centroid.y - 500.0 / 3.0).abs() < 1e-3);
        assert!(top_left.contains(pos2(100.0, 100.0), CANVAS));
        assert!(!top_left.contains(pos2(900.0, 450.0), CANVAS));
        assert!(layout.zone("bottom-right").unwrap().contains(pos2(900.0, 450.0), CANVAS));
    }

    #[test]
    fn test_assign_replaces_and_moves() {
        let mut layout = layout("grid-2x2");
        let a = ElementId::from("a");
        let b = ElementId::from("b");

        assert_eq!(layout.assign("tl", &a), Some(None));
        assert_eq!(layout.assign("br", &a), Some(None));
        assert!(layout.zone("tl").unwrap().is_empty());
        assert_eq!(layout.assign("br", &b), Some(Some(a.clone())));
        assert!(!layout.is_assigned(&a));
        assert_eq!(layout.assign("nope", &a), None);
    }

    #[test]
    fn test_template_switch_keeps_matching_zone_ids() {
        let mut layout = layout("2-vertical");
        layout.assign("left", &ElementId::from("a"));
        layout.assign("right", &ElementId::from("b"));

        let dropped = layout.select_template("3-vertical").unwrap();
        assert_eq!(dropped, Vec::<ElementId>::new());
        assert_eq!(layout.zone("left").unwrap().element_id, Some(ElementId::from("a")));

        let dropped = layout.select_template("2-horizontal").unwrap();
        assert_eq!(dropped.len(), 2);
        assert!(layout.zones().iter().all(GridZone::is_empty));

        assert!(layout.select_template("missing").is_err());
        assert_eq!(layout.template().id, "2-horizontal");
    }

    #[test]
    fn test_zone_local_mapping() {
        let layout = layout("grid-2x2");
        let zone = layout.zone("br").unwrap();
        let local = zone.to_local(pos2(510.0, 260.0), CANVAS);
        assert_eq!(local, pos2(10.0, 10.0));
        assert_eq!(zone.to_canvas(local, CANVAS), pos2(510.0, 260.0));
    }
}
