use egui::{Pos2, Rect, pos2, vec2};

/// Static zone description in relative `[0, 1]` canvas units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneSpec {
    pub id: &'static str,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Polygon relative to the zone rectangle; empty for plain rectangles
    pub clip_path: &'static [Pos2],
}

impl ZoneSpec {
    pub fn relative_rect(&self) -> Rect {
        Rect::from_min_size(pos2(self.x, self.y), vec2(self.width, self.height))
    }

    pub fn is_polygon(&self) -> bool {
        !self.clip_path.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub zones: &'static [ZoneSpec],
}

impl GridTemplate {
    /// The template that disables grid mode
    pub fn is_free(&self) -> bool {
        self.zones.is_empty()
    }
}

pub const FREE_TEMPLATE_ID: &str = "none";

const fn rect(id: &'static str, x: f32, y: f32, width: f32, height: f32) -> ZoneSpec {
    ZoneSpec { id, x, y, width, height, clip_path: &[] }
}

const fn poly(id: &'static str, clip_path: &'static [Pos2]) -> ZoneSpec {
    ZoneSpec { id, x: 0.0, y: 0.0, width: 1.0, height: 1.0, clip_path }
}

pub static TEMPLATES: &[GridTemplate] = &[
    GridTemplate { id: FREE_TEMPLATE_ID, name: "Free", zones: &[] },
    GridTemplate {
        id: "2-vertical",
        name: "2 Columns",
        zones: &[rect("left", 0.0, 0.0, 0.5, 1.0), rect("right", 0.5, 0.0, 0.5, 1.0)],
    },
    GridTemplate {
        id: "2-horizontal",
        name: "2 Rows",
        zones: &[rect("top", 0.0, 0.0, 1.0, 0.5), rect("bottom", 0.0, 0.5, 1.0, 0.5)],
    },
    GridTemplate {
        id: "3-horizontal",
        name: "3 Rows",
        zones: &[
            rect("top", 0.0, 0.0, 1.0, 0.333),
            rect("middle", 0.0, 0.333, 1.0, 0.334),
            rect("bottom", 0.0, 0.667, 1.0, 0.333),
        ],
    },
    GridTemplate {
        id: "3-vertical",
        name: "3 Columns",
        zones: &[
            rect("left", 0.0, 0.0, 0.333, 1.0),
            rect("middle", 0.333, 0.0, 0.334, 1.0),
            rect("right", 0.667, 0.0, 0.333, 1.0),
        ],
    },
    GridTemplate {
        id: "grid-2x2",
        name: "Grid 2x2",
        zones: &[
            rect("tl", 0.0, 0.0, 0.5, 0.5),
            rect("tr", 0.5, 0.0, 0.5, 0.5),
            rect("bl", 0.0, 0.5, 0.5, 0.5),
            rect("br", 0.5, 0.5, 0.5, 0.5),
        ],
    },
    GridTemplate {
        id: "grid-3x3",
        name: "Grid 3x3",
        zones: &[
            rect("r1c1", 0.0, 0.0, 0.333, 0.333),
            rect("r1c2", 0.333, 0.0, 0.334, 0.333),
            rect("r1c3", 0.667, 0.0, 0.333, 0.333),
            rect("r2c1", 0.0, 0.333, 0.333, 0.334),
            rect("r2c2", 0.333, 0.333, 0.334, 0.334),
            rect("r2c3", 0.667, 0.333, 0.333, 0.334),
            rect("r3c1", 0.0, 0.667, 0.333, 0.333),
            rect("r3c2", 0.333, 0.667, 0.334, 0.333),
            rect("r3c3", 0.667, 0.667, 0.333, 0.333),
        ],
    },
    GridTemplate {
        id: "grid-2x3",
        name: "Grid 2x3",
        zones: &[
            rect("r1c1", 0.0, 0.0, 0.5, 0.333),
            rect("r1c2", 0.5, 0.0, 0.5, 0.333),
            rect("r2c1", 0.0, 0.333, 0.5, 0.334),
            rect("r2c2", 0.5, 0.333, 0.5, 0.334),
            rect("r3c1", 0.0, 0.667, 0.5, 0.333),
            rect("r3c2", 0.5, 0.667, 0.5, 0.333),
        ],
    },
    GridTemplate {
        id: "grid-3x4",
        name: "Grid 3x4",
        zones: &[
            rect("r1c1", 0.0, 0.0, 0.333, 0.25),
            rect("r1c2", 0.333, 0.0, 0.334, 0.25),
            rect("r1c3", 0.667, 0.0, 0.333, 0.25),
            rect("r2c1", 0.0, 0.25, 0.333, 0.25),
            rect("r2c2", 0.333, 0.25, 0.334, 0.25),
            rect("r2c3", 0.667, 0.25, 0.333, 0.25),
            rect("r3c1", 0.0, 0.5, 0.333, 0.25),
            rect("r3c2", 0.333, 0.5, 0.334, 0.25),
            rect("r3c3", 0.667, 0.5, 0.333, 0.25),
            rect("r4c1", 0.0, 0.75, 0.333, 0.25),
            rect("r4c2", 0.333, 0.75, 0.334, 0.25),
            rect("r4c3", 0.667, 0.75, 0.333, 0.25),
        ],
    },
    GridTemplate {
        id: "hero-left",
        name: "Hero Left",
        zones: &[
            rect("hero", 0.0, 0.0, 0.66, 1.0),
            rect("top", 0.66, 0.0, 0.34, 0.5),
            rect("bottom", 0.66, 0.5, 0.34, 0.5),
        ],
    },
    GridTemplate {
        id: "hero-right",
        name: "Hero Right",
        zones: &[
            rect("top", 0.0, 0.0, 0.34, 0.5),
            rect("bottom", 0.0, 0.5, 0.34, 0.5),
            rect("hero", 0.34, 0.0, 0.66, 1.0),
        ],
    },
    GridTemplate {
        id: "hero-top",
        name: "Hero Top",
        zones: &[
            rect("hero", 0.0, 0.0, 1.0, 0.66),
            rect("left", 0.0, 0.66, 0.5, 0.34),
            rect("right", 0.5, 0.66, 0.5, 0.34),
        ],
    },
    GridTemplate {
        id: "hero-bottom",
        name: "Hero Bottom",
        zones: &[
            rect("left", 0.0, 0.0, 0.5, 0.34),
            rect("right", 0.5, 0.0, 0.5, 0.34),
            rect("hero", 0.0, 0.34, 1.0, 0.66),
        ],
    },
    GridTemplate {
        id: "diagonal-split",
        name: "Diagonal",
        zones: &[
            poly("top-left", &[pos2(0.0, 0.0), pos2(1.0, 0.0), pos2(0.0, 1.0)]),
            poly("bottom-right", &[pos2(1.0, 0.0), pos2(1.0, 1.0), pos2(0.0, 1.0)]),
        ],
    },
    GridTemplate {
        id: "diagonal-inverse",
        name: "Inverse Diagonal",
        zones: &[
            poly("top-right", &[pos2(0.0, 0.0), pos2(1.0, 0.0), pos2(1.0, 1.0)]),
            poly("bottom-left", &[pos2(0.0, 0.0), pos2(0.0, 1.0), pos2(1.0, 1.0)]),
        ],
    },
    GridTemplate {
        id: "diagonal-cross",
        name: "Diagonal Cross",
        zones: &[
            poly("top", &[pos2(0.0, 0.0), pos2(1.0, 0.0), pos2(0.5, 0.5)]),
            poly("right", &[pos2(1.0, 0.0), pos2(1.0, 1.0), pos2(0.5, 0.5)]),
            poly("bottom", &[pos2(1.0, 1.0), pos2(0.0, 1.0), pos2(0.5, 0.5)]),
            poly("left", &[pos2(0.0, 0.0), pos2(0.0, 1.0), pos2(0.5, 0.5)]),
        ],
    },
    GridTemplate {
        id: "zigzag-3",
        name: "Zigzag 3",
        zones: &[
            poly("z1", &[pos2(0.0, 0.0), pos2(0.4, 0.0), pos2(0.6, 0.5), pos2(0.0, 0.5)]),
            poly(
                "z2",
                &[pos2(0.4, 0.0), pos2(1.0, 0.0), pos2(1.0, 1.0), pos2(0.4, 1.0), pos2(0.6, 0.5)],
            ),
            poly("z3", &[pos2(0.0, 0.5), pos2(0.6, 0.5), pos2(0.4, 1.0), pos2(0.0, 1.0)]),
        ],
    },
    GridTemplate {
        id: "broken-mirror",
        name: "Broken Mirror",
        zones: &[
            poly("shard1", &[pos2(0.0, 0.0), pos2(0.3, 0.0), pos2(0.45, 0.4), pos2(0.0, 0.5)]),
            poly("shard2", &[pos2(0.3, 0.0), pos2(0.7, 0.0), pos2(0.55, 0.35), pos2(0.45, 0.4)]),
            poly("shard3", &[pos2(0.7, 0.0), pos2(1.0, 0.0), pos2(1.0, 0.6), pos2(0.55, 0.35)]),
            poly("shard4", &[pos2(0.0, 0.5), pos2(0.45, 0.4), pos2(0.5, 0.7), pos2(0.0, 1.0)]),
            poly(
                "shard5",
                &[pos2(0.45, 0.4), pos2(0.55, 0.35), pos2(1.0, 0.6), pos2(0.6, 1.0), pos2(0.5, 0.7)],
            ),
            poly("shard6", &[pos2(0.0, 1.0), pos2(0.5, 0.7), pos2(0.6, 1.0)]),
            poly("shard7", &[pos2(0.6, 1.0), pos2(1.0, 0.6), pos2(1.0, 1.0)]),
        ],
    },
    GridTemplate {
        id: "lightning",
        name: "Lightning",
        zones: &[
            poly(
                "left",
                &[
                    pos2(0.0, 0.0),
                    pos2(0.4, 0.0),
                    pos2(0.3, 0.3),
                    pos2(0.5, 0.5),
                    pos2(0.35, 0.7),
                    pos2(0.45, 1.0),
                    pos2(0.0, 1.0),
                ],
            ),
            poly(
                "right",
                &[
                    pos2(0.4, 0.0),
                    pos2(1.0, 0.0),
                    pos2(1.0, 1.0),
                    pos2(0.45, 1.0),
                    pos2(0.35, 0.7),
                    pos2(0.5, 0.5),
                    pos2(0.3, 0.3),
                ],
            ),
        ],
    },
];

pub fn list_templates() -> &'static [GridTemplate] {
    TEMPLATES
}

pub fn get_template(id: &str) -> Option<&'static GridTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

pub fn free_template() -> &'static GridTemplate {
    &TEMPLATES[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let ids: HashSet<_> = TEMPLATES.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), TEMPLATES.len());
        for template in TEMPLATES {
            let zone_ids: HashSet<_> = template.zones.iter().map(|z| z.id).collect();
            assert_eq!(zone_ids.len(), template.zones.len(), "{}", template.id);
        }
    }

    #[test]
    fn test_rectangular_templates_cover_the_canvas() {
        for template in TEMPLATES.iter().filter(|t| t.zones.iter().all(|z| !z.is_polygon())) {
            let area: f32 = template.zones.iter().map(|z| z.width * z.height).sum();
            if !template.is_free() {
                assert!((area - 1.0).abs() < 0.01, "{} covers {}", template.id, area);
            }
        }
    }

    #[test]
    fn test_free_template_has_no_zones() {
        assert!(free_template().is_free());
        assert_eq!(get_template(FREE_TEMPLATE_ID).map(|t| t.zones.len()), Some(0));
    }
}
