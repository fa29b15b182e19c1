//! The global walkability test shared by the navmesh and the samplers.
//!
//! A point is walkable iff it lies inside (or on) some walkable zone
//! polygon and strictly outside every obstacle polygon.

use crate::geometry::{self, Bounds, Point};
use crate::map::MapData;

#[derive(Debug, Clone)]
struct Region {
    vertices: Vec<Point>,
    bounds: Bounds,
}

impl Region {
    fn new(vertices: Vec<Point>) -> Self {
        let bounds = Bounds::of(&vertices);
        Self { vertices, bounds }
    }
}

/// Union of walkable zones minus obstacles.
#[derive(Debug, Clone)]
pub struct WalkableArea {
    zones: Vec<Region>,
    obstacles: Vec<Region>,
}

impl WalkableArea {
    pub fn new(zones: Vec<Vec<Point>>, obstacles: Vec<Vec<Point>>) -> Self {
        Self {
            zones: zones.into_iter().map(Region::new).collect(),
            obstacles: obstacles.into_iter().map(Region::new).collect(),
        }
    }

    pub fn from_map(map: &MapData) -> Self {
        let zones = map
            .walkable_zones
            .iter()
            .filter(|z| z.walkable)
            .map(|z| z.vertices.clone())
            .collect();
        Self::new(zones, map.obstacle_polygons())
    }

    pub fn in_any_zone(&self, p: &Point) -> bool {
        self.zones
            .iter()
            .any(|z| z.bounds.contains(p) && geometry::polygon_contains(p, &z.vertices))
    }

    pub fn in_obstacle(&self, p: &Point) -> bool {
        self.obstacles
            .iter()
            .any(|o| o.bounds.contains(p) && geometry::point_in_polygon(p, &o.vertices))
    }

    pub fn is_walkable(&self, p: &Point) -> bool {
        self.in_any_zone(p) && !self.in_obstacle(p)
    }

    /// Line of sight: both ends walkable, no obstacle edge crossed, and every
    /// sample along the segment (at most `step` apart) walkable.
    pub fn segment_clear(&self, a: &Point, b: &Point, step: f32) -> bool {
        if !self.is_walkable(a) || !self.is_walkable(b) {
            return false;
        }
        let seg = Bounds::of(&[*a, *b]);
        for o in &self.obstacles {
            if !o.bounds.intersects(&seg) {
                continue;
            }
            if geometry::edges(&o.vertices).any(|(c, d)| geometry::segments_intersect(a, b, &c, &d)) {
                return false;
            }
        }
        let len = a.distance(b);
        let samples = (len / step.max(0.01)).ceil() as usize;
        (1..samples).all(|i| self.is_walkable(&a.lerp(b, i as f32 / samples as f32)))
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }
}
