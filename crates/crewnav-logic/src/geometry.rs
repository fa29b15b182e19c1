//! Planar geometry over zone polygons.
//!
//! Polygons are plain `&[Point]` slices (implicitly closed). Everything here
//! is a pure function: containment, area, centroids, segment tests and the
//! shared-boundary search the navmesh builder uses to find portals.

use serde::{Deserialize, Serialize};

/// Distance under which a point counts as lying on a polygon edge.
pub const EDGE_TOLERANCE: f32 = 1e-3;

/// Cross products smaller than this are treated as collinear.
const CROSS_EPSILON: f32 = 1e-4;

/// 2D map coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Linear interpolation: `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Point at `radius` from `self` in direction `angle` (radians).
    pub fn offset_polar(&self, angle: f32, radius: f32) -> Self {
        Self {
            x: self.x + angle.cos() * radius,
            y: self.y + angle.sin() * radius,
        }
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Bounding box of a vertex list. Empty input gives a zero box at the origin.
    pub fn of(vertices: &[Point]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::default();
        };
        vertices.iter().skip(1).fold(
            Self {
                min_x: first.x,
                min_y: first.y,
                max_x: first.x,
                max_y: first.y,
            },
            |b, p| Self {
                min_x: b.min_x.min(p.x),
                min_y: b.min_y.min(p.y),
                max_x: b.max_x.max(p.x),
                max_y: b.max_y.max(p.y),
            },
        )
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min_x - EDGE_TOLERANCE
            && p.x <= self.max_x + EDGE_TOLERANCE
            && p.y >= self.min_y - EDGE_TOLERANCE
            && p.y <= self.max_y + EDGE_TOLERANCE
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x + EDGE_TOLERANCE
            && other.min_x <= self.max_x + EDGE_TOLERANCE
            && self.min_y <= other.max_y + EDGE_TOLERANCE
            && other.min_y <= self.max_y + EDGE_TOLERANCE
    }

    /// Box with the same center, scaled by `fraction` on each axis.
    pub fn scaled(&self, fraction: f32) -> Self {
        let c = self.center();
        let hw = self.width() * fraction / 2.0;
        let hh = self.height() * fraction / 2.0;
        Self {
            min_x: c.x - hw,
            min_y: c.y - hh,
            max_x: c.x + hw,
            max_y: c.y + hh,
        }
    }

    /// Shortest distance from `p` to the box (zero inside).
    pub fn distance_to(&self, p: &Point) -> f32 {
        let dx = (self.min_x - p.x).max(0.0).max(p.x - self.max_x);
        let dy = (self.min_y - p.y).max(0.0).max(p.y - self.max_y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Largest distance from `p` to any point of the box.
    pub fn farthest_distance(&self, p: &Point) -> f32 {
        let dx = (p.x - self.min_x).abs().max((p.x - self.max_x).abs());
        let dy = (p.y - self.min_y).abs().max((p.y - self.max_y).abs());
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle polygon, corners in counter-clockwise order.
pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Vec<Point> {
    vec![
        Point::new(x, y),
        Point::new(x + width, y),
        Point::new(x + width, y + height),
        Point::new(x, y + height),
    ]
}

/// Shoelace area; positive for counter-clockwise winding.
pub fn signed_area(vertices: &[Point]) -> f32 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

pub fn polygon_area(vertices: &[Point]) -> f32 {
    signed_area(vertices).abs()
}

/// Even-odd ray cast. Points exactly on an edge may land either way;
/// use [`polygon_contains`] when the boundary must count as inside.
pub fn point_in_polygon(p: &Point, vertices: &[Point]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

pub fn distance_to_segment(p: &Point, a: &Point, b: &Point) -> f32 {
    let ab = *b - *a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len_sq).clamp(0.0, 1.0);
    p.distance(&a.lerp(b, t))
}

pub fn on_boundary(p: &Point, vertices: &[Point], tolerance: f32) -> bool {
    edges(vertices).any(|(a, b)| distance_to_segment(p, &a, &b) <= tolerance)
}

/// Inside-or-on-boundary test.
pub fn polygon_contains(p: &Point, vertices: &[Point]) -> bool {
    point_in_polygon(p, vertices) || on_boundary(p, vertices, EDGE_TOLERANCE)
}

/// Iterate the closed edge list `(v[i], v[i+1])`, wrapping at the end.
pub fn edges(vertices: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| (vertices[i], vertices[(i + 1) % n]))
}

/// Area-weighted centroid. Falls back to the vertex mean for zero-area input.
pub fn centroid(vertices: &[Point]) -> Point {
    if vertices.is_empty() {
        return Point::ZERO;
    }
    let area = signed_area(vertices);
    if area.abs() <= f32::EPSILON {
        let n = vertices.len() as f32;
        let sum = vertices.iter().fold(Point::ZERO, |acc, p| acc + *p);
        return sum * (1.0 / n);
    }
    let (mut cx, mut cy) = (0.0, 0.0);
    for (a, b) in edges(vertices) {
        let cross = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    Point::new(cx / (6.0 * area), cy / (6.0 * area))
}

/// A point guaranteed inside (or on) the polygon.
///
/// The centroid when it is contained; otherwise the midpoint of the first
/// interior span of a horizontal scanline, trying the middle, then the
/// quartiles of the bounding box.
pub fn interior_point(vertices: &[Point]) -> Point {
    let c = centroid(vertices);
    if polygon_contains(&c, vertices) {
        return c;
    }
    let b = Bounds::of(vertices);
    for fraction in [0.5, 0.25, 0.75, 0.1, 0.9] {
        let y = b.min_y + b.height() * fraction;
        let mut crossings: Vec<f32> = edges(vertices)
            .filter(|(a, b)| (a.y > y) != (b.y > y))
            .map(|(a, b)| (b.x - a.x) * (y - a.y) / (b.y - a.y) + a.x)
            .collect();
        crossings.sort_by(|a, b| a.total_cmp(b));
        if crossings.len() >= 2 {
            let candidate = Point::new((crossings[0] + crossings[1]) / 2.0, y);
            if polygon_contains(&candidate, vertices) {
                return candidate;
            }
        }
    }
    vertices.first().copied().unwrap_or(Point::ZERO)
}

fn cross(a: &Point, b: &Point, c: &Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Proper crossing of segments `ab` and `cd`. Touching at an endpoint or
/// running collinear does not count.
pub fn segments_intersect(a: &Point, b: &Point, c: &Point, d: &Point) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    let straddles = |p: f32, q: f32| {
        (p > CROSS_EPSILON && q < -CROSS_EPSILON) || (p < -CROSS_EPSILON && q > CROSS_EPSILON)
    };
    straddles(d1, d2) && straddles(d3, d4)
}

/// Crossing point of two properly intersecting segments.
pub fn segment_intersection(a: &Point, b: &Point, c: &Point, d: &Point) -> Option<Point> {
    if !segments_intersect(a, b, c, d) {
        return None;
    }
    let r = *b - *a;
    let s = *d - *c;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() <= f32::EPSILON {
        return None;
    }
    let t = ((c.x - a.x) * s.y - (c.y - a.y) * s.x) / denom;
    Some(a.lerp(b, t))
}

/// No two non-adjacent edges cross.
pub fn is_simple(vertices: &[Point]) -> bool {
    let n = vertices.len();
    if n < 4 {
        return n == 3;
    }
    for i in 0..n {
        let (a, b) = (vertices[i], vertices[(i + 1) % n]);
        for j in (i + 2)..n {
            // First and last edges share vertex 0
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (vertices[j], vertices[(j + 1) % n]);
            if segments_intersect(&a, &b, &c, &d) {
                return false;
            }
        }
    }
    true
}

/// Every collinear overlap between an edge of `a` and an edge of `b` that is
/// at least `min_length` long, in edge order.
pub fn shared_boundaries(a: &[Point], b: &[Point], min_length: f32) -> Vec<(Point, Point)> {
    let mut walls = Vec::new();
    for (p, q) in edges(a) {
        let dir = q - p;
        let len = dir.length();
        if len <= f32::EPSILON {
            continue;
        }
        let unit = dir * (1.0 / len);
        for (r, s) in edges(b) {
            // Both endpoints of the other edge must sit on this edge's line
            let off_r = ((r.x - p.x) * unit.y - (r.y - p.y) * unit.x).abs();
            let off_s = ((s.x - p.x) * unit.y - (s.y - p.y) * unit.x).abs();
            if off_r > EDGE_TOLERANCE * 10.0 || off_s > EDGE_TOLERANCE * 10.0 {
                continue;
            }
            let tr = (r.x - p.x) * unit.x + (r.y - p.y) * unit.y;
            let ts = (s.x - p.x) * unit.x + (s.y - p.y) * unit.y;
            let lo = tr.min(ts).max(0.0);
            let hi = tr.max(ts).min(len);
            if hi - lo >= min_length {
                walls.push((p + unit * lo, p + unit * hi));
            }
        }
    }
    walls
}

/// Longest collinear overlap between an edge of `a` and an edge of `b`.
///
/// Returns the overlap's endpoints when two polygons share a wall at least
/// `min_length` long.
pub fn shared_boundary(a: &[Point], b: &[Point], min_length: f32) -> Option<(Point, Point)> {
    let mut best: Option<(Point, Point)> = None;
    for (s, e) in shared_boundaries(a, b, min_length) {
        if best.map_or(true, |(bs, be)| s.distance(&e) > bs.distance(&be)) {
            best = Some((s, e));
        }
    }
    best
}

/// A representative point of the region where two polygons overlap.
pub fn overlap_point(a: &[Point], b: &[Point]) -> Option<Point> {
    let mut candidates: Vec<Point> = Vec::new();
    candidates.extend(a.iter().filter(|p| point_in_polygon(p, b)).copied());
    candidates.extend(b.iter().filter(|p| point_in_polygon(p, a)).copied());
    for (p, q) in edges(a) {
        for (r, s) in edges(b) {
            if let Some(x) = segment_intersection(&p, &q, &r, &s) {
                candidates.push(x);
            }
        }
    }
    let first = *candidates.first()?;
    let mean = candidates.iter().fold(Point::ZERO, |acc, p| acc + *p) * (1.0 / candidates.len() as f32);
    if polygon_contains(&mean, a) && polygon_contains(&mean, b) {
        Some(mean)
    } else {
        Some(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Vec<Point> {
        // ┌─┐
        // │ └──┐
        // └────┘
        vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ]
    }

    #[test]
    fn test_rect_area_and_winding() {
        let r = rect(0.0, 0.0, 10.0, 5.0);
        assert!((signed_area(&r) - 50.0).abs() < 1e-4);
        let mut cw = r.clone();
        cw.reverse();
        assert!((signed_area(&cw) + 50.0).abs() < 1e-4);
        assert!((polygon_area(&cw) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_point_in_polygon() {
        let poly = l_shape();
        assert!(point_in_polygon(&Point::new(5.0, 5.0), &poly));
        assert!(point_in_polygon(&Point::new(25.0, 5.0), &poly));
        assert!(!point_in_polygon(&Point::new(20.0, 20.0), &poly));
        assert!(!point_in_polygon(&Point::new(-1.0, 5.0), &poly));
    }

    #[test]
    fn test_boundary_counts_as_contained() {
        let r = rect(0.0, 0.0, 10.0, 10.0);
        assert!(polygon_contains(&Point::new(10.0, 5.0), &r));
        assert!(polygon_contains(&Point::new(0.0, 0.0), &r));
        assert!(!polygon_contains(&Point::new(10.1, 5.0), &r));
    }

    #[test]
    fn test_centroid_of_rect() {
        let c = centroid(&rect(10.0, 20.0, 40.0, 20.0));
        assert!((c.x - 30.0).abs() < 1e-3);
        assert!((c.y - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_interior_point_of_concave_polygon() {
        // U shape whose centroid falls in the notch
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 5.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ];
        let p = interior_point(&u);
        assert!(polygon_contains(&p, &u));
    }

    #[test]
    fn test_segments_intersect() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 10.0);
        let c = Point::new(0.0, 10.0);
        let d = Point::new(10.0, 0.0);
        assert!(segments_intersect(&a, &b, &c, &d));
        let x = segment_intersection(&a, &b, &c, &d).unwrap();
        assert!((x.x - 5.0).abs() < 1e-3 && (x.y - 5.0).abs() < 1e-3);

        // Touching at an endpoint is not a crossing
        assert!(!segments_intersect(&a, &b, &b, &Point::new(20.0, 0.0)));
        // Collinear overlap is not a crossing
        assert!(!segments_intersect(&a, &b, &Point::new(5.0, 5.0), &Point::new(15.0, 15.0)));
    }

    #[test]
    fn test_bowtie_is_not_simple() {
        let bowtie = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        assert!(!is_simple(&bowtie));
        assert!(is_simple(&l_shape()));
        assert!(is_simple(&rect(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_shared_boundary_between_adjacent_rects() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(10.0, 4.0, 10.0, 4.0);
        let (s, e) = shared_boundary(&a, &b, 0.5).unwrap();
        let mid = s.lerp(&e, 0.5);
        assert!((mid.x - 10.0).abs() < 1e-3);
        assert!((mid.y - 6.0).abs() < 1e-3);
        assert!((s.distance(&e) - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_shared_boundaries_finds_every_wall() {
        // A U-shaped room wrapped around a square on three sides
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ];
        let inner = rect(10.0, 10.0, 10.0, 20.0);
        let walls = shared_boundaries(&u, &inner, 0.5);
        assert_eq!(walls.len(), 3);
        let (s, e) = shared_boundary(&u, &inner, 0.5).unwrap();
        assert!((s.distance(&e) - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_shared_boundary_for_corner_touch() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(10.0, 10.0, 10.0, 10.0);
        assert!(shared_boundary(&a, &b, 0.5).is_none());
    }

    #[test]
    fn test_overlap_point_inside_both() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 10.0, 10.0);
        let p = overlap_point(&a, &b).unwrap();
        assert!(polygon_contains(&p, &a));
        assert!(polygon_contains(&p, &b));
        assert!(overlap_point(&a, &rect(50.0, 50.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn test_bounds_distances() {
        let b = Bounds::of(&rect(0.0, 0.0, 10.0, 10.0));
        assert_eq!(b.distance_to(&Point::new(5.0, 5.0)), 0.0);
        assert!((b.distance_to(&Point::new(13.0, 14.0)) - 5.0).abs() < 1e-4);
        assert!((b.farthest_distance(&Point::new(0.0, 0.0)) - 200f32.sqrt()).abs() < 1e-3);
        let inner = b.scaled(0.5);
        assert!((inner.width() - 5.0).abs() < 1e-4);
        assert_eq!(inner.center(), b.center());
    }
}
