//! Navigation mesh: graph of walkable sample points.
//!
//! [`NavMeshBuilder`] samples nodes inside every walkable zone (centroid
//! plus an interior grid), adds door and portal nodes on the walls between
//! zones, then connects every pair of same-zone nodes that can see each
//! other. Edge weights are Euclidean distances.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::NavMeshConfig;
use crate::error::MapError;
use crate::geometry::{self, Bounds, Point};
use crate::map::{MapData, WalkableZone};
use crate::validation::{self, Severity};
use crate::walkable::WalkableArea;

pub type NodeId = u32;

/// Where a node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Centroid,
    Interior,
    Portal,
    Door,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavNode {
    pub id: NodeId,
    pub position: Point,
    /// Every walkable zone containing this node (portals sit in two).
    pub zones: Vec<String>,
    pub kind: NodeKind,
}

impl NavNode {
    pub fn in_zone(&self, zone: &str) -> bool {
        self.zones.iter().any(|z| z == zone)
    }
}

/// The built graph. Read-only after construction.
#[derive(Debug, Clone)]
pub struct NavMesh {
    nodes: Vec<NavNode>,
    zone_order: Vec<String>,
    zone_nodes: HashMap<String, Vec<NodeId>>,
    /// Adjacency by node id, sorted by neighbor id.
    edges: Vec<Vec<(NodeId, f32)>>,
    area: Arc<WalkableArea>,
    visibility_step: f32,
}

impl NavMesh {
    pub fn node(&self, id: NodeId) -> Option<&NavNode> {
        self.nodes.get(id as usize)
    }

    pub fn nodes(&self) -> &[NavNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Undirected edge count.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn neighbors(&self, id: NodeId) -> &[(NodeId, f32)] {
        self.edges.get(id as usize).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn edge_weight(&self, a: NodeId, b: NodeId) -> Option<f32> {
        self.neighbors(a).iter().find(|(n, _)| *n == b).map(|&(_, w)| w)
    }

    /// Zone names in map order.
    pub fn zone_names(&self) -> &[String] {
        &self.zone_order
    }

    pub fn zone_nodes(&self, zone: &str) -> &[NodeId] {
        self.zone_nodes.get(zone).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Node positions grouped by zone, for the destination sampler.
    pub fn zone_node_positions(&self) -> HashMap<String, Vec<Point>> {
        self.zone_nodes
            .iter()
            .map(|(zone, ids)| {
                let points = ids.iter().map(|&id| self.nodes[id as usize].position).collect();
                (zone.clone(), points)
            })
            .collect()
    }

    pub fn area(&self) -> &Arc<WalkableArea> {
        &self.area
    }

    pub fn is_walkable(&self, p: &Point) -> bool {
        self.area.is_walkable(p)
    }

    pub fn line_of_sight(&self, a: &Point, b: &Point) -> bool {
        self.area.segment_clear(a, b, self.visibility_step)
    }

    /// Closest node by straight-line distance; ties go to the lower id.
    pub fn nearest_node(&self, p: &Point) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;
        for node in &self.nodes {
            let d = node.position.distance_squared(p);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((node.id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Closest node with a clear straight line from `p`.
    pub fn nearest_visible_node(&self, p: &Point) -> Option<NodeId> {
        let mut by_distance: Vec<(f32, NodeId)> = self
            .nodes
            .iter()
            .map(|n| (n.position.distance_squared(p), n.id))
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        by_distance
            .into_iter()
            .map(|(_, id)| id)
            .find(|&id| self.line_of_sight(p, &self.nodes[id as usize].position))
    }

    /// Number of connected components in the graph.
    pub fn component_count(&self) -> usize {
        let mut seen = vec![false; self.nodes.len()];
        let mut components = 0;
        for start in 0..self.nodes.len() {
            if seen[start] {
                continue;
            }
            components += 1;
            seen[start] = true;
            let mut queue = VecDeque::from([start as NodeId]);
            while let Some(current) = queue.pop_front() {
                for &(next, _) in self.neighbors(current) {
                    if !seen[next as usize] {
                        seen[next as usize] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        components
    }

    /// Whether zones `a` and `b` are joined by an edge or a shared node.
    pub fn zones_connected(&self, a: &str, b: &str) -> bool {
        self.zone_nodes(a).iter().any(|&u| {
            let neighbors = self.neighbors(u);
            if self.nodes[u as usize].in_zone(b) {
                return !neighbors.is_empty();
            }
            neighbors.iter().any(|&(v, _)| self.nodes[v as usize].in_zone(b))
        })
    }
}

/// Builds a [`NavMesh`] from map geometry.
pub struct NavMeshBuilder {
    config: NavMeshConfig,
}

struct ZoneShape {
    name: String,
    vertices: Vec<Point>,
    centroid: Point,
    bounds: Bounds,
}

impl NavMeshBuilder {
    pub fn new(config: NavMeshConfig) -> Self {
        Self { config }
    }

    pub fn build_zones(&self, zones: &[WalkableZone]) -> Result<NavMesh, MapError> {
        self.build(&MapData::with_zones(zones.to_vec()))
    }

    pub fn build(&self, map: &MapData) -> Result<NavMesh, MapError> {
        if map.walkable_zones.is_empty() {
            return Err(MapError::Empty);
        }
        let issues = validation::validate_zones(&map.walkable_zones)
            .into_iter()
            .chain(validation::check_labels(&map.labeled_zones));
        for issue in issues {
            match issue.severity {
                Severity::Error => {
                    if let Some(err) = issue.to_map_error() {
                        return Err(err);
                    }
                }
                Severity::Warning => log::warn!("{}", issue.message),
            }
        }

        let area = Arc::new(WalkableArea::from_map(map));
        let shapes: Vec<ZoneShape> = map
            .walkable_zones
            .iter()
            .enumerate()
            .filter(|(_, z)| z.walkable)
            .map(|(i, z)| ZoneShape {
                name: z.name_or_index(i),
                vertices: z.vertices.clone(),
                centroid: z.interior_centroid(),
                bounds: Bounds::of(&z.vertices),
            })
            .collect();

        let mut positions: Vec<(Point, NodeKind)> = Vec::new();

        // ── Interior samples ──
        for shape in &shapes {
            let samples = self.sample_zone(shape, &area);
            if samples.is_empty() {
                return Err(MapError::NoWalkableInterior {
                    zone: shape.name.clone(),
                });
            }
            positions.extend(samples);
        }

        // ── Doors ──
        for door in &map.doors {
            let p = door.position;
            if area.is_walkable(&p) && shapes.iter().any(|s| geometry::polygon_contains(&p, &s.vertices)) {
                positions.push((p, NodeKind::Door));
            } else {
                log::warn!("Door at ({:.0},{:.0}) is not on walkable ground", p.x, p.y);
            }
        }

        // ── Portals between touching or overlapping zones ──
        let mut adjacent_pairs = Vec::new();
        for i in 0..shapes.len() {
            for j in (i + 1)..shapes.len() {
                let (a, b) = (&shapes[i], &shapes[j]);
                if !a.bounds.intersects(&b.bounds) {
                    continue;
                }
                let walls = geometry::shared_boundaries(&a.vertices, &b.vertices, self.config.min_portal_width);
                let openings: Vec<Point> = if walls.is_empty() {
                    match geometry::overlap_point(&a.vertices, &b.vertices) {
                        Some(p) => self.overlap_opening(p, a, b, &area).into_iter().collect(),
                        None => continue,
                    }
                } else {
                    walls
                        .iter()
                        .flat_map(|(s, e)| self.wall_openings(s, e, &area))
                        .collect()
                };
                adjacent_pairs.push((i, j));
                let has_door = positions.iter().any(|(p, kind)| {
                    *kind == NodeKind::Door
                        && geometry::polygon_contains(p, &a.vertices)
                        && geometry::polygon_contains(p, &b.vertices)
                });
                if has_door {
                    continue;
                }
                if openings.is_empty() {
                    log::warn!("No walkable portal between '{}' and '{}'", a.name, b.name);
                }
                positions.extend(openings.into_iter().map(|p| (p, NodeKind::Portal)));
            }
        }

        // ── Nodes and zone membership ──
        let mut nodes = Vec::with_capacity(positions.len());
        let mut zone_nodes: HashMap<String, Vec<NodeId>> =
            shapes.iter().map(|s| (s.name.clone(), Vec::new())).collect();
        for (idx, (position, kind)) in positions.into_iter().enumerate() {
            let id = idx as NodeId;
            let zones: Vec<String> = shapes
                .iter()
                .filter(|s| s.bounds.contains(&position) && geometry::polygon_contains(&position, &s.vertices))
                .map(|s| s.name.clone())
                .collect();
            for zone in &zones {
                if let Some(list) = zone_nodes.get_mut(zone) {
                    list.push(id);
                }
            }
            nodes.push(NavNode {
                id,
                position,
                zones,
                kind,
            });
        }

        // ── Visibility edges within each zone ──
        let mut edges: Vec<Vec<(NodeId, f32)>> = vec![Vec::new(); nodes.len()];
        let mut linked: HashSet<(NodeId, NodeId)> = HashSet::new();
        for shape in &shapes {
            let ids = &zone_nodes[&shape.name];
            for (k, &u) in ids.iter().enumerate() {
                for &v in &ids[k + 1..] {
                    let key = (u.min(v), u.max(v));
                    if linked.contains(&key) {
                        continue;
                    }
                    let (pu, pv) = (nodes[u as usize].position, nodes[v as usize].position);
                    if area.segment_clear(&pu, &pv, self.config.visibility_step) {
                        let w = pu.distance(&pv);
                        edges[u as usize].push((v, w));
                        edges[v as usize].push((u, w));
                        linked.insert(key);
                    }
                }
            }
        }
        for list in &mut edges {
            list.sort_by_key(|&(n, _)| n);
        }

        let mesh = NavMesh {
            nodes,
            zone_order: shapes.iter().map(|s| s.name.clone()).collect(),
            zone_nodes,
            edges,
            area,
            visibility_step: self.config.visibility_step,
        };

        for (i, j) in adjacent_pairs {
            let (a, b) = (&shapes[i].name, &shapes[j].name);
            if !mesh.zones_connected(a, b) {
                return Err(MapError::DisconnectedZones {
                    a: a.clone(),
                    b: b.clone(),
                });
            }
        }

        log::info!(
            "NavMesh built: {} zones, {} nodes, {} edges, {} components",
            mesh.zone_order.len(),
            mesh.node_count(),
            mesh.edge_count(),
            mesh.component_count()
        );
        Ok(mesh)
    }

    /// One portal per walkable stretch of a shared wall.
    ///
    /// The wall is sampled every `visibility_step`; each run of walkable
    /// samples yields its midpoint, or its middle sample when an obstacle
    /// narrower than the step sits on the midpoint.
    fn wall_openings(&self, start: &Point, end: &Point, area: &WalkableArea) -> Vec<Point> {
        let step = self.config.visibility_step.max(self.config.min_portal_width).max(1.0);
        let count = (start.distance(end) / step).ceil().max(1.0) as usize;
        let pick = |run: &[Point]| {
            let mid = run[0].lerp(&run[run.len() - 1], 0.5);
            if area.is_walkable(&mid) {
                mid
            } else {
                run[run.len() / 2]
            }
        };

        let mut openings = Vec::new();
        let mut run: Vec<Point> = Vec::new();
        for k in 0..=count {
            let p = start.lerp(end, k as f32 / count as f32);
            if area.is_walkable(&p) {
                run.push(p);
            } else if !run.is_empty() {
                openings.push(pick(&run));
                run.clear();
            }
        }
        if !run.is_empty() {
            openings.push(pick(&run));
        }
        openings
    }

    /// A walkable point shared by two overlapping zones, nearest `hint` first.
    fn overlap_opening(&self, hint: Point, a: &ZoneShape, b: &ZoneShape, area: &WalkableArea) -> Option<Point> {
        if area.is_walkable(&hint) {
            return Some(hint);
        }
        let step = self.config.visibility_step.max(1.0);
        let lo = Point::new(a.bounds.min_x.max(b.bounds.min_x), a.bounds.min_y.max(b.bounds.min_y));
        let hi = Point::new(a.bounds.max_x.min(b.bounds.max_x), a.bounds.max_y.min(b.bounds.max_y));
        let mut best: Option<(f32, Point)> = None;
        let mut y = lo.y;
        while y <= hi.y {
            let mut x = lo.x;
            while x <= hi.x {
                let p = Point::new(x, y);
                if geometry::polygon_contains(&p, &a.vertices)
                    && geometry::polygon_contains(&p, &b.vertices)
                    && area.is_walkable(&p)
                {
                    let d = p.distance_squared(&hint);
                    if best.map_or(true, |(bd, _)| d < bd) {
                        best = Some((d, p));
                    }
                }
                x += step;
            }
            y += step;
        }
        best.map(|(_, p)| p)
    }

    /// Centroid (when walkable) plus grid cell centres inside the zone.
    fn sample_zone(&self, shape: &ZoneShape, area: &WalkableArea) -> Vec<(Point, NodeKind)> {
        let spacing = self.config.grid_spacing.max(1.0);
        let inside = |p: &Point| geometry::polygon_contains(p, &shape.vertices) && area.is_walkable(p);

        let mut samples = Vec::new();
        if inside(&shape.centroid) {
            samples.push((shape.centroid, NodeKind::Centroid));
        }

        let b = shape.bounds;
        let mut y = b.min_y + spacing / 2.0;
        while y < b.max_y {
            let mut x = b.min_x + spacing / 2.0;
            while x < b.max_x {
                let p = Point::new(x, y);
                if inside(&p) && p.distance(&shape.centroid) > spacing / 2.0 {
                    samples.push((p, NodeKind::Interior));
                }
                x += spacing;
            }
            y += spacing;
        }

        if samples.is_empty() {
            let fallback = geometry::interior_point(&shape.vertices);
            if inside(&fallback) {
                samples.push((fallback, NodeKind::Interior));
            }
        }
        samples
    }
}

impl Default for NavMeshBuilder {
    fn default() -> Self {
        Self::new(NavMeshConfig::default())
    }
}
