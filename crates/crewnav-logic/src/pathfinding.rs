//! A* pathfinding over the navigation mesh.
//!
//! `Pathfinder` snaps arbitrary points onto the mesh, searches with a
//! Euclidean heuristic, and keeps a bounded FIFO cache of node routes.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::sync::Arc;

use crate::geometry::Point;
use crate::navmesh::{NavMesh, NodeId};

/// Waypoints closer than this are merged.
const DUPLICATE_EPSILON: f32 = 1e-3;

/// A route from start to goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Start, the node positions along the route, then the goal.
    pub waypoints: Vec<Point>,
    /// Mesh nodes visited, in order.
    pub nodes: Vec<NodeId>,
    /// Summed edge weight of the node route.
    pub cost: f32,
}

impl Path {
    /// Polyline length through all waypoints.
    pub fn length(&self) -> f32 {
        self.waypoints.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }
}

#[derive(Debug, Clone, Copy)]
struct Frontier {
    estimate: f32,
    cost: f32,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    // Reversed: BinaryHeap pops the lowest estimate, then the lowest id.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Shortest-path queries against a shared mesh.
pub struct Pathfinder {
    mesh: Arc<NavMesh>,
    cache: HashMap<(NodeId, NodeId), (Vec<NodeId>, f32)>,
    order: VecDeque<(NodeId, NodeId)>,
    cache_capacity: usize,
}

impl Pathfinder {
    pub fn new(mesh: Arc<NavMesh>) -> Self {
        Self::with_cache(mesh, 256)
    }

    pub fn with_cache(mesh: Arc<NavMesh>, cache_capacity: usize) -> Self {
        Self {
            mesh,
            cache: HashMap::new(),
            order: VecDeque::new(),
            cache_capacity,
        }
    }

    pub fn mesh(&self) -> &Arc<NavMesh> {
        &self.mesh
    }

    /// Node a free point attaches to: the closest one in sight.
    ///
    /// A walkable point with no node in sight is sealed off and snaps to
    /// nothing. A point off the walkable area falls back to the closest node
    /// so a stray agent can still find its way back.
    pub fn snap(&self, p: &Point) -> Option<NodeId> {
        match self.mesh.nearest_visible_node(p) {
            Some(id) => Some(id),
            None if self.mesh.is_walkable(p) => None,
            None => self.mesh.nearest_node(p),
        }
    }

    /// Route from `start` to `goal`, or `None` when they are not connected.
    pub fn find_path(&mut self, start: Point, goal: Point) -> Option<Path> {
        let direct = || Path {
            waypoints: dedup(vec![start, goal]),
            nodes: Vec::new(),
            cost: 0.0,
        };
        let (from, to) = match (self.snap(&start), self.snap(&goal)) {
            (Some(from), Some(to)) => (from, to),
            // Both ends inside the same sealed pocket
            (None, None) if self.mesh.line_of_sight(&start, &goal) => return Some(direct()),
            _ => return None,
        };

        if from == to && self.mesh.line_of_sight(&start, &goal) {
            return Some(direct());
        }

        let (nodes, cost) = self.find_node_path(from, to)?;
        let mut waypoints = Vec::with_capacity(nodes.len() + 2);
        waypoints.push(start);
        waypoints.extend(nodes.iter().filter_map(|&id| self.mesh.node(id)).map(|n| n.position));
        waypoints.push(goal);
        Some(Path {
            waypoints: dedup(waypoints),
            nodes,
            cost,
        })
    }

    /// Node-level route with its cost, served from the cache when possible.
    pub fn find_node_path(&mut self, from: NodeId, to: NodeId) -> Option<(Vec<NodeId>, f32)> {
        let key = (from, to);
        if let Some(cached) = self.cache.get(&key) {
            return Some(cached.clone());
        }

        let result = self.astar(from, to)?;
        if self.cache_capacity > 0 {
            if self.cache.len() >= self.cache_capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.cache.remove(&oldest);
                }
            }
            self.cache.insert(key, result.clone());
            self.order.push_back(key);
        }
        Some(result)
    }

    /// Drop intermediate waypoints whose neighbours can see each other.
    pub fn smooth_path(&self, waypoints: &[Point]) -> Vec<Point> {
        if waypoints.len() <= 2 {
            return waypoints.to_vec();
        }
        let mut smoothed = vec![waypoints[0]];
        let mut anchor = 0;
        while anchor < waypoints.len() - 1 {
            let mut next = anchor + 1;
            for candidate in (anchor + 2..waypoints.len()).rev() {
                if self.mesh.line_of_sight(&waypoints[anchor], &waypoints[candidate]) {
                    next = candidate;
                    break;
                }
            }
            smoothed.push(waypoints[next]);
            anchor = next;
        }
        smoothed
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.order.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    fn astar(&self, start: NodeId, goal: NodeId) -> Option<(Vec<NodeId>, f32)> {
        let n = self.mesh.node_count();
        if start as usize >= n {
            return None;
        }
        let goal_pos = self.mesh.node(goal)?.position;
        let h = |id: NodeId| {
            self.mesh
                .node(id)
                .map_or(0.0, |node| node.position.distance(&goal_pos))
        };

        let mut best = vec![f32::INFINITY; n];
        let mut came_from: Vec<Option<NodeId>> = vec![None; n];
        let mut closed = vec![false; n];
        let mut open = BinaryHeap::new();

        best[start as usize] = 0.0;
        open.push(Frontier {
            estimate: h(start),
            cost: 0.0,
            node: start,
        });

        while let Some(Frontier { cost, node, .. }) = open.pop() {
            if node == goal {
                let mut route = vec![goal];
                let mut current = goal;
                while let Some(prev) = came_from[current as usize] {
                    route.push(prev);
                    current = prev;
                }
                route.reverse();
                return Some((route, cost));
            }
            if closed[node as usize] {
                continue;
            }
            closed[node as usize] = true;

            for &(next, weight) in self.mesh.neighbors(node) {
                let candidate = cost + weight;
                if candidate < best[next as usize] {
                    best[next as usize] = candidate;
                    came_from[next as usize] = Some(node);
                    open.push(Frontier {
                        estimate: candidate + h(next),
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }
        None
    }
}

fn dedup(mut points: Vec<Point>) -> Vec<Point> {
    points.dedup_by(|b, a| a.distance(b) < DUPLICATE_EPSILON);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{MapData, Obstacle, WalkableZone};
    use crate::navmesh::NavMeshBuilder;

    /// Room A, hallway, room B in a row; plus an unreachable island.
    fn corridor_mesh() -> Arc<NavMesh> {
        let map = MapData::with_zones(vec![
            WalkableZone::rect("A", 0.0, 0.0, 100.0, 100.0, true),
            WalkableZone::rect("Hall", 100.0, 30.0, 120.0, 40.0, false),
            WalkableZone::rect("B", 220.0, 0.0, 100.0, 100.0, true),
            WalkableZone::rect("Island", 500.0, 0.0, 50.0, 50.0, true),
        ]);
        Arc::new(NavMeshBuilder::default().build(&map).unwrap())
    }

    #[test]
    fn test_path_includes_start_and_goal() {
        let mut pf = Pathfinder::new(corridor_mesh());
        let start = Point::new(20.0, 20.0);
        let goal = Point::new(300.0, 80.0);
        let path = pf.find_path(start, goal).unwrap();
        assert_eq!(path.waypoints.first(), Some(&start));
        assert_eq!(path.waypoints.last(), Some(&goal));
        assert!(path.waypoints.len() >= 3);
        for w in path.waypoints.windows(2) {
            assert!(pf.mesh().line_of_sight(&w[0], &w[1]), "blocked leg {:?}", w);
        }
    }

    #[test]
    fn test_unreachable_is_none() {
        let mut pf = Pathfinder::new(corridor_mesh());
        assert!(pf.find_path(Point::new(20.0, 20.0), Point::new(520.0, 20.0)).is_none());
    }

    #[test]
    fn test_same_node_direct() {
        let mut pf = Pathfinder::new(corridor_mesh());
        let path = pf.find_path(Point::new(48.0, 50.0), Point::new(52.0, 50.0)).unwrap();
        assert_eq!(path.waypoints, vec![Point::new(48.0, 50.0), Point::new(52.0, 50.0)]);
    }

    #[test]
    fn test_deterministic() {
        let mesh = corridor_mesh();
        let mut a = Pathfinder::new(mesh.clone());
        let mut b = Pathfinder::new(mesh);
        let start = Point::new(10.0, 90.0);
        let goal = Point::new(310.0, 10.0);
        assert_eq!(a.find_path(start, goal), b.find_path(start, goal));
    }

    #[test]
    fn test_cost_matches_edges() {
        let mut pf = Pathfinder::new(corridor_mesh());
        let path = pf.find_path(Point::new(20.0, 20.0), Point::new(300.0, 80.0)).unwrap();
        let summed: f32 = path
            .nodes
            .windows(2)
            .map(|w| pf.mesh().edge_weight(w[0], w[1]).unwrap())
            .sum();
        assert!((summed - path.cost).abs() < 1e-2);
    }

    #[test]
    fn test_cache_is_bounded_fifo() {
        let mesh = corridor_mesh();
        let ids: Vec<NodeId> = mesh.zone_nodes("A").to_vec();
        let mut pf = Pathfinder::with_cache(mesh, 2);
        pf.find_node_path(ids[0], ids[1]).unwrap();
        pf.find_node_path(ids[0], ids[2]).unwrap();
        pf.find_node_path(ids[1], ids[2]).unwrap();
        assert_eq!(pf.cache_size(), 2);
        pf.clear_cache();
        assert_eq!(pf.cache_size(), 0);
    }

    #[test]
    fn test_smooth_never_longer() {
        let mut pf = Pathfinder::new(corridor_mesh());
        let path = pf.find_path(Point::new(10.0, 10.0), Point::new(310.0, 90.0)).unwrap();
        let smoothed = pf.smooth_path(&path.waypoints);
        let length = |pts: &[Point]| -> f32 { pts.windows(2).map(|w| w[0].distance(&w[1])).sum() };
        assert!(smoothed.len() <= path.waypoints.len());
        assert!(length(&smoothed) <= length(&path.waypoints) + 1e-3);
        assert_eq!(smoothed.first(), path.waypoints.first());
        assert_eq!(smoothed.last(), path.waypoints.last());
    }

    #[test]
    fn test_walled_pocket_is_unreachable() {
        // Two overlapping walls seal off the corner x,y in (90,100]
        let mut map = MapData::with_zones(vec![WalkableZone::rect("Room", 0.0, 0.0, 100.0, 100.0, true)]);
        map.obstacles.push(Obstacle::new("wall-h", Point::new(92.5, 87.5), 15.0, 5.0));
        map.obstacles.push(Obstacle::new("wall-v", Point::new(87.5, 92.5), 5.0, 15.0));
        let mesh = Arc::new(NavMeshBuilder::default().build(&map).unwrap());
        let mut pf = Pathfinder::new(mesh.clone());

        let pocket = Point::new(95.0, 95.0);
        assert!(mesh.is_walkable(&pocket));
        assert!(pf.snap(&pocket).is_none());
        assert!(pf.find_path(Point::new(20.0, 20.0), pocket).is_none());
        assert!(pf.find_path(pocket, Point::new(20.0, 20.0)).is_none());

        // Moving within the pocket is still allowed
        let inside = pf.find_path(pocket, Point::new(97.0, 93.0)).unwrap();
        assert_eq!(inside.waypoints.len(), 2);
        // Off the map still attaches somewhere
        assert!(pf.snap(&Point::new(-50.0, 50.0)).is_some());
    }

    #[test]
    fn test_routes_around_table() {
        let mut map = MapData::with_zones(vec![WalkableZone::rect("Room", 0.0, 0.0, 200.0, 120.0, true)]);
        map.obstacles.push(Obstacle::new("table", Point::new(100.0, 60.0), 40.0, 100.0));
        let mesh = Arc::new(NavMeshBuilder::default().build(&map).unwrap());
        let mut pf = Pathfinder::new(mesh);
        let path = pf.find_path(Point::new(20.0, 60.0), Point::new(180.0, 60.0)).unwrap();
        for w in path.waypoints.windows(2) {
            assert!(pf.mesh().line_of_sight(&w[0], &w[1]));
        }
        assert!(path.length() > 160.0);
    }
}
