//! Spatial components: where an agent is, how it moves, where it is going.

use std::collections::VecDeque;

use crewnav_logic::geometry::Point;
use serde::{Deserialize, Serialize};

/// Current map position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Point);

/// Per-agent movement parameters, fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Map units per second
    pub speed: f32,
    pub vision_radius: f32,
    pub action_radius: f32,
}

/// Waypoints still to walk. Removed on arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub waypoints: VecDeque<Point>,
    pub destination: Point,
}

impl Route {
    /// Route through `waypoints`; a leading waypoint equal to `from` is skipped.
    pub fn new(from: Point, waypoints: impl IntoIterator<Item = Point>) -> Self {
        let mut waypoints: VecDeque<Point> = waypoints.into_iter().collect();
        if waypoints.front().is_some_and(|p| p.distance(&from) < 1e-3) {
            waypoints.pop_front();
        }
        let destination = waypoints.back().copied().unwrap_or(from);
        Self {
            waypoints,
            destination,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn remaining_length(&self, from: Point) -> f32 {
        let mut last = from;
        let mut total = 0.0;
        for p in &self.waypoints {
            total += last.distance(p);
            last = *p;
        }
        total
    }
}

/// A task the agent is walking to or working on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chore {
    pub task_type: String,
    /// Seconds of work left once the agent arrives
    pub remaining: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_skips_start() {
        let start = Point::new(0.0, 0.0);
        let route = Route::new(start, [start, Point::new(3.0, 4.0), Point::new(3.0, 10.0)]);
        assert_eq!(route.waypoints.len(), 2);
        assert_eq!(route.destination, Point::new(3.0, 10.0));
        assert!((route.remaining_length(start) - 11.0).abs() < 1e-4);
    }
}
