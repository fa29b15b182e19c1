//! Movement system - walks agents along their routes

use crewnav_logic::geometry::Point;
use hecs::{Entity, World};

use crate::components::{Motion, Position, Route};

/// Within this distance a waypoint counts as reached.
const ARRIVE_EPSILON: f32 = 0.1;

/// Move one agent along its route for `delta_seconds`.
///
/// Returns `true` when the agent reached its final waypoint this step; the
/// `Route` component is removed in that case.
pub fn movement_step(world: &mut World, entity: Entity, delta_seconds: f32) -> bool {
    let (new_position, finished) = {
        let Ok((pos, motion, route)) = world.query_one_mut::<(&Position, &Motion, &mut Route)>(entity) else {
            return false;
        };
        let next = advance_along_route(pos.0, route, motion.speed * delta_seconds);
        (next, route.is_finished())
    };

    if let Ok(mut pos) = world.get::<&mut Position>(entity) {
        pos.0 = new_position;
    }
    if finished {
        let _ = world.remove_one::<Route>(entity);
    }
    finished
}

/// Spend `budget` map units walking through the route's waypoints, popping
/// each one reached. Returns the new position.
pub fn advance_along_route(mut current: Point, route: &mut Route, mut budget: f32) -> Point {
    while let Some(&target) = route.waypoints.front() {
        let distance = current.distance(&target);
        if distance < ARRIVE_EPSILON || budget >= distance {
            // Reached this waypoint, carry the leftover step on
            budget -= distance;
            current = target;
            route.waypoints.pop_front();
            continue;
        }
        current = current.lerp(&target, budget / distance);
        break;
    }
    current
}
