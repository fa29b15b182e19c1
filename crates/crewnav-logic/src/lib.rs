//! Pure navigation logic for crewnav.
//!
//! Everything an agent needs to get around a polygon map, independent of
//! any ECS or runtime: functions and types take plain data, use a
//! caller-supplied RNG, and are unit-testable in isolation.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | NavMesh, sampling and fleet tunables with defaults |
//! | [`destination`] | Constrained random destinations, tasks, vents, meeting point |
//! | [`error`] | Map/build-time errors |
//! | [`geometry`] | Points, bounds, polygon containment and segment tests |
//! | [`map`] | Map editor document model (zones, tasks, obstacles, vents, doors) |
//! | [`navmesh`] | NavMesh graph and its builder |
//! | [`pathfinding`] | A* over the NavMesh with a bounded route cache |
//! | [`state_machine`] | Per-agent activity/location state, history, listeners |
//! | [`validation`] | Zone polygon validation (errors and warnings) |
//! | [`walkable`] | Global walkability and line-of-sight tests |
//! | [`zones`] | Semantic zone list and per-agent zone detection |

pub mod config;
pub mod destination;
pub mod error;
pub mod geometry;
pub mod map;
pub mod navmesh;
pub mod pathfinding;
pub mod state_machine;
pub mod validation;
pub mod walkable;
pub mod zones;

pub use error::MapError;
pub use geometry::Point;
