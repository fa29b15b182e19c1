//! Tunables for navmesh construction, destination sampling, and the fleet.
//!
//! Every numeric constant the navigation code uses lives here with a
//! `Default` that reproduces the stock behaviour. Hosts override fields by
//! deserializing a partial config (missing keys fall back to defaults).

use serde::{Deserialize, Serialize};

/// NavMesh builder and pathfinder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavMeshConfig {
    /// Spacing of the interior sample grid, in map units.
    pub grid_spacing: f32,
    /// Step used when sampling a segment for line-of-sight.
    pub visibility_step: f32,
    /// Minimum shared wall length for two zones to count as adjacent.
    pub min_portal_width: f32,
    /// Bounded route cache size in the pathfinder.
    pub path_cache_capacity: usize,
}

impl Default for NavMeshConfig {
    fn default() -> Self {
        Self {
            grid_spacing: 40.0,
            visibility_step: 4.0,
            min_portal_width: 1.0,
            path_cache_capacity: 256,
        }
    }
}

/// Destination sampling settings.
///
/// The jitter radius is `jitter_fraction` of the zone's shorter bounding-box
/// side, clamped to `jitter_min..=jitter_max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub outer_attempts: u32,
    pub inner_attempts: u32,
    pub jitter_min: f32,
    pub jitter_max: f32,
    pub jitter_fraction: f32,
    pub node_attempts: u32,
    pub node_attempts_avoid_edges: u32,
    /// Probability of sampling from the central region when avoiding edges.
    pub center_bias: f64,
    /// Size of the central region relative to the bounding box.
    pub center_fraction: f32,
    pub nearby_attempts: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            outer_attempts: 10,
            inner_attempts: 20,
            jitter_min: 20.0,
            jitter_max: 80.0,
            jitter_fraction: 0.25,
            node_attempts: 5,
            node_attempts_avoid_edges: 10,
            center_bias: 0.6,
            center_fraction: 0.5,
            nearby_attempts: 6,
        }
    }
}

/// Fleet setup: how many agents, their movement parameters, and the seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub agent_count: usize,
    pub seed: u64,
    pub min_speed: f32,
    pub max_speed: f32,
    pub vision_radius: f32,
    pub action_radius: f32,
    pub spawn_attempts: u32,
    pub navmesh: NavMeshConfig,
    pub sampling: SamplingConfig,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            agent_count: 8,
            seed: 42,
            min_speed: 90.0,
            max_speed: 120.0,
            vision_radius: 150.0,
            action_radius: 50.0,
            spawn_attempts: 10,
            navmesh: NavMeshConfig::default(),
            sampling: SamplingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_defaults() {
        let c = SamplingConfig::default();
        assert_eq!(c.outer_attempts, 10);
        assert_eq!(c.inner_attempts, 20);
        assert_eq!((c.jitter_min, c.jitter_max), (20.0, 80.0));
        assert!((c.center_bias - 0.6).abs() < f64::EPSILON);
        assert_eq!(c.nearby_attempts, 6);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let c: FleetConfig =
            serde_json::from_str(r#"{ "agent_count": 3, "sampling": { "outer_attempts": 4 } }"#)
                .unwrap();
        assert_eq!(c.agent_count, 3);
        assert_eq!(c.sampling.outer_attempts, 4);
        assert_eq!(c.sampling.inner_attempts, 20);
        assert_eq!(c.navmesh, NavMeshConfig::default());
    }
}
