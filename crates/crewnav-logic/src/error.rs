//! Configuration errors surfaced while loading a map or building the navmesh.
//!
//! These are the only hard failures in the crate. Per-frame queries
//! (paths, sampling, zone lookups) report "nothing found" through `Option`.

/// A malformed map, detected once at load/build time.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("map JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("map has no walkable zones")]
    Empty,

    #[error("zone '{zone}' has {count} vertices, at least 3 are required")]
    TooFewVertices { zone: String, count: usize },

    #[error("zone '{zone}' has zero area")]
    DegeneratePolygon { zone: String },

    #[error("zone '{zone}' is self-intersecting")]
    SelfIntersecting { zone: String },

    #[error("zone name '{0}' is used by more than one walkable zone")]
    DuplicateZone(String),

    #[error("zone '{zone}' has no walkable interior outside its obstacles")]
    NoWalkableInterior { zone: String },

    #[error("zones '{a}' and '{b}' touch but no walkable passage joins them")]
    DisconnectedZones { a: String, b: String },
}
