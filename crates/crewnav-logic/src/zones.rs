//! Semantic zones and per-agent zone tracking.
//!
//! [`build_zones`] merges walkable geometry with labeled overlays into one
//! ordered list of [`Zone`]s. [`ZoneDetector`] classifies positions against
//! that list and reports when an agent crosses into a different zone.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::{self, Bounds, Point};
use crate::map::MapData;
use crate::validation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneType {
    Room,
    Hallway,
    #[default]
    Unknown,
}

/// Runtime view of a zone: resolved type plus immutable geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub zone_type: ZoneType,
    pub vertices: Vec<Point>,
    pub walkable: bool,
    pub centroid: Point,
    pub bounds: Bounds,
}

impl Zone {
    pub fn new(name: impl Into<String>, zone_type: ZoneType, vertices: Vec<Point>, walkable: bool) -> Self {
        let centroid = geometry::interior_point(&vertices);
        let bounds = Bounds::of(&vertices);
        Self {
            name: name.into(),
            zone_type,
            vertices,
            walkable,
            centroid,
            bounds,
        }
    }

    pub fn contains(&self, p: &Point) -> bool {
        self.bounds.contains(p) && geometry::polygon_contains(p, &self.vertices)
    }

    pub fn is_room(&self) -> bool {
        self.zone_type == ZoneType::Room
    }

    pub fn is_hallway(&self) -> bool {
        self.zone_type == ZoneType::Hallway
    }
}

/// Merge walkable zones and labeled overlays into the canonical zone list.
///
/// Labeled zones come first, in input order, so they win where geometry
/// overlaps. A label without vertices, or whose own polygon is malformed,
/// borrows the geometry of the walkable zone with the same name; a label with
/// neither is dropped. Walkable zones
/// not claimed by a label follow, typed from their own flags.
pub fn build_zones(map: &MapData) -> Vec<Zone> {
    let walkable_by_name: HashMap<String, usize> = map
        .zone_names()
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, i))
        .collect();

    let mut zones = Vec::new();
    let mut claimed: HashSet<String> = HashSet::new();

    for label in &map.labeled_zones {
        if claimed.contains(&label.name) {
            log::warn!("Labeled zone '{}' declared twice, keeping the first", label.name);
            continue;
        }
        let source = walkable_by_name.get(&label.name).map(|&i| &map.walkable_zones[i]);
        let own_shape_ok = match validation::label_shape_issue(&label.name, &label.vertices) {
            Some(issue) if !label.vertices.is_empty() => {
                log::warn!("{}, ignoring its vertices", issue.message);
                false
            }
            Some(_) => false,
            None => true,
        };
        let zone = if own_shape_ok {
            let walkable = source.map_or(true, |w| w.walkable);
            Zone::new(label.name.clone(), label.zone_type, label.vertices.clone(), walkable)
        } else if let Some(w) = source {
            let mut zone = Zone::new(label.name.clone(), label.zone_type, w.vertices.clone(), w.walkable);
            zone.centroid = w.interior_centroid();
            zone
        } else {
            log::warn!("Labeled zone '{}' has no geometry, skipping", label.name);
            continue;
        };
        claimed.insert(label.name.clone());
        zones.push(zone);
    }

    for (i, w) in map.walkable_zones.iter().enumerate() {
        let name = w.name_or_index(i);
        if claimed.contains(&name) {
            continue;
        }
        let zone_type = if !w.walkable {
            ZoneType::Unknown
        } else if w.is_room {
            ZoneType::Room
        } else {
            ZoneType::Hallway
        };
        let mut zone = Zone::new(name.clone(), zone_type, w.vertices.clone(), w.walkable);
        zone.centroid = w.interior_centroid();
        claimed.insert(name);
        zones.push(zone);
    }

    zones
}

/// Emitted when an agent's resolved zone changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTransition {
    pub agent_id: String,
    pub from_zone: Option<String>,
    pub from_type: ZoneType,
    pub to_zone: Option<String>,
    pub to_type: ZoneType,
    pub timestamp: f64,
}

/// Classifies positions and tracks the last zone of every agent.
///
/// Agents get a dense slot on first sight; `last_zone[slot]` indexes into
/// the shared zone list (`None` = outside every zone).
pub struct ZoneDetector {
    zones: Arc<[Zone]>,
    slots: HashMap<String, usize>,
    last_zone: Vec<Option<usize>>,
}

impl ZoneDetector {
    pub fn new(zones: Arc<[Zone]>) -> Self {
        Self {
            zones,
            slots: HashMap::new(),
            last_zone: Vec::new(),
        }
    }

    pub fn get_all_zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone_by_name(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// First zone in priority order containing `p`.
    pub fn zone_at(&self, p: &Point) -> Option<&Zone> {
        self.zone_index_at(p).map(|i| &self.zones[i])
    }

    fn zone_index_at(&self, p: &Point) -> Option<usize> {
        self.zones.iter().position(|z| z.contains(p))
    }

    /// Record the agent's new position; returns an event only on a zone change.
    pub fn update_player_position(&mut self, agent_id: &str, position: Point, now: f64) -> Option<ZoneTransition> {
        let resolved = self.zone_index_at(&position);
        let slot = match self.slots.get(agent_id) {
            Some(&slot) => slot,
            None => {
                let slot = self.last_zone.len();
                self.slots.insert(agent_id.to_string(), slot);
                self.last_zone.push(None);
                slot
            }
        };

        let previous = self.last_zone[slot];
        if previous == resolved {
            return None;
        }
        self.last_zone[slot] = resolved;

        let describe = |idx: Option<usize>| match idx {
            Some(i) => (Some(self.zones[i].name.clone()), self.zones[i].zone_type),
            None => (None, ZoneType::Unknown),
        };
        let (from_zone, from_type) = describe(previous);
        let (to_zone, to_type) = describe(resolved);
        log::debug!(
            "{} moved {} -> {}",
            agent_id,
            from_zone.as_deref().unwrap_or("?"),
            to_zone.as_deref().unwrap_or("?")
        );
        Some(ZoneTransition {
            agent_id: agent_id.to_string(),
            from_zone,
            from_type,
            to_zone,
            to_type,
            timestamp: now,
        })
    }

    /// Last recorded zone for an agent (`None` if unseen or outside all zones).
    pub fn current_zone(&self, agent_id: &str) -> Option<&Zone> {
        let slot = *self.slots.get(agent_id)?;
        self.last_zone[slot].map(|i| &self.zones[i])
    }

    /// Clear an agent's record; the next update is treated as a first sighting.
    pub fn forget_player(&mut self, agent_id: &str) {
        if let Some(&slot) = self.slots.get(agent_id) {
            self.last_zone[slot] = None;
        }
    }

    pub fn tracked_players(&self) -> usize {
        self.slots.len()
    }
}
