//! Static map data: walkable zones, labeled overlays, tasks, obstacles.
//!
//! Mirrors the map editor's JSON layout (camelCase keys). Parsing happens
//! from an in-memory string; loading the file is the host's job.

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::geometry::{self, Point};
use crate::zones::ZoneType;

/// A polygon region agents may occupy.
///
/// The centroid is computed on construction when the document omits it. A
/// stored centroid is kept as given, even outside the polygon; validation
/// warns about that case and consumers read [`WalkableZone::interior_centroid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawWalkableZone", rename_all = "camelCase")]
pub struct WalkableZone {
    pub vertices: Vec<Point>,
    pub room_name: String,
    pub is_room: bool,
    pub walkable: bool,
    pub centroid: Point,
    /// Obstacle polygons cut out of this zone.
    pub holes: Vec<Vec<Point>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWalkableZone {
    vertices: Vec<Point>,
    #[serde(default)]
    room_name: String,
    #[serde(default)]
    is_room: bool,
    #[serde(default = "default_true")]
    walkable: bool,
    #[serde(default)]
    centroid: Option<Point>,
    #[serde(default)]
    holes: Option<Vec<Vec<Point>>>,
}

fn default_true() -> bool {
    true
}

impl From<RawWalkableZone> for WalkableZone {
    fn from(raw: RawWalkableZone) -> Self {
        let centroid = raw
            .centroid
            .unwrap_or_else(|| geometry::interior_point(&raw.vertices));
        Self {
            vertices: raw.vertices,
            room_name: raw.room_name,
            is_room: raw.is_room,
            walkable: raw.walkable,
            centroid,
            holes: raw.holes.unwrap_or_default(),
        }
    }
}

impl WalkableZone {
    pub fn new(name: impl Into<String>, vertices: Vec<Point>, is_room: bool) -> Self {
        let centroid = geometry::interior_point(&vertices);
        Self {
            vertices,
            room_name: name.into(),
            is_room,
            walkable: true,
            centroid,
            holes: Vec::new(),
        }
    }

    pub fn room(name: impl Into<String>, vertices: Vec<Point>) -> Self {
        Self::new(name, vertices, true)
    }

    pub fn hallway(name: impl Into<String>, vertices: Vec<Point>) -> Self {
        Self::new(name, vertices, false)
    }

    /// Axis-aligned rectangular zone with its corner at `(x, y)`.
    pub fn rect(name: impl Into<String>, x: f32, y: f32, width: f32, height: f32, is_room: bool) -> Self {
        Self::new(name, geometry::rect(x, y, width, height), is_room)
    }

    pub fn with_hole(mut self, hole: Vec<Point>) -> Self {
        self.holes.push(hole);
        self
    }

    pub fn with_walkable(mut self, walkable: bool) -> Self {
        self.walkable = walkable;
        self
    }

    /// The stored centroid when it lies inside or on the polygon, otherwise a
    /// computed interior point.
    pub fn interior_centroid(&self) -> Point {
        if self.vertices.len() < 3 || geometry::polygon_contains(&self.centroid, &self.vertices) {
            self.centroid
        } else {
            geometry::interior_point(&self.vertices)
        }
    }

    /// The zone's name, or `Zone-<index>` for unnamed editor zones.
    pub fn name_or_index(&self, index: usize) -> String {
        if self.room_name.trim().is_empty() {
            format!("Zone-{}", index)
        } else {
            self.room_name.clone()
        }
    }
}

/// Semantic overlay that pins a zone's type.
///
/// Empty `vertices` means "same geometry as the walkable zone of this name".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledZone {
    pub name: String,
    #[serde(default = "default_label_type", rename = "type")]
    pub zone_type: ZoneType,
    #[serde(default)]
    pub vertices: Vec<Point>,
}

fn default_label_type() -> ZoneType {
    ZoneType::Room
}

impl LabeledZone {
    pub fn new(name: impl Into<String>, zone_type: ZoneType) -> Self {
        Self {
            name: name.into(),
            zone_type,
            vertices: Vec::new(),
        }
    }

    pub fn with_vertices(mut self, vertices: Vec<Point>) -> Self {
        self.vertices = vertices;
        self
    }
}

/// A fixed task station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "type")]
    pub task_type: String,
    pub position: Point,
    #[serde(default)]
    pub room: String,
}

impl Task {
    pub fn new(task_type: impl Into<String>, position: Point, room: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            position,
            room: room.into(),
        }
    }
}

/// Furniture blocking movement: a rectangle centered on `position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    pub position: Point,
    #[serde(default = "default_obstacle_size")]
    pub width: f32,
    #[serde(default = "default_obstacle_size")]
    pub height: f32,
}

fn default_obstacle_size() -> f32 {
    60.0
}

impl Obstacle {
    pub fn new(id: impl Into<String>, position: Point, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            kind: "table".into(),
            position,
            width,
            height,
        }
    }

    pub fn polygon(&self) -> Vec<Point> {
        geometry::rect(
            self.position.x - self.width / 2.0,
            self.position.y - self.height / 2.0,
            self.width,
            self.height,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vent {
    pub id: String,
    pub position: Point,
    #[serde(default)]
    pub connected_to: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorOrientation {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub position: Point,
    #[serde(default)]
    pub orientation: DoorOrientation,
    #[serde(default)]
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyButton {
    pub position: Point,
    #[serde(default = "default_button_room")]
    pub room: String,
}

fn default_button_room() -> String {
    "Cafeteria".into()
}

/// Everything the map editor exports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    #[serde(default)]
    pub walkable_zones: Vec<WalkableZone>,
    #[serde(default)]
    pub labeled_zones: Vec<LabeledZone>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub vents: Vec<Vent>,
    #[serde(default)]
    pub doors: Vec<Door>,
    #[serde(default)]
    pub emergency_button: Option<EmergencyButton>,
}

impl MapData {
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        let map: MapData = serde_json::from_str(json)?;
        if map.walkable_zones.is_empty() {
            return Err(MapError::Empty);
        }
        Ok(map)
    }

    pub fn with_zones(walkable_zones: Vec<WalkableZone>) -> Self {
        Self {
            walkable_zones,
            ..Default::default()
        }
    }

    /// Effective zone names in input order (unnamed zones get `Zone-<index>`).
    pub fn zone_names(&self) -> Vec<String> {
        self.walkable_zones
            .iter()
            .enumerate()
            .map(|(i, z)| z.name_or_index(i))
            .collect()
    }

    /// Every blocking polygon: zone holes, furniture, and non-walkable zones.
    pub fn obstacle_polygons(&self) -> Vec<Vec<Point>> {
        let mut polygons: Vec<Vec<Point>> = self
            .walkable_zones
            .iter()
            .flat_map(|z| z.holes.iter().cloned())
            .collect();
        polygons.extend(self.obstacles.iter().map(Obstacle::polygon));
        polygons.extend(
            self.walkable_zones
                .iter()
                .filter(|z| !z.walkable)
                .map(|z| z.vertices.clone()),
        );
        polygons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDITOR_JSON: &str = r#"{
        "metadata": { "image": "skeld.png", "version": "2.0" },
        "walls": [],
        "walkableZones": [
            {
                "vertices": [{"x": 0, "y": 0}, {"x": 100, "y": 0}, {"x": 100, "y": 100}, {"x": 0, "y": 100}],
                "isRoom": true,
                "roomName": "Cafeteria",
                "holes": [[{"x": 40, "y": 40}, {"x": 60, "y": 40}, {"x": 60, "y": 60}, {"x": 40, "y": 60}]]
            },
            {
                "vertices": [{"x": 100, "y": 40}, {"x": 200, "y": 40}, {"x": 200, "y": 60}, {"x": 100, "y": 60}],
                "isRoom": false,
                "roomName": ""
            }
        ],
        "labeledZones": [{ "vertices": [], "name": "Hall-1", "type": "HALLWAY" }],
        "tasks": [{ "type": "Swipe Card", "position": {"x": 10, "y": 10}, "room": "Cafeteria" }],
        "obstacles": [{ "id": "t1", "type": "table", "position": {"x": 80, "y": 80} }],
        "vents": [{ "id": "v1", "position": {"x": 5, "y": 5}, "connectedTo": ["v2"] }],
        "doors": [{ "position": {"x": 100, "y": 50}, "orientation": "vertical", "room": "Cafeteria" }],
        "cameras": [],
        "emergencyButton": { "position": {"x": 20, "y": 50}, "room": "Cafeteria" }
    }"#;

    #[test]
    fn test_parse_editor_document() {
        let map = MapData::from_json(EDITOR_JSON).unwrap();
        assert_eq!(map.walkable_zones.len(), 2);
        assert!(map.walkable_zones[0].is_room);
        assert_eq!(map.walkable_zones[0].holes.len(), 1);
        assert!(map.walkable_zones[1].walkable);
        assert_eq!(map.labeled_zones[0].zone_type, ZoneType::Hallway);
        assert_eq!(map.tasks[0].task_type, "Swipe Card");
        assert_eq!(map.obstacles[0].width, 60.0);
        assert_eq!(map.vents[0].connected_to, vec!["v2".to_string()]);
        assert_eq!(map.doors[0].orientation, DoorOrientation::Vertical);
        assert_eq!(map.emergency_button.as_ref().unwrap().room, "Cafeteria");
    }

    #[test]
    fn test_missing_centroid_is_computed() {
        let map = MapData::from_json(EDITOR_JSON).unwrap();
        let c = map.walkable_zones[0].centroid;
        assert!((c.x - 50.0).abs() < 1e-3 && (c.y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_stored_centroid_outside_polygon() {
        let json = r#"{"walkableZones": [{
            "vertices": [{"x": 0, "y": 0}, {"x": 100, "y": 0}, {"x": 100, "y": 100}, {"x": 0, "y": 100}],
            "roomName": "Cafeteria",
            "centroid": {"x": 500, "y": 500}
        }]}"#;
        let map = MapData::from_json(json).unwrap();
        let zone = &map.walkable_zones[0];
        assert_eq!(zone.centroid, Point::new(500.0, 500.0));
        let c = zone.interior_centroid();
        assert!(geometry::polygon_contains(&c, &zone.vertices));
    }

    #[test]
    fn test_unnamed_zones_get_index_names() {
        let map = MapData::from_json(EDITOR_JSON).unwrap();
        assert_eq!(map.zone_names(), vec!["Cafeteria".to_string(), "Zone-1".to_string()]);
    }

    #[test]
    fn test_obstacle_polygons_include_holes_and_furniture() {
        let map = MapData::from_json(EDITOR_JSON).unwrap();
        let polys = map.obstacle_polygons();
        assert_eq!(polys.len(), 2);
        // Furniture rect is centered on its position
        let b = geometry::Bounds::of(&polys[1]);
        assert_eq!(b.center(), Point::new(80.0, 80.0));
    }

    #[test]
    fn test_empty_map_is_rejected() {
        let err = MapData::from_json(r#"{ "walkableZones": [] }"#).unwrap_err();
        assert!(matches!(err, MapError::Empty));
    }

    #[test]
    fn test_bad_json_is_a_parse_error() {
        let err = MapData::from_json("{ not json").unwrap_err();
        assert!(matches!(err, MapError::Parse(_)));
    }
}
