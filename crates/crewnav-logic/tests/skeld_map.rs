//! End-to-end checks against the bundled Skeld map.

use std::sync::Arc;

use crewnav_logic::config::{NavMeshConfig, SamplingConfig};
use crewnav_logic::destination::{DestinationOptions, DestinationSelector};
use crewnav_logic::map::MapData;
use crewnav_logic::navmesh::{NavMesh, NavMeshBuilder, NodeKind};
use crewnav_logic::pathfinding::Pathfinder;
use crewnav_logic::state_machine::{LocationState, PlayerStateMachine};
use crewnav_logic::zones::{build_zones, Zone, ZoneDetector, ZoneType};
use crewnav_logic::Point;
use rand::rngs::StdRng;
use rand::SeedableRng;

const SKELD_JSON: &str = include_str!("../../../data/skeld_map.json");

fn load() -> (MapData, Arc<NavMesh>) {
    let map = MapData::from_json(SKELD_JSON).expect("bundled map parses");
    let mesh = NavMeshBuilder::new(NavMeshConfig::default())
        .build(&map)
        .expect("bundled map builds");
    (map, Arc::new(mesh))
}

#[test]
fn every_zone_has_a_node() {
    let (map, mesh) = load();
    for name in map.zone_names() {
        assert!(!mesh.zone_nodes(&name).is_empty(), "{} has no nodes", name);
    }
}

#[test]
fn mesh_is_one_component() {
    let (_, mesh) = load();
    assert_eq!(mesh.component_count(), 1);
}

#[test]
fn doors_become_nodes() {
    let (map, mesh) = load();
    let doors = mesh.nodes().iter().filter(|n| n.kind == NodeKind::Door).count();
    assert_eq!(doors, map.doors.len());
}

#[test]
fn every_room_reaches_every_other_room() {
    let (_, mesh) = load();
    let mut pf = Pathfinder::new(mesh.clone());
    let zones = build_zones(&MapData::from_json(SKELD_JSON).unwrap());
    let rooms: Vec<&Zone> = zones.iter().filter(|z| z.is_room()).collect();
    assert!(rooms.len() >= 12);
    for a in &rooms {
        for b in &rooms {
            let path = pf
                .find_path(a.centroid, b.centroid)
                .unwrap_or_else(|| panic!("{} -> {} unreachable", a.name, b.name));
            assert_eq!(path.waypoints.first(), Some(&a.centroid));
            assert_eq!(path.waypoints.last(), Some(&b.centroid));
            for leg in path.waypoints.windows(2) {
                assert!(mesh.line_of_sight(&leg[0], &leg[1]), "{} -> {}: {:?}", a.name, b.name, leg);
            }
        }
    }
}

#[test]
fn tasks_are_walkable() {
    let (map, mesh) = load();
    for task in &map.tasks {
        assert!(mesh.is_walkable(&task.position), "{} in {}", task.task_type, task.room);
    }
}

#[test]
fn hallways_are_labeled() {
    let map = MapData::from_json(SKELD_JSON).unwrap();
    let zones = build_zones(&map);
    let spine = zones.iter().find(|z| z.name == "Spine").unwrap();
    assert_eq!(spine.zone_type, ZoneType::Hallway);
    let medbay = zones.iter().find(|z| z.name == "MedBay").unwrap();
    assert_eq!(medbay.zone_type, ZoneType::Room);
}

#[test]
fn walking_out_of_the_cafeteria() {
    let map = MapData::from_json(SKELD_JSON).unwrap();
    let mut detector = ZoneDetector::new(build_zones(&map).into());
    let mut sm = PlayerStateMachine::new("Red");

    let t = detector
        .update_player_position("Red", Point::new(540.0, 140.0), 0.0)
        .expect("first sighting is a transition");
    assert_eq!(t.to_type, ZoneType::Room);
    sm.update_location(t.to_zone.as_deref(), t.to_type);
    assert_eq!(sm.location(), LocationState::InRoom);

    assert!(detector.update_player_position("Red", Point::new(545.0, 150.0), 0.1).is_none());

    let t = detector
        .update_player_position("Red", Point::new(540.0, 300.0), 0.2)
        .expect("crossing into the spine");
    assert_eq!(t.from_zone.as_deref(), Some("Cafeteria"));
    assert_eq!(t.to_zone.as_deref(), Some("Spine"));
    sm.update_location(t.to_zone.as_deref(), t.to_type);
    assert_eq!(sm.location(), LocationState::InHallway);
}

#[test]
fn sampled_destinations_are_walkable() {
    let (map, mesh) = load();
    let zones: Arc<[Zone]> = build_zones(&map).into();
    let selector = DestinationSelector::new(zones.clone(), mesh.area().clone(), SamplingConfig::default())
        .with_map_features(&map)
        .with_zone_nodes(mesh.zone_node_positions());
    let mut rng = StdRng::seed_from_u64(42);
    let current = Point::new(540.0, 140.0);
    for opts in [
        DestinationOptions::default(),
        DestinationOptions::rooms().avoiding_edges(),
        DestinationOptions::hallways(),
        DestinationOptions::in_zone("Electrical"),
        DestinationOptions::default().with_min_distance(200.0).with_max_distance(400.0),
    ] {
        for _ in 0..50 {
            if let Some(p) = selector.select_random_destination(current, &zones, &opts, &mut rng) {
                assert!(mesh.is_walkable(&p), "{:?} with {:?}", p, opts);
                if let Some(min) = opts.min_distance_from_current {
                    assert!(current.distance(&p) >= min);
                }
                if let Some(max) = opts.max_distance_from_current {
                    assert!(current.distance(&p) <= max);
                }
            }
        }
    }
    assert_eq!(selector.select_meeting_point(), Some(Point::new(540.0, 140.0)));
    assert!(selector.select_vent_exit("v-admin", &mut rng).is_some());
}
