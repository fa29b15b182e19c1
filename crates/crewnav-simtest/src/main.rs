//! crewnav Headless Simulation Harness
//!
//! Loads the bundled Skeld map and checks the navigation stack end to end:
//! mesh construction, routing, zone tracking, destination sampling, agent
//! state and a seeded fleet run. No rendering, no game server.
//!
//! Usage:
//!   cargo run -p crewnav-simtest
//!   cargo run -p crewnav-simtest -- --verbose --seed 7
//!
//! Library logging goes to stderr; set `RUST_LOG=debug` for per-agent detail.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crewnav_core::prelude::*;
use crewnav_logic::config::{FleetConfig, NavMeshConfig, SamplingConfig};
use crewnav_logic::destination::{DestinationOptions, DestinationSelector};
use crewnav_logic::map::{MapData, WalkableZone};
use crewnav_logic::navmesh::{NavMesh, NavMeshBuilder, NodeId, NodeKind};
use crewnav_logic::pathfinding::Pathfinder;
use crewnav_logic::state_machine::{ActivityState, LocationState, PlayerStateMachine, HISTORY_CAPACITY};
use crewnav_logic::validation::{validate_zones, Severity};
use crewnav_logic::zones::{build_zones, Zone, ZoneDetector, ZoneType};
use crewnav_logic::Point;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

// ── Map (same JSON the editor exports) ──────────────────────────────────
const SKELD_JSON: &str = include_str!("../../../data/skeld_map.json");

#[derive(Debug, Default, Deserialize)]
struct MapMetadata {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
}

#[derive(Debug, Deserialize)]
struct MapHeader {
    #[serde(default)]
    metadata: MapMetadata,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

/// Everything the sections share.
struct Fixture {
    map: MapData,
    mesh: Arc<NavMesh>,
    zones: Arc<[Zone]>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);

    println!("=== crewnav Simulation Harness (seed {}) ===\n", seed);

    let mut results = Vec::new();

    // 1. Map load and validation
    let fixture = match load_map(&mut results) {
        Some(f) => f,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. NavMesh invariants
    results.extend(validate_navmesh(&fixture, verbose));

    // 3. Pathfinding across every room pair
    results.extend(validate_pathfinding(&fixture, verbose));

    // 4. Zone detection
    results.extend(validate_zone_detection(&fixture, verbose));

    // 5. Destination sampling sweep
    results.extend(validate_destinations(&fixture, seed, verbose));

    // 6. Player state machine
    results.extend(validate_state_machine(verbose));

    // 7. Seeded fleet run
    results.extend(validate_fleet_run(&fixture, seed, verbose));

    if !report(&results, verbose) {
        std::process::exit(1);
    }
}

/// Print the summary; true when everything passed.
fn report(results: &[TestResult], verbose: bool) -> bool {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!("\n=== RESULT: {}/{} passed, {} failed ===", passed, total, failed);
    failed == 0
}

// ── 1. Map ──────────────────────────────────────────────────────────────

fn load_map(results: &mut Vec<TestResult>) -> Option<Fixture> {
    println!("--- Map ---");

    let header: MapHeader = match serde_json::from_str(SKELD_JSON) {
        Ok(h) => h,
        Err(e) => {
            results.push(TestResult::new("map_parse", false, format!("JSON parse error: {}", e)));
            return None;
        }
    };
    let map = match MapData::from_json(SKELD_JSON) {
        Ok(m) => m,
        Err(e) => {
            results.push(TestResult::new("map_parse", false, e.to_string()));
            return None;
        }
    };
    log::info!("Loaded '{}' with {} walkable zones", header.metadata.name, map.walkable_zones.len());
    results.push(TestResult::new(
        "map_parse",
        true,
        format!(
            "'{}' v{}: {} zones, {} tasks, {} vents, {} doors",
            header.metadata.name,
            header.metadata.version,
            map.walkable_zones.len(),
            map.tasks.len(),
            map.vents.len(),
            map.doors.len()
        ),
    ));

    let issues = validate_zones(&map.walkable_zones);
    let errors: Vec<_> = issues.iter().filter(|i| i.severity == Severity::Error).collect();
    results.push(TestResult::new(
        "map_no_validation_errors",
        errors.is_empty(),
        if errors.is_empty() {
            format!("{} warnings", issues.len())
        } else {
            errors.iter().map(|i| i.message.as_str()).collect::<Vec<_>>().join("; ")
        },
    ));

    let mesh = match NavMeshBuilder::new(NavMeshConfig::default()).build(&map) {
        Ok(m) => Arc::new(m),
        Err(e) => {
            results.push(TestResult::new("navmesh_build", false, e.to_string()));
            return None;
        }
    };
    results.push(TestResult::new(
        "navmesh_build",
        true,
        format!("{} nodes, {} edges", mesh.node_count(), mesh.edge_count()),
    ));

    let zones: Arc<[Zone]> = build_zones(&map).into();
    let rooms = zones.iter().filter(|z| z.is_room()).count();
    let hallways = zones.iter().filter(|z| z.is_hallway()).count();
    results.push(TestResult::new(
        "zones_classified",
        rooms >= 12 && hallways >= 6 && zones.iter().all(|z| z.zone_type != ZoneType::Unknown),
        format!("{} rooms, {} hallways", rooms, hallways),
    ));

    let off_map: Vec<_> = map.tasks.iter().filter(|t| !mesh.is_walkable(&t.position)).collect();
    results.push(TestResult::new(
        "tasks_walkable",
        off_map.is_empty(),
        if off_map.is_empty() {
            format!("all {} task stations reachable on foot", map.tasks.len())
        } else {
            format!(
                "off the map: {}",
                off_map.iter().map(|t| t.task_type.as_str()).collect::<Vec<_>>().join(", ")
            )
        },
    ));

    Some(Fixture { map, mesh, zones })
}

// ── 2. NavMesh ──────────────────────────────────────────────────────────

fn validate_navmesh(fx: &Fixture, verbose: bool) -> Vec<TestResult> {
    println!("--- NavMesh ---");
    let mut results = Vec::new();
    let mesh = &fx.mesh;

    let empty: Vec<String> = fx
        .map
        .zone_names()
        .into_iter()
        .filter(|name| mesh.zone_nodes(name).is_empty())
        .collect();
    results.push(TestResult::new(
        "navmesh_every_zone_has_nodes",
        empty.is_empty(),
        if empty.is_empty() {
            "no empty zones".to_string()
        } else {
            format!("empty: {}", empty.join(", "))
        },
    ));

    let components = mesh.component_count();
    results.push(TestResult::new(
        "navmesh_single_component",
        components == 1,
        format!("{} connected component(s)", components),
    ));

    let doors = mesh.nodes().iter().filter(|n| n.kind == NodeKind::Door).count();
    let portals = mesh.nodes().iter().filter(|n| n.kind == NodeKind::Portal).count();
    results.push(TestResult::new(
        "navmesh_doors_as_nodes",
        doors == fx.map.doors.len(),
        format!("{} door nodes, {} portal nodes", doors, portals),
    ));

    let mut asymmetric = 0;
    let mut blocked = 0;
    for node in mesh.nodes() {
        for &(next, weight) in mesh.neighbors(node.id) {
            if mesh.edge_weight(next, node.id) != Some(weight) {
                asymmetric += 1;
            }
            let Some(other) = mesh.node(next) else {
                blocked += 1;
                continue;
            };
            if !mesh.line_of_sight(&node.position, &other.position) {
                blocked += 1;
            }
        }
    }
    results.push(TestResult::new(
        "navmesh_edges_symmetric",
        asymmetric == 0,
        format!("{} asymmetric edges", asymmetric),
    ));
    results.push(TestResult::new(
        "navmesh_edges_clear",
        blocked == 0,
        format!("{} edges without line of sight", blocked),
    ));

    let off_mesh = mesh.nodes().iter().filter(|n| !mesh.is_walkable(&n.position)).count();
    results.push(TestResult::new(
        "navmesh_nodes_walkable",
        off_mesh == 0,
        format!("{} of {} nodes off the walkable area", off_mesh, mesh.node_count()),
    ));

    if verbose {
        for name in mesh.zone_names() {
            println!("    {:<18} {:>3} nodes", name, mesh.zone_nodes(name).len());
        }
    }

    results
}

// ── 3. Pathfinding ──────────────────────────────────────────────────────

fn validate_pathfinding(fx: &Fixture, verbose: bool) -> Vec<TestResult> {
    println!("--- Pathfinding ---");
    let mut results = Vec::new();
    let mut pf = Pathfinder::new(fx.mesh.clone());

    let rooms: Vec<&Zone> = fx.zones.iter().filter(|z| z.is_room()).collect();
    let mut failures = Vec::new();
    let mut longest = (0.0f32, String::new());
    let mut smoothing_worse = 0;
    for a in &rooms {
        for b in &rooms {
            let Some(path) = pf.find_path(a.centroid, b.centroid) else {
                failures.push(format!("{}→{} unreachable", a.name, b.name));
                continue;
            };
            let legs_clear = path
                .waypoints
                .windows(2)
                .all(|w| fx.mesh.line_of_sight(&w[0], &w[1]));
            if !legs_clear {
                failures.push(format!("{}→{} has a blocked leg", a.name, b.name));
            }
            let smoothed = pf.smooth_path(&path.waypoints);
            let smoothed_len: f32 = smoothed.windows(2).map(|w| w[0].distance(&w[1])).sum();
            if smoothed_len > path.length() + 1e-3 {
                smoothing_worse += 1;
            }
            if path.length() > longest.0 {
                longest = (path.length(), format!("{}→{}", a.name, b.name));
            }
        }
    }
    results.push(TestResult::new(
        "pathfind_all_room_pairs",
        failures.is_empty(),
        if failures.is_empty() {
            format!("{} pairs routed, longest {} ({:.0})", rooms.len() * rooms.len(), longest.1, longest.0)
        } else {
            failures.join("; ")
        },
    ));
    results.push(TestResult::new(
        "pathfind_smoothing_never_longer",
        smoothing_worse == 0,
        format!("{} smoothed paths longer than raw", smoothing_worse),
    ));
    results.push(TestResult::new(
        "pathfind_cache_bounded",
        pf.cache_size() <= NavMeshConfig::default().path_cache_capacity,
        format!("{} cached routes", pf.cache_size()),
    ));

    // Optimality spot check against plain Dijkstra
    let mut worse = Vec::new();
    let node_count = fx.mesh.node_count() as NodeId;
    for (from, to) in [(0, node_count / 2), (1, node_count - 1), (node_count / 3, node_count / 4)] {
        let astar = pf.find_node_path(from, to).map(|(_, cost)| cost);
        let exhaustive = dijkstra(&fx.mesh, from, to);
        let agrees = match (astar, exhaustive) {
            (Some(a), Some(b)) => (a - b).abs() < 1e-2,
            (None, None) => true,
            _ => false,
        };
        if !agrees {
            worse.push(format!("{}→{}: A* {:?} vs {:?}", from, to, astar, exhaustive));
        }
    }
    results.push(TestResult::new(
        "pathfind_optimal",
        worse.is_empty(),
        if worse.is_empty() {
            "A* cost matches Dijkstra on 3 node pairs".to_string()
        } else {
            worse.join("; ")
        },
    ));

    // Disconnected island
    let island_map = MapData::with_zones(vec![
        WalkableZone::rect("Main", 0.0, 0.0, 100.0, 100.0, true),
        WalkableZone::rect("Island", 400.0, 0.0, 100.0, 100.0, true),
    ]);
    let unreachable = match NavMeshBuilder::default().build(&island_map) {
        Ok(mesh) => Pathfinder::new(Arc::new(mesh))
            .find_path(Point::new(50.0, 50.0), Point::new(450.0, 50.0))
            .is_none(),
        Err(_) => false,
    };
    results.push(TestResult::new(
        "pathfind_unreachable",
        unreachable,
        "island → no path".to_string(),
    ));

    if verbose {
        println!("    {} rooms checked", rooms.len());
    }
    results
}

/// Reference shortest-path cost, O(n²) with no heuristic.
fn dijkstra(mesh: &NavMesh, from: NodeId, to: NodeId) -> Option<f32> {
    let n = mesh.node_count();
    let mut dist = vec![f32::INFINITY; n];
    let mut done = vec![false; n];
    dist[from as usize] = 0.0;
    loop {
        let current = (0..n)
            .filter(|&i| !done[i] && dist[i].is_finite())
            .min_by(|&a, &b| dist[a].total_cmp(&dist[b]))?;
        if current == to as usize {
            return Some(dist[current]);
        }
        done[current] = true;
        for &(next, weight) in mesh.neighbors(current as NodeId) {
            let candidate = dist[current] + weight;
            if candidate < dist[next as usize] {
                dist[next as usize] = candidate;
            }
        }
    }
}

// ── 4. Zone Detection ───────────────────────────────────────────────────

fn validate_zone_detection(fx: &Fixture, _verbose: bool) -> Vec<TestResult> {
    println!("--- Zone Detection ---");
    let mut results = Vec::new();
    let mut detector = ZoneDetector::new(fx.zones.clone());

    let first = detector.update_player_position("Red", Point::new(660.0, 60.0), 0.0);
    results.push(TestResult::new(
        "zone_first_sighting",
        first.as_ref().is_some_and(|t| t.from_zone.is_none() && t.to_zone.as_deref() == Some("Cafeteria")),
        "void → Cafeteria".to_string(),
    ));

    let repeat = detector.update_player_position("Red", Point::new(650.0, 70.0), 0.1);
    results.push(TestResult::new(
        "zone_no_event_within_zone",
        repeat.is_none(),
        "moving inside Cafeteria is silent".to_string(),
    ));

    let hallway = detector.update_player_position("Red", Point::new(540.0, 400.0), 0.2);
    results.push(TestResult::new(
        "zone_room_to_hallway",
        hallway.as_ref().is_some_and(|t| {
            t.from_zone.as_deref() == Some("Cafeteria")
                && t.to_zone.as_deref() == Some("Spine")
                && t.to_type == ZoneType::Hallway
        }),
        "Cafeteria → Spine (HALLWAY)".to_string(),
    ));

    let void = detector.update_player_position("Red", Point::new(-500.0, -500.0), 0.3);
    results.push(TestResult::new(
        "zone_leaving_map",
        void.as_ref().is_some_and(|t| t.to_zone.is_none() && t.to_type == ZoneType::Unknown),
        "Spine → void".to_string(),
    ));

    let unseen = detector.update_player_position("Blue", Point::new(-500.0, -500.0), 0.0);
    results.push(TestResult::new(
        "zone_void_first_sighting_silent",
        unseen.is_none() && detector.tracked_players() == 2,
        "first sighting off the map emits nothing".to_string(),
    ));

    let misses: Vec<&str> = fx
        .zones
        .iter()
        .filter(|z| fx.mesh.is_walkable(&z.centroid))
        .filter(|z| detector.zone_at(&z.centroid).map(|found| found.name.as_str()) != Some(z.name.as_str()))
        .map(|z| z.name.as_str())
        .collect();
    results.push(TestResult::new(
        "zone_centroids_classified",
        misses.is_empty(),
        if misses.is_empty() {
            "every centroid maps to its own zone".to_string()
        } else {
            format!("misclassified: {}", misses.join(", "))
        },
    ));

    results
}

// ── 5. Destinations ─────────────────────────────────────────────────────

fn validate_destinations(fx: &Fixture, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Destinations ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let selector = DestinationSelector::new(fx.zones.clone(), fx.mesh.area().clone(), SamplingConfig::default())
        .with_map_features(&fx.map)
        .with_zone_nodes(fx.mesh.zone_node_positions());

    let origin = Point::new(540.0, 140.0);
    let sweeps: [(&str, DestinationOptions); 4] = [
        ("any", DestinationOptions::default()),
        ("rooms", DestinationOptions::rooms()),
        ("hallways", DestinationOptions::hallways().avoiding_edges()),
        ("far", DestinationOptions::default().with_min_distance(300.0)),
    ];
    for (label, opts) in sweeps {
        let mut misses = 0;
        let mut wrong_kind = 0;
        let mut too_close = 0;
        let mut found = 0;
        for _ in 0..200 {
            let Some(p) = selector.select_random_destination(origin, &fx.zones, &opts, &mut rng) else {
                misses += 1;
                continue;
            };
            found += 1;
            if !fx.mesh.is_walkable(&p) {
                misses += 1;
            }
            if opts.prefer_rooms && !in_zone_of_kind(&fx.zones, &p, Zone::is_room) {
                wrong_kind += 1;
            }
            if opts.prefer_hallways && !in_zone_of_kind(&fx.zones, &p, Zone::is_hallway) {
                wrong_kind += 1;
            }
            if opts.min_distance_from_current.is_some_and(|d| p.distance(&origin) < d) {
                too_close += 1;
            }
        }
        results.push(TestResult::new(
            &format!("destination_{}", label),
            misses == 0 && wrong_kind == 0 && too_close == 0,
            format!(
                "{}/200 found, {} off-map, {} wrong zone type, {} too close",
                found, misses, wrong_kind, too_close
            ),
        ));
    }

    let nothing = selector.select_random_destination(origin, &[], &DestinationOptions::default(), &mut rng);
    results.push(TestResult::new(
        "destination_no_candidates",
        nothing.is_none(),
        "empty candidate list → none".to_string(),
    ));

    let meeting = selector.select_meeting_point();
    results.push(TestResult::new(
        "destination_meeting_point",
        meeting == fx.map.emergency_button.as_ref().map(|b| b.position),
        format!("{:?}", meeting),
    ));

    let mut vent_failures = Vec::new();
    for vent in &fx.map.vents {
        match selector.select_vent_exit(&vent.id, &mut rng) {
            Some(p) if fx.mesh.is_walkable(&p) => {}
            Some(p) => vent_failures.push(format!("{} exits off-map at ({:.0},{:.0})", vent.id, p.x, p.y)),
            None if vent.connected_to.is_empty() => {}
            None => vent_failures.push(format!("{} has no exit", vent.id)),
        }
    }
    results.push(TestResult::new(
        "destination_vent_exits",
        vent_failures.is_empty(),
        if vent_failures.is_empty() {
            format!("{} vents checked", fx.map.vents.len())
        } else {
            vent_failures.join("; ")
        },
    ));

    let task = selector.select_task_destination(Some("Swipe Card"), &mut rng);
    results.push(TestResult::new(
        "destination_named_task",
        task.is_some_and(|p| fx.map.tasks.iter().any(|t| t.task_type == "Swipe Card" && t.position == p)),
        format!("Swipe Card at {:?}", task),
    ));

    if verbose {
        for zone in fx.zones.iter().filter(|z| z.is_room()) {
            let center = selector.select_room_center(Some(&zone.name), &mut rng);
            println!("    {:<18} center {:?}", zone.name, center);
        }
    }
    results
}

fn in_zone_of_kind(zones: &[Zone], p: &Point, kind: fn(&Zone) -> bool) -> bool {
    zones.iter().any(|z| kind(z) && z.contains(p))
}

// ── 6. State Machine ────────────────────────────────────────────────────

fn validate_state_machine(_verbose: bool) -> Vec<TestResult> {
    println!("--- State Machine ---");
    let mut results = Vec::new();
    let mut sm = PlayerStateMachine::new("Red");

    let entered = Arc::new(Mutex::new(0u32));
    let counter = entered.clone();
    sm.on_enter(ActivityState::DoingTask, move |_| {
        if let Ok(mut n) = counter.lock() {
            *n += 1;
        }
    });

    let mut now = 0.0;
    for i in 0..30 {
        now += 1.0;
        let state = ActivityState::ALL[i % ActivityState::ALL.len()];
        sm.transition_to(state, Some("sweep"), now);
    }
    results.push(TestResult::new(
        "state_history_bounded",
        sm.history_len() == HISTORY_CAPACITY,
        format!("{} entries kept", sm.history_len()),
    ));

    let before = sm.history_len();
    let current = sm.activity();
    let repeat = sm.transition_to(current, None, now + 1.0);
    results.push(TestResult::new(
        "state_same_state_noop",
        repeat.is_none() && sm.history_len() == before,
        format!("{} → {} ignored", current.label(), current.label()),
    ));

    let fired = entered.lock().map(|n| *n).unwrap_or(0);
    results.push(TestResult::new(
        "state_listener_fires",
        fired == 6,
        format!("DOING_TASK listener fired {} times", fired),
    ));

    sm.update_location(Some("Spine"), ZoneType::Hallway);
    results.push(TestResult::new(
        "state_location_from_zone",
        sm.location() == LocationState::InHallway && sm.history_len() == before,
        "Spine → IN_HALLWAY without history".to_string(),
    ));

    results
}

// ── 7. Fleet Run ────────────────────────────────────────────────────────

fn validate_fleet_run(fx: &Fixture, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Fleet Run ---");
    let mut results = Vec::new();
    let config = FleetConfig {
        seed,
        ..Default::default()
    };

    let run = |ticks: usize| -> Option<(FleetEngine, Vec<usize>)> {
        let mut engine = FleetEngine::new(&fx.map, config.clone()).ok()?;
        let mut per_tick = Vec::with_capacity(ticks);
        for _ in 0..ticks {
            engine.tick(0.1);
            per_tick.push(engine.drain_zone_transitions().len());
        }
        Some((engine, per_tick))
    };

    let Some((engine, per_tick)) = run(1200) else {
        results.push(TestResult::new("fleet_spawn", false, "engine failed to build"));
        return results;
    };
    results.push(TestResult::new(
        "fleet_spawn",
        engine.agent_count() == config.agent_count,
        format!("{} agents", engine.agent_count()),
    ));

    let zone_changes: usize = per_tick.iter().sum();
    results.push(TestResult::new(
        "fleet_zone_transitions",
        zone_changes > config.agent_count,
        format!("{} zone transitions over {:.0}s", zone_changes, engine.sim_time()),
    ));

    let mut lost = Vec::new();
    let mut activity_counts: HashMap<&'static str, usize> = HashMap::new();
    let mut history_total = 0;
    for id in engine.agent_ids() {
        let Some(p) = engine.position(id.as_str()) else {
            lost.push(id.to_string());
            continue;
        };
        let walking = engine.activity(id.as_str()) == Some(ActivityState::Walking);
        if !walking && !fx.mesh.is_walkable(&p) {
            lost.push(format!("{} at ({:.0},{:.0})", id, p.x, p.y));
        }
        if let Some(activity) = engine.activity(id.as_str()) {
            *activity_counts.entry(activity.label()).or_default() += 1;
        }
        history_total += engine.history(id.as_str()).map_or(0, |h| h.len());
    }
    results.push(TestResult::new(
        "fleet_agents_on_map",
        lost.is_empty(),
        if lost.is_empty() {
            "every resting agent stands on walkable ground".to_string()
        } else {
            lost.join("; ")
        },
    ));
    results.push(TestResult::new(
        "fleet_activity",
        history_total > 0,
        format!("{} activity transitions recorded", history_total),
    ));

    let replay = run(1200).map(|(other, _)| {
        engine
            .agent_ids()
            .iter()
            .all(|id| engine.position(id.as_str()) == other.position(id.as_str()))
    });
    results.push(TestResult::new(
        "fleet_deterministic",
        replay == Some(true),
        format!("seed {} replays identically", seed),
    ));

    if verbose {
        let mut counts: Vec<_> = activity_counts.into_iter().collect();
        counts.sort();
        for (label, n) in counts {
            println!("    {:<12} {}", label, n);
        }
        for id in engine.agent_ids() {
            if let (Some(p), Some(loc)) = (engine.position(id.as_str()), engine.location(id.as_str())) {
                println!("    {:<8} ({:>4.0},{:>4.0}) {:?}", id, p.x, p.y, loc);
            }
        }
    }
    results
}
