//! Fleet engine - main entry point for running agents on a map

use std::collections::HashMap;
use std::sync::Arc;

use crewnav_logic::config::FleetConfig;
use crewnav_logic::destination::DestinationSelector;
use crewnav_logic::error::MapError;
use crewnav_logic::geometry::Point;
use crewnav_logic::map::MapData;
use crewnav_logic::navmesh::{NavMesh, NavMeshBuilder};
use crewnav_logic::pathfinding::{Path, Pathfinder};
use crewnav_logic::state_machine::{
    ActivityState, ListenerId, LocationState, PlayerStateMachine, StateTransition,
};
use crewnav_logic::zones::{build_zones, Zone, ZoneDetector, ZoneTransition};
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::components::*;
use crate::systems::WanderBehavior;

/// Everything a behaviour may touch while stepping one agent.
pub struct AgentContext<'a> {
    pub entity: Entity,
    pub world: &'a mut World,
    pub pathfinder: &'a mut Pathfinder,
    pub selector: &'a DestinationSelector,
    pub rng: &'a mut StdRng,
    /// Simulation time in seconds, already advanced for this frame
    pub now: f64,
    pub dt: f32,
}

impl AgentContext<'_> {
    pub fn position(&self) -> Option<Point> {
        self.world.get::<&Position>(self.entity).ok().map(|p| p.0)
    }

    pub fn activity(&self) -> Option<ActivityState> {
        self.world
            .get::<&PlayerStateMachine>(self.entity)
            .ok()
            .map(|sm| sm.activity())
    }

    /// Change this agent's activity at the current time.
    pub fn transition_to(&mut self, state: ActivityState, reason: &str) -> Option<StateTransition> {
        let mut sm = self.world.get::<&mut PlayerStateMachine>(self.entity).ok()?;
        let transition = sm.transition_to(state, Some(reason), self.now);
        transition
    }
}

/// Moves one agent per call. Supplied by the host; [`WanderBehavior`] is
/// the built-in default.
pub trait AgentBehavior {
    fn step(&mut self, ctx: &mut AgentContext<'_>);
}

/// Owns the navigation stack and every agent.
pub struct FleetEngine {
    /// ECS world holding one entity per agent
    pub world: World,
    /// Simulation time in seconds since start
    pub sim_time: f64,
    navmesh: Arc<NavMesh>,
    zones: Arc<[Zone]>,
    pathfinder: Pathfinder,
    detector: ZoneDetector,
    selector: DestinationSelector,
    /// Spawn order, which is also the tick order
    agents: Vec<Entity>,
    index: HashMap<AgentId, Entity>,
    zone_events: Vec<ZoneTransition>,
    rng: StdRng,
    config: FleetConfig,
    wander: WanderBehavior,
}

impl FleetEngine {
    /// Build the navmesh and zone list from `map`, then spawn the fleet.
    pub fn new(map: &MapData, config: FleetConfig) -> Result<Self, MapError> {
        let navmesh = Arc::new(NavMeshBuilder::new(config.navmesh.clone()).build(map)?);
        let zones: Arc<[Zone]> = build_zones(map).into();
        let pathfinder = Pathfinder::with_cache(navmesh.clone(), config.navmesh.path_cache_capacity);
        let detector = ZoneDetector::new(zones.clone());
        let selector = DestinationSelector::new(zones.clone(), navmesh.area().clone(), config.sampling.clone())
            .with_map_features(map)
            .with_zone_nodes(navmesh.zone_node_positions());

        let mut engine = Self {
            world: World::new(),
            sim_time: 0.0,
            navmesh,
            zones,
            pathfinder,
            detector,
            selector,
            agents: Vec::with_capacity(config.agent_count),
            index: HashMap::new(),
            zone_events: Vec::new(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            wander: WanderBehavior::default(),
        };
        for i in 0..engine.config.agent_count {
            engine.spawn_agent(i);
        }
        log::info!(
            "Fleet ready: {} agents on {} zones (seed {})",
            engine.agents.len(),
            engine.zones.len(),
            engine.config.seed
        );
        Ok(engine)
    }

    fn spawn_agent(&mut self, index: usize) -> Entity {
        let agent = Agent::new(index);
        let position = self.spawn_point();
        let speed = if self.config.max_speed > self.config.min_speed {
            self.rng.gen_range(self.config.min_speed..=self.config.max_speed)
        } else {
            self.config.min_speed
        };
        let motion = Motion {
            speed,
            vision_radius: self.config.vision_radius,
            action_radius: self.config.action_radius,
        };
        let mut sm = PlayerStateMachine::new(agent.id.as_str());
        sm.set_position(position);

        log::debug!(
            "Spawned {} at ({:.0},{:.0}) speed {:.0}",
            agent.id,
            position.x,
            position.y,
            speed
        );
        let id = agent.id.clone();
        let entity = self.world.spawn((agent, Position(position), motion, sm));
        self.agents.push(entity);
        self.index.insert(id, entity);
        entity
    }

    /// Random point in a random walkable zone; the zone centroid if sampling fails.
    fn spawn_point(&mut self) -> Point {
        let walkable: Vec<&Zone> = self.zones.iter().filter(|z| z.walkable).collect();
        if walkable.is_empty() {
            return Point::ZERO;
        }
        let zone = walkable[self.rng.gen_range(0..walkable.len())];
        for _ in 0..self.config.spawn_attempts {
            if let Some(p) = self.selector.generate_point_in_zone(zone, false, &mut self.rng) {
                return p;
            }
        }
        log::warn!("Spawn sampling failed in '{}', using its centroid", zone.name);
        zone.centroid
    }

    /// Advance one frame with the given behaviour.
    ///
    /// Agents are visited in spawn order; each one moves, is classified by the
    /// zone detector, and has any zone change applied to its state machine
    /// before the next agent starts.
    pub fn update(&mut self, delta_seconds: f32, behavior: &mut impl AgentBehavior) {
        self.sim_time += delta_seconds as f64;
        let now = self.sim_time;

        for i in 0..self.agents.len() {
            let entity = self.agents[i];

            // (a) Behaviour and movement
            {
                let mut ctx = AgentContext {
                    entity,
                    world: &mut self.world,
                    pathfinder: &mut self.pathfinder,
                    selector: &self.selector,
                    rng: &mut self.rng,
                    now,
                    dt: delta_seconds,
                };
                behavior.step(&mut ctx);
            }

            let (id, position) = match self.world.query_one_mut::<(&Agent, &Position)>(entity) {
                Ok((agent, pos)) => (agent.id.clone(), pos.0),
                Err(_) => continue,
            };

            // (b) Zone detection, (c) location update
            let transition = self.detector.update_player_position(id.as_str(), position, now);
            if let Ok(mut sm) = self.world.get::<&mut PlayerStateMachine>(entity) {
                sm.set_position(position);
                if let Some(t) = &transition {
                    sm.update_location(t.to_zone.as_deref(), t.to_type);
                }
            }
            if let Some(t) = transition {
                self.zone_events.push(t);
            }
        }
    }

    /// Advance one frame with the built-in wandering behaviour.
    pub fn tick(&mut self, delta_seconds: f32) {
        let mut wander = std::mem::take(&mut self.wander);
        self.update(delta_seconds, &mut wander);
        self.wander = wander;
    }

    /// Zone transitions recorded since the last drain, in tick order.
    pub fn drain_zone_transitions(&mut self) -> Vec<ZoneTransition> {
        std::mem::take(&mut self.zone_events)
    }

    /// Agent ids in a seeded random order.
    pub fn speaking_order(&mut self) -> Vec<AgentId> {
        let mut ids = self.agent_ids();
        ids.shuffle(&mut self.rng);
        ids
    }

    /// Agent ids in spawn order.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents
            .iter()
            .filter_map(|&e| self.world.get::<&Agent>(e).ok().map(|a| a.id.clone()))
            .collect()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn entity(&self, id: &str) -> Option<Entity> {
        self.index.get(&AgentId::from(id)).copied()
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        let entity = self.entity(id)?;
        self.world.get::<&Position>(entity).ok().map(|p| p.0)
    }

    pub fn motion(&self, id: &str) -> Option<Motion> {
        let entity = self.entity(id)?;
        self.world.get::<&Motion>(entity).ok().map(|m| *m)
    }

    pub fn color(&self, id: &str) -> Option<AgentColor> {
        let entity = self.entity(id)?;
        self.world.get::<&Agent>(entity).ok().map(|a| a.color)
    }

    pub fn activity(&self, id: &str) -> Option<ActivityState> {
        self.with_state_machine(id, |sm| sm.activity())
    }

    pub fn location(&self, id: &str) -> Option<LocationState> {
        self.with_state_machine(id, |sm| sm.location())
    }

    pub fn history(&self, id: &str) -> Option<Vec<StateTransition>> {
        self.with_state_machine(id, |sm| sm.history().cloned().collect())
    }

    pub fn with_state_machine<R>(&self, id: &str, f: impl FnOnce(&PlayerStateMachine) -> R) -> Option<R> {
        let entity = self.entity(id)?;
        let sm = self.world.get::<&PlayerStateMachine>(entity).ok()?;
        let result = f(&sm);
        Some(result)
    }

    pub fn with_state_machine_mut<R>(&mut self, id: &str, f: impl FnOnce(&mut PlayerStateMachine) -> R) -> Option<R> {
        let entity = self.entity(id)?;
        let mut sm = self.world.get::<&mut PlayerStateMachine>(entity).ok()?;
        let result = f(&mut sm);
        Some(result)
    }

    /// Request an activity change for an agent at the current sim time.
    pub fn transition_agent(&mut self, id: &str, state: ActivityState, reason: Option<&str>) -> Option<StateTransition> {
        let now = self.sim_time;
        self.with_state_machine_mut(id, |sm| sm.transition_to(state, reason, now))
            .flatten()
    }

    /// Listen for an agent entering `state`.
    pub fn on_enter(
        &mut self,
        id: &str,
        state: ActivityState,
        listener: impl FnMut(&StateTransition) + Send + Sync + 'static,
    ) -> Option<ListenerId> {
        self.with_state_machine_mut(id, |sm| sm.on_enter(state, listener))
    }

    /// Put an agent down at `p` and drop whatever it was doing.
    pub fn teleport(&mut self, id: &str, p: Point) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        if let Ok(mut pos) = self.world.get::<&mut Position>(entity) {
            pos.0 = p;
        }
        let _ = self.world.remove_one::<Route>(entity);
        let _ = self.world.remove_one::<Chore>(entity);
        true
    }

    /// Reset every agent's state machine and zone record. Positions stay.
    pub fn reset_agents(&mut self) {
        for &entity in &self.agents {
            let _ = self.world.remove_one::<Route>(entity);
            let _ = self.world.remove_one::<Chore>(entity);
            if let Ok(mut sm) = self.world.get::<&mut PlayerStateMachine>(entity) {
                sm.reset();
                self.detector.forget_player(sm.agent_id());
            }
        }
        self.zone_events.clear();
    }

    pub fn find_path(&mut self, start: Point, goal: Point) -> Option<Path> {
        self.pathfinder.find_path(start, goal)
    }

    pub fn navmesh(&self) -> &Arc<NavMesh> {
        &self.navmesh
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn detector(&self) -> &ZoneDetector {
        &self.detector
    }

    pub fn selector(&self) -> &DestinationSelector {
        &self.selector
    }

    /// The engine's seeded RNG, for host-side sampling calls.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }
}
