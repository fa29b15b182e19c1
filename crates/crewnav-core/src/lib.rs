//! crewnav Core - Agent Fleet Engine
//!
//! Owns the navigation stack for a whole crew of agents and runs the
//! per-frame tick that ties movement, zone detection and agent state
//! together.
//!
//! # Architecture
//!
//! Agents live in a `hecs` world:
//! - **Entities**: one per agent, spawned in a fixed order
//! - **Components**: identity, position, movement parameters, route, state machine
//! - **Systems**: route following and the built-in wandering behaviour
//!
//! The tick visits agents strictly one after another: behaviour step, then
//! zone detection, then the location update on that agent's state machine.
//!
//! # Example
//!
//! ```rust,no_run
//! use crewnav_core::prelude::*;
//! use crewnav_logic::config::FleetConfig;
//! use crewnav_logic::map::MapData;
//!
//! # fn run(json: &str) -> Result<(), crewnav_logic::MapError> {
//! let map = MapData::from_json(json)?;
//! let mut engine = FleetEngine::new(&map, FleetConfig::default())?;
//! let mut behavior = WanderBehavior::default();
//!
//! loop {
//!     engine.update(1.0 / 30.0, &mut behavior);
//! }
//! # }
//! ```

pub mod components;
pub mod engine;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{AgentBehavior, AgentContext, FleetEngine};
    pub use crate::systems::WanderBehavior;
}
