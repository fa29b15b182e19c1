//! Component definitions for the agent world.
//!
//! Components are plain data attached to agent entities. Behaviour lives in
//! systems and in the engine tick.

mod agent;
mod motion;

pub use agent::*;
pub use motion::*;
