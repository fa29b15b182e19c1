//! Systems - logic that operates on agent components

mod movement;
mod wandering;

pub use movement::*;
pub use wandering::*;
