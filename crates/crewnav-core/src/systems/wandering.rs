//! Wandering behaviour - gives idle agents somewhere to go
//!
//! Idle agents occasionally pick a destination (a task station or a random
//! point), route to it and walk there. Agents that reach a task work on it
//! for a few seconds before going idle again. Vent and meeting states are
//! left for the host to drive.

use crewnav_logic::destination::DestinationOptions;
use crewnav_logic::geometry::Point;
use crewnav_logic::state_machine::ActivityState;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::movement::movement_step;
use crate::components::{Chore, Route};
use crate::engine::{AgentBehavior, AgentContext};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderBehavior {
    /// Chance per second that an idle agent sets off
    pub departure_rate: f32,
    /// Share of departures that head for a task station
    pub task_chance: f32,
    /// Seconds spent on a task, sampled uniformly
    pub task_duration: (f32, f32),
    pub options: DestinationOptions,
    /// Straighten routes with line-of-sight pruning
    pub smooth_paths: bool,
}

impl Default for WanderBehavior {
    fn default() -> Self {
        Self {
            departure_rate: 0.5,
            task_chance: 0.3,
            task_duration: (2.0, 5.0),
            options: DestinationOptions::default(),
            smooth_paths: true,
        }
    }
}

impl WanderBehavior {
    fn depart(&self, ctx: &mut AgentContext<'_>, from: Point) {
        let (destination, chore) = if ctx.rng.gen::<f32>() < self.task_chance {
            let task = match ctx.selector.tasks() {
                [] => None,
                tasks => Some(tasks[ctx.rng.gen_range(0..tasks.len())].clone()),
            };
            match task {
                Some(task) => {
                    let (lo, hi) = self.task_duration;
                    let remaining = if hi > lo { ctx.rng.gen_range(lo..=hi) } else { lo };
                    let chore = Chore {
                        task_type: task.task_type,
                        remaining,
                    };
                    (Some(task.position), Some(chore))
                }
                None => (None, None),
            }
        } else {
            let dest = ctx.selector.select_random_destination(
                from,
                ctx.selector.zones(),
                &self.options,
                &mut *ctx.rng,
            );
            (dest, None)
        };

        let Some(destination) = destination else {
            return;
        };
        let Some(path) = ctx.pathfinder.find_path(from, destination) else {
            log::debug!("No route from ({:.0},{:.0}) to ({:.0},{:.0})", from.x, from.y, destination.x, destination.y);
            return;
        };
        let waypoints = if self.smooth_paths {
            ctx.pathfinder.smooth_path(&path.waypoints)
        } else {
            path.waypoints
        };

        let reason = match &chore {
            Some(c) => format!("heading to {}", c.task_type),
            None => "wandering".to_string(),
        };
        let _ = ctx.world.insert_one(ctx.entity, Route::new(from, waypoints));
        if let Some(chore) = chore {
            let _ = ctx.world.insert_one(ctx.entity, chore);
        }
        ctx.transition_to(ActivityState::Walking, &reason);
    }
}

impl AgentBehavior for WanderBehavior {
    fn step(&mut self, ctx: &mut AgentContext<'_>) {
        let Some(activity) = ctx.activity() else {
            return;
        };

        match activity {
            ActivityState::Walking => {
                if ctx.world.get::<&Route>(ctx.entity).is_err() {
                    ctx.transition_to(ActivityState::Idle, "route lost");
                    return;
                }
                if movement_step(ctx.world, ctx.entity, ctx.dt) {
                    if ctx.world.get::<&Chore>(ctx.entity).is_ok() {
                        ctx.transition_to(ActivityState::DoingTask, "arrived at task");
                    } else {
                        ctx.transition_to(ActivityState::Idle, "arrived");
                    }
                }
            }
            ActivityState::DoingTask => {
                let done = match ctx.world.get::<&mut Chore>(ctx.entity) {
                    Ok(mut chore) => {
                        chore.remaining -= ctx.dt;
                        chore.remaining <= 0.0
                    }
                    Err(_) => true,
                };
                if done {
                    let _ = ctx.world.remove_one::<Chore>(ctx.entity);
                    ctx.transition_to(ActivityState::Idle, "task complete");
                }
            }
            ActivityState::Idle => {
                let chance = (self.departure_rate * ctx.dt).clamp(0.0, 1.0);
                if ctx.rng.gen::<f32>() >= chance {
                    return;
                }
                if let Some(from) = ctx.position() {
                    self.depart(ctx, from);
                }
            }
            ActivityState::InVent | ActivityState::InMeeting => {}
        }
    }
}
