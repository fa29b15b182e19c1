//! Per-agent activity and location state.
//!
//! Activity changes go through [`PlayerStateMachine::transition_to`], which
//! records history and notifies listeners. Location is a plain property set
//! from zone transitions and never fires listeners.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::zones::ZoneType;

/// Transitions kept in history before the oldest is dropped.
pub const HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityState {
    #[default]
    Idle,
    Walking,
    DoingTask,
    InVent,
    InMeeting,
}

impl ActivityState {
    pub const ALL: [ActivityState; 5] = [
        ActivityState::Idle,
        ActivityState::Walking,
        ActivityState::DoingTask,
        ActivityState::InVent,
        ActivityState::InMeeting,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ActivityState::Idle => "idle",
            ActivityState::Walking => "walking",
            ActivityState::DoingTask => "doing task",
            ActivityState::InVent => "in vent",
            ActivityState::InMeeting => "in meeting",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationState {
    InRoom,
    InHallway,
    #[default]
    Unknown,
}

impl From<ZoneType> for LocationState {
    fn from(zone_type: ZoneType) -> Self {
        match zone_type {
            ZoneType::Room => LocationState::InRoom,
            ZoneType::Hallway => LocationState::InHallway,
            ZoneType::Unknown => LocationState::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub agent_id: String,
    pub from: ActivityState,
    pub to: ActivityState,
    pub timestamp: f64,
    pub reason: Option<String>,
}

/// Handle returned by [`PlayerStateMachine::on_enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&StateTransition) + Send + Sync>;

pub struct PlayerStateMachine {
    agent_id: String,
    activity: ActivityState,
    location: LocationState,
    current_zone: Option<String>,
    last_position: Option<Point>,
    state_entered_at: f64,
    history: VecDeque<StateTransition>,
    listeners: Vec<(ListenerId, ActivityState, Listener)>,
    next_listener: u64,
}

impl PlayerStateMachine {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            activity: ActivityState::Idle,
            location: LocationState::Unknown,
            current_zone: None,
            last_position: None,
            state_entered_at: 0.0,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn activity(&self) -> ActivityState {
        self.activity
    }

    pub fn location(&self) -> LocationState {
        self.location
    }

    pub fn current_zone(&self) -> Option<&str> {
        self.current_zone.as_deref()
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = &StateTransition> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn last_transition(&self) -> Option<&StateTransition> {
        self.history.back()
    }

    pub fn time_in_state(&self, now: f64) -> f64 {
        (now - self.state_entered_at).max(0.0)
    }

    pub fn state_entered_at(&self) -> f64 {
        self.state_entered_at
    }

    pub fn set_position(&mut self, p: Point) {
        self.last_position = Some(p);
    }

    pub fn last_position(&self) -> Option<Point> {
        self.last_position
    }

    /// Change activity. Returns `None` (and touches nothing) if already in `state`.
    pub fn transition_to(&mut self, state: ActivityState, reason: Option<&str>, now: f64) -> Option<StateTransition> {
        if state == self.activity {
            return None;
        }
        let transition = StateTransition {
            agent_id: self.agent_id.clone(),
            from: self.activity,
            to: state,
            timestamp: now,
            reason: reason.map(str::to_string),
        };
        self.activity = state;
        self.state_entered_at = now;
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(transition.clone());

        for (_, target, listener) in self.listeners.iter_mut() {
            if *target == state {
                listener(&transition);
            }
        }
        Some(transition)
    }

    /// Record the zone the agent is in. No history, no listeners.
    pub fn update_location(&mut self, zone_name: Option<&str>, zone_type: ZoneType) {
        self.current_zone = zone_name.map(str::to_string);
        self.location = LocationState::from(zone_type);
    }

    /// Call `listener` whenever the machine enters `state`.
    pub fn on_enter(
        &mut self,
        state: ActivityState,
        listener: impl FnMut(&StateTransition) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, state, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Back to IDLE / UNKNOWN with empty history. Keeps identity, last
    /// position and listeners.
    pub fn reset(&mut self) {
        self.activity = ActivityState::Idle;
        self.location = LocationState::Unknown;
        self.current_zone = None;
        self.state_entered_at = 0.0;
        self.history.clear();
    }
}

impl std::fmt::Debug for PlayerStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerStateMachine")
            .field("agent_id", &self.agent_id)
            .field("activity", &self.activity)
            .field("location", &self.location)
            .field("current_zone", &self.current_zone)
            .field("history", &self.history.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_initial_state() {
        let sm = PlayerStateMachine::new("Red");
        assert_eq!(sm.activity(), ActivityState::Idle);
        assert_eq!(sm.location(), LocationState::Unknown);
        assert_eq!(sm.history_len(), 0);
    }

    #[test]
    fn test_transition_records_history() {
        let mut sm = PlayerStateMachine::new("Red");
        let t = sm.transition_to(ActivityState::Walking, Some("heading to task"), 1.5).unwrap();
        assert_eq!(t.from, ActivityState::Idle);
        assert_eq!(t.to, ActivityState::Walking);
        assert_eq!(t.reason.as_deref(), Some("heading to task"));
        assert_eq!(sm.history_len(), 1);
        assert_eq!(sm.time_in_state(4.0), 2.5);
    }

    #[test]
    fn test_same_state_is_noop() {
        let mut sm = PlayerStateMachine::new("Red");
        sm.transition_to(ActivityState::Walking, None, 1.0);
        assert!(sm.transition_to(ActivityState::Walking, None, 5.0).is_none());
        assert_eq!(sm.history_len(), 1);
        assert_eq!(sm.state_entered_at(), 1.0);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut sm = PlayerStateMachine::new("Red");
        for i in 0..25 {
            let state = if i % 2 == 0 {
                ActivityState::Walking
            } else {
                ActivityState::Idle
            };
            sm.transition_to(state, None, i as f64);
        }
        assert_eq!(sm.history_len(), HISTORY_CAPACITY);
        let first = sm.history().next().unwrap();
        assert_eq!(first.timestamp, 5.0);
        assert_eq!(sm.last_transition().unwrap().timestamp, 24.0);
    }

    #[test]
    fn test_listeners_fire_in_order_for_their_state() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sm = PlayerStateMachine::new("Red");
        let l1 = log.clone();
        sm.on_enter(ActivityState::DoingTask, move |t| l1.lock().unwrap().push(format!("first {:?}", t.to)));
        let l2 = log.clone();
        sm.on_enter(ActivityState::DoingTask, move |_| l2.lock().unwrap().push("second".to_string()));
        let l3 = log.clone();
        sm.on_enter(ActivityState::InVent, move |_| l3.lock().unwrap().push("vent".to_string()));

        sm.transition_to(ActivityState::Walking, None, 0.0);
        sm.transition_to(ActivityState::DoingTask, None, 1.0);
        assert_eq!(*log.lock().unwrap(), vec!["first DoingTask".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_remove_listener() {
        let hits = Arc::new(Mutex::new(0));
        let mut sm = PlayerStateMachine::new("Red");
        let h = hits.clone();
        let id = sm.on_enter(ActivityState::Walking, move |_| *h.lock().unwrap() += 1);
        assert!(sm.remove_listener(id));
        assert!(!sm.remove_listener(id));
        sm.transition_to(ActivityState::Walking, None, 0.0);
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn test_update_location_bypasses_listeners() {
        let hits = Arc::new(Mutex::new(0));
        let mut sm = PlayerStateMachine::new("Red");
        for state in ActivityState::ALL {
            let h = hits.clone();
            sm.on_enter(state, move |_| *h.lock().unwrap() += 1);
        }
        sm.update_location(Some("Cafeteria"), ZoneType::Room);
        assert_eq!(sm.location(), LocationState::InRoom);
        assert_eq!(sm.current_zone(), Some("Cafeteria"));
        sm.update_location(Some("Hall-1"), ZoneType::Hallway);
        assert_eq!(sm.location(), LocationState::InHallway);
        sm.update_location(None, ZoneType::Unknown);
        assert_eq!(sm.location(), LocationState::Unknown);
        assert_eq!(*hits.lock().unwrap(), 0);
        assert_eq!(sm.history_len(), 0);
    }

    #[test]
    fn test_reset_keeps_identity_and_position() {
        let mut sm = PlayerStateMachine::new("Red");
        sm.set_position(Point::new(3.0, 4.0));
        sm.on_enter(ActivityState::Walking, |_| {});
        sm.transition_to(ActivityState::Walking, None, 1.0);
        sm.update_location(Some("Cafeteria"), ZoneType::Room);
        sm.reset();
        assert_eq!(sm.agent_id(), "Red");
        assert_eq!(sm.last_position(), Some(Point::new(3.0, 4.0)));
        assert_eq!(sm.activity(), ActivityState::Idle);
        assert_eq!(sm.location(), LocationState::Unknown);
        assert_eq!(sm.history_len(), 0);
        assert_eq!(sm.listener_count(), 1);
    }
}
