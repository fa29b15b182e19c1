//! Agent identity: ids and the colour palette.

use serde::{Deserialize, Serialize};

/// Stable agent identifier (the display name, e.g. "Red" or "Red-2").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Visual identity, assigned round-robin at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Pink,
    Cyan,
}

impl AgentColor {
    pub const PALETTE: [AgentColor; 8] = [
        AgentColor::Red,
        AgentColor::Blue,
        AgentColor::Green,
        AgentColor::Yellow,
        AgentColor::Purple,
        AgentColor::Orange,
        AgentColor::Pink,
        AgentColor::Cyan,
    ];

    /// Palette entry for the `index`-th spawned agent.
    pub fn for_index(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            AgentColor::Red => "Red",
            AgentColor::Blue => "Blue",
            AgentColor::Green => "Green",
            AgentColor::Yellow => "Yellow",
            AgentColor::Purple => "Purple",
            AgentColor::Orange => "Orange",
            AgentColor::Pink => "Pink",
            AgentColor::Cyan => "Cyan",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            AgentColor::Red => (255, 0, 0),
            AgentColor::Blue => (0, 0, 255),
            AgentColor::Green => (0, 255, 0),
            AgentColor::Yellow => (255, 255, 0),
            AgentColor::Purple => (128, 0, 128),
            AgentColor::Orange => (255, 165, 0),
            AgentColor::Pink => (255, 192, 203),
            AgentColor::Cyan => (0, 255, 255),
        }
    }
}

/// Identity component attached to every agent entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// Spawn order; also the tick order.
    pub index: usize,
    pub color: AgentColor,
}

impl Agent {
    /// Agents past the first lap of the palette get a numeric suffix.
    pub fn new(index: usize) -> Self {
        let color = AgentColor::for_index(index);
        let lap = index / AgentColor::PALETTE.len();
        let id = if lap == 0 {
            color.name().to_string()
        } else {
            format!("{}-{}", color.name(), lap + 1)
        };
        Self {
            id: AgentId(id),
            index,
            color,
        }
    }
}
