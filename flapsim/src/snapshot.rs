use crate::DeathCause;

use serde::{Deserialize, Serialize};

/// A read-only view of a round after a tick, for
/// presentation layers that draw or record rounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub generation: usize,
    pub tick: u64,
    /// Obstacles passed so far.
    pub score: u32,
    /// Agents still in play, in identity order.
    pub agents: Vec<AgentSnapshot>,
    /// Obstacles, leftmost first.
    pub obstacles: Vec<ObstacleSnapshot>,
    /// Agents removed during this tick, in identity order.
    pub departures: Vec<DepartureSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub tilt: f32,
    pub fitness: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSnapshot {
    pub x: f32,
    pub top: f32,
    pub bottom: f32,
    pub passed: bool,
}

/// An agent's exit from the round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepartureSnapshot {
    pub id: usize,
    pub cause: DeathCause,
    /// Final fitness, penalty included.
    pub fitness: f32,
}

impl RoundSnapshot {
    /// Returns the snapshot of agent `id`, if it is still in play.
    pub fn agent(&self, id: usize) -> Option<&AgentSnapshot> {
        self.agents
            .binary_search_by_key(&id, |a| a.id)
            .ok()
            .map(|i| &self.agents[i])
    }
}
