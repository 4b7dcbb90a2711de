use thiserror::Error;

/// An error type indicating an unusable
/// [`SimulationConfig`](crate::SimulationConfig).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("tick rate must be at least 1 tick per second")]
    ZeroTickRate,
    #[error("gap range {start}..{end} is empty")]
    EmptyGapRange { start: u32, end: u32 },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("action threshold must be finite, got {0}")]
    NonFiniteThreshold(f32),
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
    #[error(
        "agent at x = {start_x} is behind obstacles when they are recycled \
         (agent x plus obstacle width must exceed obstacle velocity {obstacle_velocity})"
    )]
    UnpassableObstacles { start_x: f32, obstacle_velocity: f32 },
    #[error("agent starting height {start_y} lies outside the world (ground at {world_height})")]
    AgentOutOfBounds { start_y: f32, world_height: f32 },
}

/// An error type indicating that a round
/// could not be evaluated to completion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// A policy produced an action outside the
    /// domain of finite reals. The round is abandoned
    /// at the tick the action was returned.
    #[error("policy of agent {agent} returned invalid action {action} at tick {tick}")]
    PolicyQuery { agent: usize, tick: u64, action: f32 },
}

impl EvaluationError {
    /// Returns the id of the agent whose policy failed.
    pub fn agent(&self) -> usize {
        match self {
            Self::PolicyQuery { agent, .. } => *agent,
        }
    }
}
