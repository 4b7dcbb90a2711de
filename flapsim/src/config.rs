use crate::error::ConfigError;

use serde::{Deserialize, Serialize};

use std::ops::Range;

/// Configuration data for a simulation round.
///
/// The [`Default`] value reproduces the classic game's
/// constants (30 ticks per second, a 400×580 playable area,
/// 200px gaps scrolling at 5px per tick). Every field has a
/// default, so a deserialized configuration only needs to
/// name the values it overrides.
///
/// # Examples
/// ```
/// use flapsim::{FitnessConfig, SimulationConfig};
///
/// let config = SimulationConfig {
///     max_ticks: Some(10_000),
///     fitness: FitnessConfig {
///         pass_bonus: 10.0,
///         ..FitnessConfig::default()
///     },
///     ..SimulationConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticks per simulated second. The core never sleeps;
    /// this only converts tick counts into simulated time.
    pub tick_rate: u32,
    /// Vertical motion constants.
    pub physics: PhysicsConfig,
    /// Obstacle geometry and motion.
    pub obstacles: ObstacleConfig,
    /// Playable area.
    pub world: WorldConfig,
    /// Agent placement and size.
    pub agent: AgentConfig,
    /// Fitness accrual rules.
    pub fitness: FitnessConfig,
    /// Policy outputs strictly above this value trigger an impulse.
    pub action_threshold: f32,
    /// Minimum number of live agents for which policy
    /// queries are dispatched to the rayon thread pool.
    /// `None` keeps every query on the calling thread.
    pub parallel_query_threshold: Option<usize>,
    /// Upper bound on the length of a round. `None` lets
    /// a round run until every agent has died.
    pub max_ticks: Option<u64>,
    /// Base seed for obstacle placement. Each generation
    /// derives its own stream from it.
    pub seed: u64,
}

/// Vertical motion model constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration, in px/tick².
    pub gravity: f32,
    /// Velocity set by an impulse. Negative is upward.
    pub impulse_velocity: f32,
    /// Maximum downward displacement in a single tick.
    pub max_fall_per_tick: f32,
    /// Extra upward displacement added to every ascending tick.
    pub ascent_correction: f32,
    /// Maximum upward tilt, in degrees.
    pub max_tilt: f32,
    /// Maximum downward tilt, in degrees.
    pub min_tilt: f32,
    /// Downward tilt change per tick while falling.
    pub tilt_rate: f32,
    /// Height band below the last impulse in which the
    /// agent keeps its upward tilt.
    pub tilt_band: f32,
}

/// Obstacle geometry and motion constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Vertical size of the opening between the two halves.
    pub gap_size: f32,
    /// Range from which the gap's upper edge is drawn.
    pub gap_center_range: Range<u32>,
    /// Horizontal displacement per tick.
    pub obstacle_velocity: f32,
    /// Width of each half.
    pub width: f32,
    /// Height of each half.
    pub height: f32,
    /// Horizontal position of the obstacle present at round start.
    pub first_obstacle_x: f32,
    /// Distance past the right edge of the world at which
    /// new obstacles appear.
    pub spawn_spacing: f32,
}

/// Playable area.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub world_width: f32,
    /// Distance from the top of the world to the ground line.
    pub world_height: f32,
}

/// Agent placement and bounding size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub start_x: f32,
    pub start_y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fitness accrual rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    /// Added to every live agent each tick.
    pub survival_reward: f32,
    /// Added to every live agent when the field's lead
    /// obstacle is passed.
    pub pass_bonus: f32,
    /// Subtracted once from an agent killed by an obstacle.
    pub collision_penalty: f32,
}

impl Default for SimulationConfig {
    fn default() -> SimulationConfig {
        SimulationConfig {
            tick_rate: 30,
            physics: PhysicsConfig::default(),
            obstacles: ObstacleConfig::default(),
            world: WorldConfig::default(),
            agent: AgentConfig::default(),
            fitness: FitnessConfig::default(),
            action_threshold: 0.5,
            parallel_query_threshold: Some(64),
            max_ticks: None,
            seed: 0,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> PhysicsConfig {
        PhysicsConfig {
            gravity: 3.0,
            impulse_velocity: -10.5,
            max_fall_per_tick: 16.0,
            ascent_correction: 2.0,
            max_tilt: 25.0,
            min_tilt: -90.0,
            tilt_rate: 20.0,
            tilt_band: 50.0,
        }
    }
}

impl Default for ObstacleConfig {
    fn default() -> ObstacleConfig {
        ObstacleConfig {
            gap_size: 200.0,
            gap_center_range: 50..350,
            obstacle_velocity: 5.0,
            width: 104.0,
            height: 640.0,
            first_obstacle_x: 500.0,
            spawn_spacing: 150.0,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> WorldConfig {
        WorldConfig {
            world_width: 400.0,
            world_height: 580.0,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> AgentConfig {
        AgentConfig {
            start_x: 170.0,
            start_y: 250.0,
            width: 68.0,
            height: 48.0,
        }
    }
}

impl Default for FitnessConfig {
    fn default() -> FitnessConfig {
        FitnessConfig {
            survival_reward: 0.1,
            pass_bonus: 5.0,
            collision_penalty: 1.0,
        }
    }
}

impl ObstacleConfig {
    /// Horizontal position of obstacles spawned after a pass.
    pub fn spawn_x(&self, world: &WorldConfig) -> f32 {
        world.world_width + self.spawn_spacing
    }
}

impl SimulationConfig {
    /// Checks that the configuration describes a playable world.
    ///
    /// # Errors
    /// Returns the first offending value found.
    ///
    /// # Examples
    /// ```
    /// use flapsim::SimulationConfig;
    ///
    /// let mut config = SimulationConfig::default();
    /// config.obstacles.gap_center_range = 200..200;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.obstacles.gap_center_range.is_empty() {
            return Err(ConfigError::EmptyGapRange {
                start: self.obstacles.gap_center_range.start,
                end: self.obstacles.gap_center_range.end,
            });
        }
        if !(self.obstacles.obstacle_velocity > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "obstacle_velocity",
                value: self.obstacles.obstacle_velocity,
            });
        }
        let sizes = [
            ("gap_size", self.obstacles.gap_size),
            ("obstacle width", self.obstacles.width),
            ("obstacle height", self.obstacles.height),
            ("world_width", self.world.world_width),
            ("world_height", self.world.world_height),
            ("agent width", self.agent.width),
            ("agent height", self.agent.height),
            ("max_fall_per_tick", self.physics.max_fall_per_tick),
        ];
        if let Some(&(name, value)) = sizes.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(ConfigError::NonPositive { name, value });
        }
        if !self.action_threshold.is_finite() {
            return Err(ConfigError::NonFiniteThreshold(self.action_threshold));
        }
        let constants = [
            ("gravity", self.physics.gravity),
            ("impulse_velocity", self.physics.impulse_velocity),
            ("ascent_correction", self.physics.ascent_correction),
            ("max_tilt", self.physics.max_tilt),
            ("min_tilt", self.physics.min_tilt),
            ("tilt_rate", self.physics.tilt_rate),
            ("tilt_band", self.physics.tilt_band),
            ("first_obstacle_x", self.obstacles.first_obstacle_x),
            ("spawn_spacing", self.obstacles.spawn_spacing),
            ("start_x", self.agent.start_x),
            ("start_y", self.agent.start_y),
            ("survival_reward", self.fitness.survival_reward),
            ("pass_bonus", self.fitness.pass_bonus),
            ("collision_penalty", self.fitness.collision_penalty),
        ];
        if let Some(&(name, value)) = constants.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFinite { name, value });
        }
        // The last check before an obstacle is recycled happens
        // at some x below `obstacle_velocity - width`.
        if !(self.agent.start_x + self.obstacles.width > self.obstacles.obstacle_velocity) {
            return Err(ConfigError::UnpassableObstacles {
                start_x: self.agent.start_x,
                obstacle_velocity: self.obstacles.obstacle_velocity,
            });
        }
        if self.agent.start_y < 0.0
            || self.agent.start_y + self.agent.height >= self.world.world_height
        {
            return Err(ConfigError::AgentOutOfBounds {
                start_y: self.agent.start_y,
                world_height: self.world.world_height,
            });
        }
        Ok(())
    }

    /// Converts a tick count into simulated seconds.
    pub fn seconds(&self, ticks: u64) -> f32 {
        ticks as f32 / self.tick_rate as f32
    }
}
