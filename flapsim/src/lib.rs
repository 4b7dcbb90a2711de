//! A fitness-evaluation harness for populations of evolved agents
//! flying through a scrolling field of obstacles.
//!
//! An external optimizer (for example a NEAT population) supplies one
//! [`Policy`] per agent. An [`EvaluationSession`] runs a single round:
//! every tick each live agent observes its height and its distance to
//! the edges of the gap ahead, its policy decides whether to flap, and
//! the harness applies gravity, collisions, and fitness rules. Agents are
//! removed as they die; the round ends when none remain, and the session
//! returns one fitness value per policy, in input order.
//!
//! Rendering, input, and the learning algorithm itself live outside this
//! crate. Presentation layers can follow a round through
//! [`EvaluationSession::run_observed`].
//!
//! # Example usage
//! ```
//! use flapsim::{EvaluationSession, Observation, SimulationConfig};
//!
//! // A hand-written policy: flap whenever the agent sinks
//! // too close to the bottom of the gap.
//! fn cautious(observation: &Observation) -> f32 {
//!     if observation.gap_bottom_distance < 90.0 {
//!         1.0
//!     } else {
//!         0.0
//!     }
//! }
//!
//! let config = SimulationConfig {
//!     max_ticks: Some(2_000),
//!     ..SimulationConfig::default()
//! };
//! let session = EvaluationSession::new(config, 0).unwrap();
//!
//! let mut policies = vec![cautious as fn(&Observation) -> f32; 8];
//! let outcome = session.run(&mut policies).unwrap();
//! assert_eq!(outcome.fitness.len(), 8);
//! println!("{} obstacles passed in {} ticks", outcome.score, outcome.ticks);
//! ```

mod agent;
mod collision;
mod config;
mod error;
mod field;
mod kinematics;
pub mod logging;
mod obstacle;
mod policy;
mod population;
mod rng;
mod round;
mod session;
mod snapshot;

pub use agent::{Agent, AgentState, DeathCause};
pub use collision::{CollisionDetector, Hitbox, Mask, Rect};
pub use config::{AgentConfig, FitnessConfig, ObstacleConfig, PhysicsConfig, SimulationConfig, WorldConfig};
pub use error::{ConfigError, EvaluationError};
pub use field::ObstacleField;
pub use kinematics::Kinematics;
pub use obstacle::{Gap, Obstacle};
pub use policy::{Observation, Policy};
pub use population::Population;
pub use rng::GapSampler;
pub use round::{RoundState, SimulationRound};
pub use session::{AbortHandle, EvaluationSession, RoundOutcome, Termination};
pub use snapshot::{AgentSnapshot, DepartureSnapshot, ObstacleSnapshot, RoundSnapshot};
