use crate::collision::Rect;
use crate::error::EvaluationError;
use crate::{AgentConfig, Gap, Kinematics, Observation, Policy, SimulationConfig};

use serde::{Deserialize, Serialize};

/// Why an agent left the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Flew above the world or hit the ground.
    Bounds,
    /// Touched an obstacle.
    Obstacle,
}

/// Lifecycle of an agent within a round. `Dead` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    Alive,
    Dead(DeathCause),
}

/// A simulated agent driven by a borrowed policy.
#[derive(Debug)]
pub struct Agent<'p, P> {
    id: usize,
    x: f32,
    width: f32,
    height: f32,
    kinematics: Kinematics,
    policy: &'p mut P,
    fitness: f32,
    state: AgentState,
}

impl<'p, P: Policy> Agent<'p, P> {
    /// Creates a live agent at the configured start position.
    /// `id` is the policy's index in the evaluated batch.
    pub fn new(id: usize, policy: &'p mut P, config: &AgentConfig) -> Agent<'p, P> {
        Agent {
            id,
            x: config.start_x,
            width: config.width,
            height: config.height,
            kinematics: Kinematics::new(config.start_y),
            policy,
            fitness: 0.0,
            state: AgentState::Alive,
        }
    }

    /// Runs one tick of the agent's own update: queries the
    /// policy about `gap`, flaps if the action clears the
    /// threshold, accrues the survival reward, and moves.
    ///
    /// Dead agents are left untouched.
    ///
    /// # Errors
    /// Returns an error if the policy's action is not finite.
    pub fn act(&mut self, gap: Gap, tick: u64, config: &SimulationConfig) -> Result<(), EvaluationError> {
        if !self.is_alive() {
            return Ok(());
        }
        let observation = Observation::new(self.kinematics.y(), gap);
        let action = self.policy.evaluate(&observation);
        if !action.is_finite() {
            return Err(EvaluationError::PolicyQuery {
                agent: self.id,
                tick,
                action,
            });
        }
        if action > config.action_threshold {
            self.kinematics.impulse(&config.physics);
        }
        self.fitness += config.fitness.survival_reward;
        self.kinematics.integrate(&config.physics);
        Ok(())
    }

    /// Adds `amount` to a live agent's fitness.
    pub fn award(&mut self, amount: f32) {
        if self.is_alive() {
            self.fitness += amount;
        }
    }

    /// Kills the agent, deducting `penalty` from its fitness.
    /// Killing a dead agent has no effect.
    pub fn kill(&mut self, cause: DeathCause, penalty: f32) {
        if self.is_alive() {
            self.fitness -= penalty;
            self.state = AgentState::Dead(cause);
        }
    }
}

impl<'p, P> Agent<'p, P> {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.kinematics.y()
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state == AgentState::Alive
    }

    /// Returns the rectangle the agent currently occupies.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.kinematics.y(), self.width, self.height)
    }
}
