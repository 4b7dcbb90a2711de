use crate::error::EvaluationError;
use crate::rng::GapSampler;
use crate::snapshot::{AgentSnapshot, DepartureSnapshot, ObstacleSnapshot, RoundSnapshot};
use crate::{
    Agent, CollisionDetector, DeathCause, Gap, ObstacleField, Policy, Population, SimulationConfig,
};

use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::trace;

/// Whether a round still has agents in play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    Running,
    Ended,
}

/// One generation's simulation, advanced a tick at a time.
///
/// Each [`step`] runs, in order:
/// 1. policy queries and movement, observing the obstacle
///    the lead agent is navigating before anything moves;
/// 2. obstacle collisions and pass detection;
/// 3. obstacle scrolling, plus the pass bonus and a new
///    obstacle if anything was passed;
/// 4. world-bounds checks;
/// 5. removal of every agent that died this tick.
///
/// The round ends once no agents remain.
///
/// [`step`]: SimulationRound::step
pub struct SimulationRound<'p, P> {
    config: SimulationConfig,
    generation: usize,
    population: Population<'p, P>,
    field: ObstacleField<StdRng>,
    detector: CollisionDetector,
    tick: u64,
    score: u32,
    state: RoundState,
    departed: Vec<usize>,
}

impl<'p, P: Policy> SimulationRound<'p, P> {
    /// Sets up a round with one agent per policy.
    ///
    /// `config` is assumed to be [valid].
    ///
    /// [valid]: SimulationConfig::validate
    pub fn new(
        config: &SimulationConfig,
        generation: usize,
        detector: CollisionDetector,
        policies: &'p mut [P],
    ) -> SimulationRound<'p, P> {
        let sampler = GapSampler::seeded(
            config.seed,
            generation,
            config.obstacles.gap_center_range.clone(),
        );
        let population = Population::new(policies, &config.agent);
        let state = if population.is_empty() {
            RoundState::Ended
        } else {
            RoundState::Running
        };
        SimulationRound {
            field: ObstacleField::new(&config.obstacles, &config.world, sampler),
            config: config.clone(),
            generation,
            population,
            detector,
            tick: 0,
            score: 0,
            state,
            departed: vec![],
        }
    }

    /// Like [`step`], but always queries policies on the
    /// calling thread, so policies need not be [`Send`].
    ///
    /// [`step`]: SimulationRound::step
    pub fn step_local(&mut self) -> Result<RoundState, EvaluationError> {
        self.advance(|agents, gap, tick, config| {
            agents
                .iter_mut()
                .try_for_each(|agent| agent.act(gap, tick, config))
        })
    }

    fn advance<Q>(&mut self, query: Q) -> Result<RoundState, EvaluationError>
    where
        Q: FnOnce(&mut [Agent<'p, P>], Gap, u64, &SimulationConfig) -> Result<(), EvaluationError>,
    {
        if self.state == RoundState::Ended {
            return Ok(RoundState::Ended);
        }
        let tick = self.tick + 1;

        if let Some(lead) = self.population.lead() {
            let gap = self.field.target_gap(lead.x());
            query(self.population.agents_mut(), gap, tick, &self.config)?;
        }
        let passed = self.resolve_obstacles();
        self.field.advance_all();
        if self.field.maybe_spawn(passed) {
            self.score += 1;
            self.population.award(self.config.fitness.pass_bonus);
            trace!(generation = self.generation, tick, score = self.score, "obstacle passed");
        }
        self.resolve_bounds();
        self.departed = self.population.cull();
        if !self.departed.is_empty() {
            trace!(
                generation = self.generation,
                tick,
                culled = self.departed.len(),
                remaining = self.population.len(),
                "agents removed"
            );
        }

        self.tick = tick;
        if self.population.is_empty() {
            self.state = RoundState::Ended;
        }
        Ok(self.state)
    }

    /// Returns whether any obstacle was passed for the first time.
    fn resolve_obstacles(&mut self) -> bool {
        let penalty = self.config.fitness.collision_penalty;
        let mut passed = false;
        for obstacle in self.field.iter_mut() {
            for agent in self.population.alive_mut() {
                if obstacle.overlaps(&agent.bounds(), &self.detector) {
                    agent.kill(DeathCause::Obstacle, penalty);
                    trace!(agent = agent.id(), fitness = agent.fitness(), "obstacle collision");
                }
                if obstacle.x() < agent.x() && obstacle.mark_passed() {
                    passed = true;
                }
            }
        }
        passed
    }

    fn resolve_bounds(&mut self) {
        let world_height = self.config.world.world_height;
        for agent in self.population.alive_mut() {
            if self.detector.check_bounds(&agent.bounds(), world_height) {
                agent.kill(DeathCause::Bounds, 0.0);
                trace!(agent = agent.id(), y = agent.y(), "out of bounds");
            }
        }
    }
}

impl<'p, P: Policy + Send> SimulationRound<'p, P> {
    /// Advances the round by one tick and returns its new state.
    /// Stepping an ended round does nothing.
    ///
    /// Policies are queried on the rayon thread pool when at least
    /// [`parallel_query_threshold`] agents are alive.
    ///
    /// # Errors
    /// Returns an error if any policy produces a non-finite
    /// action. When several do in the same tick, the error names
    /// the lowest agent id. The round is left mid-tick and must
    /// be discarded.
    ///
    /// # Panics
    /// Panics if agents are alive but no obstacle is in play.
    ///
    /// [`parallel_query_threshold`]: SimulationConfig::parallel_query_threshold
    pub fn step(&mut self) -> Result<RoundState, EvaluationError> {
        self.advance(|agents, gap, tick, config| match config.parallel_query_threshold {
            Some(threshold) if agents.len() >= threshold => agents
                .par_iter_mut()
                .filter_map(|agent| agent.act(gap, tick, config).err())
                .min_by_key(EvaluationError::agent)
                .map_or(Ok(()), Err),
            _ => agents
                .iter_mut()
                .try_for_each(|agent| agent.act(gap, tick, config)),
        })
    }
}

impl<'p, P> SimulationRound<'p, P> {
    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of obstacles passed.
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn alive_count(&self) -> usize {
        self.population.len()
    }

    pub fn population(&self) -> &Population<'p, P> {
        &self.population
    }

    pub fn field(&self) -> &ObstacleField<StdRng> {
        &self.field
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            generation: self.generation,
            tick: self.tick,
            score: self.score,
            agents: self
                .population
                .agents()
                .iter()
                .map(|a| AgentSnapshot {
                    id: a.id(),
                    x: a.x(),
                    y: a.y(),
                    tilt: a.kinematics().tilt(),
                    fitness: a.fitness(),
                })
                .collect(),
            obstacles: self
                .field
                .iter()
                .map(|o| ObstacleSnapshot {
                    x: o.x(),
                    top: o.top(),
                    bottom: o.bottom(),
                    passed: o.passed(),
                })
                .collect(),
            departures: self
                .departed
                .iter()
                .filter_map(|&id| {
                    Some(DepartureSnapshot {
                        id,
                        cause: self.population.cause_of(id)?,
                        fitness: self.population.fitness_of(id)?,
                    })
                })
                .collect(),
        }
    }

    /// Ends the round, returning each agent's fitness in
    /// the order its policy was supplied.
    pub fn into_fitness(self) -> Vec<f32> {
        self.population.into_fitness()
    }
}
