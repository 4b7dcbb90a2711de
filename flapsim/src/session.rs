use crate::error::{ConfigError, EvaluationError};
use crate::{CollisionDetector, Policy, RoundSnapshot, RoundState, SimulationConfig, SimulationRound};

use serde::{Deserialize, Serialize};
use tracing::debug;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Why a round stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Termination {
    /// Every agent died.
    Extinct,
    /// The configured tick limit was reached.
    TickLimit,
    /// An [`AbortHandle`] was triggered.
    Aborted,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extinct => write!(f, "extinct"),
            Self::TickLimit => write!(f, "tick limit"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Result of evaluating one generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub generation: usize,
    /// Final fitness of each policy, in input order.
    pub fitness: Vec<f32>,
    /// Ticks simulated.
    pub ticks: u64,
    /// Obstacles passed.
    pub score: u32,
    /// Simulated time, from the configured tick rate.
    pub seconds: f32,
    pub termination: Termination,
}

/// Stops a running round between two ticks.
///
/// Handles are cheap to clone and may be triggered
/// from any thread. A session and all of its clones
/// share one handle. Once triggered, every later round
/// of any of them stops before its first tick, until
/// the handle is [reset].
///
/// [reset]: AbortHandle::reset
#[derive(Clone, Debug, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Lets later rounds run again.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The generation-boundary protocol: takes one batch of
/// policies from an optimizer, runs them through a round,
/// and hands back their fitness.
///
/// # Examples
/// ```
/// use flapsim::{EvaluationSession, Observation, SimulationConfig};
///
/// let config = SimulationConfig {
///     max_ticks: Some(1000),
///     ..SimulationConfig::default()
/// };
/// let session = EvaluationSession::new(config, 0).unwrap();
///
/// let mut policies = vec![
///     |o: &Observation| if o.gap_bottom_distance < 80.0 { 1.0 } else { 0.0 };
///     10
/// ];
/// let fitness = session.evaluate(&mut policies).unwrap();
/// assert_eq!(fitness.len(), 10);
/// ```
#[derive(Clone, Debug)]
pub struct EvaluationSession {
    config: SimulationConfig,
    generation: usize,
    detector: CollisionDetector,
    abort: AbortHandle,
}

impl EvaluationSession {
    /// Creates a session for generation number `generation`,
    /// using bounding-box collisions.
    ///
    /// # Errors
    /// Returns an error if `config` is [invalid].
    ///
    /// [invalid]: SimulationConfig::validate
    pub fn new(config: SimulationConfig, generation: usize) -> Result<EvaluationSession, ConfigError> {
        config.validate()?;
        Ok(EvaluationSession {
            detector: CollisionDetector::bounding_box(&config.obstacles),
            config,
            generation,
            abort: AbortHandle::default(),
        })
    }

    /// Replaces the session's collision detector.
    pub fn with_detector(mut self, detector: CollisionDetector) -> EvaluationSession {
        self.detector = detector;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns a handle that stops this session's rounds.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Runs a round with one agent per policy and returns
    /// each policy's fitness, in input order. Agents that die
    /// keep the fitness they had when they died.
    ///
    /// Policies may be queried from several threads. Use
    /// [`run_local`] for policies that are not [`Send`].
    ///
    /// # Errors
    /// Returns an error if any policy produces an invalid action.
    ///
    /// [`run_local`]: EvaluationSession::run_local
    pub fn evaluate<P: Policy + Send>(&self, policies: &mut [P]) -> Result<Vec<f32>, EvaluationError> {
        self.run(policies).map(|outcome| outcome.fitness)
    }

    /// Like [`evaluate`], but also reports how the round went.
    ///
    /// [`evaluate`]: EvaluationSession::evaluate
    pub fn run<P: Policy + Send>(&self, policies: &mut [P]) -> Result<RoundOutcome, EvaluationError> {
        self.drive(policies, None, SimulationRound::step)
    }

    /// Like [`run`], calling `observer` with a snapshot of
    /// the round after every tick.
    ///
    /// [`run`]: EvaluationSession::run
    pub fn run_observed<P, O>(
        &self,
        policies: &mut [P],
        mut observer: O,
    ) -> Result<RoundOutcome, EvaluationError>
    where
        P: Policy + Send,
        O: FnMut(&RoundSnapshot),
    {
        self.drive(policies, Some(&mut observer), SimulationRound::step)
    }

    /// Like [`run`], querying every policy on the calling
    /// thread regardless of [`parallel_query_threshold`].
    ///
    /// # Examples
    /// ```
    /// use flapsim::{EvaluationSession, Observation, SimulationConfig};
    /// use std::rc::Rc;
    ///
    /// let session = EvaluationSession::new(SimulationConfig::default(), 0).unwrap();
    /// let shared = Rc::new(0.0_f32);
    /// let mut policies = [|_: &Observation| *shared];
    /// let outcome = session.run_local(&mut policies).unwrap();
    /// assert_eq!(outcome.ticks, 20);
    /// ```
    ///
    /// [`run`]: EvaluationSession::run
    /// [`parallel_query_threshold`]: SimulationConfig::parallel_query_threshold
    pub fn run_local<P: Policy>(&self, policies: &mut [P]) -> Result<RoundOutcome, EvaluationError> {
        self.drive(policies, None, SimulationRound::step_local)
    }

    /// Like [`run_local`], calling `observer` with a snapshot
    /// of the round after every tick.
    ///
    /// [`run_local`]: EvaluationSession::run_local
    pub fn run_local_observed<P, O>(
        &self,
        policies: &mut [P],
        mut observer: O,
    ) -> Result<RoundOutcome, EvaluationError>
    where
        P: Policy,
        O: FnMut(&RoundSnapshot),
    {
        self.drive(policies, Some(&mut observer), SimulationRound::step_local)
    }

    fn drive<'p, P, S>(
        &self,
        policies: &'p mut [P],
        mut observer: Option<&mut dyn FnMut(&RoundSnapshot)>,
        mut step: S,
    ) -> Result<RoundOutcome, EvaluationError>
    where
        P: Policy,
        S: FnMut(&mut SimulationRound<'p, P>) -> Result<RoundState, EvaluationError>,
    {
        let agents = policies.len();
        let mut round =
            SimulationRound::new(&self.config, self.generation, self.detector.clone(), policies);
        debug!(generation = self.generation, agents, "round started");

        let termination = loop {
            if round.state() == RoundState::Ended {
                break Termination::Extinct;
            }
            if self.abort.is_aborted() {
                break Termination::Aborted;
            }
            if matches!(self.config.max_ticks, Some(max) if round.tick() >= max) {
                break Termination::TickLimit;
            }
            step(&mut round)?;
            if let Some(observer) = observer.as_mut() {
                observer(&round.snapshot());
            }
        };

        let ticks = round.tick();
        let score = round.score();
        debug!(
            generation = self.generation,
            ticks,
            score,
            %termination,
            "round finished"
        );
        Ok(RoundOutcome {
            generation: self.generation,
            fitness: round.into_fitness(),
            ticks,
            score,
            seconds: self.config.seconds(ticks),
            termination,
        })
    }
}
