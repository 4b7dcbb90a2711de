use crate::{RoundOutcome, Termination};

use serde::{Deserialize, Serialize};

use std::fmt;

/// Defines how much of each round a logger keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingLevel {
    /// Keeps every agent's fitness.
    AllFitness,
    /// Keeps only summary statistics.
    Summary,
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about numbers in a sequence,
    /// or `None` if the sequence is empty.
    ///
    /// # Examples
    /// ```
    /// use flapsim::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied()).unwrap();
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f32>) -> Option<Stats> {
        let mut data: Vec<f32> = data.collect();
        if data.is_empty() {
            return None;
        }
        data.sort_unstable_by(f32::total_cmp);
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Some(Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f32>() / data.len() as f32,
            median,
        })
    }
}

/// A record of one evaluated generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationLog {
    pub generation: usize,
    pub agent_count: usize,
    pub ticks: u64,
    pub seconds: f32,
    pub score: u32,
    pub termination: Termination,
    pub fitness: Option<Stats>,
    /// Every agent's fitness, if the reporting level keeps it.
    pub all_fitness: Option<Vec<f32>>,
}

impl fmt::Display for GenerationLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GenerationLog {{\n\
            \tgeneration: {}\n\
            \tagent_count: {}\n\
            \tticks: {} ({:.1}s)\n\
            \tscore: {}\n\
            \ttermination: {}\n\
            \tfitness: {:?}\n\
            }}",
            self.generation,
            self.agent_count,
            self.ticks,
            self.seconds,
            self.score,
            self.termination,
            self.fitness,
        )
    }
}

/// A log of evaluated generations over time.
#[derive(Clone, Debug)]
pub struct EvaluationLogger {
    reporting_level: ReportingLevel,
    logs: Vec<GenerationLog>,
}

impl EvaluationLogger {
    /// Returns a logger with the appropiate reporting level.
    pub fn new(reporting_level: ReportingLevel) -> EvaluationLogger {
        EvaluationLogger {
            reporting_level,
            logs: vec![],
        }
    }

    /// Stores a record of `outcome` and returns it.
    ///
    /// # Examples
    /// ```
    /// use flapsim::{EvaluationSession, Observation, SimulationConfig};
    /// use flapsim::logging::{EvaluationLogger, ReportingLevel};
    ///
    /// let session = EvaluationSession::new(SimulationConfig::default(), 0).unwrap();
    /// let mut policies = [|_: &Observation| 0.0];
    /// let outcome = session.run(&mut policies).unwrap();
    ///
    /// let mut logger = EvaluationLogger::new(ReportingLevel::Summary);
    /// let log = logger.log(&outcome);
    /// assert_eq!(log.generation, 0);
    /// assert!(log.all_fitness.is_none());
    /// ```
    pub fn log(&mut self, outcome: &RoundOutcome) -> &GenerationLog {
        self.logs.push(GenerationLog {
            generation: outcome.generation,
            agent_count: outcome.fitness.len(),
            ticks: outcome.ticks,
            seconds: outcome.seconds,
            score: outcome.score,
            termination: outcome.termination,
            fitness: Stats::from(outcome.fitness.iter().copied()),
            all_fitness: match self.reporting_level {
                ReportingLevel::AllFitness => Some(outcome.fitness.clone()),
                ReportingLevel::Summary => None,
            },
        });
        &self.logs[self.logs.len() - 1]
    }

    /// Iterate over all logged generations.
    pub fn iter(&self) -> impl Iterator<Item = &GenerationLog> {
        self.logs.iter()
    }

    /// Returns the log with the highest score, earliest first on ties.
    pub fn best(&self) -> Option<&GenerationLog> {
        self.logs
            .iter()
            .rev()
            .max_by_key(|log| log.score)
    }
}
