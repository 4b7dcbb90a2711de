use flapsim::logging::{EvaluationLogger, ReportingLevel};
use flapsim::{EvaluationSession, Observation, Policy, SimulationConfig, Termination};
use oxineat::{Population, PopulationConfig};
use oxineat_nn::genomics::{ActivationType, GeneticConfig, NNGenome};
use oxineat_nn::networks::FunctionApproximatorNetwork;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Evolves neural-network agents that fly through obstacle gaps.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// RON file with simulation settings. Missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of generations to evolve.
    #[arg(long, default_value_t = 50)]
    generations: usize,

    /// Number of agents per generation.
    #[arg(long, default_value_t = 150)]
    population: usize,

    /// Overrides the obstacle layout seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Caps every round at this many ticks.
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u64,

    /// Stops once the champion reaches this fitness.
    #[arg(long)]
    fitness_threshold: Option<f32>,

    /// Logs every agent's fitness instead of summaries.
    #[arg(long)]
    all_fitness: bool,
}

/// Drives an agent from a phenotype network.
///
/// Observations are divided by the world height
/// before being fed in, next to a constant bias input.
struct NetworkPolicy {
    network: FunctionApproximatorNetwork,
    scale: f32,
}

impl NetworkPolicy {
    fn new(genome: &NNGenome, world_height: f32) -> NetworkPolicy {
        NetworkPolicy {
            network: FunctionApproximatorNetwork::from::<1>(genome),
            scale: world_height.recip(),
        }
    }
}

impl Policy for NetworkPolicy {
    fn evaluate(&mut self, observation: &Observation) -> f32 {
        let [y, top, bottom] = observation.to_array();
        let inputs = [1.0, y * self.scale, top * self.scale, bottom * self.scale];
        // An empty output is reported as an invalid action.
        self.network
            .evaluate_at(&inputs)
            .first()
            .copied()
            .unwrap_or(f32::NAN)
    }
}

fn genetic_config() -> GeneticConfig {
    GeneticConfig {
        input_count: NonZeroUsize::new(4).unwrap(),
        output_count: NonZeroUsize::new(1).unwrap(),
        activation_types: vec![ActivationType::Sigmoid],
        output_activation_types: vec![ActivationType::Sigmoid],
        child_mutation_chance: 0.65,
        mate_by_averaging_chance: 0.4,
        suppression_reset_chance: 1.0,
        initial_expression_chance: 1.0,
        weight_bound: 5.0,
        weight_reset_chance: 0.2,
        weight_nudge_chance: 0.9,
        weight_mutation_power: 2.5,
        node_addition_mutation_chance: 0.03,
        gene_addition_mutation_chance: 0.05,
        node_deletion_mutation_chance: 0.001,
        gene_deletion_mutation_chance: 0.002,
        max_gene_addition_mutation_attempts: 20,
        recursion_chance: 0.0,
        excess_gene_factor: 1.0,
        disjoint_gene_factor: 1.0,
        common_weight_factor: 0.4,
        ..GeneticConfig::zero()
    }
}

fn population_config(size: NonZeroUsize) -> PopulationConfig {
    PopulationConfig {
        size,
        distance_threshold: 3.0,
        elitism: 1,
        survival_threshold: 0.2,
        adoption_rate: 1.0,
        sexual_reproduction_chance: 0.6,
        interspecies_mating_chance: 0.001,
        stagnation_threshold: NonZeroUsize::new(15).unwrap(),
        stagnation_penalty: 1.0,
    }
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ron::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.max_ticks = Some(args.max_ticks);
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let size = NonZeroUsize::new(args.population).context("population size must be positive")?;

    let mut population =
        Population::<_, _, NNGenome>::new(population_config(size), genetic_config());
    let reporting_level = if args.all_fitness {
        ReportingLevel::AllFitness
    } else {
        ReportingLevel::Summary
    };
    let mut logger = EvaluationLogger::new(reporting_level);
    let world_height = config.world.world_height;

    for remaining in (0..args.generations).rev() {
        let generation = population.generation();
        let session = EvaluationSession::new(config.clone(), generation)?;

        let mut policies: Vec<NetworkPolicy> = population
            .genomes()
            .map(|genome| NetworkPolicy::new(genome, world_height))
            .collect();
        let outcome = session
            .run(&mut policies)
            .with_context(|| format!("evaluating generation {}", generation))?;

        // Genomes are visited in the same order they were listed above.
        let mut fitness = outcome.fitness.iter().copied();
        population.evaluate_fitness(|_| fitness.next().unwrap_or(0.0).max(0.0));

        let log = logger.log(&outcome);
        info!(
            generation,
            ticks = log.ticks,
            score = log.score,
            max_fitness = log.fitness.as_ref().map_or(0.0, |s| s.maximum),
            mean_fitness = log.fitness.as_ref().map_or(0.0, |s| s.mean),
            "generation evaluated"
        );
        if outcome.termination == Termination::TickLimit {
            info!(generation, "an agent survived the whole round");
        }

        let champion_fitness = population.champion().fitness();
        if matches!(args.fitness_threshold, Some(threshold) if champion_fitness >= threshold) {
            info!(generation, champion_fitness, "fitness threshold reached");
            break;
        }
        if remaining == 0 {
            break;
        }
        if let Err(e) = population.evolve() {
            warn!(generation, error = %e, "evolution failed, resetting population");
            population.reset();
        }
    }

    if let Some(best) = logger.best() {
        println!("{}", best);
    }
    println!("{}", ron::to_string(population.champion())?);
    Ok(())
}
