use flapsim::{
    CollisionDetector, DeathCause, EvaluationSession, Mask, Observation, RoundSnapshot,
    SimulationConfig, Termination,
};

use std::collections::BTreeMap;

const EPSILON: f32 = 1e-4;

fn never_flap(_: &Observation) -> f32 {
    0.0
}

fn always_flap(_: &Observation) -> f32 {
    1.0
}

/// Keeps the agent between 308 and 416, inside a gap at 300..500.
fn hover_low(observation: &Observation) -> f32 {
    if observation.y > 400.0 {
        1.0
    } else {
        0.0
    }
}

/// Keeps the agent between 55 and 163, squarely in front of the top half.
fn hover_high(observation: &Observation) -> f32 {
    if observation.y > 150.0 {
        1.0
    } else {
        0.0
    }
}

fn fixed_gap(height: u32) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.obstacles.gap_center_range = height..height + 1;
    config
}

#[test]
fn never_flapping_falls_to_the_ground() {
    let session = EvaluationSession::new(SimulationConfig::default(), 0).unwrap();
    let mut policies = [never_flap];
    let outcome = session.run(&mut policies).unwrap();
    assert_eq!(outcome.termination, Termination::Extinct);
    assert_eq!(outcome.ticks, 20);
    assert_eq!(outcome.score, 0);
    assert!((outcome.fitness[0] - 20.0 * 0.1).abs() < EPSILON);
}

#[test]
fn always_flapping_leaves_through_the_top() {
    let session = EvaluationSession::new(SimulationConfig::default(), 0).unwrap();
    let mut policies = [always_flap];
    let mut heights = vec![];
    let outcome = session
        .run_observed(&mut policies, |s| {
            if let Some(agent) = s.agent(0) {
                heights.push(agent.y);
            }
        })
        .unwrap();
    assert_eq!(outcome.ticks, 23);
    assert!(heights.windows(2).all(|w| w[1] < w[0]));
    // Only survival rewards: no penalty, no pass bonus.
    assert!((outcome.fitness[0] - 23.0 * 0.1).abs() < EPSILON);
}

#[test]
fn obstacle_death_freezes_fitness_while_survivor_accrues() {
    let config = SimulationConfig {
        max_ticks: Some(200),
        ..fixed_gap(300)
    };
    let session = EvaluationSession::new(config, 0).unwrap();
    let mut policies = [hover_high, hover_low];

    let mut alive_at = BTreeMap::new();
    let outcome = session
        .run_observed(&mut policies, |s| {
            alive_at.insert(s.tick, s.agents.iter().map(|a| a.id).collect::<Vec<_>>());
        })
        .unwrap();

    assert_eq!(outcome.fitness.len(), 2);
    assert_eq!(outcome.termination, Termination::TickLimit);
    // The obstacle reaches the agents on tick 54.
    assert_eq!(alive_at[&53], [0, 1]);
    assert_eq!(alive_at[&54], [1]);
    assert!((outcome.fitness[0] - (54.0 * 0.1 - 1.0)).abs() < EPSILON);
    // 200 survival rewards plus two passes.
    assert_eq!(outcome.score, 2);
    assert!((outcome.fitness[1] - (200.0 * 0.1 + 2.0 * 5.0)).abs() < 1e-3);
}

#[test]
fn output_order_matches_input_regardless_of_death_order() {
    let config = SimulationConfig {
        max_ticks: Some(100),
        ..fixed_gap(300)
    };
    let session = EvaluationSession::new(config, 0).unwrap();
    let mut policies = [hover_low, never_flap, hover_high, always_flap, never_flap];
    let fitness = session.evaluate(&mut policies).unwrap();
    assert_eq!(fitness.len(), 5);
    assert!((fitness[1] - 2.0).abs() < EPSILON);
    assert!((fitness[4] - 2.0).abs() < EPSILON);
    assert!((fitness[3] - 2.3).abs() < EPSILON);
    assert!((fitness[2] - 4.4).abs() < EPSILON);
    assert!((fitness[0] - (100.0 * 0.1 + 5.0)).abs() < 1e-3);
}

#[test]
fn fitness_drops_only_by_the_collision_penalty() {
    let config = SimulationConfig {
        max_ticks: Some(400),
        ..fixed_gap(300)
    };
    let session = EvaluationSession::new(config, 3).unwrap();
    let limits: Vec<f32> = (0..30)
        .map(|i| 120.0 + i as f32 * 12.0)
        .chain([f32::INFINITY])
        .collect();
    let mut policies: Vec<_> = limits
        .iter()
        .map(|&limit| move |o: &Observation| if o.y > limit { 1.0 } else { 0.0 })
        .collect();

    let mut snapshots: Vec<RoundSnapshot> = vec![];
    let outcome = session
        .run_observed(&mut policies, |s| snapshots.push(s.clone()))
        .unwrap();

    let mut last: Vec<Option<f32>> = vec![Some(0.0); limits.len()];
    let mut score = 0;
    let mut causes = vec![];
    for snapshot in &snapshots {
        let bonus = if snapshot.score > score { 5.0 } else { 0.0 };
        score = snapshot.score;
        for agent in &snapshot.agents {
            let previous = last[agent.id].expect("agent reappeared");
            assert!((agent.fitness - (previous + 0.1 + bonus)).abs() < 1e-3);
            last[agent.id] = Some(agent.fitness);
        }
        for departure in &snapshot.departures {
            let previous = last[departure.id].take().expect("agent departed twice");
            // Obstacle deaths happen before the pass bonus is paid.
            let expected = match departure.cause {
                DeathCause::Obstacle => previous + 0.1 - 1.0,
                DeathCause::Bounds => previous + 0.1 + bonus,
            };
            assert!(
                (departure.fitness - expected).abs() < 1e-3,
                "agent {} died of {:?} with {}, expected {}",
                departure.id,
                departure.cause,
                departure.fitness,
                expected
            );
            assert_eq!(departure.fitness, outcome.fitness[departure.id]);
            causes.push(departure.cause);
        }
    }
    assert!(causes.contains(&DeathCause::Obstacle));
    assert!(causes.contains(&DeathCause::Bounds));
}

#[test]
fn pixel_masks_plug_into_sessions() {
    let config = SimulationConfig {
        max_ticks: Some(100),
        ..fixed_gap(300)
    };
    let detector = CollisionDetector::pixel_mask(Mask::filled(68, 48), Mask::filled(104, 640));
    let session = EvaluationSession::new(config, 0).unwrap().with_detector(detector);
    let mut policies = [hover_high, hover_low];
    let fitness = session.evaluate(&mut policies).unwrap();
    assert!((fitness[0] - 4.4).abs() < EPSILON);
    assert!(fitness[1] > 10.0);
}

#[test]
fn snapshots_serialize_for_presentation() {
    let session = EvaluationSession::new(SimulationConfig::default(), 0).unwrap();
    let mut policies = [never_flap];
    let mut frames = vec![];
    session
        .run_observed(&mut policies, |s| frames.push(serde_json::to_string(s).unwrap()))
        .unwrap();
    assert_eq!(frames.len(), 20);
    let first: RoundSnapshot = serde_json::from_str(&frames[0]).unwrap();
    assert_eq!(first.tick, 1);
    assert_eq!(first.agents[0].y, 251.5);
    let last: RoundSnapshot = serde_json::from_str(&frames[19]).unwrap();
    assert!(last.agents.is_empty());
}
