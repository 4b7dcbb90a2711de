use crate::Gap;

use serde::{Deserialize, Serialize};

/// What a policy sees of the world on each tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// The agent's height.
    pub y: f32,
    /// Vertical distance to the upper edge of the target gap.
    pub gap_top_distance: f32,
    /// Vertical distance to the lower edge of the target gap.
    pub gap_bottom_distance: f32,
}

impl Observation {
    pub fn new(y: f32, gap: Gap) -> Observation {
        Observation {
            y,
            gap_top_distance: (y - gap.top).abs(),
            gap_bottom_distance: (y - gap.bottom).abs(),
        }
    }

    /// Returns the observation as a network input vector.
    pub fn to_array(&self) -> [f32; 3] {
        [self.y, self.gap_top_distance, self.gap_bottom_distance]
    }
}

/// An externally supplied decision function.
///
/// The harness calls [`evaluate`] once per tick for every
/// live agent, and never otherwise touches the policy.
/// Values above the configured [action threshold] make
/// the agent flap. Non-finite values abort the round.
///
/// Any `FnMut(&Observation) -> f32` is a policy.
///
/// [`evaluate`]: Policy::evaluate
/// [action threshold]: crate::SimulationConfig::action_threshold
///
/// # Examples
/// ```
/// use flapsim::{Observation, Policy};
///
/// struct Hover(f32);
///
/// impl Policy for Hover {
///     fn evaluate(&mut self, observation: &Observation) -> f32 {
///         if observation.y > self.0 { 1.0 } else { 0.0 }
///     }
/// }
///
/// let mut closure = |o: &Observation| o.gap_bottom_distance / 100.0;
/// # let o = Observation { y: 10.0, gap_top_distance: 0.0, gap_bottom_distance: 50.0 };
/// # assert_eq!(closure.evaluate(&o), 0.5);
/// # assert_eq!(Hover(5.0).evaluate(&o), 1.0);
/// ```
pub trait Policy {
    fn evaluate(&mut self, observation: &Observation) -> f32;
}

impl<F> Policy for F
where
    F: FnMut(&Observation) -> f32,
{
    fn evaluate(&mut self, observation: &Observation) -> f32 {
        self(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances_are_absolute() {
        let o = Observation::new(
            250.0,
            Gap {
                top: 300.0,
                bottom: 500.0,
            },
        );
        assert_eq!(o.to_array(), [250.0, 50.0, 250.0]);
        let o = Observation::new(
            400.0,
            Gap {
                top: 300.0,
                bottom: 500.0,
            },
        );
        assert_eq!(o.to_array(), [400.0, 100.0, 100.0]);
    }

    #[test]
    fn stateful_closures_are_policies() {
        let mut calls = 0;
        let mut policy = |_: &Observation| {
            calls += 1;
            calls as f32
        };
        let o = Observation::new(0.0, Gap { top: 0.0, bottom: 0.0 });
        assert_eq!(policy.evaluate(&o), 1.0);
        assert_eq!(policy.evaluate(&o), 2.0);
    }
}
