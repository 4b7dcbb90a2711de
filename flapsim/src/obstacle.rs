use crate::collision::{CollisionDetector, Rect};
use crate::rng::GapSampler;
use crate::ObstacleConfig;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Vertical extent of the opening an agent must fly through.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    /// Lower edge of the top half.
    pub top: f32,
    /// Upper edge of the bottom half.
    pub bottom: f32,
}

/// A scrolling pair of obstacle halves separated by a gap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    x: f32,
    height: f32,
    top: f32,
    bottom: f32,
    passed: bool,
}

impl Obstacle {
    /// Creates an obstacle at horizontal position `x` with a
    /// freshly drawn gap height.
    ///
    /// # Examples
    /// ```
    /// use flapsim::{GapSampler, Obstacle, ObstacleConfig};
    ///
    /// let config = ObstacleConfig::default();
    /// let mut sampler = GapSampler::seeded(0, 0, config.gap_center_range.clone());
    /// let obstacle = Obstacle::spawn(500.0, &mut sampler, &config);
    ///
    /// assert_eq!(obstacle.top(), obstacle.height() - config.height);
    /// assert_eq!(obstacle.bottom(), obstacle.height() + config.gap_size);
    /// ```
    pub fn spawn<R: Rng>(x: f32, sampler: &mut GapSampler<R>, config: &ObstacleConfig) -> Obstacle {
        let height = sampler.next_height();
        Obstacle {
            x,
            height,
            top: height - config.height,
            bottom: height + config.gap_size,
            passed: false,
        }
    }

    /// Moves the obstacle `velocity` pixels to the left.
    pub fn advance(&mut self, velocity: f32) {
        self.x -= velocity;
    }

    /// Returns whether the obstacle's right edge has
    /// left the world.
    pub fn is_off_screen(&self, width: f32) -> bool {
        self.x + width < 0.0
    }

    /// Marks the obstacle as passed. Returns `true` only
    /// the first time it is called.
    pub fn mark_passed(&mut self) -> bool {
        !std::mem::replace(&mut self.passed, true)
    }

    pub fn overlaps(&self, agent: &Rect, detector: &CollisionDetector) -> bool {
        detector.check(agent, self)
    }

    pub fn gap(&self) -> Gap {
        Gap {
            top: self.height,
            bottom: self.bottom,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    /// The y of the gap's upper edge.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// The y at which the top half begins.
    pub fn top(&self) -> f32 {
        self.top
    }

    /// The y at which the bottom half begins.
    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    pub fn passed(&self) -> bool {
        self.passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_extents_follow_height() {
        let config = ObstacleConfig::default();
        let mut sampler = GapSampler::seeded(42, 0, config.gap_center_range.clone());
        for _ in 0..1000 {
            let obstacle = Obstacle::spawn(550.0, &mut sampler, &config);
            assert!(obstacle.height() >= 50.0 && obstacle.height() < 350.0);
            assert_eq!(obstacle.top(), obstacle.height() - 640.0);
            assert_eq!(obstacle.bottom(), obstacle.height() + 200.0);
            assert!(!obstacle.passed());
        }
    }

    #[test]
    fn advances_and_leaves() {
        let config = ObstacleConfig::default();
        let mut sampler = GapSampler::seeded(0, 0, config.gap_center_range.clone());
        let mut obstacle = Obstacle::spawn(0.0, &mut sampler, &config);
        for _ in 0..20 {
            obstacle.advance(config.obstacle_velocity);
        }
        assert_eq!(obstacle.x(), -100.0);
        assert!(!obstacle.is_off_screen(config.width));
        obstacle.advance(config.obstacle_velocity);
        assert!(obstacle.is_off_screen(config.width));
    }

    #[test]
    fn passing_is_idempotent() {
        let config = ObstacleConfig::default();
        let mut sampler = GapSampler::seeded(0, 0, config.gap_center_range.clone());
        let mut obstacle = Obstacle::spawn(0.0, &mut sampler, &config);
        assert!(obstacle.mark_passed());
        assert!(!obstacle.mark_passed());
        assert!(obstacle.passed());
    }

    #[test]
    fn gap_spans_opening() {
        let config = ObstacleConfig::default();
        let mut sampler = GapSampler::seeded(0, 0, 120..121);
        let obstacle = Obstacle::spawn(0.0, &mut sampler, &config);
        assert_eq!(
            obstacle.gap(),
            Gap {
                top: 120.0,
                bottom: 320.0
            }
        );
    }
}
