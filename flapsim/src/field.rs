use crate::rng::GapSampler;
use crate::{Gap, Obstacle, ObstacleConfig, WorldConfig};

use rand::Rng;

/// The obstacles currently in play, in spawn order.
///
/// Obstacles move uniformly, so spawn order is also
/// ascending horizontal order: index 0 is always the
/// leftmost obstacle.
#[derive(Clone, Debug)]
pub struct ObstacleField<R: Rng> {
    obstacles: Vec<Obstacle>,
    sampler: GapSampler<R>,
    config: ObstacleConfig,
    spawn_x: f32,
}

impl<R: Rng> ObstacleField<R> {
    /// Returns a field holding a single obstacle at
    /// the configured starting position.
    pub fn new(config: &ObstacleConfig, world: &WorldConfig, mut sampler: GapSampler<R>) -> ObstacleField<R> {
        let first = Obstacle::spawn(config.first_obstacle_x, &mut sampler, config);
        ObstacleField {
            obstacles: vec![first],
            sampler,
            config: config.clone(),
            spawn_x: config.spawn_x(world),
        }
    }

    /// Advances every obstacle, then drops those that
    /// have left the world.
    pub fn advance_all(&mut self) {
        let velocity = self.config.obstacle_velocity;
        let width = self.config.width;
        for obstacle in &mut self.obstacles {
            obstacle.advance(velocity);
        }
        self.obstacles.retain(|o| !o.is_off_screen(width));
    }

    /// Appends a new obstacle past the right edge of the
    /// world iff `trigger` is set. Returns whether one
    /// was spawned.
    pub fn maybe_spawn(&mut self, trigger: bool) -> bool {
        if trigger {
            let obstacle = Obstacle::spawn(self.spawn_x, &mut self.sampler, &self.config);
            self.obstacles.push(obstacle);
        }
        trigger
    }

    /// Returns the index of the obstacle an agent at
    /// `lead_x` is currently navigating. Once `lead_x` is
    /// past the right edge of the leftmost obstacle, the
    /// next one becomes relevant.
    ///
    /// # Panics
    /// Panics if the field is empty.
    pub fn nearest_relevant(&self, lead_x: f32) -> usize {
        assert!(!self.obstacles.is_empty(), "empty obstacle field");
        if self.obstacles.len() > 1 && lead_x > self.obstacles[0].x() + self.config.width {
            1
        } else {
            0
        }
    }

    /// Returns the gap of the [nearest relevant] obstacle.
    ///
    /// [nearest relevant]: ObstacleField::nearest_relevant
    pub fn target_gap(&self, lead_x: f32) -> Gap {
        self.obstacles[self.nearest_relevant(lead_x)].gap()
    }

    pub fn get(&self, index: usize) -> Option<&Obstacle> {
        self.obstacles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Obstacle> {
        self.obstacles.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    fn field() -> ObstacleField<StdRng> {
        let config = ObstacleConfig::default();
        let sampler = GapSampler::seeded(3, 0, config.gap_center_range.clone());
        ObstacleField::new(&config, &WorldConfig::default(), sampler)
    }

    #[test]
    fn starts_with_one_obstacle() {
        let field = field();
        assert_eq!(field.len(), 1);
        assert_eq!(field.get(0).unwrap().x(), 500.0);
    }

    #[test]
    fn spawns_only_on_trigger() {
        let mut field = field();
        assert!(!field.maybe_spawn(false));
        assert_eq!(field.len(), 1);
        assert!(field.maybe_spawn(true));
        assert_eq!(field.len(), 2);
        assert_eq!(field.get(1).unwrap().x(), 550.0);
    }

    #[test]
    fn recycles_off_screen_obstacles() {
        let mut field = field();
        field.maybe_spawn(true);
        // 500 + 104 = 604px to clear the left edge.
        for _ in 0..120 {
            field.advance_all();
        }
        assert_eq!(field.len(), 2);
        field.advance_all();
        assert_eq!(field.len(), 1);
        assert_eq!(field.get(0).unwrap().x(), 550.0 - 121.0 * 5.0);
    }

    #[test]
    fn nearest_relevant_skips_cleared_obstacle() {
        let mut field = field();
        assert_eq!(field.nearest_relevant(170.0), 0);
        // Only one obstacle: stays at 0 even once cleared.
        for _ in 0..90 {
            field.advance_all();
        }
        assert_eq!(field.nearest_relevant(170.0), 0);
        field.maybe_spawn(true);
        // Leftmost right edge at 50 + 104 = 154 < 170.
        assert_eq!(field.nearest_relevant(170.0), 1);
        assert_eq!(field.nearest_relevant(154.0), 0);
    }

    #[test]
    #[should_panic]
    fn nearest_relevant_requires_obstacles() {
        let mut field = field();
        for _ in 0..200 {
            field.advance_all();
        }
        field.nearest_relevant(170.0);
    }
}
