use crate::PhysicsConfig;

use serde::{Deserialize, Serialize};

/// Vertical motion state of a single agent.
///
/// Motion follows a ballistic arc restarted by every
/// [impulse](Kinematics::impulse): the displacement of
/// each tick is `v·t + ½·g·t²`, where `t` counts ticks
/// since the last impulse. Tilt is carried along for
/// presentation only and never affects motion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    y: f32,
    velocity: f32,
    ticks_since_impulse: u64,
    impulse_height: f32,
    tilt: f32,
}

impl Kinematics {
    /// Returns a resting state at height `y`.
    pub fn new(y: f32) -> Kinematics {
        Kinematics {
            y,
            velocity: 0.0,
            ticks_since_impulse: 0,
            impulse_height: y,
            tilt: 0.0,
        }
    }

    /// Advances the motion by one tick.
    ///
    /// # Examples
    /// ```
    /// use flapsim::{Kinematics, PhysicsConfig};
    ///
    /// let physics = PhysicsConfig::default();
    /// let mut kinematics = Kinematics::new(250.0);
    /// kinematics.integrate(&physics);
    /// assert_eq!(kinematics.y(), 251.5);
    /// ```
    pub fn integrate(&mut self, physics: &PhysicsConfig) {
        self.ticks_since_impulse += 1;
        let t = self.ticks_since_impulse as f32;

        let mut displacement = self.velocity * t + 0.5 * physics.gravity * t * t;
        if displacement >= physics.max_fall_per_tick {
            displacement = physics.max_fall_per_tick;
        }
        if displacement < 0.0 {
            displacement -= physics.ascent_correction;
        }
        self.y += displacement;

        if displacement < 0.0 || self.y < self.impulse_height + physics.tilt_band {
            if self.tilt < physics.max_tilt {
                self.tilt = physics.max_tilt;
            }
        } else {
            self.tilt = (self.tilt - physics.tilt_rate).max(physics.min_tilt);
        }
    }

    /// Starts a new upward arc from the current height.
    pub fn impulse(&mut self, physics: &PhysicsConfig) {
        self.velocity = physics.impulse_velocity;
        self.ticks_since_impulse = 0;
        self.impulse_height = self.y;
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    pub fn ticks_since_impulse(&self) -> u64 {
        self.ticks_since_impulse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_fall_is_clamped() {
        let physics = PhysicsConfig::default();
        let mut k = Kinematics::new(250.0);
        let mut heights = vec![];
        for _ in 0..6 {
            k.integrate(&physics);
            heights.push(k.y());
        }
        assert_eq!(heights, [251.5, 257.5, 271.0, 287.0, 303.0, 319.0]);
    }

    #[test]
    fn impulse_ascends_with_correction() {
        let physics = PhysicsConfig::default();
        let mut k = Kinematics::new(250.0);
        k.impulse(&physics);
        k.integrate(&physics);
        // -10.5 + 1.5, minus the 2px ascent correction.
        assert_eq!(k.y(), 239.0);
        assert_eq!(k.ticks_since_impulse(), 1);
        assert_eq!(k.tilt(), physics.max_tilt);
    }

    #[test]
    fn arc_peaks_and_turns_around() {
        let physics = PhysicsConfig::default();
        let mut k = Kinematics::new(300.0);
        k.impulse(&physics);
        let mut heights = vec![];
        for _ in 0..9 {
            k.integrate(&physics);
            heights.push(k.y());
        }
        assert_eq!(
            heights,
            [289.0, 272.0, 252.0, 232.0, 215.0, 204.0, 204.0, 216.0, 232.0]
        );
    }

    #[test]
    fn tilt_decays_to_floor() {
        let physics = PhysicsConfig::default();
        let mut k = Kinematics::new(0.0);
        for _ in 0..40 {
            k.integrate(&physics);
        }
        assert_eq!(k.tilt(), physics.min_tilt);
    }

    #[test]
    fn tilt_holds_inside_band() {
        let physics = PhysicsConfig::default();
        let mut k = Kinematics::new(100.0);
        k.impulse(&physics);
        for _ in 0..8 {
            k.integrate(&physics);
        }
        // Falling again, but still above the impulse height.
        assert_eq!(k.y(), 16.0);
        assert_eq!(k.tilt(), physics.max_tilt);
    }

    #[test]
    fn impulse_resets_arc() {
        let physics = PhysicsConfig::default();
        let mut k = Kinematics::new(250.0);
        for _ in 0..5 {
            k.integrate(&physics);
        }
        k.impulse(&physics);
        assert_eq!(k.ticks_since_impulse(), 0);
        assert_eq!(k.velocity(), physics.impulse_velocity);
    }

    #[test]
    fn arc_length_counts_round_ticks() {
        let physics = PhysicsConfig::default();
        let mut k = Kinematics::new(250.0);
        let mut round_ticks: u64 = 0;
        for _ in 0..7 {
            k.integrate(&physics);
            round_ticks += 1;
        }
        assert_eq!(k.ticks_since_impulse(), round_ticks);
    }
}
