use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use std::ops::Range;

/// Draws gap heights for newly spawned obstacles.
///
/// Wraps any `R: Rng` so obstacle code can be driven
/// by a seeded generator in a session and by a fixed
/// one in tests.
#[derive(Clone, Debug)]
pub struct GapSampler<R: Rng> {
    rng: R,
    range: Range<u32>,
}

impl GapSampler<StdRng> {
    /// Returns a sampler whose stream depends only on
    /// `seed` and `generation`.
    pub fn seeded(seed: u64, generation: usize, range: Range<u32>) -> GapSampler<StdRng> {
        let stream = seed ^ (generation as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        GapSampler::new(StdRng::seed_from_u64(stream), range)
    }
}

impl<R: Rng> GapSampler<R> {
    /// # Panics
    /// Panics if `range` is empty.
    pub fn new(rng: R, range: Range<u32>) -> GapSampler<R> {
        assert!(!range.is_empty(), "empty gap range {:?}", range);
        GapSampler { rng, range }
    }

    /// Returns a whole-pixel height in the sampler's range.
    pub fn next_height(&mut self) -> f32 {
        self.rng.gen_range(self.range.clone()) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_stay_in_range() {
        let mut sampler = GapSampler::seeded(7, 3, 50..350);
        for _ in 0..10_000 {
            let h = sampler.next_height();
            assert!((50.0..350.0).contains(&h));
            assert_eq!(h, h.trunc());
        }
    }

    #[test]
    fn generations_get_distinct_streams() {
        let draw = |generation| {
            let mut sampler = GapSampler::seeded(7, generation, 50..350);
            (0..16).map(|_| sampler.next_height()).collect::<Vec<_>>()
        };
        assert_eq!(draw(1), draw(1));
        assert_ne!(draw(1), draw(2));
    }

    #[test]
    #[should_panic]
    fn empty_range_panics() {
        GapSampler::seeded(0, 0, 10..10);
    }
}
