use bevy::prelude::Resource;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// The single random source for percentile rolls and weighted draws.
#[derive(Resource, Debug, Clone)]
pub struct SimRng {
    seed: u64,
    rng: SmallRng,
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn reseed(&mut self, seed: u64) {
        *self = Self::seeded(seed);
    }

    /// Uniform roll in `0..100`.
    pub fn percentile(&mut self) -> u32 {
        self.rng.gen_range(0..100)
    }

    pub fn pick<'a, T>(&mut self, pool: &'a [T]) -> Option<&'a T> {
        pool.choose(&mut self.rng)
    }

    pub fn rng_mut(&mut self) -> &mut SmallRng {
        &mut self.rng
    }
}
