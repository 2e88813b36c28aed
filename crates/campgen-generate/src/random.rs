use std::num::NonZeroU32;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The one random source of a generation run.
///
/// Every stochastic decision draws from this sequence, so the order of calls
/// is part of the output: moving a draw changes every row generated after it.
#[derive(Debug, Clone)]
pub struct RandomSequence {
    rng: ChaCha8Rng,
    draws: u64,
}

impl RandomSequence {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// Uniform double in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.draws += 1;
        self.rng.random::<f64>()
    }

    /// Uniform integer in `[0, bound)`.
    pub fn next_below(&mut self, bound: NonZeroU32) -> u32 {
        self.draws += 1;
        self.rng.random_range(0..bound.get())
    }

    pub fn next_bool(&mut self) -> bool {
        self.draws += 1;
        self.rng.random_bool(0.5)
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}
