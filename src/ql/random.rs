use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The engine's single source of randomness.
///
/// Every stochastic decision (exploration walks, tie-breaking, random state
/// selection) draws from one instance, so an entire training run replays
/// identically from one seed.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Uniform value in `[0, 1)`. Pure function of the seed and call count.
    pub fn random(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Restarts the sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Uniform index into a collection of `len` elements: `floor(len * random())`.
    /// `None` for an empty collection, without consuming a draw.
    pub(crate) fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some((len as f64 * self.random()) as usize)
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::from_seed(0)
    }
}
