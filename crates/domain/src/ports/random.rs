use rand::Rng;

pub trait RandomSource: Send + Sync {
    /// Uniform draw from `0..upper`. `upper` is never zero.
    fn below(&self, upper: usize) -> usize;
}

/// Thread-local generator from `rand`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&self, upper: usize) -> usize {
        rand::rng().random_range(0..upper)
    }
}
