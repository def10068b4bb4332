//! Injected randomness for score evolution.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::sync::Mutex;

/// Bounds of the per-cycle score increment.
pub const INCREMENT_RANGE: RangeInclusive<u32> = 2..=4;

/// Source of score increments applied by the evolver.
pub trait IncrementSource: Send + Sync {
    /// Next increment, expected within [`INCREMENT_RANGE`].
    fn next_increment(&self) -> u32;
}

/// Uniform increments drawn from a seedable generator.
pub struct RandomIncrement {
    rng: Mutex<StdRng>,
}

impl RandomIncrement {
    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seeded when `seed` is given, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl IncrementSource for RandomIncrement {
    fn next_increment(&self) -> u32 {
        // A poisoned lock still holds a usable generator
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(INCREMENT_RANGE)
    }
}

/// Always returns the same increment.
#[derive(Debug, Clone, Copy)]
pub struct FixedIncrement(pub u32);

impl IncrementSource for FixedIncrement {
    fn next_increment(&self) -> u32 {
        self.0
    }
}
