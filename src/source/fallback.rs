//! Fixed candidate set used when the search provider cannot answer.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use super::types::Hypothesis;
use super::IdeaSource;

/// Built-in candidates as `(idea, info)` pairs.
pub const FALLBACK_IDEAS: [(&str, &str); 4] = [
    ("Solar panels on rooftops", "cost: $200/unit"),
    ("Wind turbines integrated into buildings", "efficiency: 75%"),
    ("Smart grids for urban energy efficiency", "savings: 30%"),
    ("Hydrogen fuel cells for city transport", "adoption: rising"),
];

/// Picks one of [`FALLBACK_IDEAS`] with an injected generator. Never fails.
pub struct FallbackCatalog {
    rng: Mutex<StdRng>,
}

impl FallbackCatalog {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Pick a candidate. Score is unset and there are no alternates.
    pub fn pick(&self) -> Hypothesis {
        let index = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_range(0..FALLBACK_IDEAS.len())
        };
        let (idea, info) = FALLBACK_IDEAS[index];
        Hypothesis::new(idea, info)
    }
}

/// Idea source that never touches the network.
pub struct OfflineIdeaSource {
    catalog: FallbackCatalog,
}

impl OfflineIdeaSource {
    pub fn new(catalog: FallbackCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl IdeaSource for OfflineIdeaSource {
    async fn fetch(&self, _query: &str) -> Hypothesis {
        self.catalog.pick()
    }

    fn name(&self) -> &str {
        "offline"
    }
}
