//! The per-cycle agents driven by the orchestrator.
//!
//! - **Reflector**: pass-through confirmation
//! - **SimilarityRanker**: TF-IDF relevance score in [3, 10]
//! - **Evolver**: refined idea plus a bounded score increment
//! - **ReviewClassifier**: feedback tier from the score delta
//! - **ProximityAdvisor**: prior top result from memory

mod evolution;
mod proximity;
mod ranking;
mod reflection;
mod review;

pub use evolution::{Evolution, Evolver};
pub use proximity::{ProximityAdvisor, ProximitySuggestion};
pub use ranking::{Ranking, SimilarityRanker};
pub use reflection::Reflector;
pub use review::{Review, ReviewClassifier, ReviewTier};

/// Lowest score the ranker produces.
pub const MIN_SCORE: u32 = 3;

/// Highest score anything produces.
pub const MAX_SCORE: u32 = 10;
