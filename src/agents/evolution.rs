//! Score-bounded idea evolution.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::random::IncrementSource;
use crate::source::IdeaSource;

use super::MAX_SCORE;

/// Result of one evolution step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evolution {
    pub idea: String,
    pub score: u32,
    /// False when the source had nothing usable and the input was kept
    pub refined: bool,
}

/// Asks the idea source for a refinement and bumps the score.
pub struct Evolver {
    source: Arc<dyn IdeaSource>,
    increments: Arc<dyn IncrementSource>,
}

impl Evolver {
    pub fn new(source: Arc<dyn IdeaSource>, increments: Arc<dyn IncrementSource>) -> Self {
        Self { source, increments }
    }

    /// Query sent to the source for refining `idea`.
    pub fn augmented_query(idea: &str) -> String {
        format!("latest innovations in {}", idea)
    }

    /// Refine `idea`. The returned score is `min(current + increment, 10)` and
    /// never below `current_score`; on an unusable refinement both are kept.
    pub async fn evolve(&self, idea: &str, current_score: u32) -> Evolution {
        let refined = self.source.fetch(&Self::augmented_query(idea)).await;

        if !refined.is_usable() {
            debug!(idea, "No usable refinement, keeping idea");
            return Evolution {
                idea: idea.to_string(),
                score: current_score,
                refined: false,
            };
        }

        let increment = self.increments.next_increment();
        Evolution {
            idea: refined.idea,
            score: bump_score(current_score, increment),
            refined: true,
        }
    }
}

fn bump_score(current: u32, increment: u32) -> u32 {
    current.saturating_add(increment).min(MAX_SCORE).max(current)
}
