//! Qualitative review of a cycle's score change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Feedback tier for a cycle, by score delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewTier {
    /// Delta above 3
    Significant,
    /// Delta of 2 or 3
    Moderate,
    /// Delta of 1 or less
    Minimal,
}

impl ReviewTier {
    /// First matching tier for `final_score - initial_score`.
    pub fn classify(initial_score: u32, final_score: u32) -> Self {
        let delta = final_score as i64 - initial_score as i64;
        if delta > 3 {
            Self::Significant
        } else if delta > 1 {
            Self::Moderate
        } else {
            Self::Minimal
        }
    }

    pub fn feedback(&self) -> &'static str {
        match self {
            Self::Significant => "Significant improvement detected. Approach is effective.",
            Self::Moderate => {
                "Moderate improvement. Consider refining ranking and evolution further."
            }
            Self::Minimal => {
                "Minimal improvement. Optimize web query or rethink hypothesis generation."
            }
        }
    }
}

impl fmt::Display for ReviewTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Significant => write!(f, "significant"),
            Self::Moderate => write!(f, "moderate"),
            Self::Minimal => write!(f, "minimal"),
        }
    }
}

/// Review of one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub tier: ReviewTier,
    pub delta: i64,
    /// Refined idea the review refers to; carried for reporting only
    pub final_output: String,
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Meta-review: {}", self.tier.feedback())
    }
}

/// Classifies score deltas into review tiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewClassifier;

impl ReviewClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn review(&self, final_output: &str, initial_score: u32, final_score: u32) -> Review {
        Review {
            tier: ReviewTier::classify(initial_score, final_score),
            delta: final_score as i64 - initial_score as i64,
            final_output: final_output.to_string(),
        }
    }
}
