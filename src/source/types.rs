//! Candidate idea records.

use serde::{Deserialize, Serialize};

/// The in-flight candidate idea refined across cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypothesis {
    /// Primary idea text
    pub idea: String,
    /// Alternate ideas returned alongside the primary (0-2 items)
    #[serde(default)]
    pub alt_ideas: Vec<String>,
    /// Relevance score, unset until ranked
    #[serde(default)]
    pub score: Option<u32>,
    /// Provenance or detail string from the source
    pub info: String,
}

impl Hypothesis {
    /// Create an unscored hypothesis without alternates.
    pub fn new(idea: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            alt_ideas: Vec::new(),
            score: None,
            info: info.into(),
        }
    }

    pub fn with_alt_ideas(mut self, alt_ideas: Vec<String>) -> Self {
        self.alt_ideas = alt_ideas;
        self
    }

    /// Whether the idea text can be refined further.
    pub fn is_usable(&self) -> bool {
        !self.idea.trim().is_empty()
    }
}
