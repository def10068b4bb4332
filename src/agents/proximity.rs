//! Suggestions drawn from prior high-scoring results.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::Result;
use crate::memory::{MemoryRecord, SqliteMemoryStore};

/// What memory suggests before generation starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProximitySuggestion {
    /// Highest-scoring stored result
    Revisit(MemoryRecord),
    NoPriorData,
}

impl fmt::Display for ProximitySuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revisit(record) => write!(
                f,
                "Proximity Suggestion: Consider revisiting '{}' from previous research.",
                record.result
            ),
            Self::NoPriorData => write!(f, "Proximity Suggestion: No prior relevant data found."),
        }
    }
}

/// Reads the top stored results; never writes.
#[derive(Debug, Clone, Copy)]
pub struct ProximityAdvisor {
    limit: usize,
}

impl Default for ProximityAdvisor {
    fn default() -> Self {
        Self { limit: 1 }
    }
}

impl ProximityAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consult this many top records (the suggestion uses the first).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    /// Suggest a prior result. `_query` is not used for filtering yet.
    pub fn advise(&self, _query: &str, memory: &SqliteMemoryStore) -> Result<ProximitySuggestion> {
        let past = memory.retrieve_top_results(self.limit)?;
        debug!(stored = ?past, "Current stored queries");

        Ok(past
            .into_iter()
            .next()
            .map_or(ProximitySuggestion::NoPriorData, ProximitySuggestion::Revisit))
    }
}
