//! Record types persisted by the memory store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Best-known result for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub query: String,
    pub result: String,
    pub score: u32,
}

impl MemoryRecord {
    pub fn new(query: impl Into<String>, result: impl Into<String>, score: u32) -> Self {
        Self {
            query: query.into(),
            result: result.into(),
            score,
        }
    }
}

/// One refinement cycle as recorded in the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleEntry {
    pub query: String,
    pub cycle: u32,
    pub idea: String,
    pub initial_score: u32,
    pub final_score: u32,
    /// Review tier label (`significant`, `moderate`, `minimal`)
    pub tier: String,
    pub recorded_at: DateTime<Utc>,
}
