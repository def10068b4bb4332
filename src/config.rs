//! Run and search-provider configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of refinement cycles per query.
pub const DEFAULT_CYCLES: u32 = 3;

/// Environment variable holding the search API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Environment variable holding the custom search engine id.
pub const ENGINE_ID_ENV: &str = "CUSTOM_SEARCH_ENGINE_ID";

/// Configuration for a refinement run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Path of the SQLite memory file (`~` is expanded)
    pub db_path: String,
    /// Refinement cycles per query (default: 3)
    pub cycles: u32,
    /// Upper bound on a single idea-source fetch in milliseconds
    pub source_timeout_ms: u64,
    /// Seed for fallback picks and evolution increments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Maximum queries processed concurrently by `execute_many`
    pub max_parallel: usize,
    /// Number of prior results consulted before generation
    pub top_results_limit: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            db_path: "memory.db".to_string(),
            cycles: DEFAULT_CYCLES,
            source_timeout_ms: 10_000,
            seed: None,
            max_parallel: 4,
            top_results_limit: 1,
        }
    }
}

impl LoopConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_db_path(mut self, path: impl Into<String>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.cycles = cycles;
        self
    }

    pub fn with_source_timeout_ms(mut self, timeout: u64) -> Self {
        self.source_timeout_ms = timeout;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_parallel(mut self, max: usize) -> Self {
        self.max_parallel = max.max(1);
        self
    }

    /// Database path with `~` and environment variables expanded.
    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.db_path).map_err(|e| {
            Error::Config(format!("invalid database path '{}': {}", self.db_path, e))
        })?;
        Ok(PathBuf::from(expanded.into_owned()))
    }
}

/// Configuration for the web search provider.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// API key
    pub api_key: String,
    /// Custom search engine id
    pub engine_id: String,
    /// Base URL override
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Titles kept per search (first is the idea, rest are alternates)
    pub max_results: usize,
}

impl SearchConfig {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            base_url: None,
            timeout_secs: 10,
            max_results: 3,
        }
    }

    /// Read credentials from `GOOGLE_API_KEY` and `CUSTOM_SEARCH_ENGINE_ID`.
    pub fn from_env() -> Result<Self> {
        let api_key = read_env(API_KEY_ENV)?;
        let engine_id = read_env(ENGINE_ID_ENV)?;
        Ok(Self::new(api_key, engine_id))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn read_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{} is not set", name))),
    }
}
