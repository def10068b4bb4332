//! # research-loop
//!
//! An iterative research-idea refinement loop. A query is turned into a
//! candidate idea, scored for relevance with TF-IDF cosine similarity, evolved
//! toward a higher score, and persisted in a memory store that biases later
//! runs toward previously high-scoring results.
//!
//! ## Core Components
//!
//! - **Memory**: SQLite table of best-known results per query
//! - **Source**: idea sources with search-provider fallback
//! - **Agents**: reflection, ranking, evolution, review and proximity
//! - **Orchestrator**: the fixed-cycle refinement loop
//! - **Trajectory**: observable progress events
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use research_loop::{
//!     FallbackCatalog, LoopConfig, OfflineIdeaSource, Orchestrator, RandomIncrement,
//!     SqliteMemoryStore,
//! };
//!
//! let memory = SqliteMemoryStore::open("memory.db")?;
//! let orchestrator = Orchestrator::new(
//!     LoopConfig::default(),
//!     memory,
//!     Arc::new(OfflineIdeaSource::new(FallbackCatalog::seeded(7))),
//!     Arc::new(RandomIncrement::seeded(7)),
//! );
//!
//! let report = orchestrator.execute("urban energy solutions").await?;
//! println!("{} - Score: {}/10", report.final_idea, report.final_score);
//! ```

pub mod agents;
pub mod config;
pub mod error;
pub mod memory;
pub mod orchestrator;
pub mod random;
pub mod similarity;
pub mod source;
pub mod trajectory;

// Re-exports for convenience
pub use agents::{
    Evolution, Evolver, ProximityAdvisor, ProximitySuggestion, Ranking, Reflector, Review,
    ReviewClassifier, ReviewTier, SimilarityRanker, MAX_SCORE, MIN_SCORE,
};
pub use config::{LoopConfig, SearchConfig, DEFAULT_CYCLES};
pub use error::{Error, Result};
pub use memory::{CycleEntry, MemoryRecord, SqliteMemoryStore};
pub use orchestrator::{CycleReport, Orchestrator, RunReport};
pub use random::{FixedIncrement, IncrementSource, RandomIncrement, INCREMENT_RANGE};
pub use similarity::{cosine_similarity, tokenize, TfIdfMatrix};
pub use source::{
    FallbackCatalog, GoogleSearchProvider, Hypothesis, IdeaSource, OfflineIdeaSource,
    SearchProvider, WebIdeaSource, FALLBACK_IDEAS,
};
pub use trajectory::{
    BroadcastEmitter, CollectingEmitter, EventEmitter, NullEmitter, RunEvent, RunEventType,
};
