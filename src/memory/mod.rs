//! Persistent research memory.
//!
//! The memory store keeps one best-known result per query in a SQLite table
//! and biases later runs toward high-scoring results:
//!
//! - **storage**: `(query, result, score)`, replaced on every store
//! - **cycle_log**: append-only history of every refinement cycle
//!
//! ## Example
//!
//! ```rust,ignore
//! use research_loop::memory::SqliteMemoryStore;
//!
//! let store = SqliteMemoryStore::open("memory.db")?;
//! store.store("urban energy solutions", "Smart grids", 8)?;
//!
//! let best = store.retrieve_top_results(1)?;
//! ```

mod schema;
mod store;
mod types;

pub use schema::{get_schema_version, initialize_schema, is_initialized, SCHEMA_VERSION};
pub use store::SqliteMemoryStore;
pub use types::{CycleEntry, MemoryRecord};
