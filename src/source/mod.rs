//! Idea sources: where candidate hypotheses come from.
//!
//! An [`IdeaSource`] turns a text query into a [`Hypothesis`] and never fails.
//! The web-backed source asks a [`SearchProvider`] for result titles and falls
//! back to a fixed candidate set on any transport, parse or timeout failure.
//!
//! ## Example
//!
//! ```rust,ignore
//! use research_loop::source::{FallbackCatalog, GoogleSearchProvider, WebIdeaSource};
//! use research_loop::SearchConfig;
//!
//! let provider = GoogleSearchProvider::new(SearchConfig::from_env()?)?;
//! let source = WebIdeaSource::new(provider, FallbackCatalog::seeded(7));
//!
//! let hypothesis = source.fetch("urban energy solutions").await;
//! ```

mod fallback;
mod google;
mod types;
mod web;

use async_trait::async_trait;

use crate::error::Result;

pub use fallback::{FallbackCatalog, OfflineIdeaSource, FALLBACK_IDEAS};
pub use google::GoogleSearchProvider;
pub use types::Hypothesis;
pub use web::{WebIdeaSource, WEB_INFO};

/// Produces candidate ideas for a query.
#[async_trait]
pub trait IdeaSource: Send + Sync {
    /// Fetch a hypothesis for `query`. Implementations recover their own failures.
    async fn fetch(&self, query: &str) -> Hypothesis;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// Raw search backend returning result titles, best first.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<String>>;

    fn name(&self) -> &str;
}
