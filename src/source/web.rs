//! Search-backed idea source with bounded fetches and catalog fallback.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::Error;

use super::fallback::FallbackCatalog;
use super::types::Hypothesis;
use super::{IdeaSource, SearchProvider};

/// Provenance string for search-derived hypotheses.
pub const WEB_INFO: &str = "Web-sourced from Google Search";

/// Turns provider titles into hypotheses. Transport failures, timeouts and
/// empty result sets are absorbed by the fallback catalog.
pub struct WebIdeaSource<P: SearchProvider> {
    provider: P,
    fallback: FallbackCatalog,
    timeout: Duration,
}

impl<P: SearchProvider> WebIdeaSource<P> {
    pub fn new(provider: P, fallback: FallbackCatalog) -> Self {
        Self {
            provider,
            fallback,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl<P: SearchProvider> IdeaSource for WebIdeaSource<P> {
    async fn fetch(&self, query: &str) -> Hypothesis {
        let outcome = match tokio::time::timeout(self.timeout, self.provider.search(query)).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(self.timeout.as_millis() as u64)),
        };

        match outcome {
            Ok(mut titles) if !titles.is_empty() => {
                let idea = titles.remove(0);
                debug!(provider = self.provider.name(), %idea, "Search returned idea");
                Hypothesis::new(idea, WEB_INFO).with_alt_ideas(titles)
            }
            Ok(_) => {
                warn!(provider = self.provider.name(), query, "Search returned no results, using fallback");
                self.fallback.pick()
            }
            Err(err) => {
                warn!(provider = self.provider.name(), query, error = %err, "Search failed, using fallback");
                self.fallback.pick()
            }
        }
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}
