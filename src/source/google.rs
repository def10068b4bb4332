//! Google Custom Search provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::{Error, Result};

use super::SearchProvider;

const PROVIDER: &str = "google";

/// Result titles from the Custom Search JSON API.
pub struct GoogleSearchProvider {
    config: SearchConfig,
    http: Client,
}

impl GoogleSearchProvider {
    const DEFAULT_BASE_URL: &'static str = "https://www.googleapis.com";

    pub fn new(config: SearchConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(Self::DEFAULT_BASE_URL)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: String,
}

/// Extract up to `max` titles from a response body.
fn parse_titles(body: &str, max: usize) -> Result<Vec<String>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| Error::source_unavailable(PROVIDER, format!("Failed to parse response: {}", e)))?;

    Ok(response
        .items
        .unwrap_or_default()
        .into_iter()
        .take(max)
        .map(|item| item.title)
        .collect())
}

#[async_trait]
impl SearchProvider for GoogleSearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let url = format!("{}/customsearch/v1", self.base_url());

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("key", self.config.api_key.as_str()),
                ("cx", self.config.engine_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::source_unavailable(PROVIDER, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::source_unavailable(PROVIDER, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::source_unavailable(
                PROVIDER,
                format!("Search API error ({})", status),
            ));
        }

        parse_titles(&body, self.config.max_results)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
