//! Listing page fetching

use crate::error::{FreewatchError, FreewatchResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Source of raw listing page HTML
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the page body at `url`
    async fn fetch(&self, url: &str) -> FreewatchResult<String>;
}

/// Blocking HTTP client run on tokio's blocking pool
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();

        Self {
            agent: config.into(),
            user_agent: user_agent.into(),
        }
    }

    fn fetch_blocking(&self, url: &str) -> FreewatchResult<String> {
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(|e| FreewatchError::fetch(url, e))?;

        debug!("GET {} -> {}", url, response.status());

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| FreewatchError::fetch(url, e))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FreewatchResult<String> {
        let fetcher = self.clone();
        let target = url.to_string();

        tokio::task::spawn_blocking(move || fetcher.fetch_blocking(&target))
            .await
            .map_err(|e| FreewatchError::Internal(format!("fetch task failed: {}", e)))?
    }
}
