use crate::config::BackendConfig;
use anyhow::{bail, Context, Result};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tm_filter::{SearchRequest, SearchResponse};
use tracing::debug;

pub const COMBINED_SEARCH_PATH: &str = "/api/combined_search";

/// Client for the trademark search backend.
///
/// Searches are last-write-wins: every call takes a ticket, and a response that arrives
/// after a newer call was started is dropped. Clones share the ticket counter.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    endpoint: String,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("endpoint", &self.endpoint)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl SearchClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            generation: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Start a new search generation, superseding every earlier ticket.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Run a search. `Ok(None)` means a newer search started while this one was in flight.
    pub async fn search(&self, request: &SearchRequest) -> Result<Option<SearchResponse>> {
        let ticket = self.begin();
        self.send(ticket, request).await
    }

    pub async fn send(
        &self,
        ticket: u64,
        request: &SearchRequest,
    ) -> Result<Option<SearchResponse>> {
        let outcome = self.post(request).await;
        if !self.is_current(ticket) {
            debug!(ticket, "Dropping superseded search response");
            return Ok(None);
        }
        outcome.map(Some)
    }

    async fn post(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let url = format!("{}{}", self.endpoint, COMBINED_SEARCH_PATH);
        debug!(
            %url,
            page = request.page,
            per_page = request.per_page,
            conditions = request.filter_tree.len(),
            "Submitting search"
        );
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to POST {}", COMBINED_SEARCH_PATH))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            bail!("HTTP {} for POST {}: {}", status, COMBINED_SEARCH_PATH, body);
        }

        serde_json::from_str(&body).with_context(|| {
            format!(
                "Failed to deserialize response from POST {}: {}",
                COMBINED_SEARCH_PATH, body
            )
        })
    }
}
