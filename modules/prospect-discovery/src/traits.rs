use anyhow::Result;
use async_trait::async_trait;

use serper_client::{SearchHit, SerperClient};

/// A web search provider. The engine only ever sees this seam, so tests
/// and alternative providers can slot in without touching channel logic.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Whether the provider has the credentials it needs. Gates the
    /// search-engine channel's enablement.
    fn is_configured(&self) -> bool;

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

#[async_trait]
impl WebSearcher for SerperClient {
    fn is_configured(&self) -> bool {
        self.has_key()
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.search(query, max_results)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))
    }
}
