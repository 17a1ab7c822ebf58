use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use prospect_common::{CandidateMeta, ChannelKind};

use super::{ChannelConfig, DiscoverInput, DiscoverOutcome, DiscoveryChannel, SearchEngineChannel};

/// Expands raw keyword terms into search queries by delegating to the
/// search-engine channel, then relabels provenance so downstream
/// consumers see `keyword` as the source. The original channel and query
/// survive in the candidate's metadata.
pub struct KeywordChannel {
    inner: SearchEngineChannel,
}

impl KeywordChannel {
    pub fn new(inner: SearchEngineChannel) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DiscoveryChannel for KeywordChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Keyword
    }

    fn is_enabled(&self, config: &ChannelConfig) -> bool {
        self.inner.is_enabled(config)
    }

    async fn discover(&self, input: &DiscoverInput) -> Result<DiscoverOutcome> {
        if !self.inner.is_enabled(&input.config) {
            return Ok(DiscoverOutcome {
                results: Vec::new(),
                success: false,
                error: Some(
                    "Keyword expansion requires the search-engine channel, which is not configured"
                        .to_string(),
                ),
            });
        }

        // Keywords pass through as query strings unchanged.
        let mut outcome = self.inner.discover(input).await?;

        for candidate in &mut outcome.results {
            let discovery = candidate.discovery_mut();
            let upstream = std::mem::replace(&mut discovery.extra, CandidateMeta::None);
            discovery.extra = CandidateMeta::Keyword {
                upstream_source: discovery.source,
                upstream_query: discovery.query.clone(),
                upstream: Box::new(upstream),
            };
            discovery.source = ChannelKind::Keyword;
        }

        info!(results = outcome.results.len(), "Keyword channel relabeled provenance");
        Ok(outcome)
    }
}
