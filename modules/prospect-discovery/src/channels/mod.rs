pub mod gated;
pub mod hosts;
pub mod keyword;
pub mod search_engine;

pub use gated::GatedChannel;
pub use keyword::KeywordChannel;
pub use search_engine::SearchEngineChannel;

use anyhow::Result;
use async_trait::async_trait;

use prospect_common::{Candidate, ChannelKind};

use crate::cancel::CancelToken;
use crate::scoring::AnalysisConfig;

/// Resolved per-channel configuration handed to `discover`.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub enabled: bool,
    /// Result cap per individual search query.
    pub max_results_per_query: usize,
    /// When set, each surviving search result is fetched and scored and
    /// only passing candidates are kept. When absent, candidates are
    /// converted from the raw search result without scraping.
    pub analysis: Option<AnalysisConfig>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_results_per_query: 10,
            analysis: None,
        }
    }
}

/// One or more query strings for a channel to process, in order.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub queries: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DiscoverInput {
    pub config: ChannelConfig,
    pub criteria: SearchCriteria,
    /// Polled between queries; an in-flight fetch is never aborted.
    pub cancel: CancelToken,
}

/// Channel output. `success: false` marks a hard configuration or
/// availability failure, distinct from "ran and found nothing".
#[derive(Debug, Default)]
pub struct DiscoverOutcome {
    pub results: Vec<Candidate>,
    pub success: bool,
    pub error: Option<String>,
}

impl DiscoverOutcome {
    pub fn empty_ok() -> Self {
        Self {
            results: Vec::new(),
            success: true,
            error: None,
        }
    }
}

/// A named source of candidate records.
#[async_trait]
pub trait DiscoveryChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    fn is_enabled(&self, config: &ChannelConfig) -> bool;

    /// Returning `Err` is the "channel blew up" path; the aggregator
    /// catches it and carries on with the remaining channels.
    async fn discover(&self, input: &DiscoverInput) -> Result<DiscoverOutcome>;
}
