//! Runs the enabled channels for one discovery request, strictly
//! sequentially, and deduplicates the combined output. No single channel
//! failure aborts aggregation, and the aggregator itself never
//! propagates an error to its caller.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use prospect_common::{normalize_key, Candidate, ChannelKind, ChannelOutcomeStat};
use prospect_fetch::ContentFetcher;

use crate::cancel::CancelToken;
use crate::channels::{
    ChannelConfig, DiscoverInput, DiscoveryChannel, GatedChannel, KeywordChannel, SearchCriteria,
    SearchEngineChannel,
};
use crate::scoring::AnalysisConfig;
use crate::traits::WebSearcher;

#[derive(Debug, Clone)]
pub struct AggregationRequest {
    /// Channels to run, in order.
    pub channels: Vec<ChannelKind>,
    pub queries: Vec<String>,
    pub max_results_per_query: usize,
    /// When present, the search-engine channel scrapes and scores each
    /// result instead of the lightweight conversion.
    pub analysis: Option<AnalysisConfig>,
    pub cancel: CancelToken,
}

#[derive(Debug, Default)]
pub struct AggregationOutcome {
    pub results: Vec<Candidate>,
    pub channels: Vec<ChannelOutcomeStat>,
    pub total_before_dedupe: u32,
    pub total_after_dedupe: u32,
    pub success: bool,
    pub error: Option<String>,
}

impl AggregationOutcome {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            ..Default::default()
        }
    }
}

pub struct Aggregator {
    searcher: Arc<dyn WebSearcher>,
    fetcher: Arc<dyn ContentFetcher>,
}

impl Aggregator {
    pub fn new(searcher: Arc<dyn WebSearcher>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { searcher, fetcher }
    }

    /// Execute one discovery request. Infallible at the signature: any
    /// error escaping the control flow itself is converted into a
    /// `success: false` outcome with zero results.
    pub async fn execute(&self, request: &AggregationRequest) -> AggregationOutcome {
        match self.execute_inner(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Aggregation failed");
                AggregationOutcome::failure(e.to_string())
            }
        }
    }

    fn build_channel(&self, kind: ChannelKind) -> Box<dyn DiscoveryChannel> {
        match kind {
            ChannelKind::SearchEngine => Box::new(SearchEngineChannel::new(
                Arc::clone(&self.searcher),
                Arc::clone(&self.fetcher),
            )),
            ChannelKind::Keyword => Box::new(KeywordChannel::new(SearchEngineChannel::new(
                Arc::clone(&self.searcher),
                Arc::clone(&self.fetcher),
            ))),
            ChannelKind::ProfileMonitor => Box::new(GatedChannel::profile_monitor()),
            ChannelKind::SocialMonitor => Box::new(GatedChannel::social_monitor()),
        }
    }

    async fn execute_inner(&self, request: &AggregationRequest) -> Result<AggregationOutcome> {
        let mut all_results: Vec<Candidate> = Vec::new();
        let mut channel_stats: Vec<ChannelOutcomeStat> = Vec::new();

        // Channel N+1 does not start until channel N has returned.
        for kind in &request.channels {
            let channel = self.build_channel(*kind);
            let config = ChannelConfig {
                enabled: true,
                max_results_per_query: request.max_results_per_query,
                analysis: request.analysis.clone(),
            };

            if !channel.is_enabled(&config) {
                // The primary source being unavailable is a configuration
                // failure worth surfacing; gated channels are expected to
                // be off.
                let error = if *kind == ChannelKind::SearchEngine {
                    Some("Search provider not configured (missing API key)".to_string())
                } else {
                    None
                };
                info!(channel = %kind, "Channel disabled, skipping");
                channel_stats.push(ChannelOutcomeStat {
                    channel: *kind,
                    results: 0,
                    error,
                });
                continue;
            }

            let input = DiscoverInput {
                config,
                criteria: SearchCriteria {
                    queries: request.queries.clone(),
                },
                cancel: request.cancel.clone(),
            };

            match channel.discover(&input).await {
                Ok(outcome) => {
                    info!(
                        channel = %kind,
                        results = outcome.results.len(),
                        success = outcome.success,
                        "Channel completed"
                    );
                    channel_stats.push(ChannelOutcomeStat {
                        channel: *kind,
                        results: outcome.results.len() as u32,
                        error: outcome.error,
                    });
                    all_results.extend(outcome.results);
                }
                Err(e) => {
                    warn!(channel = %kind, error = %e, "Channel failed, continuing");
                    channel_stats.push(ChannelOutcomeStat {
                        channel: *kind,
                        results: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let total_before = all_results.len() as u32;
        let deduped = deduplicate(all_results);
        let total_after = deduped.len() as u32;

        if total_before != total_after {
            info!(
                before = total_before,
                after = total_after,
                "Cross-channel dedup dropped duplicates"
            );
        }

        Ok(AggregationOutcome {
            results: deduped,
            channels: channel_stats,
            total_before_dedupe: total_before,
            total_after_dedupe: total_after,
            success: true,
            error: None,
        })
    }
}

/// Cross-channel, exact-match dedup. Keys are type-specific; the first
/// occurrence wins, so output order is first-seen insertion order.
/// Candidates with no usable key are kept unconditionally rather than
/// risk dropping data.
pub fn deduplicate(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let key = match &candidate {
            Candidate::Company(company) => company
                .website
                .as_deref()
                .filter(|w| !w.trim().is_empty())
                .map(|w| format!("company:site:{}", normalize_key(w)))
                .or_else(|| Some(format!("company:name:{}", normalize_key(&company.name)))),
            Candidate::Contact(contact) => contact
                .email
                .as_deref()
                .filter(|e| !e.trim().is_empty())
                .map(|e| format!("contact:email:{}", normalize_key(e)))
                .or_else(|| {
                    contact
                        .display_name()
                        .map(|n| format!("contact:name:{}", normalize_key(&n)))
                }),
            Candidate::Lead(lead) => {
                let contact_email = lead
                    .contact
                    .as_ref()
                    .and_then(|c| c.email.as_deref())
                    .filter(|e| !e.trim().is_empty());
                let company_site = lead
                    .company
                    .as_ref()
                    .and_then(|c| c.website.as_deref())
                    .filter(|w| !w.trim().is_empty());
                match (contact_email, company_site) {
                    (Some(email), _) => Some(format!("lead:email:{}", normalize_key(email))),
                    (None, Some(site)) => Some(format!("lead:site:{}", normalize_key(site))),
                    (None, None) => None,
                }
            }
        };

        match key {
            Some(key) => {
                if seen.insert(key) {
                    out.push(candidate);
                }
            }
            None => out.push(candidate),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{company, contact, lead, MockFetcher, MockSearcher};
    use serper_client::SearchHit;

    #[test]
    fn dedup_is_idempotent() {
        let candidates = vec![
            company("Acme", Some("https://acme.example")),
            company("Acme Again", Some("https://ACME.example")),
            contact("Bob Refilwe", Some("bob@acme.example")),
            lead(None, None),
        ];
        let once = deduplicate(candidates);
        let once_len = once.len();
        let twice = deduplicate(once);
        assert_eq!(once_len, twice.len());
    }

    #[test]
    fn identical_normalized_websites_keep_exactly_one() {
        let candidates = vec![
            company("First", Some("https://acme.example")),
            company("Second", Some("  HTTPS://ACME.EXAMPLE  ")),
            company("Third", Some("https://acme.example")),
        ];
        let deduped = deduplicate(candidates);
        assert_eq!(deduped.len(), 1);
        match &deduped[0] {
            Candidate::Company(c) => assert_eq!(c.name, "First"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn scheme_and_trailing_slash_variants_survive() {
        // Normalization is lowercase+trim only; these stay distinct keys.
        let candidates = vec![
            company("A", Some("http://acme.example")),
            company("B", Some("https://acme.example")),
            company("C", Some("https://acme.example/")),
        ];
        assert_eq!(deduplicate(candidates).len(), 3);
    }

    #[test]
    fn companies_without_websites_fall_back_to_name() {
        let candidates = vec![
            company("Acme Digital", None),
            company("acme digital", None),
            company("Other Co", None),
        ];
        assert_eq!(deduplicate(candidates).len(), 2);
    }

    #[test]
    fn contacts_dedupe_by_email_then_name() {
        let candidates = vec![
            contact("Bob", Some("bob@acme.example")),
            contact("Robert", Some("BOB@acme.example")),
            contact("Alice", None),
            contact("alice", None),
        ];
        assert_eq!(deduplicate(candidates).len(), 2);
    }

    #[test]
    fn leads_without_keys_are_never_dropped() {
        let candidates = vec![lead(None, None), lead(None, None), lead(None, None)];
        assert_eq!(deduplicate(candidates).len(), 3);
    }

    #[test]
    fn leads_dedupe_by_contact_email_then_company_site() {
        let candidates = vec![
            lead(Some("info@acme.example"), Some("https://acme.example")),
            lead(Some("info@acme.example"), Some("https://other.example")),
            lead(None, Some("https://acme.example")),
            lead(None, Some("https://acme.example")),
        ];
        // First two share an email; last two share a site.
        assert_eq!(deduplicate(candidates).len(), 2);
    }

    #[tokio::test]
    async fn channels_run_in_caller_order_and_share_dedup() {
        let searcher = MockSearcher::new()
            .on_search(
                "q",
                vec![SearchHit {
                    url: "https://acme.example".into(),
                    title: "Acme".into(),
                    snippet: "".into(),
                }],
            );
        let aggregator = Aggregator::new(Arc::new(searcher), Arc::new(MockFetcher::new()));

        let outcome = aggregator
            .execute(&AggregationRequest {
                channels: vec![
                    ChannelKind::SocialMonitor,
                    ChannelKind::SearchEngine,
                    ChannelKind::Keyword,
                ],
                queries: vec!["q".into()],
                max_results_per_query: 5,
                analysis: None,
                cancel: CancelToken::new(),
            })
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.channels.len(), 3);
        assert_eq!(outcome.channels[0].channel, ChannelKind::SocialMonitor);
        assert_eq!(outcome.channels[0].results, 0);
        assert_eq!(outcome.channels[1].results, 1);
        // Search + keyword both found the same site; dedup keeps one.
        assert_eq!(outcome.total_before_dedupe, 2);
        assert_eq!(outcome.total_after_dedupe, 1);
    }

    #[tokio::test]
    async fn disabled_search_channel_gets_synthesized_error() {
        let aggregator = Aggregator::new(
            Arc::new(MockSearcher::new().unconfigured()),
            Arc::new(MockFetcher::new()),
        );

        let outcome = aggregator
            .execute(&AggregationRequest {
                channels: vec![ChannelKind::SearchEngine, ChannelKind::Keyword],
                queries: vec!["q".into()],
                max_results_per_query: 5,
                analysis: None,
                cancel: CancelToken::new(),
            })
            .await;

        assert!(outcome.success);
        assert!(outcome.results.is_empty());
        let search_stat = &outcome.channels[0];
        assert_eq!(search_stat.channel, ChannelKind::SearchEngine);
        assert!(search_stat.error.as_deref().unwrap().contains("not configured"));
        // The keyword channel reports zero without its own error entry.
        let keyword_stat = &outcome.channels[1];
        assert_eq!(keyword_stat.results, 0);
        assert!(keyword_stat.error.is_none());
    }

    #[tokio::test]
    async fn partial_channel_failure_keeps_other_results() {
        let searcher = MockSearcher::new()
            .on_search(
                "good",
                vec![
                    SearchHit {
                        url: "https://a.example".into(),
                        title: "A".into(),
                        snippet: "".into(),
                    },
                    SearchHit {
                        url: "https://b.example".into(),
                        title: "B".into(),
                        snippet: "".into(),
                    },
                    SearchHit {
                        url: "https://c.example".into(),
                        title: "C".into(),
                        snippet: "".into(),
                    },
                ],
            )
            .failing("times-out");
        let aggregator = Aggregator::new(Arc::new(searcher), Arc::new(MockFetcher::new()));

        let outcome = aggregator
            .execute(&AggregationRequest {
                channels: vec![ChannelKind::SearchEngine],
                queries: vec!["good".into(), "times-out".into()],
                max_results_per_query: 5,
                analysis: None,
                cancel: CancelToken::new(),
            })
            .await;

        assert_eq!(outcome.total_before_dedupe, 3);
        assert_eq!(outcome.results.len(), 3);
        assert!(outcome.channels[0].error.is_some());
    }
}
