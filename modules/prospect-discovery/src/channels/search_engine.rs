use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use prospect_common::{
    normalize_key, Candidate, CandidateMeta, ChannelKind, CompanyCandidate, ContactChannels,
    DiscoveryMeta,
};
use prospect_fetch::extract::{clean_company_name, first_sentence};
use prospect_fetch::ContentFetcher;
use serper_client::SearchHit;

use super::hosts::is_excluded_host;
use super::{ChannelConfig, DiscoverInput, DiscoverOutcome, DiscoveryChannel};
use crate::scoring::{analyze, AnalysisConfig};
use crate::traits::WebSearcher;

/// Cap on simultaneous content fetches for one query's results. The only
/// intra-run parallelism; kept small out of courtesy to target sites and
/// search quota.
const MAX_CONCURRENT_FETCHES: usize = 3;

/// Queries an external search API, filters out hosts that are never a
/// prospect's own site, and converts the survivors to company candidates
/// either by scraping and scoring each page or by a lightweight
/// title/snippet conversion.
pub struct SearchEngineChannel {
    searcher: Arc<dyn WebSearcher>,
    fetcher: Arc<dyn ContentFetcher>,
}

impl SearchEngineChannel {
    pub fn new(searcher: Arc<dyn WebSearcher>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { searcher, fetcher }
    }

    /// Convert a search hit without touching the page: best-effort name
    /// from the result title, falling back to the snippet's first
    /// sentence, falling back to the host.
    fn lightweight_candidate(query: &str, hit: &SearchHit) -> Candidate {
        let name = clean_company_name(&hit.title)
            .or_else(|| first_sentence(&hit.snippet))
            .unwrap_or_else(|| prospect_common::extract_host(&hit.url));

        let mut discovery = DiscoveryMeta::new(ChannelKind::SearchEngine, Some(query.to_string()));
        discovery.extra = CandidateMeta::Search {
            title: hit.title.clone(),
            snippet: hit.snippet.clone(),
        };

        Candidate::Company(CompanyCandidate {
            name,
            website: Some(hit.url.clone()),
            industry: None,
            country: None,
            services: Vec::new(),
            industries_served: Vec::new(),
            locations: Vec::new(),
            contact: None,
            discovery,
        })
    }

    /// Fetch and score one query's surviving hits under the fetch
    /// semaphore, keeping only candidates whose relevance verdict passes.
    async fn scrape_and_score(
        &self,
        query: &str,
        hits: Vec<SearchHit>,
        analysis: &AnalysisConfig,
    ) -> Vec<Candidate> {
        let scored = stream::iter(hits)
            .map(|hit| {
                let fetcher = Arc::clone(&self.fetcher);
                async move {
                    let content = fetcher.fetch(&hit.url).await;
                    (hit, content)
                }
            })
            .buffered(MAX_CONCURRENT_FETCHES)
            .collect::<Vec<_>>()
            .await;

        let mut candidates = Vec::new();
        for (hit, content) in scored {
            let relevance = analyze(&content, analysis);
            if !relevance.relevant {
                info!(
                    url = hit.url.as_str(),
                    score = relevance.score,
                    "Dropped irrelevant result"
                );
                continue;
            }

            let name = content
                .company_name
                .clone()
                .or_else(|| content.title.as_deref().and_then(clean_company_name))
                .unwrap_or_else(|| prospect_common::extract_host(&hit.url));

            let contact = if content.contact.email.is_some() || content.contact.phone.is_some() {
                Some(ContactChannels {
                    email: content.contact.email.clone(),
                    phone: content.contact.phone.clone(),
                })
            } else {
                None
            };

            let mut discovery =
                DiscoveryMeta::new(ChannelKind::SearchEngine, Some(query.to_string()));
            discovery.extra = CandidateMeta::Scored {
                relevance: relevance.clone(),
            };

            candidates.push(Candidate::Company(CompanyCandidate {
                name,
                website: Some(hit.url.clone()),
                industry: relevance.detected_industry.clone(),
                country: None,
                services: content.services.clone(),
                industries_served: Vec::new(),
                locations: Vec::new(),
                contact,
                discovery,
            }));
        }
        candidates
    }

    /// Drop repeat websites from this channel's own output, keeping the
    /// first occurrence. Case-insensitive exact match.
    fn dedupe_by_website(candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let key = match &candidate {
                Candidate::Company(c) => c
                    .website
                    .as_deref()
                    .map(normalize_key)
                    .unwrap_or_else(|| normalize_key(&c.name)),
                Candidate::Contact(c) => c
                    .email
                    .as_deref()
                    .map(normalize_key)
                    .or_else(|| c.display_name().map(|n| normalize_key(&n)))
                    .unwrap_or_default(),
                Candidate::Lead(_) => String::new(),
            };
            if key.is_empty() || seen.insert(key) {
                out.push(candidate);
            }
        }
        out
    }
}

#[async_trait]
impl DiscoveryChannel for SearchEngineChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::SearchEngine
    }

    fn is_enabled(&self, config: &ChannelConfig) -> bool {
        config.enabled && self.searcher.is_configured()
    }

    async fn discover(&self, input: &DiscoverInput) -> Result<DiscoverOutcome> {
        let mut results = Vec::new();
        let mut errors = Vec::new();
        let mut attempted = 0u32;

        for query in &input.criteria.queries {
            if input.cancel.is_cancelled() {
                info!(query, "Cancellation requested, stopping before next query");
                break;
            }
            attempted += 1;

            let hits = match self
                .searcher
                .search(query, input.config.max_results_per_query)
                .await
            {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(query, error = %e, "Search query failed");
                    errors.push(format!("{query}: {e}"));
                    continue;
                }
            };

            let survivors: Vec<SearchHit> = hits
                .into_iter()
                .filter(|h| !h.url.is_empty() && !is_excluded_host(&h.url))
                .collect();

            info!(query, kept = survivors.len(), "Search results filtered");

            match &input.config.analysis {
                Some(analysis) => {
                    results.extend(self.scrape_and_score(query, survivors, analysis).await);
                }
                None => {
                    results.extend(
                        survivors
                            .iter()
                            .map(|hit| Self::lightweight_candidate(query, hit)),
                    );
                }
            }
        }

        let results = Self::dedupe_by_website(results);

        // Every attempted query failing with nothing to show is the hard
        // configuration/availability failure; partial failure is not.
        let hard_failure =
            attempted > 0 && errors.len() as u32 == attempted && results.is_empty();

        Ok(DiscoverOutcome {
            success: !hard_failure,
            error: if errors.is_empty() {
                None
            } else {
                Some(errors.join("; "))
            },
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{content_page, MockFetcher, MockSearcher};
    use prospect_common::RelevanceScore;

    fn hit(url: &str, title: &str, snippet: &str) -> SearchHit {
        SearchHit {
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
        }
    }

    fn input(queries: &[&str], analysis: Option<AnalysisConfig>) -> DiscoverInput {
        DiscoverInput {
            config: ChannelConfig {
                enabled: true,
                max_results_per_query: 10,
                analysis,
            },
            criteria: SearchCriteria {
                queries: queries.iter().map(|q| q.to_string()).collect(),
            },
            cancel: CancelToken::new(),
        }
    }

    use super::super::SearchCriteria;
    use crate::cancel::CancelToken;

    #[tokio::test]
    async fn lightweight_conversion_cleans_titles() {
        let searcher = MockSearcher::new().on_search(
            "web design Botswana",
            vec![
                hit(
                    "https://acme.co.bw",
                    "Acme Studios - Web Design in Gaborone",
                    "Award-winning agency.",
                ),
                hit("https://www.facebook.com/acme", "Acme | Facebook", ""),
            ],
        );
        let channel =
            SearchEngineChannel::new(Arc::new(searcher), Arc::new(MockFetcher::new()));

        let out = channel
            .discover(&input(&["web design Botswana"], None))
            .await
            .unwrap();

        assert!(out.success);
        assert_eq!(out.results.len(), 1);
        match &out.results[0] {
            Candidate::Company(c) => {
                assert_eq!(c.name, "Acme Studios");
                assert_eq!(c.website.as_deref(), Some("https://acme.co.bw"));
            }
            other => panic!("expected company, got {}", other.type_label()),
        }
    }

    #[tokio::test]
    async fn scraping_keeps_only_passing_candidates() {
        let searcher = MockSearcher::new().on_search(
            "agencies",
            vec![
                hit("https://good.example", "Good Agency", ""),
                hit("https://bad.example", "Bad", ""),
            ],
        );
        let fetcher = MockFetcher::new()
            .on_page(
                "https://good.example",
                content_page("Good Agency", "A digital marketing agency offering web design and seo services to clients across South Africa."),
            )
            .on_page("https://bad.example", content_page("Bad", "unrelated text"));

        let analysis = AnalysisConfig {
            positive_keywords: vec!["web design".into(), "seo".into(), "marketing".into()],
            negative_keywords: vec![],
            target_business_types: vec!["digital marketing agency".into()],
            threshold: 25,
            priority_regions: vec![],
        };

        let channel = SearchEngineChannel::new(Arc::new(searcher), Arc::new(fetcher));
        let out = channel
            .discover(&input(&["agencies"], Some(analysis)))
            .await
            .unwrap();

        assert_eq!(out.results.len(), 1);
        match &out.results[0] {
            Candidate::Company(c) => {
                assert_eq!(c.website.as_deref(), Some("https://good.example"));
                match &c.discovery.extra {
                    CandidateMeta::Scored { relevance } => assert!(relevance.relevant),
                    _ => panic!("expected scored metadata"),
                }
            }
            other => panic!("expected company, got {}", other.type_label()),
        }
    }

    #[tokio::test]
    async fn partial_query_failure_keeps_earlier_results() {
        let searcher = MockSearcher::new()
            .on_search(
                "first",
                vec![
                    hit("https://a.example", "A Co", ""),
                    hit("https://b.example", "B Co", ""),
                    hit("https://c.example", "C Co", ""),
                ],
            )
            .failing("second");
        let channel =
            SearchEngineChannel::new(Arc::new(searcher), Arc::new(MockFetcher::new()));

        let out = channel
            .discover(&input(&["first", "second"], None))
            .await
            .unwrap();

        assert!(out.success, "partial failure is not a hard failure");
        assert_eq!(out.results.len(), 3);
        assert!(out.error.as_deref().unwrap().contains("second"));
    }

    #[tokio::test]
    async fn all_queries_failing_is_a_hard_failure() {
        let searcher = MockSearcher::new().failing("only");
        let channel =
            SearchEngineChannel::new(Arc::new(searcher), Arc::new(MockFetcher::new()));

        let out = channel.discover(&input(&["only"], None)).await.unwrap();
        assert!(!out.success);
        assert!(out.results.is_empty());
        assert!(out.error.is_some());
    }

    #[tokio::test]
    async fn own_output_is_deduplicated_by_website() {
        let searcher = MockSearcher::new()
            .on_search("q1", vec![hit("https://acme.example", "Acme", "")])
            .on_search("q2", vec![hit("HTTPS://ACME.EXAMPLE", "Acme Again", "")]);
        let channel =
            SearchEngineChannel::new(Arc::new(searcher), Arc::new(MockFetcher::new()));

        let out = channel.discover(&input(&["q1", "q2"], None)).await.unwrap();
        assert_eq!(out.results.len(), 1);
    }

    #[tokio::test]
    async fn cancellation_stops_between_queries() {
        let searcher = MockSearcher::new()
            .on_search("first", vec![hit("https://a.example", "A", "")])
            .on_search("second", vec![hit("https://b.example", "B", "")]);
        let channel =
            SearchEngineChannel::new(Arc::new(searcher), Arc::new(MockFetcher::new()));

        let mut inp = input(&["first", "second"], None);
        inp.cancel = CancelToken::new();
        inp.cancel.cancel();

        let out = channel.discover(&inp).await.unwrap();
        assert!(out.results.is_empty());
        assert!(out.success);
    }

    #[test]
    fn disabled_when_searcher_lacks_credentials() {
        let channel = SearchEngineChannel::new(
            Arc::new(MockSearcher::new().unconfigured()),
            Arc::new(MockFetcher::new()),
        );
        assert!(!channel.is_enabled(&ChannelConfig::default()));
    }

    #[test]
    fn unreachable_page_scores_zero() {
        let analysis = AnalysisConfig {
            positive_keywords: vec!["anything".into()],
            negative_keywords: vec![],
            target_business_types: vec![],
            threshold: 40,
            priority_regions: vec![],
        };
        let content = prospect_fetch::FetchedContent::failed("https://x.example", "timeout");
        let score: RelevanceScore = analyze(&content, &analysis);
        assert_eq!(score.score, 0);
        assert!(!score.relevant);
    }
}
