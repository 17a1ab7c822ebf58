//! Test mocks for the discovery engine, one per trait boundary:
//! `MockSearcher` (WebSearcher), `MockFetcher` (ContentFetcher),
//! `MemorySink` / `FailingSink` (CandidateSink), plus candidate builders.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use prospect_common::{
    Candidate, ChannelKind, CompanyCandidate, ContactCandidate, DiscoveryMeta, LeadCandidate,
};
use prospect_fetch::{ContentFetcher, FetchedContent};
use serper_client::SearchHit;

use crate::sink::{candidate_identity, in_persist_order, CandidateSink, PersistFailure, PersistOutcome};
use crate::traits::WebSearcher;

// ---------------------------------------------------------------------------
// MockSearcher
// ---------------------------------------------------------------------------

/// HashMap-backed searcher. Unregistered queries return no hits; queries
/// registered via `failing` return an error.
pub struct MockSearcher {
    hits: HashMap<String, Vec<SearchHit>>,
    failing: HashSet<String>,
    configured: bool,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self {
            hits: HashMap::new(),
            failing: HashSet::new(),
            configured: true,
        }
    }

    pub fn on_search(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.hits.insert(query.to_string(), hits);
        self
    }

    pub fn failing(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    /// Simulate missing credentials: `is_configured` reports false.
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        if self.failing.contains(query) {
            bail!("MockSearcher: simulated failure for {query}");
        }
        Ok(self
            .hits
            .get(query)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(max_results)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// HashMap-backed content fetcher. Unregistered URLs report an in-band
/// fetch failure, matching the contract of never erroring out.
pub struct MockFetcher {
    pages: HashMap<String, FetchedContent>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    pub fn on_page(mut self, url: &str, content: FetchedContent) -> Self {
        self.pages.insert(url.to_string(), content);
        self
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchedContent {
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| FetchedContent::failed(url, "MockFetcher: no page registered"))
    }
}

/// A successful page with a title and body, enough for the scorer.
pub fn content_page(title: &str, body: &str) -> FetchedContent {
    FetchedContent {
        url: String::new(),
        success: true,
        title: Some(title.to_string()),
        description: None,
        company_name: Some(title.to_string()),
        text: Some(body.to_string()),
        contact: Default::default(),
        social: Default::default(),
        services: Vec::new(),
        error: None,
    }
}

// ---------------------------------------------------------------------------
// Candidate builders
// ---------------------------------------------------------------------------

pub fn company(name: &str, website: Option<&str>) -> Candidate {
    Candidate::Company(CompanyCandidate {
        name: name.to_string(),
        website: website.map(String::from),
        industry: None,
        country: None,
        services: Vec::new(),
        industries_served: Vec::new(),
        locations: Vec::new(),
        contact: None,
        discovery: DiscoveryMeta::new(ChannelKind::SearchEngine, None),
    })
}

pub fn contact(name: &str, email: Option<&str>) -> Candidate {
    Candidate::Contact(ContactCandidate {
        name: Some(name.to_string()),
        first_name: None,
        last_name: None,
        email: email.map(String::from),
        phone: None,
        role: None,
        profile_url: None,
        company_name: None,
        discovery: DiscoveryMeta::new(ChannelKind::SearchEngine, None),
    })
}

pub fn lead(contact_email: Option<&str>, company_site: Option<&str>) -> Candidate {
    let nested_contact = contact_email.map(|email| match contact("Lead Contact", Some(email)) {
        Candidate::Contact(c) => c,
        _ => unreachable!(),
    });
    let nested_company = company_site.map(|site| match company("Lead Company", Some(site)) {
        Candidate::Company(c) => c,
        _ => unreachable!(),
    });
    Candidate::Lead(LeadCandidate {
        company: nested_company,
        contact: nested_contact,
        discovery: DiscoveryMeta::new(ChannelKind::SearchEngine, None),
    })
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryState {
    identities: HashSet<String>,
    stored: Vec<Candidate>,
    persist_calls: u32,
}

/// Stateful in-memory sink honoring the idempotency and ordering
/// contract.
#[derive(Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored_count(&self) -> usize {
        self.state.lock().unwrap().stored.len()
    }

    pub fn persist_calls(&self) -> u32 {
        self.state.lock().unwrap().persist_calls
    }

    pub fn stored(&self) -> Vec<Candidate> {
        self.state.lock().unwrap().stored.clone()
    }
}

#[async_trait]
impl CandidateSink for MemorySink {
    async fn persist(&self, candidates: &[Candidate]) -> Result<PersistOutcome> {
        let mut state = self.state.lock().unwrap();
        state.persist_calls += 1;

        let mut outcome = PersistOutcome {
            success: true,
            ..Default::default()
        };

        for candidate in in_persist_order(candidates) {
            let identity = match candidate_identity(candidate) {
                Some(identity) => identity,
                None => {
                    outcome.errors.push(PersistFailure {
                        result_type: candidate.type_label().to_string(),
                        error: "No resolvable identity".to_string(),
                    });
                    continue;
                }
            };
            if !state.identities.insert(identity) {
                match candidate {
                    Candidate::Company(_) => outcome.companies_skipped += 1,
                    Candidate::Contact(_) => outcome.contacts_skipped += 1,
                    Candidate::Lead(_) => outcome.leads_skipped += 1,
                }
                continue;
            }
            state.stored.push(candidate.clone());
            match candidate {
                Candidate::Company(_) => outcome.companies_created += 1,
                Candidate::Contact(_) => outcome.contacts_created += 1,
                Candidate::Lead(_) => outcome.leads_created += 1,
            }
        }

        Ok(outcome)
    }
}

/// Always errors; exercises the fatal run path.
pub struct FailingSink;

#[async_trait]
impl CandidateSink for FailingSink {
    async fn persist(&self, _candidates: &[Candidate]) -> Result<PersistOutcome> {
        bail!("FailingSink: persistence unavailable")
    }
}
