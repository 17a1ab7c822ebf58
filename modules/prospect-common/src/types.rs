use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::score::RelevanceScore;

// --- Channels ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    SearchEngine,
    Keyword,
    ProfileMonitor,
    SocialMonitor,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelKind::SearchEngine => write!(f, "search_engine"),
            ChannelKind::Keyword => write!(f, "keyword"),
            ChannelKind::ProfileMonitor => write!(f, "profile_monitor"),
            ChannelKind::SocialMonitor => write!(f, "social_monitor"),
        }
    }
}

impl ChannelKind {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "search_engine" | "search" | "web_search" => Some(Self::SearchEngine),
            "keyword" | "keywords" => Some(Self::Keyword),
            "profile_monitor" | "profile" => Some(Self::ProfileMonitor),
            "social_monitor" | "social" => Some(Self::SocialMonitor),
            _ => None,
        }
    }
}

// --- Discovery provenance ---

/// Where and how a candidate was found. Attached to every company and
/// contact candidate; leads carry their own top-level copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryMeta {
    pub source: ChannelKind,
    pub discovered_at: DateTime<Utc>,
    /// The query or method string that surfaced this candidate.
    pub query: Option<String>,
    pub extra: CandidateMeta,
}

impl DiscoveryMeta {
    pub fn new(source: ChannelKind, query: Option<String>) -> Self {
        Self {
            source,
            discovered_at: Utc::now(),
            query,
            extra: CandidateMeta::None,
        }
    }
}

/// Typed per-producer metadata. Each known producer gets its own variant;
/// `Other` is the escape hatch for channel-specific payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateMeta {
    None,
    /// Raw search-result context when no scrape was performed.
    Search { title: String, snippet: String },
    /// Full scrape-and-score context.
    Scored { relevance: RelevanceScore },
    /// Keyword-channel relabel: the original provenance is preserved here.
    Keyword {
        upstream_source: ChannelKind,
        upstream_query: Option<String>,
        upstream: Box<CandidateMeta>,
    },
    Other { data: serde_json::Value },
}

// --- Candidate records ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactChannels {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyCandidate {
    pub name: String,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub industries_served: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,
    pub contact: Option<ContactChannels>,
    pub discovery: DiscoveryMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactCandidate {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub profile_url: Option<String>,
    pub company_name: Option<String>,
    pub discovery: DiscoveryMeta,
}

impl ContactCandidate {
    /// Best available display name: `name`, else "first last".
    pub fn display_name(&self) -> Option<String> {
        if let Some(n) = &self.name {
            if !n.trim().is_empty() {
                return Some(n.trim().to_string());
            }
        }
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => Some(format!("{} {}", f.trim(), l.trim())),
            (Some(f), None) => Some(f.trim().to_string()),
            (None, Some(l)) => Some(l.trim().to_string()),
            (None, None) => None,
        }
    }
}

/// A composite prospect: company and/or contact plus its own provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadCandidate {
    pub company: Option<CompanyCandidate>,
    pub contact: Option<ContactCandidate>,
    pub discovery: DiscoveryMeta,
}

/// The unit the discovery pipeline produces. The variant tag determines
/// which fields are meaningful; variants never mix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Candidate {
    Company(CompanyCandidate),
    Contact(ContactCandidate),
    Lead(LeadCandidate),
}

impl Candidate {
    pub fn discovery(&self) -> &DiscoveryMeta {
        match self {
            Candidate::Company(c) => &c.discovery,
            Candidate::Contact(c) => &c.discovery,
            Candidate::Lead(l) => &l.discovery,
        }
    }

    pub fn discovery_mut(&mut self) -> &mut DiscoveryMeta {
        match self {
            Candidate::Company(c) => &mut c.discovery,
            Candidate::Contact(c) => &mut c.discovery,
            Candidate::Lead(l) => &mut l.discovery,
        }
    }

    pub fn type_label(&self) -> &'static str {
        match self {
            Candidate::Company(_) => "company",
            Candidate::Contact(_) => "contact",
            Candidate::Lead(_) => "lead",
        }
    }
}

// --- Normalization helpers ---

/// Normalize a dedup key: lowercase + trim. Scheme and trailing slashes
/// are deliberately left intact, so `http://x` and `https://x/` remain
/// distinct keys.
pub fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Extract the host from a URL (e.g. "https://www.example.com/p" ->
/// "www.example.com").
pub fn extract_host(url: &str) -> String {
    url.split("://")
        .nth(1)
        .unwrap_or(url)
        .split('/')
        .next()
        .unwrap_or("")
        .split('?')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> DiscoveryMeta {
        DiscoveryMeta::new(ChannelKind::SearchEngine, Some("schools Botswana".into()))
    }

    #[test]
    fn contact_display_name_prefers_full_name() {
        let c = ContactCandidate {
            name: Some("Thabo Mokoena".into()),
            first_name: Some("T".into()),
            last_name: Some("M".into()),
            email: None,
            phone: None,
            role: None,
            profile_url: None,
            company_name: None,
            discovery: meta(),
        };
        assert_eq!(c.display_name().as_deref(), Some("Thabo Mokoena"));
    }

    #[test]
    fn contact_display_name_falls_back_to_parts() {
        let c = ContactCandidate {
            name: None,
            first_name: Some("Naledi".into()),
            last_name: Some("Dlamini".into()),
            email: None,
            phone: None,
            role: None,
            profile_url: None,
            company_name: None,
            discovery: meta(),
        };
        assert_eq!(c.display_name().as_deref(), Some("Naledi Dlamini"));
    }

    #[test]
    fn candidate_serializes_with_type_tag() {
        let c = Candidate::Company(CompanyCandidate {
            name: "Acme Digital".into(),
            website: Some("https://acme.example".into()),
            industry: None,
            country: Some("ZA".into()),
            services: vec![],
            industries_served: vec![],
            locations: vec![],
            contact: None,
            discovery: meta(),
        });
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "company");
        assert_eq!(json["name"], "Acme Digital");
    }

    #[test]
    fn channel_kind_round_trips_loose() {
        for kind in [
            ChannelKind::SearchEngine,
            ChannelKind::Keyword,
            ChannelKind::ProfileMonitor,
            ChannelKind::SocialMonitor,
        ] {
            assert_eq!(ChannelKind::from_str_loose(&kind.to_string()), Some(kind));
        }
        assert_eq!(ChannelKind::from_str_loose("nope"), None);
    }

    #[test]
    fn normalize_key_keeps_scheme_and_slash() {
        assert_eq!(normalize_key("  HTTPS://Acme.example/ "), "https://acme.example/");
        assert_ne!(normalize_key("http://acme.example"), normalize_key("https://acme.example"));
        assert_ne!(
            normalize_key("https://acme.example"),
            normalize_key("https://acme.example/")
        );
    }

    #[test]
    fn extract_host_strips_path_and_query() {
        assert_eq!(extract_host("https://www.Example.com/a/b?q=1"), "www.example.com");
        assert_eq!(extract_host("example.com/x"), "example.com");
    }
}
