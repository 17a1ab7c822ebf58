use serde::{Deserialize, Serialize};

use crate::types::ChannelKind;

/// Placeholder substituted with each target country's display name during
/// intent resolution.
pub const COUNTRY_PLACEHOLDER: &str = "{country}";

/// Display names for the ISO country codes intents target. Unknown codes
/// fall back to the code itself at resolution time.
pub fn country_name(code: &str) -> Option<&'static str> {
    match code.to_uppercase().as_str() {
        "ZA" => Some("South Africa"),
        "BW" => Some("Botswana"),
        "NA" => Some("Namibia"),
        "ZW" => Some("Zimbabwe"),
        "MZ" => Some("Mozambique"),
        "LS" => Some("Lesotho"),
        "SZ" => Some("Eswatini"),
        "ZM" => Some("Zambia"),
        "KE" => Some("Kenya"),
        "NG" => Some("Nigeria"),
        "GH" => Some("Ghana"),
        "GB" => Some("United Kingdom"),
        "US" => Some("United States"),
        _ => None,
    }
}

/// Per-intent default limits. `None` defers to the hard defaults at
/// resolution time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentLimits {
    pub max_companies: Option<u32>,
    pub max_leads: Option<u32>,
    pub max_queries: Option<u32>,
    pub time_budget_secs: Option<u64>,
}

/// Geography bias: candidates matching priority regions earn a capped
/// score boost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographyConfig {
    pub primary_country: String,
    pub priority_regions: Vec<String>,
}

/// A named, reusable discovery template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub id: String,
    pub name: String,
    /// ISO country codes.
    pub countries: Vec<String>,
    /// Seed queries; may contain [`COUNTRY_PLACEHOLDER`].
    pub seed_queries: Vec<String>,
    pub include_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    /// Phrases naming the kind of business this intent hunts for
    /// (e.g. "web design agency"). Drive the relevance scorer.
    pub target_business_types: Vec<String>,
    pub channels: Vec<ChannelKind>,
    pub limits: IntentLimits,
    pub category: String,
    pub active: bool,
    pub geography: Option<GeographyConfig>,
    pub relevance_threshold: u32,
}

/// Caller-supplied overrides layered on top of an intent. Keyword lists
/// are additive; scalar fields replace.
#[derive(Debug, Clone, Default)]
pub struct IntentOverrides {
    pub countries: Option<Vec<String>>,
    pub include_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    pub channels: Option<Vec<ChannelKind>>,
    /// Explicit query list. Replaces seed-query expansion and additionally
    /// caps `max_queries` at its own length.
    pub queries: Option<Vec<String>>,
    pub max_companies: Option<u32>,
    pub max_leads: Option<u32>,
    pub max_queries: Option<u32>,
    pub time_budget_secs: Option<u64>,
    pub relevance_threshold: Option<u32>,
}

/// Fully concrete limits after override > intent > default resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLimits {
    pub max_companies: u32,
    pub max_leads: u32,
    pub max_queries: u32,
    pub time_budget_secs: u64,
}

/// The merge of an [`Intent`] with caller overrides: concrete countries,
/// fully substituted queries, merged keyword lists, resolved channels and
/// limits. Snapshotted into run statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedIntent {
    pub intent_id: String,
    pub intent_name: String,
    pub countries: Vec<String>,
    pub queries: Vec<String>,
    pub include_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    pub target_business_types: Vec<String>,
    pub channels: Vec<ChannelKind>,
    pub limits: ResolvedLimits,
    pub geography: Option<GeographyConfig>,
    pub relevance_threshold: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_names_cover_target_markets() {
        assert_eq!(country_name("ZA"), Some("South Africa"));
        assert_eq!(country_name("bw"), Some("Botswana"));
        assert_eq!(country_name("XX"), None);
    }
}
