//! Built-in discovery intent templates.

use prospect_common::{
    ChannelKind, GeographyConfig, Intent, IntentLimits, DEFAULT_RELEVANCE_THRESHOLD,
    LOW_SIGNAL_RELEVANCE_THRESHOLD,
};

pub const DEFAULT_INTENT_ID: &str = "digital-agencies";

/// Appended to every intent's excludes at catalog build time: job-board,
/// retail and listicle noise that no intent ever wants.
const GLOBAL_NEGATIVE_KEYWORDS: &[&str] = &[
    "vacancy",
    "vacancies",
    "job opening",
    "careers",
    "hiring now",
    "salary",
    "recruitment agency",
    "top 10",
    "best of",
    "buy online",
    "add to cart",
    "free shipping",
];

fn strs(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn with_global_negatives(mut intent: Intent) -> Intent {
    intent
        .exclude_keywords
        .extend(GLOBAL_NEGATIVE_KEYWORDS.iter().map(|s| s.to_string()));
    intent
}

/// Look up one intent template by id.
pub fn intent(id: &str) -> Option<Intent> {
    all_intents().into_iter().find(|i| i.id == id)
}

/// All templates, with global negatives applied.
pub fn all_intents() -> Vec<Intent> {
    vec![
        digital_agencies(),
        private_schools(),
        government_tenders(),
        accounting_firms(),
    ]
    .into_iter()
    .map(with_global_negatives)
    .collect()
}

fn digital_agencies() -> Intent {
    Intent {
        id: "digital-agencies".into(),
        name: "Digital & creative agencies".into(),
        countries: strs(&["ZA", "BW"]),
        seed_queries: strs(&[
            "web design agency {country}",
            "digital marketing agency {country}",
            "creative studio branding {country}",
        ]),
        include_keywords: strs(&[
            "web design",
            "web development",
            "seo",
            "digital marketing",
            "branding",
            "ecommerce",
            "social media management",
        ]),
        exclude_keywords: strs(&["course", "tutorial", "template marketplace"]),
        target_business_types: strs(&[
            "web design agency",
            "digital marketing agency",
            "creative studio",
        ]),
        channels: vec![ChannelKind::SearchEngine, ChannelKind::Keyword],
        limits: IntentLimits {
            max_companies: Some(20),
            max_leads: Some(20),
            max_queries: Some(5),
            time_budget_secs: Some(600),
        },
        category: "agencies".into(),
        active: true,
        geography: Some(GeographyConfig {
            primary_country: "ZA".into(),
            priority_regions: strs(&[
                "Johannesburg",
                "Pretoria",
                "Cape Town",
                "Durban",
                "Gauteng",
            ]),
        }),
        relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
    }
}

fn private_schools() -> Intent {
    Intent {
        id: "private-schools".into(),
        name: "Private schools & training providers".into(),
        countries: strs(&["ZA", "BW"]),
        seed_queries: strs(&[
            "schools {country}",
            "private schools {country}",
            "accredited training providers {country}",
        ]),
        include_keywords: strs(&[
            "school",
            "education",
            "curriculum",
            "admissions",
            "enrolment",
            "training",
        ]),
        exclude_keywords: strs(&["university ranking", "past exam papers"]),
        target_business_types: strs(&["private school", "training provider", "college"]),
        channels: vec![ChannelKind::SearchEngine, ChannelKind::Keyword],
        limits: IntentLimits {
            max_companies: Some(15),
            max_leads: Some(15),
            max_queries: Some(4),
            time_budget_secs: Some(600),
        },
        category: "education".into(),
        active: true,
        geography: None,
        relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
    }
}

fn government_tenders() -> Intent {
    Intent {
        id: "government-tenders".into(),
        name: "Government ICT tender publishers".into(),
        countries: strs(&["ZA"]),
        seed_queries: strs(&[
            "government ICT tenders {country}",
            "tender bulletin website development {country}",
        ]),
        include_keywords: strs(&[
            "tender",
            "procurement",
            "request for quotation",
            "bid notice",
            "supply chain",
        ]),
        exclude_keywords: strs(&["tender results archive"]),
        target_business_types: strs(&["tender bulletin", "procurement portal"]),
        channels: vec![ChannelKind::SearchEngine],
        limits: IntentLimits {
            max_companies: Some(10),
            max_leads: Some(10),
            max_queries: Some(3),
            time_budget_secs: Some(300),
        },
        category: "public-sector".into(),
        active: true,
        geography: None,
        // Tender pages carry little marketing copy, so the usual
        // threshold would reject nearly everything.
        relevance_threshold: LOW_SIGNAL_RELEVANCE_THRESHOLD,
    }
}

fn accounting_firms() -> Intent {
    Intent {
        id: "accounting-firms".into(),
        name: "Accounting & bookkeeping firms".into(),
        countries: strs(&["ZA", "BW", "NA"]),
        seed_queries: strs(&[
            "accounting firms {country}",
            "bookkeeping services {country}",
            "registered tax practitioners {country}",
        ]),
        include_keywords: strs(&[
            "accounting",
            "bookkeeping",
            "tax",
            "payroll",
            "audit",
            "financial statements",
        ]),
        exclude_keywords: strs(&["accounting software download"]),
        target_business_types: strs(&["accounting firm", "bookkeeping service"]),
        channels: vec![ChannelKind::SearchEngine, ChannelKind::Keyword],
        limits: IntentLimits {
            max_companies: Some(20),
            max_leads: Some(20),
            max_queries: Some(5),
            time_budget_secs: Some(600),
        },
        category: "professional-services".into(),
        active: true,
        geography: None,
        relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
    }
}
