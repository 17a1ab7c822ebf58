//! Content relevance scoring: five independent, additive, capped
//! dimensions summed and clamped to 0-100.

use prospect_common::{Confidence, RelevanceScore, ResolvedIntent, ScoreBreakdown};
use prospect_fetch::FetchedContent;

use super::industry::detect_industry;

const KEYWORD_POINTS: i32 = 5;
const KEYWORD_CAP: i32 = 30;
const NEGATIVE_KEYWORD_PENALTY: i32 = 10;

const SERVICE_PHRASE_POINTS: u32 = 3;
const SERVICE_BUSINESS_TYPE_POINTS: u32 = 5;
const SERVICE_CAP: u32 = 25;

const TITLE_NOUN_POINTS: u32 = 15;
const BUSINESS_TYPE_POINTS: u32 = 5;
const ABOUT_PAGE_POINTS: u32 = 3;
const BUSINESS_TYPE_CAP: u32 = 30;

const QUALITY_CAP: u32 = 15;

const REGION_POINTS: u32 = 5;
const GEOGRAPHY_CAP: u32 = 15;

/// Generic service language that signals an actual service business
/// rather than a news article or directory page.
const SERVICE_PHRASES: &[&str] = &[
    "we offer",
    "our services",
    "we provide",
    "we specialise",
    "we specialize",
    "our solutions",
    "our clients",
];

/// Business-type nouns matched against the page title only; body
/// mentions are too noisy ("the agency said...").
const BUSINESS_TYPE_NOUNS: &[&str] = &[
    "agency",
    "studio",
    "consultancy",
    "consulting",
    "firm",
    "group",
    "solutions",
    "services",
];

const ABOUT_PHRASES: &[&str] = &["about us", "who we are", "our story", "our team"];

/// Body length above which a page counts as substantial content.
const SUBSTANTIAL_BODY_CHARS: usize = 2000;
const MODERATE_BODY_CHARS: usize = 500;

/// What an intent contributes to scoring.
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub target_business_types: Vec<String>,
    pub threshold: u32,
    pub priority_regions: Vec<String>,
}

impl AnalysisConfig {
    pub fn from_intent(resolved: &ResolvedIntent) -> Self {
        Self {
            positive_keywords: resolved.include_keywords.clone(),
            negative_keywords: resolved.exclude_keywords.clone(),
            target_business_types: resolved.target_business_types.clone(),
            threshold: resolved.relevance_threshold,
            priority_regions: resolved
                .geography
                .as_ref()
                .map(|g| g.priority_regions.clone())
                .unwrap_or_default(),
        }
    }
}

/// Score fetched content against an intent's configuration. Pure: same
/// inputs, same score.
pub fn analyze(content: &FetchedContent, config: &AnalysisConfig) -> RelevanceScore {
    let body = content.text.as_deref().map(str::trim).unwrap_or("");
    if !content.success || body.is_empty() {
        let reason = content
            .error
            .clone()
            .unwrap_or_else(|| "No text content extracted".to_string());
        return RelevanceScore::unreachable(config.threshold, reason);
    }

    let title = content.title.as_deref().unwrap_or("").to_lowercase();
    let description = content.description.as_deref().unwrap_or("").to_lowercase();
    let body_lower = body.to_lowercase();
    let haystack = format!("{title}\n{description}\n{body_lower}");

    let mut reasons = Vec::new();

    // --- Keywords ---
    let mut matched_keywords: Vec<&str> = Vec::new();
    for keyword in &config.positive_keywords {
        let k = keyword.to_lowercase();
        if !k.is_empty()
            && haystack.contains(&k)
            && !matched_keywords.iter().any(|m| m.eq_ignore_ascii_case(keyword))
        {
            matched_keywords.push(keyword.as_str());
        }
    }
    let mut keyword_score = (matched_keywords.len() as i32 * KEYWORD_POINTS).min(KEYWORD_CAP);
    if !matched_keywords.is_empty() {
        reasons.push(format!(
            "Matched {} keyword(s): {}",
            matched_keywords.len(),
            matched_keywords.join(", ")
        ));
    }
    for negative in &config.negative_keywords {
        let n = negative.to_lowercase();
        if !n.is_empty() && haystack.contains(&n) {
            keyword_score -= NEGATIVE_KEYWORD_PENALTY;
            reasons.push(format!("Negative keyword present: {negative}"));
        }
    }

    // --- Service language ---
    let mut service_score = 0u32;
    for phrase in SERVICE_PHRASES {
        if haystack.contains(phrase) {
            service_score += SERVICE_PHRASE_POINTS;
        }
    }
    let services_text = content.services.join("\n").to_lowercase();
    for business_type in &config.target_business_types {
        let b = business_type.to_lowercase();
        if !b.is_empty() && (services_text.contains(&b) || body_lower.contains(&b)) {
            service_score += SERVICE_BUSINESS_TYPE_POINTS;
            reasons.push(format!("Offers target service: {business_type}"));
        }
    }
    let service_score = service_score.min(SERVICE_CAP);

    // --- Business type ---
    let mut business_score = 0u32;
    if let Some(noun) = BUSINESS_TYPE_NOUNS.iter().find(|n| title.contains(*n)) {
        business_score += TITLE_NOUN_POINTS;
        reasons.push(format!("Business-type \"{noun}\" in page title"));
    }
    for business_type in &config.target_business_types {
        let b = business_type.to_lowercase();
        if !b.is_empty() && haystack.contains(&b) {
            business_score += BUSINESS_TYPE_POINTS;
        }
    }
    if ABOUT_PHRASES.iter().any(|p| haystack.contains(p)) {
        business_score += ABOUT_PAGE_POINTS;
    }
    let business_score = business_score.min(BUSINESS_TYPE_CAP);

    // --- Content quality ---
    let mut quality_score = 0u32;
    if content.company_name.is_some() {
        quality_score += 3;
    }
    if content.description.as_deref().map(str::len).unwrap_or(0) > 50 {
        quality_score += 3;
    }
    if content.contact.email.is_some() {
        quality_score += 2;
    }
    if content.contact.phone.is_some() {
        quality_score += 1;
    }
    if content.contact.address.is_some() {
        quality_score += 1;
    }
    quality_score += (content.social.count() as u32).min(3);
    if content.social.has_professional_profile() {
        quality_score += 2;
    }
    if body.len() > SUBSTANTIAL_BODY_CHARS {
        quality_score += 2;
    }
    let quality_score = quality_score.min(QUALITY_CAP);

    // --- Geography boost ---
    let mut geography_score = 0u32;
    if !config.priority_regions.is_empty() {
        let mut matched_regions = Vec::new();
        for region in &config.priority_regions {
            let r = region.to_lowercase();
            if !r.is_empty() && haystack.contains(&r) {
                geography_score += REGION_POINTS;
                matched_regions.push(region.as_str());
            }
        }
        geography_score = geography_score.min(GEOGRAPHY_CAP);
        if !matched_regions.is_empty() {
            reasons.push(format!("Priority region(s): {}", matched_regions.join(", ")));
        }
    }

    let breakdown = ScoreBreakdown {
        keyword: keyword_score,
        service: service_score,
        business_type: business_score,
        content_quality: quality_score,
        geography: geography_score,
    };
    let score = breakdown.total();

    // Confidence reflects how much real content the page held, not how
    // well it scored.
    let confidence = if body.len() > SUBSTANTIAL_BODY_CHARS && content.description.is_some() {
        Confidence::High
    } else if body.len() > MODERATE_BODY_CHARS {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    RelevanceScore {
        score,
        relevant: score >= config.threshold,
        threshold: config.threshold,
        breakdown,
        reasons,
        detected_industry: detect_industry(&haystack),
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospect_fetch::{ContactSignals, SocialLinks};

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            positive_keywords: vec!["web design".into(), "seo".into(), "ecommerce".into()],
            negative_keywords: vec!["vacancy".into()],
            target_business_types: vec!["web design agency".into()],
            threshold: 40,
            priority_regions: vec![],
        }
    }

    fn page(title: &str, body: &str) -> FetchedContent {
        FetchedContent {
            url: "https://acme.example".into(),
            success: true,
            title: Some(title.into()),
            description: Some("Full-service web design agency serving growing businesses.".into()),
            company_name: Some("Acme".into()),
            text: Some(body.into()),
            contact: ContactSignals::default(),
            social: SocialLinks::default(),
            services: vec![],
            error: None,
        }
    }

    #[test]
    fn failed_fetch_scores_exactly_zero() {
        let content = FetchedContent::failed("https://down.example", "connection refused");
        let score = analyze(&content, &config());
        assert_eq!(score.score, 0);
        assert!(!score.relevant);
        assert_eq!(score.confidence, Confidence::Low);
        assert_eq!(score.reasons, vec!["connection refused".to_string()]);
    }

    #[test]
    fn empty_body_degrades_like_a_failure() {
        let mut content = page("Acme", "");
        content.text = Some("   ".into());
        let score = analyze(&content, &config());
        assert_eq!(score.score, 0);
        assert!(!score.relevant);
    }

    #[test]
    fn relevant_page_passes_threshold() {
        let content = page(
            "Acme - Web Design Agency",
            "We offer web design, seo and ecommerce builds. Our services cover \
             everything a growing business needs. About us: we are a web design agency.",
        );
        let score = analyze(&content, &config());
        assert!(score.score <= 100);
        assert!(score.relevant, "expected pass, got {score:?}");
        assert_eq!(score.relevant, score.score >= score.threshold);
    }

    #[test]
    fn negative_keywords_drag_the_score_down() {
        let body = "We offer web design and seo. Current vacancy: designer.";
        let with_negative = analyze(&page("Acme Studio", body), &config());
        let without_negative = analyze(
            &page("Acme Studio", "We offer web design and seo."),
            &config(),
        );
        assert!(with_negative.score < without_negative.score);
        assert!(with_negative.breakdown.keyword < without_negative.breakdown.keyword);
    }

    #[test]
    fn geography_boost_requires_priority_regions() {
        let body = "Web design and seo for businesses in Gaborone and Francistown.";
        let mut cfg = config();
        let plain = analyze(&page("Acme Studio", body), &cfg);
        assert_eq!(plain.breakdown.geography, 0);

        cfg.priority_regions = vec!["Gaborone".into(), "Francistown".into(), "Maun".into()];
        let boosted = analyze(&page("Acme Studio", body), &cfg);
        assert_eq!(boosted.breakdown.geography, 10);
        assert!(boosted.score > plain.score);
    }

    #[test]
    fn geography_boost_is_capped() {
        let body = "Gaborone Francistown Maun Kasane Palapye";
        let mut cfg = config();
        cfg.priority_regions = vec![
            "Gaborone".into(),
            "Francistown".into(),
            "Maun".into(),
            "Kasane".into(),
            "Palapye".into(),
        ];
        let score = analyze(&page("Acme", body), &cfg);
        assert_eq!(score.breakdown.geography, GEOGRAPHY_CAP);
    }

    #[test]
    fn confidence_tracks_content_volume_not_score() {
        let thin = analyze(&page("Irrelevant", "short text"), &config());
        assert_eq!(thin.confidence, Confidence::Low);

        let long_body = "irrelevant filler ".repeat(200);
        let rich_but_irrelevant = analyze(&page("Irrelevant", &long_body), &config());
        assert_eq!(rich_but_irrelevant.confidence, Confidence::High);
        assert!(!rich_but_irrelevant.relevant);
    }

    #[test]
    fn content_quality_rewards_contact_signals() {
        let mut content = page("Acme Studio", "We offer web design.");
        let bare = analyze(&content, &config());

        content.contact = ContactSignals {
            email: Some("info@acme.example".into()),
            phone: Some("+267 391 0000".into()),
            address: Some("Plot 1234, Gaborone".into()),
        };
        content.social = SocialLinks {
            linkedin: Some("https://linkedin.com/company/acme".into()),
            facebook: Some("https://facebook.com/acme".into()),
            ..Default::default()
        };
        let rich = analyze(&content, &config());
        assert!(rich.breakdown.content_quality > bare.breakdown.content_quality);
        assert!(rich.breakdown.content_quality <= QUALITY_CAP);
    }

    #[test]
    fn score_never_exceeds_bounds() {
        let body = format!(
            "web design seo ecommerce we offer our services we provide about us \
             web design agency {}",
            "Gaborone ".repeat(50)
        );
        let mut cfg = config();
        cfg.priority_regions = vec!["Gaborone".into()];
        let mut content = page("Acme Web Design Agency & Studio", &body);
        content.contact.email = Some("info@acme.example".into());
        let score = analyze(&content, &cfg);
        assert!(score.score <= 100);
    }
}
