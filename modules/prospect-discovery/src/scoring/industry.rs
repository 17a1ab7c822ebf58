//! Keyword-table industry detection, independent of relevance scoring.

/// Fixed table, iterated in declaration order. On a hit-count tie the
/// earlier entry wins, so detection stays deterministic.
const INDUSTRY_KEYWORDS: &[(&str, &[&str])] = &[
    ("technology", &["software", "app development", "it services", "saas", "cloud", "digital"]),
    ("marketing", &["marketing", "advertising", "seo", "branding", "social media", "campaigns"]),
    ("construction", &["construction", "building", "renovation", "civil engineering", "contractor"]),
    ("education", &["school", "education", "training", "curriculum", "learners", "tuition"]),
    ("healthcare", &["health", "medical", "clinic", "dental", "wellness", "pharmacy"]),
    ("finance", &["accounting", "finance", "insurance", "bookkeeping", "tax", "audit"]),
    ("legal", &["law firm", "legal", "attorneys", "litigation", "conveyancing"]),
    ("hospitality", &["hotel", "restaurant", "catering", "tourism", "lodge", "guesthouse"]),
    ("logistics", &["logistics", "transport", "freight", "courier", "warehousing"]),
    ("retail", &["retail", "store", "boutique", "wholesale", "merchandise"]),
];

/// The industry with the most keyword hits in `text`, if any keyword hit
/// at all. `text` is expected to be lowercased by the caller.
pub fn detect_industry(text: &str) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for (industry, keywords) in INDUSTRY_KEYWORDS {
        let hits = keywords.iter().filter(|k| text.contains(*k)).count();
        if hits == 0 {
            continue;
        }
        match best {
            Some((_, best_hits)) if hits <= best_hits => {}
            _ => best = Some((*industry, hits)),
        }
    }

    best.map(|(industry, _)| industry.to_string())
}
