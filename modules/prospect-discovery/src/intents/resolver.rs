//! Pure merge of an intent template with caller overrides. No I/O, fully
//! deterministic: identical inputs always yield identical output, so the
//! resolved config can be snapshotted into run statistics and dry runs
//! reproduce exactly.

use prospect_common::{
    country_name, Intent, IntentOverrides, ResolvedIntent, ResolvedLimits, COUNTRY_PLACEHOLDER,
};

/// Precedence for every field: explicit override > intent-defined value >
/// this base. Callers pass their mode's limit defaults as the base.
pub fn apply_intent(
    intent: &Intent,
    overrides: &IntentOverrides,
    base_limits: &ResolvedLimits,
) -> ResolvedIntent {
    let countries = overrides
        .countries
        .clone()
        .unwrap_or_else(|| intent.countries.clone());

    let queries = match &overrides.queries {
        Some(explicit) => explicit.clone(),
        None => expand_queries(&intent.seed_queries, &countries),
    };

    // Keyword overrides are additive, never replacing.
    let mut include_keywords = intent.include_keywords.clone();
    include_keywords.extend(overrides.include_keywords.iter().cloned());
    let mut exclude_keywords = intent.exclude_keywords.clone();
    exclude_keywords.extend(overrides.exclude_keywords.iter().cloned());

    let mut max_queries = overrides
        .max_queries
        .or(intent.limits.max_queries)
        .unwrap_or(base_limits.max_queries);
    // An explicit query list additionally caps the query count at its own
    // length.
    if let Some(explicit) = &overrides.queries {
        max_queries = max_queries.min(explicit.len() as u32);
    }

    ResolvedIntent {
        intent_id: intent.id.clone(),
        intent_name: intent.name.clone(),
        countries,
        queries,
        include_keywords,
        exclude_keywords,
        target_business_types: intent.target_business_types.clone(),
        channels: overrides
            .channels
            .clone()
            .unwrap_or_else(|| intent.channels.clone()),
        limits: ResolvedLimits {
            max_companies: overrides
                .max_companies
                .or(intent.limits.max_companies)
                .unwrap_or(base_limits.max_companies),
            max_leads: overrides
                .max_leads
                .or(intent.limits.max_leads)
                .unwrap_or(base_limits.max_leads),
            max_queries,
            time_budget_secs: overrides
                .time_budget_secs
                .or(intent.limits.time_budget_secs)
                .unwrap_or(base_limits.time_budget_secs),
        },
        geography: intent.geography.clone(),
        relevance_threshold: overrides
            .relevance_threshold
            .unwrap_or(intent.relevance_threshold),
    }
}

/// One query per target country for templated seeds; untemplated seeds
/// are emitted once regardless of country count. Unknown ISO codes fall
/// back to the code itself.
fn expand_queries(seed_queries: &[String], countries: &[String]) -> Vec<String> {
    let mut queries = Vec::new();
    for seed in seed_queries {
        if seed.contains(COUNTRY_PLACEHOLDER) {
            for code in countries {
                let name = country_name(code).unwrap_or(code);
                queries.push(seed.replace(COUNTRY_PLACEHOLDER, name));
            }
        } else {
            queries.push(seed.clone());
        }
    }
    queries
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospect_common::{ChannelKind, IntentLimits};

    const BASE: ResolvedLimits = ResolvedLimits {
        max_companies: 10,
        max_leads: 10,
        max_queries: 3,
        time_budget_secs: 300,
    };

    fn school_intent() -> Intent {
        Intent {
            id: "schools".into(),
            name: "Schools".into(),
            countries: vec!["ZA".into(), "BW".into()],
            seed_queries: vec!["schools {country}".into(), "education directory".into()],
            include_keywords: vec!["school".into()],
            exclude_keywords: vec!["vacancy".into()],
            target_business_types: vec!["private school".into()],
            channels: vec![ChannelKind::SearchEngine],
            limits: IntentLimits::default(),
            category: "education".into(),
            active: true,
            geography: None,
            relevance_threshold: 40,
        }
    }

    #[test]
    fn templated_queries_expand_per_country() {
        let resolved = apply_intent(&school_intent(), &IntentOverrides::default(), &BASE);
        assert_eq!(
            resolved.queries,
            vec![
                "schools South Africa".to_string(),
                "schools Botswana".to_string(),
                "education directory".to_string(),
            ]
        );
    }

    #[test]
    fn expansion_counts_match_country_count() {
        let intent = school_intent();
        for countries in [vec!["ZA".into()], vec!["ZA".into(), "BW".into(), "NA".into()]] {
            let overrides = IntentOverrides {
                countries: Some(countries.clone()),
                ..Default::default()
            };
            let resolved = apply_intent(&intent, &overrides, &BASE);
            // One templated seed expands per country; one plain seed stays.
            assert_eq!(resolved.queries.len(), countries.len() + 1);
        }
    }

    #[test]
    fn unknown_country_codes_pass_through_verbatim() {
        let overrides = IntentOverrides {
            countries: Some(vec!["XX".into()]),
            ..Default::default()
        };
        let resolved = apply_intent(&school_intent(), &overrides, &BASE);
        assert_eq!(resolved.queries[0], "schools XX");
    }

    #[test]
    fn resolution_is_deterministic_and_idempotent() {
        let intent = school_intent();
        let overrides = IntentOverrides {
            include_keywords: vec!["admissions".into()],
            max_companies: Some(7),
            ..Default::default()
        };
        let first = apply_intent(&intent, &overrides, &BASE);
        let second = apply_intent(&intent, &overrides, &BASE);
        assert_eq!(first, second);
    }

    #[test]
    fn override_beats_intent_beats_base() {
        let mut intent = school_intent();
        intent.limits.max_companies = Some(25);

        // Intent beats base.
        let resolved = apply_intent(&intent, &IntentOverrides::default(), &BASE);
        assert_eq!(resolved.limits.max_companies, 25);
        // Base fills gaps the intent leaves.
        assert_eq!(resolved.limits.max_queries, BASE.max_queries);

        // Override beats intent.
        let overrides = IntentOverrides {
            max_companies: Some(5),
            ..Default::default()
        };
        let resolved = apply_intent(&intent, &overrides, &BASE);
        assert_eq!(resolved.limits.max_companies, 5);
    }

    #[test]
    fn explicit_query_list_caps_query_count() {
        let overrides = IntentOverrides {
            queries: Some(vec!["only one query".into()]),
            max_queries: Some(10),
            ..Default::default()
        };
        let resolved = apply_intent(&school_intent(), &overrides, &BASE);
        assert_eq!(resolved.queries, vec!["only one query".to_string()]);
        assert_eq!(resolved.limits.max_queries, 1);
    }

    #[test]
    fn keyword_overrides_are_additive() {
        let overrides = IntentOverrides {
            include_keywords: vec!["stem".into()],
            exclude_keywords: vec!["homeschool".into()],
            ..Default::default()
        };
        let resolved = apply_intent(&school_intent(), &overrides, &BASE);
        assert!(resolved.include_keywords.contains(&"school".to_string()));
        assert!(resolved.include_keywords.contains(&"stem".to_string()));
        assert!(resolved.exclude_keywords.contains(&"vacancy".to_string()));
        assert!(resolved.exclude_keywords.contains(&"homeschool".to_string()));
    }
}
