// Unit tests for the dance partner matching core

use dance_match::core::{
    location_matches, normalize, CandidateRanker, FilterField, LocationMatcher, RankFilters,
    RelevanceScorer, Reselect, StyleTaxonomy,
};
use dance_match::models::{Candidate, ScoringWeights, SeekerPreference, TaxonomyEntry};
use std::sync::Arc;

fn create_candidate(id: &str, styles: &[&str], level: &str, location: &str) -> Candidate {
    Candidate {
        user_id: id.to_string(),
        display_name: format!("Dancer {}", id),
        gender: Some("female".to_string()),
        dance_styles: styles.iter().map(|s| s.to_string()).collect(),
        level: Some(level.to_string()),
        location: Some(location.to_string()),
        availability: vec!["weekend".to_string()],
        photo_url: None,
        height_cm: Some(168),
        weight_kg: None,
        rating: 4.2,
    }
}

fn seeker() -> SeekerPreference {
    SeekerPreference {
        dance_styles: vec!["salsa".to_string()],
        level: Some("beginner".to_string()),
        city: Some("Ist".to_string()),
        ..SeekerPreference::default()
    }
}

fn builtin() -> Arc<StyleTaxonomy> {
    Arc::new(StyleTaxonomy::builtin())
}

#[test]
fn test_normalize_folds_turkish_text() {
    assert_eq!(normalize("  İSTANBUL,  Kadıköy "), "istanbul kadikoy");
    assert_eq!(normalize("Şişli Çarşı Ğ Ü Ö"), "sisli carsi g u o");
    assert_eq!(normalize(""), "");
}

#[test]
fn test_beginner_salsa_dancer_in_istanbul_scores_fifty() {
    let candidate = create_candidate("a", &["Salsa", "Bachata"], "beginner", "İstanbul, Kadıköy");
    let ranker = CandidateRanker::with_default_weights(builtin());

    let result = ranker.rank(vec![candidate], &RankFilters::default(), Some(&seeker()));

    assert_eq!(result.candidates.len(), 1);
    assert_eq!(result.candidates[0].relevance_score, 50);
    assert_eq!(result.candidates[0].shared_styles, vec!["Salsa".to_string()]);
}

#[test]
fn test_style_filter_and_city_abbreviation_pass_together() {
    let candidate = create_candidate("a", &["Salsa", "Bachata"], "beginner", "İstanbul, Kadıköy");
    let filters = RankFilters::default()
        .with(FilterField::Style, "salsa", Reselect::ClearOnRepeat)
        .with(FilterField::Location, "ist", Reselect::ClearOnRepeat);
    let ranker = CandidateRanker::with_default_weights(builtin());

    let result = ranker.rank(vec![candidate], &filters, Some(&seeker()));

    assert_eq!(result.candidates.len(), 1);
}

#[test]
fn test_advanced_dancer_loses_level_points() {
    let candidate = create_candidate("b", &["Salsa", "Bachata"], "advanced", "İstanbul, Kadıköy");
    let scorer = RelevanceScorer::with_default_weights(builtin());

    assert_eq!(scorer.score(&candidate, Some(&seeker())), 35);
}

#[test]
fn test_intermediate_dancer_gets_adjacent_level_points() {
    let candidate = create_candidate("c", &["sal"], "intermediate", "İstanbul");
    let scorer = RelevanceScorer::with_default_weights(builtin());

    assert_eq!(scorer.score(&candidate, Some(&seeker())), 45);
}

#[test]
fn test_empty_taxonomy_falls_back_to_builtin() {
    let taxonomy = StyleTaxonomy::from_entries_or_builtin(&[]);

    assert!(taxonomy.is_fallback());
    assert_eq!(taxonomy.resolve("salsa").as_str(), "Salsa");
    assert_eq!(taxonomy.resolve("wcs").as_str(), "West Coast Swing");
}

#[test]
fn test_collection_taxonomy_replaces_builtin() {
    let entries = vec![
        TaxonomyEntry::new("sls", "Salsa Cubana", "salsa_cubana"),
        TaxonomyEntry::new("kz", "Kizomba", "kizomba"),
    ];
    let taxonomy = StyleTaxonomy::from_entries_or_builtin(&entries);

    assert!(!taxonomy.is_fallback());
    assert_eq!(taxonomy.resolve("SLS").as_str(), "Salsa Cubana");
    assert_eq!(taxonomy.resolve("salsa_cubana").as_str(), "Salsa Cubana");
    // Not in the collection, so kept as-is
    assert_eq!(taxonomy.resolve("Bachata").as_str(), "Bachata");
}

#[test]
fn test_resolve_is_idempotent_for_every_spelling() {
    let taxonomy = StyleTaxonomy::builtin();
    let inputs = [
        "sal", "SALSA", "Salsa", "tng", "argentine_tango", "Argentine Tango", "lindy", "Lindy Hop",
        "unknown style", "  Hip   Hop ", "",
    ];

    for input in inputs {
        let once = taxonomy.resolve(input);
        let twice = taxonomy.resolve(once.as_str());
        assert_eq!(once.as_str(), twice.as_str(), "resolve not idempotent for {:?}", input);
    }
}

#[test]
fn test_anonymous_seeker_scores_zero_for_everyone() {
    let scorer = RelevanceScorer::with_default_weights(builtin());
    let pool = [
        create_candidate("1", &["Salsa"], "beginner", "İstanbul"),
        create_candidate("2", &["Kizomba"], "professional", "Ankara"),
        create_candidate("3", &[], "", ""),
    ];

    for candidate in &pool {
        assert_eq!(scorer.score(candidate, None), 0);
    }
}

#[test]
fn test_disjoint_style_never_survives_style_filter() {
    let taxonomy = builtin();
    let ranker = CandidateRanker::with_default_weights(taxonomy.clone());
    let labels = ["Salsa", "Bachata", "Kizomba", "Argentine Tango", "Zouk"];

    for wanted in labels {
        for offered in labels.iter().filter(|l| **l != wanted) {
            let filters = RankFilters::default().with(FilterField::Style, wanted, Reselect::Replace);
            let pool = vec![create_candidate("x", &[*offered], "beginner", "İzmir")];

            let result = ranker.rank(pool, &filters, None);
            assert!(
                result.candidates.is_empty(),
                "{} dancer matched a {} filter",
                offered,
                wanted
            );
        }
    }
}

#[test]
fn test_location_matching_is_reflexive() {
    let matcher = LocationMatcher::new();
    let locations = ["İstanbul", "Ankara, Çankaya", "ist", "izm", "Bursa Nilüfer", "x"];

    for location in locations {
        assert!(matcher.matches(location, location), "{} did not match itself", location);
    }
}

#[test]
fn test_location_matching_rejects_other_cities() {
    assert!(location_matches("İzmir, Alsancak", "izm"));
    assert!(location_matches("Ankara", "ank"));
    assert!(!location_matches("Ankara", "ist"));
    assert!(!location_matches("", "ist"));
}

#[test]
fn test_filter_toggle_semantics() {
    let mut filters = RankFilters::default();

    filters.select(FilterField::Level, "beginner", Reselect::ClearOnRepeat);
    assert_eq!(filters.level.as_deref(), Some("beginner"));

    filters.select(FilterField::Level, "beginner", Reselect::ClearOnRepeat);
    assert_eq!(filters.level, None);

    filters.select(FilterField::Level, "advanced", Reselect::Replace);
    filters.select(FilterField::Level, "advanced", Reselect::Replace);
    assert_eq!(filters.level.as_deref(), Some("advanced"));
}

#[test]
fn test_custom_weights_change_ordering() {
    let weights = ScoringWeights {
        style: 1,
        level_exact: 50,
        level_adjacent: 0,
        location: 1,
        availability: 0,
    };
    let ranker = CandidateRanker::new(builtin(), weights);
    let pool = vec![
        create_candidate("style-match", &["Salsa"], "advanced", "İstanbul"),
        create_candidate("level-match", &["Tango"], "beginner", "Ankara"),
    ];

    let result = ranker.rank(pool, &RankFilters::default(), Some(&seeker()));

    assert_eq!(result.candidates[0].candidate.user_id, "level-match");
    assert_eq!(result.candidates[0].relevance_score, 50);
    assert_eq!(result.candidates[1].relevance_score, 2);
}

#[test]
fn test_level_filter_keeps_candidate_the_scorer_rewards() {
    let candidate = create_candidate("tr", &["Kizomba"], "Başlangıç", "Ankara");
    let preference = SeekerPreference {
        level: Some("beginner".to_string()),
        ..SeekerPreference::default()
    };
    let scorer = RelevanceScorer::with_default_weights(builtin());
    assert_eq!(scorer.score(&candidate, Some(&preference)), 15);

    let filters = RankFilters::default().with(FilterField::Level, "beginner", Reselect::Replace);
    let ranker = CandidateRanker::with_default_weights(builtin());
    let result = ranker.rank(vec![candidate], &filters, Some(&preference));

    assert_eq!(result.candidates.len(), 1);
    assert_eq!(result.candidates[0].relevance_score, 15);
}
