use crate::core::filters::RankFilters;
use crate::core::location::LocationMatcher;
use crate::core::scoring::{RelevanceScorer, ResolvedCandidate, ResolvedPreference};
use crate::core::taxonomy::StyleTaxonomy;
use crate::models::{Candidate, ScoredCandidate, ScoringWeights, SeekerPreference};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

/// Result of ranking a candidate pool
#[derive(Debug)]
pub struct RankResult {
    pub candidates: Vec<ScoredCandidate>,
    pub total_candidates: usize,
    /// False when the pool was shuffled for an anonymous seeker
    pub ranked: bool,
}

/// Filter-then-order pipeline over a candidate pool
///
/// # Pipeline Stages
/// 1. Style resolution (once per candidate)
/// 2. Conjunctive filtering (style, gender, level, location, availability)
/// 3. Relevance scoring and stable descending sort, or a shuffle when the
///    seeker has no preference
#[derive(Debug, Clone)]
pub struct CandidateRanker {
    scorer: RelevanceScorer,
    matcher: LocationMatcher,
}

impl CandidateRanker {
    pub fn new(taxonomy: Arc<StyleTaxonomy>, weights: ScoringWeights) -> Self {
        Self {
            scorer: RelevanceScorer::new(taxonomy, weights),
            matcher: LocationMatcher::new(),
        }
    }

    pub fn with_default_weights(taxonomy: Arc<StyleTaxonomy>) -> Self {
        Self::new(taxonomy, ScoringWeights::default())
    }

    pub fn with_matcher(mut self, matcher: LocationMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    /// Filter and order a pool for one seeker
    pub fn rank(
        &self,
        pool: Vec<Candidate>,
        filters: &RankFilters,
        preference: Option<&SeekerPreference>,
    ) -> RankResult {
        self.rank_with_rng(pool, filters, preference, &mut rand::thread_rng())
    }

    /// Same as [`CandidateRanker::rank`] with an explicit RNG for the
    /// anonymous shuffle
    pub fn rank_with_rng<R: Rng + ?Sized>(
        &self,
        pool: Vec<Candidate>,
        filters: &RankFilters,
        preference: Option<&SeekerPreference>,
        rng: &mut R,
    ) -> RankResult {
        let total_candidates = pool.len();
        let taxonomy = self.scorer.taxonomy();
        let compiled = filters.compile(taxonomy, self.matcher);

        let survivors: Vec<ResolvedCandidate> = pool
            .into_iter()
            .map(|candidate| ResolvedCandidate::new(candidate, taxonomy))
            .filter(|candidate| compiled.matches(candidate))
            .collect();

        let Some(preference) = preference else {
            let mut candidates: Vec<ScoredCandidate> = survivors
                .into_iter()
                .map(|resolved| ScoredCandidate {
                    candidate: resolved.candidate,
                    relevance_score: 0,
                    shared_styles: Vec::new(),
                })
                .collect();
            candidates.shuffle(rng);

            tracing::debug!(
                "Shuffled {} of {} candidates for anonymous seeker",
                candidates.len(),
                total_candidates
            );

            return RankResult {
                candidates,
                total_candidates,
                ranked: false,
            };
        };

        let preference = ResolvedPreference::new(preference, taxonomy);
        let mut candidates: Vec<ScoredCandidate> = survivors
            .into_iter()
            .map(|resolved| {
                let breakdown = self.scorer.breakdown(&resolved, &preference);
                ScoredCandidate {
                    relevance_score: breakdown.total(),
                    shared_styles: breakdown.shared_styles,
                    candidate: resolved.candidate,
                }
            })
            .collect();

        // sort_by is stable: equal scores keep pool order
        candidates.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));

        tracing::debug!(
            "Ranked {} of {} candidates",
            candidates.len(),
            total_candidates
        );

        RankResult {
            candidates,
            total_candidates,
            ranked: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filters::{FilterField, Reselect};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

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
            height_cm: Some(165),
            weight_kg: None,
            rating: 4.0,
        }
    }

    fn create_preference() -> SeekerPreference {
        SeekerPreference {
            dance_styles: vec!["salsa".to_string()],
            level: Some("beginner".to_string()),
            city: Some("Ist".to_string()),
            availability: vec![],
            height_cm: None,
            weight_kg: None,
        }
    }

    fn ranker() -> CandidateRanker {
        CandidateRanker::with_default_weights(Arc::new(StyleTaxonomy::builtin()))
    }

    fn ids(result: &RankResult) -> Vec<&str> {
        result
            .candidates
            .iter()
            .map(|c| c.candidate.user_id.as_str())
            .collect()
    }

    #[test]
    fn test_sorted_by_score_descending() {
        let pool = vec![
            create_candidate("1", &["tango"], "professional", "Ankara"),
            create_candidate("2", &["Salsa"], "beginner", "İstanbul, Kadıköy"),
            create_candidate("3", &["sal"], "advanced", "İstanbul"),
        ];

        let preference = create_preference();
        let result = ranker().rank(pool, &RankFilters::default(), Some(&preference));

        assert!(result.ranked);
        assert_eq!(ids(&result), vec!["2", "3", "1"]);
        assert_eq!(result.candidates[0].relevance_score, 50);
        assert_eq!(result.candidates[1].relevance_score, 35);
        assert_eq!(result.candidates[2].relevance_score, 0);
    }

    #[test]
    fn test_ties_keep_pool_order() {
        let pool = vec![
            create_candidate("a", &["salsa"], "beginner", "Bursa"),
            create_candidate("b", &["salsa"], "beginner", "Bursa"),
            create_candidate("c", &["salsa"], "beginner", "Bursa"),
        ];

        let preference = create_preference();
        let result = ranker().rank(pool, &RankFilters::default(), Some(&preference));

        assert_eq!(ids(&result), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_filters_applied_before_ranking() {
        let pool = vec![
            create_candidate("1", &["bachata"], "beginner", "İstanbul"),
            create_candidate("2", &["salsa"], "beginner", "Ankara"),
            create_candidate("3", &["salsa"], "beginner", "İstanbul"),
        ];

        let filters = RankFilters::default()
            .with(FilterField::Style, "Salsa", Reselect::ClearOnRepeat)
            .with(FilterField::Location, "ist", Reselect::ClearOnRepeat);
        let preference = create_preference();
        let result = ranker().rank(pool, &filters, Some(&preference));

        assert_eq!(result.total_candidates, 3);
        assert_eq!(ids(&result), vec!["3"]);
    }

    #[test]
    fn test_anonymous_shuffle_is_permutation() {
        let pool: Vec<Candidate> = (0..20)
            .map(|i| create_candidate(&i.to_string(), &["salsa"], "beginner", "İzmir"))
            .collect();

        let mut rng = StdRng::seed_from_u64(7);
        let result = ranker().rank_with_rng(pool, &RankFilters::default(), None, &mut rng);

        assert!(!result.ranked);
        assert!(result.candidates.iter().all(|c| c.relevance_score == 0));

        let mut seen: Vec<usize> = result
            .candidates
            .iter()
            .map(|c| c.candidate.user_id.parse().unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_anonymous_shuffle_varies_with_seed() {
        let pool: Vec<Candidate> = (0..20)
            .map(|i| create_candidate(&i.to_string(), &[], "", ""))
            .collect();

        let first = ranker().rank_with_rng(
            pool.clone(),
            &RankFilters::default(),
            None,
            &mut StdRng::seed_from_u64(1),
        );
        let second = ranker().rank_with_rng(
            pool,
            &RankFilters::default(),
            None,
            &mut StdRng::seed_from_u64(2),
        );

        assert_ne!(ids(&first), ids(&second));
    }
}
