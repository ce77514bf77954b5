use crate::core::normalize::{normalize, normalize_opt};
use crate::core::taxonomy::{StyleLabel, StyleTaxonomy};
use crate::models::{Candidate, ScoringWeights, SeekerPreference, SkillLevel};
use std::sync::Arc;

/// Candidate with its comparable attributes resolved once on ingestion
#[derive(Debug, Clone)]
pub struct ResolvedCandidate {
    pub candidate: Candidate,
    pub styles: Vec<StyleLabel>,
    pub level: String,
    pub location: String,
    pub slots: Vec<String>,
}

impl ResolvedCandidate {
    pub fn new(candidate: Candidate, taxonomy: &StyleTaxonomy) -> Self {
        let styles = taxonomy.resolve_all(&candidate.dance_styles);
        let level = normalize_opt(candidate.level.as_deref());
        let location = normalize_opt(candidate.location.as_deref());
        let slots = normalized_set(&candidate.availability);

        Self {
            candidate,
            styles,
            level,
            location,
            slots,
        }
    }

    pub fn has_style(&self, style: &StyleLabel) -> bool {
        self.styles.contains(style)
    }
}

/// Seeker preference resolved against the same taxonomy as the pool
#[derive(Debug, Clone)]
pub struct ResolvedPreference {
    pub styles: Vec<StyleLabel>,
    pub level: String,
    pub city: String,
    pub slots: Vec<String>,
}

impl ResolvedPreference {
    pub fn new(preference: &SeekerPreference, taxonomy: &StyleTaxonomy) -> Self {
        Self {
            styles: taxonomy.resolve_all(&preference.dance_styles),
            level: normalize_opt(preference.level.as_deref()),
            city: normalize_opt(preference.city.as_deref()),
            slots: normalized_set(&preference.availability),
        }
    }
}

/// Per-axis contributions to a relevance score
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub style: u32,
    pub level: u32,
    pub location: u32,
    pub availability: u32,
    pub shared_styles: Vec<String>,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.style + self.level + self.location + self.availability
    }
}

/// Additive compatibility scorer
///
/// Scores are unbounded and only meaningful relative to other candidates
/// scored for the same seeker.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    taxonomy: Arc<StyleTaxonomy>,
    weights: ScoringWeights,
}

impl RelevanceScorer {
    pub fn new(taxonomy: Arc<StyleTaxonomy>, weights: ScoringWeights) -> Self {
        Self { taxonomy, weights }
    }

    pub fn with_default_weights(taxonomy: Arc<StyleTaxonomy>) -> Self {
        Self::new(taxonomy, ScoringWeights::default())
    }

    pub fn taxonomy(&self) -> &Arc<StyleTaxonomy> {
        &self.taxonomy
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Score one raw candidate; 0 for anonymous browsing
    pub fn score(&self, candidate: &Candidate, preference: Option<&SeekerPreference>) -> u32 {
        let Some(preference) = preference else {
            return 0;
        };

        let resolved = ResolvedCandidate::new(candidate.clone(), &self.taxonomy);
        let preference = ResolvedPreference::new(preference, &self.taxonomy);
        self.breakdown(&resolved, &preference).total()
    }

    /// Score an already resolved candidate
    pub fn breakdown(
        &self,
        candidate: &ResolvedCandidate,
        preference: &ResolvedPreference,
    ) -> ScoreBreakdown {
        let shared_styles: Vec<String> = preference
            .styles
            .iter()
            .filter(|style| candidate.has_style(style))
            .map(|style| style.as_str().to_string())
            .collect();

        let style = self.weights.style * shared_styles.len() as u32;
        let level = self.level_score(&candidate.level, &preference.level);

        let location = if !preference.city.is_empty() && candidate.location.contains(&preference.city) {
            self.weights.location
        } else {
            0
        };

        let shared_slots = preference
            .slots
            .iter()
            .filter(|slot| candidate.slots.contains(slot))
            .count() as u32;
        let availability = self.weights.availability * shared_slots;

        ScoreBreakdown {
            style,
            level,
            location,
            availability,
            shared_styles,
        }
    }

    /// Level contribution: exact match, neighbouring level, or nothing
    #[inline]
    fn level_score(&self, candidate_level: &str, seeker_level: &str) -> u32 {
        if levels_equal(candidate_level, seeker_level) {
            return self.weights.level_exact;
        }

        match (
            candidate_level.parse::<SkillLevel>(),
            seeker_level.parse::<SkillLevel>(),
        ) {
            (Ok(a), Ok(b)) if a.is_adjacent(b) => self.weights.level_adjacent,
            _ => 0,
        }
    }
}

/// Same level when the normalized texts agree or both parse to the same
/// `SkillLevel` ("başlangıç" == "beginner"). Blank never equals anything.
pub fn levels_equal(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    matches!(
        (a.parse::<SkillLevel>(), b.parse::<SkillLevel>()),
        (Ok(x), Ok(y)) if x == y
    )
}

/// Normalize a list of labels, dropping blanks and duplicates
fn normalized_set(values: &[String]) -> Vec<String> {
    let mut set: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = normalize(value);
        if !value.is_empty() && !set.contains(&value) {
            set.push(value);
        }
    }
    set
}
