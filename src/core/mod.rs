// Core algorithm exports
pub mod contact;
pub mod filters;
pub mod location;
pub mod normalize;
pub mod ranker;
pub mod scoring;
pub mod sequence;
pub mod taxonomy;

pub use contact::{ContactError, ContactRequestWorkflow, ACTIVE_REQUEST_TTL};
pub use filters::{CompiledFilters, FilterField, RankFilters, Reselect};
pub use location::{location_matches, LocationMatcher};
pub use normalize::{normalize, normalize_opt};
pub use ranker::{CandidateRanker, RankResult};
pub use scoring::{levels_equal, RelevanceScorer, ResolvedCandidate, ResolvedPreference, ScoreBreakdown};
pub use sequence::{RankSequencer, RankTicket};
pub use taxonomy::{SharedTaxonomy, StyleLabel, StyleTaxonomy};
