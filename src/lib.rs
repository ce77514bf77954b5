//! Dance Match - partner discovery and matching core for the dance platform
//!
//! This library resolves dance styles against a shared taxonomy, ranks candidate
//! partners with an additive relevance score, and drives the contact-request
//! workflow (one pending request per sender).

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    normalize, CandidateRanker, ContactError, ContactRequestWorkflow, LocationMatcher, RankFilters,
    RankResult, RelevanceScorer, StyleTaxonomy,
};
pub use models::{
    Candidate, ContactRequest, ContactStatus, ScoredCandidate, ScoringWeights, SeekerPreference,
    TaxonomyEntry,
};
