// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Candidate, ContactParty, ContactRequest, ContactStatus, ScoredCandidate, ScoringWeights,
    SeekerPreference, SkillLevel, TaxonomyEntry,
};
pub use requests::{SearchPartnersRequest, SendContactRequest};
pub use responses::{
    ActiveRequestResponse, ContactRequestResponse, ErrorResponse, HealthResponse,
    SearchPartnersResponse, TaxonomyRefreshResponse,
};
