use crate::models::{Candidate, ContactRequest, ContactStatus, TaxonomyEntry};
use crate::services::appwrite::AppwriteError;
use crate::services::postgres::PostgresError;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Collaborator-neutral storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Appwrite error: {0}")]
    Appwrite(#[from] AppwriteError),

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] PostgresError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Source of matchable users
///
/// Implementations filter server-side: the seeker and non-seeking users are
/// already excluded.
#[async_trait]
pub trait CandidateDirectory: Send + Sync {
    async fn fetch_candidate_pool(&self, seeker_id: &str) -> Result<Vec<Candidate>, StoreError>;
}

/// Source of the dance-style taxonomy; an empty list is a valid answer
#[async_trait]
pub trait TaxonomySource: Send + Sync {
    async fn fetch_style_taxonomy(&self) -> Result<Vec<TaxonomyEntry>, StoreError>;
}

/// Persistence for contact requests
#[async_trait]
pub trait ContactRequestStore: Send + Sync {
    /// Persist a new request and return its id. A second pending request
    /// for the same sender is reported as `StoreError::Conflict`.
    async fn persist_request(&self, request: &ContactRequest) -> Result<Uuid, StoreError>;

    async fn update_request_status(&self, id: Uuid, status: ContactStatus) -> Result<(), StoreError>;

    /// Move a request from pending to cancelled in one conditional write.
    /// Returns false when the request is missing or no longer pending, so a
    /// status set by the receiver is never overwritten.
    async fn cancel_pending(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn find_pending_request(&self, sender_id: &str) -> Result<Option<ContactRequest>, StoreError>;

    async fn find_request(&self, id: Uuid) -> Result<Option<ContactRequest>, StoreError>;
}
