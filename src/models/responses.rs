use serde::{Deserialize, Serialize};
use crate::models::domain::{ContactRequest, ScoredCandidate};

/// Response for the partner search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPartnersResponse {
    pub candidates: Vec<ScoredCandidate>,
    pub total_candidates: usize,
    pub ranked: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Contact request send/cancel response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequestResponse {
    pub success: bool,
    pub request: ContactRequest,
}

/// Active request lookup response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveRequestResponse {
    #[serde(rename = "senderId")]
    pub sender_id: String,
    pub request: Option<ContactRequest>,
}

/// Taxonomy refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyRefreshResponse {
    pub entries: usize,
    pub fallback: bool,
}
