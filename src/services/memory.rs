use crate::models::{ContactRequest, ContactStatus};
use crate::services::store::{ContactRequestStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process contact request store
///
/// Enforces the one-pending-request-per-sender rule on insert, the same way
/// the PostgreSQL partial unique index does.
#[derive(Debug, Default)]
pub struct MemoryRequestStore {
    requests: RwLock<HashMap<Uuid, ContactRequest>>,
}

impl MemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }

    /// Set a status directly, as the receiver side would on accept/reject
    pub async fn set_status(&self, id: Uuid, status: ContactStatus) -> bool {
        match self.requests.write().await.get_mut(&id) {
            Some(request) => {
                request.status = status;
                request.updated_at = chrono::Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ContactRequestStore for MemoryRequestStore {
    async fn persist_request(&self, request: &ContactRequest) -> Result<Uuid, StoreError> {
        let mut requests = self.requests.write().await;

        if request.is_pending()
            && requests
                .values()
                .any(|r| r.is_pending() && r.sender_id() == request.sender_id())
        {
            return Err(StoreError::Conflict(format!(
                "sender {} already has a pending request",
                request.sender_id()
            )));
        }

        requests.insert(request.id, request.clone());
        Ok(request.id)
    }

    async fn update_request_status(&self, id: Uuid, status: ContactStatus) -> Result<(), StoreError> {
        if self.set_status(id, status).await {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("contact request {}", id)))
        }
    }

    async fn cancel_pending(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut requests = self.requests.write().await;
        match requests.get_mut(&id) {
            Some(request) if request.is_pending() => {
                request.status = ContactStatus::Cancelled;
                request.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_pending_request(&self, sender_id: &str) -> Result<Option<ContactRequest>, StoreError> {
        let requests = self.requests.read().await;
        Ok(requests
            .values()
            .find(|r| r.is_pending() && r.sender_id() == sender_id)
            .cloned())
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<ContactRequest>, StoreError> {
        Ok(self.requests.read().await.get(&id).cloned())
    }
}
