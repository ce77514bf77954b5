use crate::models::{ContactParty, ContactRequest, ContactStatus};
use crate::services::cache::{CacheError, CacheKey, SessionCache};
use crate::services::store::{ContactRequestStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Validity window of the cached active request
pub const ACTIVE_REQUEST_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Contact workflow failures; precondition violations are distinct from
/// storage failures
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Sender {sender_id} already has a pending contact request")]
    AlreadyPending {
        sender_id: String,
        request_id: Option<Uuid>,
    },

    #[error("Contact request {0} not found")]
    NotFound(Uuid),

    #[error("Contact request {id} is {status}, not pending")]
    NotPending { id: Uuid, status: ContactStatus },

    #[error("Cannot send a contact request to yourself")]
    SelfRequest,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// One-pending-request-per-sender state machine
///
/// `NONE -> PENDING -> CANCELLED` is written here; `ACCEPTED` and `REJECTED`
/// are set by the receiver elsewhere and only observed. The store is the
/// source of truth, the session cache only saves a round trip.
///
/// The cache check stops the common double-submit; concurrent sessions are
/// only safe when the store rejects a second pending request itself.
pub struct ContactRequestWorkflow {
    store: Arc<dyn ContactRequestStore>,
    cache: Arc<dyn SessionCache>,
    cache_ttl: Duration,
}

impl ContactRequestWorkflow {
    pub fn new(store: Arc<dyn ContactRequestStore>, cache: Arc<dyn SessionCache>) -> Self {
        Self {
            store,
            cache,
            cache_ttl: ACTIVE_REQUEST_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Open a new pending request from `sender` to `receiver`
    pub async fn send(
        &self,
        sender: ContactParty,
        receiver: ContactParty,
    ) -> Result<ContactRequest, ContactError> {
        if sender.user_id == receiver.user_id {
            return Err(ContactError::SelfRequest);
        }

        if let Some(active) = self.cached_active_request(&sender.user_id).await {
            tracing::info!(
                "Rejecting contact request from {}: {} still pending",
                sender.user_id,
                active.id
            );
            return Err(ContactError::AlreadyPending {
                sender_id: sender.user_id,
                request_id: Some(active.id),
            });
        }

        let mut request = ContactRequest::pending(sender, receiver);
        match self.store.persist_request(&request).await {
            Ok(id) => request.id = id,
            Err(StoreError::Conflict(reason)) => {
                tracing::info!("Store rejected duplicate pending request: {}", reason);
                return Err(ContactError::AlreadyPending {
                    sender_id: request.sender.user_id,
                    request_id: None,
                });
            }
            Err(e) => {
                tracing::error!("Failed to persist contact request: {}", e);
                return Err(e.into());
            }
        }

        self.mirror(&request).await;

        tracing::info!(
            "Contact request {} sent: {} -> {}",
            request.id,
            request.sender.user_id,
            request.receiver.user_id
        );

        Ok(request)
    }

    /// Cancel a pending request
    pub async fn cancel(&self, request_id: Uuid) -> Result<ContactRequest, ContactError> {
        let mut request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or(ContactError::NotFound(request_id))?;

        if !request.is_pending() {
            return Err(ContactError::NotPending {
                id: request_id,
                status: request.status,
            });
        }

        if !self.store.cancel_pending(request_id).await? {
            // Answered or removed between the read and the write
            let current = self
                .store
                .find_request(request_id)
                .await?
                .ok_or(ContactError::NotFound(request_id))?;
            tracing::info!(
                "Contact request {} changed to {} before it could be cancelled",
                request_id,
                current.status
            );
            return Err(ContactError::NotPending {
                id: request_id,
                status: current.status,
            });
        }

        request.status = ContactStatus::Cancelled;
        request.updated_at = chrono::Utc::now();
        self.forget(request.sender_id()).await;

        tracing::info!("Contact request {} cancelled by {}", request_id, request.sender_id());

        Ok(request)
    }

    /// Look up the sender's pending request in the store and resync the cache
    pub async fn find_active_request(
        &self,
        sender_id: &str,
    ) -> Result<Option<ContactRequest>, ContactError> {
        let found = self.store.find_pending_request(sender_id).await?;

        match &found {
            Some(request) => self.mirror(request).await,
            None => self.forget(sender_id).await,
        }

        Ok(found)
    }

    /// Cache-only view of the sender's pending request
    pub async fn cached_active_request(&self, sender_id: &str) -> Option<ContactRequest> {
        let key = CacheKey::active_request(sender_id);

        let json = match self.cache.get(&key).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Session cache read failed for {}: {}", sender_id, e);
                return None;
            }
        };

        match serde_json::from_str::<ContactRequest>(&json) {
            Ok(request) if request.is_pending() && request.sender_id() == sender_id => Some(request),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Discarding unreadable cached request for {}: {}", sender_id, e);
                None
            }
        }
    }

    async fn mirror(&self, request: &ContactRequest) {
        let key = CacheKey::active_request(request.sender_id());

        let result = match serde_json::to_string(request) {
            Ok(json) => self.cache.set(&key, json, self.cache_ttl).await,
            Err(e) => Err(CacheError::from(e)),
        };

        if let Err(e) = result {
            tracing::warn!("Failed to cache active request {}: {}", request.id, e);
        }
    }

    async fn forget(&self, sender_id: &str) {
        if let Err(e) = self.cache.delete(&CacheKey::active_request(sender_id)).await {
            tracing::warn!("Failed to invalidate cached request for {}: {}", sender_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::MemorySessionCache;
    use crate::services::memory::MemoryRequestStore;
    use async_trait::async_trait;

    /// Store where the receiver accepts right after the workflow reads the request
    struct AcceptOnReadStore {
        inner: MemoryRequestStore,
    }

    #[async_trait]
    impl ContactRequestStore for AcceptOnReadStore {
        async fn persist_request(&self, request: &ContactRequest) -> Result<Uuid, StoreError> {
            self.inner.persist_request(request).await
        }

        async fn update_request_status(&self, id: Uuid, status: ContactStatus) -> Result<(), StoreError> {
            self.inner.update_request_status(id, status).await
        }

        async fn cancel_pending(&self, id: Uuid) -> Result<bool, StoreError> {
            self.inner.cancel_pending(id).await
        }

        async fn find_pending_request(&self, sender_id: &str) -> Result<Option<ContactRequest>, StoreError> {
            self.inner.find_pending_request(sender_id).await
        }

        async fn find_request(&self, id: Uuid) -> Result<Option<ContactRequest>, StoreError> {
            let found = self.inner.find_request(id).await?;
            if found.as_ref().is_some_and(|r| r.is_pending()) {
                self.inner.set_status(id, ContactStatus::Accepted).await;
            }
            Ok(found)
        }
    }

    fn party(id: &str) -> ContactParty {
        ContactParty::new(id, &format!("Dancer {}", id))
    }

    fn workflow() -> (ContactRequestWorkflow, Arc<MemoryRequestStore>, Arc<MemorySessionCache>) {
        let store = Arc::new(MemoryRequestStore::new());
        let cache = Arc::new(MemorySessionCache::default());
        let workflow = ContactRequestWorkflow::new(store.clone(), cache.clone());
        (workflow, store, cache)
    }

    #[tokio::test]
    async fn test_send_creates_pending_request() {
        let (workflow, store, _) = workflow();

        let request = workflow.send(party("u1"), party("u2")).await.unwrap();

        assert_eq!(request.status, ContactStatus::Pending);
        assert_eq!(request.created_at, request.updated_at);
        assert_eq!(store.len().await, 1);
        assert_eq!(
            workflow.cached_active_request("u1").await.map(|r| r.id),
            Some(request.id)
        );
    }

    #[tokio::test]
    async fn test_second_send_rejected_by_cache() {
        let (workflow, store, _) = workflow();
        let first = workflow.send(party("u1"), party("u2")).await.unwrap();

        let err = workflow.send(party("u1"), party("u3")).await.unwrap_err();

        match err {
            ContactError::AlreadyPending { sender_id, request_id } => {
                assert_eq!(sender_id, "u1");
                assert_eq!(request_id, Some(first.id));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_second_send_rejected_by_store_without_cache() {
        let (workflow, store, cache) = workflow();
        workflow.send(party("u1"), party("u2")).await.unwrap();
        cache.delete(&CacheKey::active_request("u1")).await.unwrap();

        let err = workflow.send(party("u1"), party("u3")).await.unwrap_err();

        assert!(matches!(err, ContactError::AlreadyPending { request_id: None, .. }));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_self_request_rejected() {
        let (workflow, store, _) = workflow();
        let err = workflow.send(party("u1"), party("u1")).await.unwrap_err();
        assert!(matches!(err, ContactError::SelfRequest));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cancel_clears_active_request() {
        let (workflow, _, _) = workflow();
        let request = workflow.send(party("u1"), party("u2")).await.unwrap();

        let cancelled = workflow.cancel(request.id).await.unwrap();

        assert_eq!(cancelled.status, ContactStatus::Cancelled);
        assert!(workflow.cached_active_request("u1").await.is_none());
        assert!(workflow.find_active_request("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_twice_fails() {
        let (workflow, _, _) = workflow();
        let request = workflow.send(party("u1"), party("u2")).await.unwrap();
        workflow.cancel(request.id).await.unwrap();

        let err = workflow.cancel(request.id).await.unwrap_err();
        assert!(matches!(
            err,
            ContactError::NotPending { status: ContactStatus::Cancelled, .. }
        ));
    }

    #[tokio::test]
    async fn test_cancel_does_not_overwrite_receiver_answer() {
        let store = Arc::new(AcceptOnReadStore {
            inner: MemoryRequestStore::new(),
        });
        let workflow = ContactRequestWorkflow::new(store.clone(), Arc::new(MemorySessionCache::default()));
        let request = workflow.send(party("u1"), party("u2")).await.unwrap();

        let err = workflow.cancel(request.id).await.unwrap_err();

        assert!(matches!(
            err,
            ContactError::NotPending { status: ContactStatus::Accepted, .. }
        ));
        let stored = store.inner.find_request(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ContactStatus::Accepted);
    }

    #[tokio::test]
    async fn test_cancel_unknown_request() {
        let (workflow, _, _) = workflow();
        let id = Uuid::new_v4();
        let err = workflow.cancel(id).await.unwrap_err();
        assert!(matches!(err, ContactError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_send_allowed_after_cancel() {
        let (workflow, store, _) = workflow();
        let first = workflow.send(party("u1"), party("u2")).await.unwrap();
        workflow.cancel(first.id).await.unwrap();

        let second = workflow.send(party("u1"), party("u3")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_find_active_overrides_stale_cache() {
        let (workflow, store, _) = workflow();
        let request = workflow.send(party("u1"), party("u2")).await.unwrap();

        // Receiver accepts outside this workflow; the cache still says pending
        store.set_status(request.id, ContactStatus::Accepted).await;
        assert!(workflow.cached_active_request("u1").await.is_some());

        assert!(workflow.find_active_request("u1").await.unwrap().is_none());
        assert!(workflow.cached_active_request("u1").await.is_none());
    }

    #[tokio::test]
    async fn test_find_active_restores_cache_after_reload() {
        let store = Arc::new(MemoryRequestStore::new());
        let first_session = ContactRequestWorkflow::new(store.clone(), Arc::new(MemorySessionCache::default()));
        let request = first_session.send(party("u1"), party("u2")).await.unwrap();

        let reloaded = ContactRequestWorkflow::new(store, Arc::new(MemorySessionCache::default()));
        assert!(reloaded.cached_active_request("u1").await.is_none());

        let found = reloaded.find_active_request("u1").await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(request.id));
        assert_eq!(
            reloaded.cached_active_request("u1").await.map(|r| r.id),
            Some(request.id)
        );
    }

    #[tokio::test]
    async fn test_cached_request_expires() {
        let (workflow, _, _) = workflow();
        let workflow = workflow.with_cache_ttl(Duration::from_millis(20));
        workflow.send(party("u1"), party("u2")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(workflow.cached_active_request("u1").await.is_none());
    }
}
