use crate::models::{ContactParty, ContactRequest, ContactStatus};
use crate::services::store::{ContactRequestStore, StoreError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Sender {0} already has a pending contact request")]
    DuplicatePending(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// PostgreSQL-backed contact request store
///
/// The `contact_requests_one_pending_per_sender` partial unique index makes
/// the database reject a second pending request from the same sender, which
/// covers concurrent sessions the client-side check cannot see.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Insert a new contact request
    pub async fn insert_request(&self, request: &ContactRequest) -> Result<Uuid, PostgresError> {
        let query = r#"
            INSERT INTO contact_requests (
                id, sender_id, sender_name, sender_photo_url,
                receiver_id, receiver_name, receiver_photo_url,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#;

        let result = sqlx::query(query)
            .bind(request.id)
            .bind(&request.sender.user_id)
            .bind(&request.sender.display_name)
            .bind(&request.sender.photo_url)
            .bind(&request.receiver.user_id)
            .bind(&request.receiver.display_name)
            .bind(&request.receiver.photo_url)
            .bind(request.status)
            .bind(request.created_at)
            .bind(request.updated_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(
                    "Inserted contact request {}: {} -> {}",
                    request.id,
                    request.sender.user_id,
                    request.receiver.user_id
                );
                Ok(request.id)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(PostgresError::DuplicatePending(request.sender.user_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Set the status of a request
    pub async fn set_status(&self, id: Uuid, status: ContactStatus) -> Result<(), PostgresError> {
        let query = r#"
            UPDATE contact_requests
            SET status = $2, updated_at = NOW()
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PostgresError::NotFound(format!("contact request {}", id)));
        }

        tracing::debug!("Contact request {} -> {}", id, status);
        Ok(())
    }

    /// Cancel a request only while it is still pending
    pub async fn cancel_if_pending(&self, id: Uuid) -> Result<bool, PostgresError> {
        let query = r#"
            UPDATE contact_requests
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
        "#;

        let result = sqlx::query(query).bind(id).execute(&self.pool).await?;
        let cancelled = result.rows_affected() > 0;

        tracing::debug!("Contact request {} cancel applied: {}", id, cancelled);
        Ok(cancelled)
    }

    /// The sender's pending request, if any
    pub async fn get_pending_for_sender(&self, sender_id: &str) -> Result<Option<ContactRequest>, PostgresError> {
        let query = r#"
            SELECT id, sender_id, sender_name, sender_photo_url,
                   receiver_id, receiver_name, receiver_photo_url,
                   status, created_at, updated_at
            FROM contact_requests
            WHERE sender_id = $1 AND status = 'pending'
            ORDER BY created_at DESC
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(sender_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(request_from_row).transpose()?)
    }

    pub async fn get_request(&self, id: Uuid) -> Result<Option<ContactRequest>, PostgresError> {
        let query = r#"
            SELECT id, sender_id, sender_name, sender_photo_url,
                   receiver_id, receiver_name, receiver_photo_url,
                   status, created_at, updated_at
            FROM contact_requests
            WHERE id = $1
        "#;

        let row = sqlx::query(query).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(request_from_row).transpose()?)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn request_from_row(row: &PgRow) -> Result<ContactRequest, sqlx::Error> {
    Ok(ContactRequest {
        id: row.try_get("id")?,
        sender: ContactParty {
            user_id: row.try_get("sender_id")?,
            display_name: row.try_get("sender_name")?,
            photo_url: row.try_get("sender_photo_url")?,
        },
        receiver: ContactParty {
            user_id: row.try_get("receiver_id")?,
            display_name: row.try_get("receiver_name")?,
            photo_url: row.try_get("receiver_photo_url")?,
        },
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ContactRequestStore for PostgresClient {
    async fn persist_request(&self, request: &ContactRequest) -> Result<Uuid, StoreError> {
        match self.insert_request(request).await {
            Ok(id) => Ok(id),
            Err(PostgresError::DuplicatePending(sender)) => Err(StoreError::Conflict(format!(
                "sender {} already has a pending request",
                sender
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_request_status(&self, id: Uuid, status: ContactStatus) -> Result<(), StoreError> {
        match self.set_status(id, status).await {
            Ok(()) => Ok(()),
            Err(PostgresError::NotFound(what)) => Err(StoreError::NotFound(what)),
            Err(e) => Err(e.into()),
        }
    }

    async fn cancel_pending(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.cancel_if_pending(id).await?)
    }

    async fn find_pending_request(&self, sender_id: &str) -> Result<Option<ContactRequest>, StoreError> {
        Ok(self.get_pending_for_sender(sender_id).await?)
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<ContactRequest>, StoreError> {
        Ok(self.get_request(id).await?)
    }
}
