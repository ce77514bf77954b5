use crate::models::{Candidate, TaxonomyEntry};
use crate::services::store::{CandidateDirectory, StoreError, TaxonomySource};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Appwrite API client
///
/// Reads the two collections the matching core needs:
/// - the user directory (matchable dancers only)
/// - the dance-style taxonomy
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
    page_size: usize,
}

/// One page of a document listing
struct DocumentPage {
    documents: Vec<Value>,
    total: Option<u64>,
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub users: String,
    pub dance_styles: String,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
            page_size: 500,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    /// List one page of documents of a collection matching the given queries
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[String],
    ) -> Result<DocumentPage, AppwriteError> {
        let queries_json = serde_json::to_string(queries)
            .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to encode queries: {}", e)))?;
        let url = format!(
            "{}?query={}",
            self.documents_url(collection),
            urlencoding::encode(&queries_json)
        );

        tracing::debug!("Listing documents from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppwriteError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to list {}: {} - {}", collection, status, body);
            return Err(AppwriteError::ApiError(format!(
                "Failed to list {}: {}",
                collection, status
            )));
        }

        let mut json: Value = response.json().await?;
        let total = json.get("total").and_then(Value::as_u64);

        match json.get_mut("documents").map(Value::take) {
            Some(Value::Array(documents)) => Ok(DocumentPage { documents, total }),
            _ => Err(AppwriteError::InvalidResponse("Missing documents array".into())),
        }
    }

    /// List every matching document, following `offset` until `total` is reached
    ///
    /// A listing that stops short of the reported total is an error, never a
    /// partial result.
    async fn list_all_documents(
        &self,
        collection: &str,
        queries: &[String],
    ) -> Result<Vec<Value>, AppwriteError> {
        let mut documents: Vec<Value> = Vec::new();

        loop {
            let mut page_queries = queries.to_vec();
            page_queries.push(format!("limit({})", self.page_size));
            page_queries.push(format!("offset({})", documents.len()));

            let page = self.list_documents(collection, &page_queries).await?;
            let received = page.documents.len();
            documents.extend(page.documents);

            match page.total {
                Some(total) if (documents.len() as u64) >= total => break,
                Some(total) if received == 0 => {
                    return Err(AppwriteError::InvalidResponse(format!(
                        "Listing {} stopped at {} of {} documents",
                        collection,
                        documents.len(),
                        total
                    )));
                }
                Some(_) => {}
                None if received < self.page_size => break,
                None => {}
            }
        }

        Ok(documents)
    }

    /// Fetch the matchable user pool for a seeker
    pub async fn query_candidates(&self, seeker_id: &str) -> Result<Vec<Candidate>, AppwriteError> {
        let seeker = serde_json::to_string(seeker_id)
            .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to encode seeker id: {}", e)))?;
        let queries = vec![
            r#"equal("lookingForPartner", true)"#.to_string(),
            format!(r#"notEqual("userId", {})"#, seeker),
        ];

        let documents = self.list_all_documents(&self.collections.users, &queries).await?;
        let fetched = documents.len();

        let candidates: Vec<Candidate> = documents
            .into_iter()
            .filter_map(|doc| match parse_candidate(doc) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    tracing::warn!("Skipping malformed user document: {}", e);
                    None
                }
            })
            .filter(|c| c.user_id != seeker_id)
            .collect();

        tracing::debug!(
            "Queried {} candidates for {} ({} documents)",
            candidates.len(),
            seeker_id,
            fetched
        );

        Ok(candidates)
    }

    /// Fetch every dance-style taxonomy entry
    pub async fn query_dance_styles(&self) -> Result<Vec<TaxonomyEntry>, AppwriteError> {
        let documents = self
            .list_all_documents(&self.collections.dance_styles, &[])
            .await?;

        let entries: Vec<TaxonomyEntry> = documents.iter().filter_map(parse_taxonomy_entry).collect();

        tracing::debug!("Loaded {} dance styles", entries.len());
        Ok(entries)
    }
}

/// Convert an Appwrite user document into a candidate
///
/// Falls back to the document `$id` when the `userId` attribute is absent.
fn parse_candidate(doc: Value) -> Result<Candidate, AppwriteError> {
    let mut data = match doc {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Object(inner)) => inner,
            _ => map,
        },
        _ => return Err(AppwriteError::InvalidResponse("Document is not an object".into())),
    };

    if !data.contains_key("userId") {
        if let Some(id) = data.get("$id").cloned() {
            data.insert("userId".to_string(), id);
        }
    }

    serde_json::from_value(Value::Object(data))
        .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to parse candidate: {}", e)))
}

/// Convert a taxonomy document; documents without a label are skipped
fn parse_taxonomy_entry(doc: &Value) -> Option<TaxonomyEntry> {
    let field = |name: &str| doc.get(name).and_then(Value::as_str).map(str::to_string);

    let label = field("label").or_else(|| field("name"))?;
    let id = field("$id").or_else(|| field("id")).unwrap_or_else(|| label.clone());
    let value = field("value").unwrap_or_else(|| label.clone());

    Some(TaxonomyEntry { id, label, value })
}

#[async_trait]
impl CandidateDirectory for AppwriteClient {
    async fn fetch_candidate_pool(&self, seeker_id: &str) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.query_candidates(seeker_id).await?)
    }
}

#[async_trait]
impl TaxonomySource for AppwriteClient {
    async fn fetch_style_taxonomy(&self) -> Result<Vec<TaxonomyEntry>, StoreError> {
        Ok(self.query_dance_styles().await?)
    }
}
