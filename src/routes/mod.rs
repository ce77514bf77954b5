// Route exports
pub mod contact;
pub mod partners;

use actix_web::{web, HttpResponse, Responder};
use crate::core::ContactRequestWorkflow;
use crate::models::{ErrorResponse, HealthResponse};
use crate::services::{DiscoveryService, PostgresClient};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub discovery: Arc<DiscoveryService>,
    pub contacts: Arc<ContactRequestWorkflow>,
    /// Present when contact requests live in PostgreSQL
    pub postgres: Option<Arc<PostgresClient>>,
    pub default_limit: usize,
    pub max_limit: usize,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(partners::configure)
            .configure(contact::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = match &state.postgres {
        Some(postgres) => postgres.health_check().await.unwrap_or(false),
        None => true,
    };

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

pub(crate) fn error_body(error: &str, message: impl ToString, status_code: u16) -> ErrorResponse {
    ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code,
    }
}
