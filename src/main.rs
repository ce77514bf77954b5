use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use dance_match::config::Settings;
use dance_match::core::ContactRequestWorkflow;
use dance_match::routes::{self, AppState};
use dance_match::services::{
    AppwriteClient, AppwriteCollections, CacheManager, DiscoveryService, MemorySessionCache,
    PostgresClient, SessionCache,
};
use std::sync::Arc;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path errors (malformed request ids)
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration before logging so the configured level applies
    let settings = Settings::load().map_err(|e| io_error("Configuration error", e))?;

    // Initialize logging; LOG_LEVEL/LOG_FORMAT override the [logging] section
    let logging = settings.logging.clone().with_overrides(
        std::env::var("LOG_LEVEL").ok(),
        std::env::var("LOG_FORMAT").ok(),
    );

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting dance partner matching service...");
    info!("Configuration loaded successfully");

    // Initialize Appwrite client
    let appwrite_collections = AppwriteCollections {
        users: settings.collection.users.clone(),
        dance_styles: settings.collection.dance_styles.clone(),
    };

    let appwrite = Arc::new(AppwriteClient::new(
        settings.appwrite.endpoint.clone(),
        settings.appwrite.api_key.clone(),
        settings.appwrite.project_id.clone(),
        settings.appwrite.database_id.clone(),
        appwrite_collections,
    ));

    info!("Appwrite client initialized");

    // Session cache: Redis-backed when configured, in-process otherwise
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);

    let cache: Arc<dyn SessionCache> = match settings.cache.redis_url.as_deref() {
        Some(redis_url) => match CacheManager::new(redis_url, l1_cache_size).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries)", l1_cache_size);
                Arc::new(c)
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), using in-process session cache", e);
                Arc::new(MemorySessionCache::new(l1_cache_size))
            }
        },
        None => {
            info!("No Redis configured, using in-process session cache");
            Arc::new(MemorySessionCache::new(l1_cache_size))
        }
    };

    // Initialize PostgreSQL client
    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            Some(db_max_conn),
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            io_error("PostgreSQL connection error", e)
        })?,
    );

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    // Discovery with configured weights
    let weights = settings.scoring_weights();
    let discovery = Arc::new(DiscoveryService::new(appwrite.clone(), appwrite, weights));

    let status = discovery.refresh_taxonomy().await;
    info!(
        "Discovery initialized with weights: {:?} (taxonomy: {} entries, fallback: {})",
        weights, status.entries, status.fallback
    );

    let contacts = Arc::new(
        ContactRequestWorkflow::new(postgres.clone(), cache)
            .with_cache_ttl(settings.cache.active_request_ttl()),
    );

    let max_limit = usize::from(settings.matching.max_limit.unwrap_or(200)).max(1);
    let default_limit = usize::from(settings.matching.default_limit.unwrap_or(50)).clamp(1, max_limit);

    // Build application state
    let app_state = AppState {
        discovery,
        contacts,
        postgres: Some(postgres),
        default_limit,
        max_limit,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
