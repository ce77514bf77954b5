use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{SearchPartnersRequest, SearchPartnersResponse, TaxonomyRefreshResponse};
use crate::routes::{error_body, AppState};
use crate::services::DiscoveryOutcome;

/// Configure partner discovery routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/partners/search", web::post().to(search_partners))
        .route("/taxonomy/refresh", web::post().to(refresh_taxonomy));
}

/// Search partners endpoint
///
/// POST /api/v1/partners/search
///
/// Request body:
/// ```json
/// {
///   "seekerId": "string",
///   "filters": { "style": "salsa", "location": "ist", "availability": ["weekend"] },
///   "preference": { "danceStyles": ["salsa"], "level": "beginner", "city": "Ist" },
///   "limit": 20
/// }
/// ```
///
/// Returns 204 when a newer search from the same seeker already completed.
async fn search_partners(
    state: web::Data<AppState>,
    req: web::Json<SearchPartnersRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for search request: {:?}", errors);
        return HttpResponse::BadRequest().json(error_body("Validation failed", errors, 400));
    }

    let limit = req
        .limit
        .map(usize::from)
        .unwrap_or(state.default_limit)
        .min(state.max_limit);

    tracing::info!(
        "Searching partners for {} (ranked: {}, limit: {})",
        req.seeker_id,
        req.preference.is_some(),
        limit
    );

    let outcome = state
        .discovery
        .discover(&req.seeker_id, &req.filters, req.preference.as_ref(), Some(limit))
        .await;

    match outcome {
        Ok(DiscoveryOutcome::Ranked(result)) => {
            tracing::info!(
                "Returning {} partners for {} (from {} candidates)",
                result.candidates.len(),
                req.seeker_id,
                result.total_candidates
            );
            HttpResponse::Ok().json(SearchPartnersResponse {
                candidates: result.candidates,
                total_candidates: result.total_candidates,
                ranked: result.ranked,
            })
        }
        Ok(DiscoveryOutcome::Stale(_)) => HttpResponse::NoContent().finish(),
        Err(e) => HttpResponse::BadGateway().json(error_body("Failed to fetch candidates", e, 502)),
    }
}

/// Rebuild the style taxonomy from the collection
///
/// POST /api/v1/taxonomy/refresh
async fn refresh_taxonomy(state: web::Data<AppState>) -> impl Responder {
    let status = state.discovery.refresh_taxonomy().await;

    HttpResponse::Ok().json(TaxonomyRefreshResponse {
        entries: status.entries,
        fallback: status.fallback,
    })
}
