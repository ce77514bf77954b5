use actix_web::{web, HttpResponse, Responder};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;
use crate::core::ContactError;
use crate::models::{ActiveRequestResponse, ContactRequestResponse, SendContactRequest};
use crate::routes::{error_body, AppState};

/// Configure contact request routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/contact-requests", web::post().to(send_request))
        .route("/contact-requests/active", web::get().to(active_request))
        .route("/contact-requests/{id}/cancel", web::post().to(cancel_request));
}

fn contact_error_response(err: ContactError) -> HttpResponse {
    match &err {
        ContactError::AlreadyPending { .. } => {
            HttpResponse::Conflict().json(error_body("request_already_pending", &err, 409))
        }
        ContactError::NotPending { .. } => {
            HttpResponse::Conflict().json(error_body("request_not_pending", &err, 409))
        }
        ContactError::NotFound(_) => {
            HttpResponse::NotFound().json(error_body("request_not_found", &err, 404))
        }
        ContactError::SelfRequest => {
            HttpResponse::BadRequest().json(error_body("self_request", &err, 400))
        }
        ContactError::Store(e) => {
            tracing::error!("Contact request store failure: {}", e);
            HttpResponse::InternalServerError().json(error_body("store_error", &err, 500))
        }
    }
}

/// Send a contact request
///
/// POST /api/v1/contact-requests
///
/// Request body:
/// ```json
/// {
///   "senderId": "string",
///   "senderName": "string",
///   "receiverId": "string",
///   "receiverName": "string"
/// }
/// ```
async fn send_request(
    state: web::Data<AppState>,
    req: web::Json<SendContactRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_body("Validation failed", errors, 400));
    }

    match state.contacts.send(req.sender(), req.receiver()).await {
        Ok(request) => HttpResponse::Created().json(ContactRequestResponse {
            success: true,
            request,
        }),
        Err(e) => contact_error_response(e),
    }
}

/// Cancel a pending contact request
///
/// POST /api/v1/contact-requests/{id}/cancel
async fn cancel_request(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match state.contacts.cancel(path.into_inner()).await {
        Ok(request) => HttpResponse::Ok().json(ContactRequestResponse {
            success: true,
            request,
        }),
        Err(e) => contact_error_response(e),
    }
}

/// Active request for a sender, read from the store
///
/// GET /api/v1/contact-requests/active?senderId={senderId}
async fn active_request(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let sender_id = match query.get("senderId") {
        Some(id) if !id.is_empty() => id,
        _ => {
            return HttpResponse::BadRequest().json(error_body(
                "Missing senderId parameter",
                "senderId query parameter is required",
                400,
            ));
        }
    };

    match state.contacts.find_active_request(sender_id).await {
        Ok(request) => HttpResponse::Ok().json(ActiveRequestResponse {
            sender_id: sender_id.clone(),
            request,
        }),
        Err(e) => contact_error_response(e),
    }
}
