use actix_web::{http::header, web, HttpResponse};

use crate::handlers::handle_domain_error;

use super::AppState;

/// Handler for GET /.well-known/jwks.json
///
/// Publishes the public half of every key pair that may still appear in a
/// valid token. Clients may cache the set briefly; an unknown `kid` means
/// the set should be fetched again.
pub async fn jwks(state: web::Data<AppState>) -> HttpResponse {
    match state.token_service.public_key_set().await {
        Ok(set) => HttpResponse::Ok()
            .insert_header((header::CACHE_CONTROL, "public, max-age=300"))
            .json(set),
        Err(error) => handle_domain_error(error),
    }
}
