//! Application factory
//!
//! Builds the Actix-web application around a shared [`AppState`].

use actix_web::{web, App, HttpResponse};

use crate::middleware::auth::JwtAuth;
use crate::routes::{
    auth::{logout, refresh, session},
    health::health_check,
    jwks::jwks,
    AppState,
};

/// Create and configure the application with all dependencies
///
/// Request logging is added by the server binary, so tests drive the same
/// routes without it.
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        // Health check endpoint
        .route("/health", web::get().to(health_check))
        // Public key set for external verifiers
        .route("/.well-known/jwks.json", web::get().to(jwks))
        // API v1 routes
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .route(
                            "/session",
                            web::get().to(session).wrap(JwtAuth::new()),
                        )
                        .route("/refresh", web::post().to(refresh))
                        // Logout reads the bearer itself; an expired access
                        // token must not block it
                        .route("/logout", web::post().to(logout)),
                )
                .route("/", web::get().to(api_documentation)),
        )
        .default_service(web::route().to(not_found))
}

/// API documentation endpoint
async fn api_documentation() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Warden API v1",
        "endpoints": {
            "health": "/health",
            "jwks": {
                "path": "/.well-known/jwks.json",
                "method": "GET",
                "description": "Public keys for verifying issued tokens"
            },
            "auth": {
                "session": {
                    "path": "/api/v1/auth/session",
                    "method": "GET",
                    "description": "Describe the subject behind an access token",
                    "requires_auth": true,
                    "responses": {
                        "200": "Session details",
                        "401": "Authentication required",
                        "503": "Storage unavailable"
                    }
                },
                "refresh": {
                    "path": "/api/v1/auth/refresh",
                    "method": "POST",
                    "description": "Exchange a refresh token for a new access token",
                    "request_body": {
                        "refresh_token": "string"
                    },
                    "responses": {
                        "200": "New access token",
                        "400": "Missing refresh token",
                        "401": "Invalid, expired or revoked refresh token",
                        "503": "Storage unavailable"
                    }
                },
                "logout": {
                    "path": "/api/v1/auth/logout",
                    "method": "POST",
                    "description": "Revoke a refresh token and the bearer access token, if any",
                    "request_body": {
                        "refresh_token": "string"
                    },
                    "responses": {
                        "200": "Logged out",
                        "400": "Missing refresh token",
                        "401": "Refresh token not recognised",
                        "503": "Storage unavailable"
                    }
                }
            }
        }
    }))
}

/// Default handler for unknown routes
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "not_found",
        "message": "The requested resource was not found"
    }))
}
