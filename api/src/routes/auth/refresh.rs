use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::{RefreshResponse, RefreshTokenRequest};
use crate::handlers::{handle_domain_error, ApiError};
use crate::routes::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new access token.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "string"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "token_type": "Bearer",
///     "expires_in": 900
/// }
/// ```
///
/// `refresh_token` is included as well when refresh tokens rotate on use;
/// the presented token is then no longer valid.
///
/// ## Errors
/// - 400 Bad Request: Missing refresh token
/// - 401 Unauthorized: Invalid, expired or revoked refresh token
/// - 503 Service Unavailable: Storage unreachable
pub async fn refresh(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    match state.token_service.refresh(&request.refresh_token).await {
        Ok(tokens) => Ok(HttpResponse::Ok().json(RefreshResponse {
            expires_in: (tokens.access_expires_at - state.token_service.clock().now())
                .num_seconds()
                .max(0),
            access_token: tokens.access_token,
            token_type: "Bearer".to_string(),
            refresh_token: tokens.refresh_token,
        })),
        Err(error) => Ok(handle_domain_error(error)),
    }
}
