use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::dto::{LogoutRequest, LogoutResponse};
use crate::handlers::{handle_domain_error, ApiError};
use crate::middleware::auth::bearer_token;
use crate::routes::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the refresh token in the body. If the request also carries a
/// Bearer access token, that token is revoked too. The access token is
/// optional and is not required to be valid, so a client whose access
/// token already expired can still log out.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "message": "Logged out successfully",
///     "access_token_revoked": true
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Missing refresh token
/// - 401 Unauthorized: Refresh token not issued by this service
/// - 503 Service Unavailable: Revocation storage unreachable; nothing was revoked
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<LogoutRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let access_token = bearer_token(req.headers());

    match state
        .token_service
        .revoke(&request.refresh_token, access_token)
        .await
    {
        Ok(outcome) => Ok(HttpResponse::Ok().json(LogoutResponse {
            message: "Logged out successfully".to_string(),
            access_token_revoked: outcome.access_blacklisted,
        })),
        Err(error) => Ok(handle_domain_error(error)),
    }
}
