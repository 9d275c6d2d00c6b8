use actix_web::HttpResponse;

use crate::dto::SessionResponse;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/v1/auth/session
///
/// Returns the subject behind the presented access token. Requires
/// authentication via Bearer token in the Authorization header.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "subject_id": "alice",
///     "email": "alice@example.com",
///     "roles": ["reader"],
///     "expires_at": "2024-03-01T09:15:00Z"
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing, invalid, expired or revoked access token
/// - 503 Service Unavailable: Revocation or identity storage unreachable
pub async fn session(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(SessionResponse {
        subject_id: auth.subject_id,
        email: auth.email,
        roles: auth.roles,
        expires_at: auth.expires_at,
    })
}
